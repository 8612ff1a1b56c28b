//! Game loop thread: ticks the campaign engine at `TICK_RATE` and hands
//! every produced event to a sink.
//!
//! The engine lives inside the thread. Commands arrive over an `mpsc`
//! channel and are applied between ticks.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info};

use sortie_core::constants::TICK_RATE;
use sortie_core::events::WorkerEvent;
use sortie_core::state::UiState;
use sortie_sim::engine::{SimConfig, SimulationEngine};

use crate::state::GameLoopCommand;

/// Real time between two ticks. The time multiplier scales simulated time,
/// not the tick rate.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop<F>(
    config: SimConfig,
    latest_state: Arc<Mutex<Option<UiState>>>,
    sink: F,
) -> std::io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)>
where
    F: FnMut(WorkerEvent) + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("sortie-game-loop".into())
        .spawn(move || {
            run_game_loop(config, cmd_rx, &latest_state, sink);
        })?;

    Ok((cmd_tx, handle))
}

/// Runs until a Shutdown command or channel disconnect. Messages queued
/// before the shutdown are still applied and answered.
fn run_game_loop<F>(
    config: SimConfig,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_state: &Mutex<Option<UiState>>,
    mut sink: F,
) where
    F: FnMut(WorkerEvent),
{
    let mut engine = SimulationEngine::new(config);
    let mut next_tick_time = Instant::now();
    info!("game loop started at {TICK_RATE} Hz");

    loop {
        let mut stop = false;
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Message(message)) => engine.queue_command(message),
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    stop = true;
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        for event in engine.tick() {
            if let WorkerEvent::StateUpdate { state } = &event {
                if let Ok(mut lock) = latest_state.lock() {
                    *lock = Some(state.as_ref().clone());
                }
            }
            sink(event);
        }

        if stop {
            info!("game loop stopped");
            return;
        }

        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            debug!("game loop behind by {:?}, resetting", now - next_tick_time);
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortie_core::commands::WorkerMessage;

    fn collect(commands: Vec<GameLoopCommand>) -> (Vec<WorkerEvent>, Option<UiState>) {
        let (tx, rx) = mpsc::channel();
        for cmd in commands {
            tx.send(cmd).unwrap();
        }
        let latest = Mutex::new(None);
        let mut events = Vec::new();
        run_game_loop(SimConfig::default(), rx, &latest, |e| events.push(e));
        (events, latest.into_inner().unwrap())
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::Message(WorkerMessage::Resume { multiplier: 2.0 }))
            .unwrap();
        tx.send(GameLoopCommand::Message(WorkerMessage::Pause)).unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let commands: Vec<_> = rx.try_iter().collect();
        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            GameLoopCommand::Message(WorkerMessage::Resume { .. })
        ));
        assert!(matches!(commands[1], GameLoopCommand::Message(WorkerMessage::Pause)));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_messages_before_shutdown_are_answered() {
        let (events, latest) = collect(vec![
            GameLoopCommand::Message(WorkerMessage::Pause),
            GameLoopCommand::Message(WorkerMessage::Serialize),
            GameLoopCommand::Shutdown,
        ]);

        let errors: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Error { message } => Some(message.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(errors, vec!["no active campaign", "no active campaign"]);
        assert!(latest.is_none());
    }

    #[test]
    fn test_no_ticks_without_campaign() {
        let (events, _) = collect(vec![GameLoopCommand::Shutdown]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_disconnect_stops_loop() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();
        tx.send(GameLoopCommand::Message(WorkerMessage::CloseCampaign))
            .unwrap();
        drop(tx);
        let latest = Mutex::new(None);
        let mut count = 0;
        run_game_loop(SimConfig::default(), rx, &latest, |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_spawned_loop_delivers_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        let (tx, handle) = spawn_game_loop(SimConfig::default(), Arc::new(Mutex::new(None)), move |e| {
            sink_events.lock().unwrap().push(e)
        })
        .unwrap();

        tx.send(GameLoopCommand::Message(WorkerMessage::GetMapUpdate))
            .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], WorkerEvent::Error { .. }));
    }

    #[test]
    fn test_tick_duration_constant() {
        // 4Hz = 250ms per tick
        assert_eq!(TICK_DURATION, Duration::from_millis(250));
    }
}
