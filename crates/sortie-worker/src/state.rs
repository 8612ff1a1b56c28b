//! State shared between the host loop and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use sortie_core::commands::WorkerMessage;
use sortie_core::state::UiState;

/// Commands sent from the host to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A message to forward to the campaign engine.
    Message(WorkerMessage),
    /// Stop the game loop thread.
    Shutdown,
}

/// Handles the host keeps on a running worker.
///
/// `command_tx` is `None` until the game loop has been spawned.
pub struct WorkerHandle {
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Last UI state the engine published, for synchronous polling.
    pub latest_state: Arc<Mutex<Option<UiState>>>,
    pub running: Mutex<bool>,
}

impl Default for WorkerHandle {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_state: Arc::new(Mutex::new(None)),
            running: Mutex::new(false),
        }
    }
}

impl WorkerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a message to the game loop.
    pub fn send(&self, message: WorkerMessage) -> Result<(), String> {
        let tx = self.command_tx.lock().map_err(|e| e.to_string())?;
        match tx.as_ref() {
            Some(tx) => tx
                .send(GameLoopCommand::Message(message))
                .map_err(|e| format!("failed to send message: {e}")),
            None => Err("worker not started".into()),
        }
    }

    /// Ask the game loop to stop. A loop that already exited is not an error.
    pub fn shutdown(&self) -> Result<(), String> {
        let mut tx = self.command_tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = tx.take() {
            let _ = tx.send(GameLoopCommand::Shutdown);
        }
        *self.running.lock().map_err(|e| e.to_string())? = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_creation() {
        let handle = WorkerHandle::new();
        assert!(handle.command_tx.lock().unwrap().is_none());
        assert!(handle.latest_state.lock().unwrap().is_none());
        assert!(!*handle.running.lock().unwrap());
    }

    #[test]
    fn test_send_before_start_fails() {
        let handle = WorkerHandle::new();
        let err = handle.send(WorkerMessage::Pause).unwrap_err();
        assert_eq!(err, "worker not started");
    }

    #[test]
    fn test_send_and_shutdown() {
        let handle = WorkerHandle::new();
        let (tx, rx) = mpsc::channel();
        *handle.command_tx.lock().unwrap() = Some(tx);
        *handle.running.lock().unwrap() = true;

        handle.send(WorkerMessage::GetMapUpdate).unwrap();
        handle.shutdown().unwrap();

        assert!(matches!(
            rx.try_recv(),
            Ok(GameLoopCommand::Message(WorkerMessage::GetMapUpdate))
        ));
        assert!(matches!(rx.try_recv(), Ok(GameLoopCommand::Shutdown)));
        assert!(handle.command_tx.lock().unwrap().is_none());
        assert!(!*handle.running.lock().unwrap());
    }
}
