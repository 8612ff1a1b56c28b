//! Campaign engine: owns the world, applies worker messages between ticks
//! and advances simulated time.
//!
//! `SimulationEngine` is headless. The host feeds it `WorkerMessage`s and
//! drains the `WorkerEvent`s each tick produces.

use std::collections::VecDeque;

use log::{info, warn};

use sortie_core::commands::WorkerMessage;
use sortie_core::config::CampaignConfig;
use sortie_core::constants::DT;
use sortie_core::enums::Coalition;
use sortie_core::error::{CampaignError, Result};
use sortie_core::events::WorkerEvent;
use sortie_core::time::{format_clock, next_day_start, SECONDS_PER_DAY};
use sortie_core::types::EntityId;

use crate::dice::SeededDice;
use crate::packages::generate_packages;
use crate::systems::flight::flight_groups_of;
use crate::world::{Notification, World};
use crate::{scenario, serialization};

/// Longest stretch of simulated time covered by a single system pass.
const MAX_STEP: f64 = 1.0;

/// Configuration for a campaign engine.
#[derive(Debug, Clone, Default)]
pub struct SimConfig {
    /// RNG seed. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub campaign: CampaignConfig,
}

pub struct SimulationEngine {
    config: SimConfig,
    world: Option<World>,
    command_queue: VecDeque<WorkerMessage>,
    events: Vec<WorkerEvent>,
    start_time_reached: bool,
    /// Simulated minute packages were last generated in.
    last_generation_minute: Option<i64>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            world: None,
            command_queue: VecDeque::new(),
            events: Vec::new(),
            start_time_reached: false,
            last_generation_minute: None,
        }
    }

    /// Queue a message for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: WorkerMessage) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = WorkerMessage>) {
        self.command_queue.extend(commands);
    }

    /// Apply queued messages, then advance one tick if a campaign is running.
    pub fn tick(&mut self) -> Vec<WorkerEvent> {
        self.process_commands();

        let multiplier = self
            .world
            .as_ref()
            .filter(|w| !w.paused)
            .map(|w| w.time_multiplier);
        if let Some(multiplier) = multiplier {
            let dt = DT * multiplier;
            self.advance(dt, MAX_STEP);
            self.events.push(WorkerEvent::Tick { dt });
            if let Some(world) = self.world.as_ref() {
                self.events.push(WorkerEvent::TimeUpdate { time: world.time });
            }
        }
        self.drain_notifications();
        std::mem::take(&mut self.events)
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    pub fn is_running(&self) -> bool {
        self.world.as_ref().is_some_and(|w| !w.paused)
    }

    pub fn start_time_reached(&self) -> bool {
        self.start_time_reached
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(e) = self.handle_command(command) {
                warn!("command rejected: {e}");
                self.events.push(WorkerEvent::Error { message: e.to_string() });
            }
        }
    }

    fn handle_command(&mut self, command: WorkerMessage) -> Result<()> {
        match command {
            WorkerMessage::Resume { multiplier } => {
                let world = self.world.as_mut().ok_or(CampaignError::NoActiveCampaign)?;
                world.time_multiplier = multiplier.max(0.0);
                world.paused = false;
                self.start_time_reached = false;
                info!("campaign resumed at x{}", world.time_multiplier);
            }
            WorkerMessage::Pause => {
                let world = self.world.as_mut().ok_or(CampaignError::NoActiveCampaign)?;
                world.paused = true;
            }
            WorkerMessage::Generate {
                blue_faction_definition,
                red_faction_definition,
                scenario,
            } => {
                let mut world = World::new(self.config.campaign.clone(), Box::new(SeededDice::new(self.config.seed)));
                scenario::generate(&mut world, *blue_faction_definition, *red_faction_definition, &scenario)?;
                self.replace_world(world);
                self.push_state_update();
            }
            WorkerMessage::Serialize => {
                let world = self.world.as_ref().ok_or(CampaignError::NoActiveCampaign)?;
                let state = serialization::serialize(world);
                self.events.push(WorkerEvent::Serialized { state: Box::new(state) });
            }
            WorkerMessage::SkipToNextDay => self.skip_to_next_day()?,
            WorkerMessage::Load { state } => {
                let world = serialization::load(
                    *state,
                    self.config.campaign.clone(),
                    Box::new(SeededDice::new(self.config.seed)),
                )?;
                self.replace_world(world);
                self.push_state_update();
            }
            WorkerMessage::CloseCampaign => {
                if let Some(world) = self.world.take() {
                    info!("campaign {} closed", world.meta.name);
                }
                self.start_time_reached = false;
                self.last_generation_minute = None;
            }
            WorkerMessage::SetClient { flight_group_id, count } => {
                let world = self.world.as_mut().ok_or(CampaignError::NoActiveCampaign)?;
                set_client(world, flight_group_id, count)?;
                self.push_state_update();
            }
            WorkerMessage::GetMapUpdate => {
                let world = self.world.as_ref().ok_or(CampaignError::NoActiveCampaign)?;
                let items = serialization::map_update(world);
                self.events.push(WorkerEvent::MapUpdate { items });
            }
        }
        Ok(())
    }

    fn replace_world(&mut self, world: World) {
        self.world = Some(world);
        self.start_time_reached = false;
        self.last_generation_minute = None;
        self.generate_if_due();
    }

    /// Advance simulated time by `dt` in steps of at most `max_step`,
    /// stopping early when a client flight group reaches its start time.
    fn advance(&mut self, dt: f64, max_step: f64) {
        let mut remaining = dt;
        while remaining > 0.0 {
            let Some(world) = self.world.as_mut() else {
                return;
            };
            if world.paused {
                return;
            }
            let step = remaining.min(max_step);
            let before = world.time;
            world.advance(step);
            remaining -= step;
            self.generate_if_due();
            if self.client_start_reached(before) {
                return;
            }
        }
    }

    /// Generate packages once per simulated minute.
    fn generate_if_due(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let minute = (world.time / 60.0).floor() as i64;
        if self.last_generation_minute == Some(minute) {
            return;
        }
        self.last_generation_minute = Some(minute);
        generate_packages(world);
    }

    /// Pause when a flight group with client aircraft started after `since`.
    fn client_start_reached(&mut self, since: f64) -> bool {
        let Some(world) = self.world.as_mut() else {
            return false;
        };
        let now = world.time;
        let reached = flight_groups_of(world, Coalition::Blue)
            .into_iter()
            .filter_map(|id| world.flight_group(id))
            .filter(|fg| fg.start_time > since && fg.start_time <= now)
            .any(|fg| {
                fg.aircraft
                    .iter()
                    .any(|a| world.aircraft(*a).is_some_and(|aircraft| aircraft.is_client))
            });
        if reached {
            world.paused = true;
            self.start_time_reached = true;
            info!("client flight group start time reached, campaign paused");
            self.push_state_update();
        }
        reached
    }

    fn skip_to_next_day(&mut self) -> Result<()> {
        let world = self.world.as_ref().ok_or(CampaignError::NoActiveCampaign)?;
        let target = next_day_start(world.time, world.config.time.day_start_hour);
        let step = world.config.time.skip_step.max(DT);
        let was_paused = world.paused;
        if let Some(world) = self.world.as_mut() {
            world.paused = false;
        }
        while let Some(world) = self.world.as_ref() {
            if world.paused || world.time >= target - 1e-6 {
                break;
            }
            let dt = step.min(target - world.time);
            self.advance(dt, step);
        }
        if let Some(world) = self.world.as_mut() {
            if !self.start_time_reached {
                world.paused = was_paused;
            }
            let time = world.time;
            info!("skipped to day {} {}", (time / SECONDS_PER_DAY).floor() as i64 + 1, format_clock(time));
            self.events.push(WorkerEvent::TimeUpdate { time });
        }
        self.push_state_update();
        Ok(())
    }

    fn push_state_update(&mut self) {
        if let Some(world) = self.world.as_ref() {
            let state = serialization::ui_state(world, self.start_time_reached);
            self.events.push(WorkerEvent::StateUpdate { state: Box::new(state) });
        }
    }

    fn drain_notifications(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let notifications = world.take_notifications();
        if notifications.contains(&Notification::FlightGroupsChanged) {
            self.push_state_update();
        }
    }
}

/// Mark the first `count` aircraft of a flight group as player-flown and
/// the rest as AI.
pub fn set_client(world: &mut World, flight_group: EntityId, count: usize) -> Result<()> {
    let aircraft = world.expect_flight_group(flight_group)?.aircraft.clone();
    for (i, id) in aircraft.into_iter().enumerate() {
        world.expect_aircraft_mut(id)?.is_client = i < count;
    }
    Ok(())
}
