//! Commands sent from the host to the campaign worker.
//!
//! Commands are queued and applied between ticks, never during one.

use serde::{Deserialize, Serialize};

use crate::definitions::{FactionDefinition, Scenario};
use crate::state::WorkerState;
use crate::types::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "name",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum WorkerMessage {
    /// Start ticking at `multiplier` simulated seconds per real second.
    Resume { multiplier: f64 },
    Pause,
    /// Generate a new campaign.
    Generate {
        blue_faction_definition: Box<FactionDefinition>,
        red_faction_definition: Box<FactionDefinition>,
        scenario: Box<Scenario>,
    },
    Serialize,
    SkipToNextDay,
    Load { state: Box<WorkerState> },
    CloseCampaign,
    /// Mark `count` aircraft of a flight group as flown by players.
    SetClient { flight_group_id: EntityId, count: usize },
    GetMapUpdate,
}
