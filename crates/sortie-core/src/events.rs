//! Events emitted by the campaign worker to its host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::state::{UiState, WorkerState};
use crate::types::{EntityId, Position};

/// Worker to host notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum WorkerEvent {
    /// A tick completed, advancing the campaign by `dt` seconds.
    Tick { dt: f64 },
    /// Map items keyed by entity id.
    MapUpdate { items: BTreeMap<String, MapItem> },
    TimeUpdate { time: f64 },
    StateUpdate { state: Box<UiState> },
    Serialized { state: Box<WorkerState> },
    /// A command was rejected.
    Error { message: String },
}

/// A drawable map entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MapItem {
    Structure {
        id: EntityId,
        name: String,
        coalition: Coalition,
        position: Position,
        structure_type: StructureType,
    },
    Airdrome {
        id: EntityId,
        name: String,
        coalition: Coalition,
        position: Position,
    },
    FlightGroup {
        id: EntityId,
        name: String,
        coalition: Coalition,
        position: Position,
        task: Task,
    },
    GroundGroup {
        id: EntityId,
        name: String,
        coalition: Coalition,
        position: Position,
        ground_group_type: GroundGroupType,
    },
    Sam {
        id: EntityId,
        name: String,
        coalition: Coalition,
        position: Position,
        range: f64,
        active: bool,
    },
}
