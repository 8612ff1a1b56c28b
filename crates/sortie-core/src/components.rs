//! Entity components stored in the world.
//!
//! Components are plain data. Links between entities are `EntityId`s that
//! the world resolves; no component owns another. Game logic lives in the
//! simulation crate's systems.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::flightplan::Flightplan;
use crate::types::{EntityId, Position};

/// Home airbase of one coalition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airdrome {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub name: String,
    pub alive: bool,
    pub destroyed_time: Option<f64>,
    /// Offset from the structure's position.
    pub offset: Position,
}

/// A named installation at an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub name: String,
    pub objective: EntityId,
    pub structure_type: StructureType,
    pub buildings: Vec<Building>,
    pub deployment_score: f64,
    pub position: Position,
}

impl Structure {
    pub fn has_alive_building(&self) -> bool {
        self.buildings.iter().any(|b| b.alive)
    }
}

/// A contestable location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub name: String,
    pub position: Position,
    /// Ground group currently heading here, at most one per coalition.
    pub incoming_ground_groups: BTreeMap<Coalition, EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundUnit {
    pub name: String,
    pub unit_type: String,
    pub category: GroundUnitCategory,
    pub alive: bool,
    pub destroyed_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundGroup {
    pub name: String,
    pub units: Vec<EntityId>,
    pub start: EntityId,
    pub target: EntityId,
    pub state: GroundGroupState,
    /// Time at which an unresolved battle is fought again.
    pub combat_timer: Option<f64>,
    pub position: Position,
    pub group_type: GroundGroupType,
}

/// Remaining air-to-air missiles of one type on an aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2AWeapon {
    pub name: String,
    /// Maximum range (meters).
    pub range: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aircraft {
    pub aircraft_type: String,
    pub display_name: String,
    /// Airdrome or Farp the aircraft operates from.
    pub home_base: EntityId,
    pub flight_group: Option<EntityId>,
    pub alive: bool,
    pub destroyed_time: Option<f64>,
    pub a2a_weapons: Vec<A2AWeapon>,
    pub is_client: bool,
}

impl Aircraft {
    pub fn is_available(&self) -> bool {
        self.alive && self.flight_group.is_none()
    }

    /// Longest maximum range of any loaded a2a weapon.
    pub fn a2a_range(&self) -> f64 {
        self.a2a_weapons
            .iter()
            .filter(|w| w.count > 0)
            .map(|w| w.range)
            .fold(0.0, f64::max)
    }
}

/// A mission instance owning its flight groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub task: Task,
    pub start_time: f64,
    pub end_time: f64,
    pub home_base: EntityId,
    pub cruise_speed: f64,
    pub flight_groups: Vec<EntityId>,
}

/// Task of a flight group and its task-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all_fields = "camelCase")]
pub enum FlightGroupTask {
    /// Patrol over a friendly objective or airdrome.
    #[serde(rename = "CAP")]
    Cap { target: EntityId },
    /// Support friendly ground forces against an enemy ground group.
    #[serde(rename = "CAS")]
    Cas {
        target: EntityId,
        jtac_frequency: u32,
    },
    #[serde(rename = "AWACS")]
    Awacs,
    /// Destroy an enemy SAM group.
    #[serde(rename = "DEAD")]
    Dead { target: EntityId },
    /// Destroy the buildings of an enemy structure.
    #[serde(rename = "Pinpoint Strike")]
    Strike { target: EntityId },
}

impl FlightGroupTask {
    pub fn task(&self) -> Task {
        match self {
            FlightGroupTask::Cap { .. } => Task::Cap,
            FlightGroupTask::Cas { .. } => Task::Cas,
            FlightGroupTask::Awacs => Task::Awacs,
            FlightGroupTask::Dead { .. } => Task::Dead,
            FlightGroupTask::Strike { .. } => Task::Strike,
        }
    }

    pub fn target(&self) -> Option<EntityId> {
        match self {
            FlightGroupTask::Cap { target }
            | FlightGroupTask::Cas { target, .. }
            | FlightGroupTask::Dead { target }
            | FlightGroupTask::Strike { target } => Some(*target),
            FlightGroupTask::Awacs => None,
        }
    }
}

/// Active air-to-air engagement of a flight group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2ACombat {
    pub target: EntityId,
    /// No shot is fired before this time.
    pub cooldown_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightGroup {
    pub name: String,
    pub task: FlightGroupTask,
    pub package: EntityId,
    pub home_base: EntityId,
    pub start_time: f64,
    pub position: Position,
    /// Member aircraft in insertion order.
    pub aircraft: Vec<EntityId>,
    pub flightplan: Flightplan,
    pub combat: Option<A2ACombat>,
    /// Last air-to-ground attack, for on-station tasks.
    pub last_attack_time: Option<f64>,
    /// Set once the one-shot air-to-ground task has been performed.
    pub task_done: bool,
}

/// Component payload of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entityType")]
pub enum EntityData {
    Airdrome(Airdrome),
    Structure(Structure),
    Objective(Objective),
    GroundGroup(GroundGroup),
    GroundUnit(GroundUnit),
    Aircraft(Aircraft),
    Package(Package),
    FlightGroup(FlightGroup),
}

impl EntityData {
    pub fn name(&self) -> Option<&str> {
        match self {
            EntityData::Airdrome(d) => Some(&d.name),
            EntityData::Structure(d) => Some(&d.name),
            EntityData::Objective(d) => Some(&d.name),
            EntityData::GroundGroup(d) => Some(&d.name),
            EntityData::GroundUnit(d) => Some(&d.name),
            EntityData::Aircraft(d) => Some(&d.display_name),
            EntityData::FlightGroup(d) => Some(&d.name),
            EntityData::Package(_) => None,
        }
    }
}

/// An entity with its query memberships, as stored in serialized campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub coalition: Coalition,
    /// Query sets the entity is registered in.
    pub queries: Vec<QueryKey>,
    pub data: EntityData,
}
