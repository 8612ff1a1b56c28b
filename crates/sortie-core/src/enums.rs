//! Enumeration types used throughout the campaign.

use serde::{Deserialize, Serialize};

/// Side an entity fights for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Coalition {
    Blue,
    Red,
    #[default]
    Neutrals,
}

impl Coalition {
    /// The coalitions that own factions.
    pub const PLAYABLE: [Coalition; 2] = [Coalition::Blue, Coalition::Red];

    pub fn opposite(self) -> Coalition {
        match self {
            Coalition::Blue => Coalition::Red,
            Coalition::Red => Coalition::Blue,
            Coalition::Neutrals => Coalition::Neutrals,
        }
    }
}

/// Mission task of a package and its flight groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Task {
    #[serde(rename = "CAP")]
    Cap,
    #[serde(rename = "CAS")]
    Cas,
    #[serde(rename = "AWACS")]
    Awacs,
    #[serde(rename = "DEAD")]
    Dead,
    #[serde(rename = "Pinpoint Strike")]
    Strike,
}

impl Task {
    pub const ALL: [Task; 5] = [Task::Cap, Task::Cas, Task::Awacs, Task::Dead, Task::Strike];

    /// Base call sign used when naming flight groups.
    pub fn call_sign_base(self) -> &'static str {
        match self {
            Task::Cap => "Enfield",
            Task::Cas => "Springfield",
            Task::Awacs => "Overlord",
            Task::Dead => "Uzi",
            Task::Strike => "Colt",
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Task::Cap => "CAP",
            Task::Cas => "CAS",
            Task::Awacs => "AWACS",
            Task::Dead => "DEAD",
            Task::Strike => "Pinpoint Strike",
        };
        f.write_str(name)
    }
}

/// Life cycle of a ground group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroundGroupState {
    /// Driving from its start objective to its target objective.
    #[serde(rename = "en route")]
    EnRoute,
    /// Arrived at a contested objective, waiting for battle resolution.
    #[serde(rename = "on target")]
    OnTarget,
    /// Battle unresolved, waiting for the combat timer.
    #[serde(rename = "combat")]
    Combat,
    /// Holding an owned objective.
    #[serde(rename = "on objective")]
    OnObjective,
}

impl GroundGroupState {
    pub const ALL: [GroundGroupState; 4] = [
        GroundGroupState::EnRoute,
        GroundGroupState::OnTarget,
        GroundGroupState::Combat,
        GroundGroupState::OnObjective,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroundGroupType {
    Armor,
    Infantry,
    Sam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroundUnitCategory {
    Armor,
    Infantry,
    Sam,
}

/// Installation type of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    Farp,
    Barrack,
    Depot,
    Power,
    Ammo,
    Fuel,
    Hospital,
}

impl StructureType {
    /// Structures that accumulate deployment score and spawn ground groups.
    pub fn is_unit_camp(self) -> bool {
        matches!(self, StructureType::Barrack | StructureType::Depot)
    }
}

/// Indexed query sets maintained by the world.
///
/// Every set is further partitioned by coalition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "query", content = "key")]
pub enum QueryKey {
    Airdromes,
    Objectives,
    Structures,
    Aircraft,
    GroundUnits,
    GroundGroups(GroundGroupState),
    Packages,
    FlightGroups(Task),
    /// Flight groups that have taken off and are drawn on the map.
    MapEntities,
}
