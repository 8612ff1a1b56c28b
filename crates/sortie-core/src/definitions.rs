//! Faction and scenario definitions received from the host.
//!
//! These carry the static reference data a campaign is generated from:
//! aircraft types per task, weapon loadouts, unit names, airdrome
//! coordinates and objective layout. They are validated before any world
//! is built from them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::{Coalition, StructureType, Task};
use crate::error::{CampaignError, Result};
use crate::types::Position;

/// An air-to-air missile carried by an aircraft type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub name: String,
    /// Maximum range (meters).
    pub range: f64,
    /// Missiles per aircraft.
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactionDefinition {
    pub name: String,
    pub country_name: String,
    pub playable: bool,
    /// Aircraft types usable for each task.
    pub aircraft_types: BTreeMap<Task, Vec<String>>,
    /// Air-to-air loadout per aircraft type.
    pub a2a_weapons: BTreeMap<String, Vec<WeaponDefinition>>,
    /// Vehicle types used for armor and infantry groups.
    pub vehicles: Vec<String>,
    /// Vehicle types used for SAM groups.
    pub sams: Vec<String>,
}

impl FactionDefinition {
    pub fn aircraft_types_for(&self, task: Task) -> &[String] {
        self.aircraft_types
            .get(&task)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn can_fly(&self, aircraft_type: &str, task: Task) -> bool {
        self.aircraft_types_for(task).iter().any(|t| t == aircraft_type)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CampaignError::InvalidFaction("faction has no name".into()));
        }
        if self.aircraft_types.values().all(Vec::is_empty) {
            return Err(CampaignError::InvalidFaction(format!(
                "faction {} has no aircraft types",
                self.name
            )));
        }
        if self.vehicles.is_empty() {
            return Err(CampaignError::InvalidFaction(format!(
                "faction {} has no vehicles",
                self.name
            )));
        }
        for weapons in self.a2a_weapons.values() {
            if let Some(w) = weapons.iter().find(|w| !(w.range > 0.0)) {
                return Err(CampaignError::InvalidFaction(format!(
                    "weapon {} has no range",
                    w.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirdromeDefinition {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    pub name: String,
    pub structure_type: StructureType,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDefinition {
    pub name: String,
    pub position: Position,
    /// Fixed owner; by default the coalition with the nearer airdrome owns it.
    #[serde(default)]
    pub coalition: Option<Coalition>,
    #[serde(default)]
    pub structures: Vec<StructureDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioCoalition {
    pub airdrome_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub theatre: String,
    /// Campaign day number the clock starts on.
    #[serde(default)]
    pub start_day: u32,
    pub blue: ScenarioCoalition,
    pub red: ScenarioCoalition,
    pub airdromes: Vec<AirdromeDefinition>,
    pub objectives: Vec<ObjectiveDefinition>,
}

impl Scenario {
    pub fn coalition(&self, coalition: Coalition) -> Option<&ScenarioCoalition> {
        match coalition {
            Coalition::Blue => Some(&self.blue),
            Coalition::Red => Some(&self.red),
            Coalition::Neutrals => None,
        }
    }

    pub fn airdrome(&self, name: &str) -> Option<&AirdromeDefinition> {
        self.airdromes.iter().find(|a| a.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for airdrome in &self.airdromes {
            if !names.insert(airdrome.name.as_str()) {
                return Err(CampaignError::InvalidScenario(format!(
                    "duplicate airdrome {}",
                    airdrome.name
                )));
            }
        }
        for coalition in Coalition::PLAYABLE {
            let Some(side) = self.coalition(coalition) else {
                continue;
            };
            if side.airdrome_names.is_empty() {
                return Err(CampaignError::InvalidScenario(format!(
                    "{coalition:?} has no airdromes"
                )));
            }
            for name in &side.airdrome_names {
                if self.airdrome(name).is_none() {
                    return Err(CampaignError::AirdromeNotFound(name.clone()));
                }
            }
        }
        if let Some(shared) = self
            .blue
            .airdrome_names
            .iter()
            .find(|n| self.red.airdrome_names.contains(n))
        {
            return Err(CampaignError::InvalidScenario(format!(
                "airdrome {shared} assigned to both coalitions"
            )));
        }
        let mut structure_names = BTreeSet::new();
        let mut objective_names = BTreeSet::new();
        for objective in &self.objectives {
            if !objective_names.insert(objective.name.as_str()) {
                return Err(CampaignError::InvalidScenario(format!(
                    "duplicate objective {}",
                    objective.name
                )));
            }
            for structure in &objective.structures {
                if !structure_names.insert(structure.name.as_str()) {
                    return Err(CampaignError::InvalidScenario(format!(
                        "duplicate structure {}",
                        structure.name
                    )));
                }
            }
        }
        Ok(())
    }
}
