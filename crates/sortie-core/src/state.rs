//! Serializable campaign state objects exchanged with the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{EntityRecord, Package};
use crate::definitions::FactionDefinition;
use crate::enums::{Coalition, Task};
use crate::flightplan::{TimeTableEntry, Waypoint};
use crate::types::{EntityId, Position};

/// Faction definitions per coalition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionDefinitions {
    pub blue: Option<FactionDefinition>,
    pub red: Option<FactionDefinition>,
    pub neutrals: Option<FactionDefinition>,
}

impl FactionDefinitions {
    pub fn get(&self, coalition: Coalition) -> Option<&FactionDefinition> {
        match coalition {
            Coalition::Blue => self.blue.as_ref(),
            Coalition::Red => self.red.as_ref(),
            Coalition::Neutrals => self.neutrals.as_ref(),
        }
    }
}

/// Persistable snapshot of a whole campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerState {
    pub id: String,
    pub name: String,
    pub time: f64,
    pub entities: Vec<EntityRecord>,
    pub active: bool,
    pub version: u32,
    pub faction_definitions: FactionDefinitions,
    pub theatre: String,
    #[serde(default)]
    pub campaign_params: CampaignParams,
    #[serde(default)]
    pub weather: Weather,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CampaignParams {
    pub ai_skill: String,
    pub hardcore: bool,
    pub training: bool,
    pub night_missions: bool,
    pub bad_weather: bool,
}

impl Default for CampaignParams {
    fn default() -> Self {
        Self {
            ai_skill: "Average".into(),
            hardcore: false,
            training: false,
            night_missions: false,
            bad_weather: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Weather {
    /// Air temperature at sea level (°C).
    pub temperature: f64,
    /// Direction the wind blows from (degrees).
    pub wind_direction: f64,
    /// Wind speed (m/s).
    pub wind_speed: f64,
    /// Cloud cover (0 clear to 10 overcast).
    pub cloud_cover: u32,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            temperature: 15.0,
            wind_direction: 0.0,
            wind_speed: 0.0,
            cloud_cover: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftView {
    pub id: EntityId,
    pub aircraft_type: String,
    pub display_name: String,
    pub home_base: EntityId,
    pub is_client: bool,
}

/// Flight group as shown in the flight group list and briefings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightGroupView {
    pub id: EntityId,
    pub name: String,
    pub task: Task,
    pub coalition: Coalition,
    pub package: EntityId,
    pub start_time: f64,
    pub position: Position,
    pub airborne: bool,
    pub aircraft: Vec<AircraftView>,
    pub flightplan: Vec<Waypoint>,
    pub time_table: Vec<TimeTableEntry>,
    pub jtac_frequency: Option<u32>,
}

/// Full UI snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub id: String,
    pub name: String,
    pub time: f64,
    pub time_multiplier: f64,
    pub flight_groups: Vec<FlightGroupView>,
    pub entities: BTreeMap<String, EntityRecord>,
    pub faction_definitions: FactionDefinitions,
    pub theatre: String,
    pub campaign_params: CampaignParams,
    pub start_time_reached: bool,
    pub has_clients: bool,
    pub weather: Weather,
}

/// Everything a mission briefing for one flight group needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingDocument {
    pub package: Package,
    pub flight_group: FlightGroupView,
    pub theatre: String,
    /// Entities the flight group refers to: home base, target and aircraft.
    pub entities: BTreeMap<String, EntityRecord>,
}
