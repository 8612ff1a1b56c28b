//! Campaign tuning configuration.
//!
//! Every field has a default so an override file only needs to name the
//! values it changes.

use serde::{Deserialize, Serialize};

use crate::enums::{Coalition, StructureType, Task};
use crate::error::Result;

/// A value per mission task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerTask<T> {
    #[serde(rename = "CAP")]
    pub cap: T,
    #[serde(rename = "CAS")]
    pub cas: T,
    #[serde(rename = "AWACS")]
    pub awacs: T,
    #[serde(rename = "DEAD")]
    pub dead: T,
    #[serde(rename = "Pinpoint Strike")]
    pub strike: T,
}

impl<T> PerTask<T> {
    pub fn get(&self, task: Task) -> &T {
        match task {
            Task::Cap => &self.cap,
            Task::Cas => &self.cas,
            Task::Awacs => &self.awacs,
            Task::Dead => &self.dead,
            Task::Strike => &self.strike,
        }
    }
}

/// A value per coalition. Neutrals never own packages or ground forces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerCoalition<T> {
    pub blue: T,
    pub red: T,
    pub neutrals: T,
}

impl<T: Copy> PerCoalition<T> {
    pub fn new(blue: T, red: T, neutrals: T) -> Self {
        Self {
            blue,
            red,
            neutrals,
        }
    }

    pub fn get(&self, coalition: Coalition) -> T {
        match coalition {
            Coalition::Blue => self.blue,
            Coalition::Red => self.red,
            Coalition::Neutrals => self.neutrals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Aircraft generated per task at every airdrome.
    pub aircraft: PerTask<u32>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            aircraft: PerTask {
                cap: 12,
                cas: 4,
                awacs: 3,
                dead: 4,
                strike: 8,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageConfig {
    pub max_active: PerCoalition<u32>,
    /// Maximum distance between home base and target (meters).
    pub max_distance: f64,
    /// Aircraft per flight group.
    pub aircraft: u32,
    /// Delay between package creation and start time (minutes, inclusive range).
    pub start_delay_minutes: (u32, u32),
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            max_active: PerCoalition::new(1, 1, 0),
            max_distance: 100_000.0,
            aircraft: 2,
            start_delay_minutes: (15, 25),
        }
    }
}

fn package(blue: u32, red: u32, max_distance: f64, aircraft: u32, delay: (u32, u32)) -> PackageConfig {
    PackageConfig {
        max_active: PerCoalition::new(blue, red, 0),
        max_distance,
        aircraft,
        start_delay_minutes: delay,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Defaults {
    /// Package cruise speed (m/s).
    pub cruise_speed: f64,
    /// Ground group road speed (m/s).
    pub ground_group_speed: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            cruise_speed: 200.0,
            ground_group_speed: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct A2AConfig {
    /// Fraction of a weapon's maximum range used as its effective range.
    pub range_multiplier: f64,
    /// Seconds between a hit and the next shot.
    pub cooldown_duration: f64,
}

impl Default for A2AConfig {
    fn default() -> Self {
        Self {
            range_multiplier: 0.66,
            cooldown_duration: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct G2GConfig {
    /// Distance at which an arriving ground group counts as on target (meters).
    pub range: f64,
    /// Percent chance per side and battle round to destroy an enemy unit.
    pub hit_chance: u32,
}

impl Default for G2GConfig {
    fn default() -> Self {
        Self {
            range: 500.0,
            hit_chance: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct A2GConfig {
    /// Seconds between CAS attacks while on station.
    pub cas_attack_interval: f64,
    /// Percent chance per aircraft and attack to destroy its target.
    pub hit_chance: u32,
}

impl Default for A2GConfig {
    fn default() -> Self {
        Self {
            cas_attack_interval: 300.0,
            hit_chance: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub a2a: A2AConfig,
    pub g2g: G2GConfig,
    pub a2g: A2GConfig,
}

/// Range of a unit camp type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCampValues {
    pub barrack: f64,
    pub depot: f64,
}

impl Default for UnitCampValues {
    fn default() -> Self {
        Self {
            barrack: 50_000.0,
            depot: 60_000.0,
        }
    }
}

impl UnitCampValues {
    pub fn get(&self, structure_type: StructureType) -> Option<f64> {
        match structure_type {
            StructureType::Barrack => Some(self.barrack),
            StructureType::Depot => Some(self.depot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// Score a unit camp needs to deploy a ground group.
    pub score_threshold: UnitCampValues,
    /// Score gained per simulated hour before the coalition multiplier.
    pub rate_per_hour: f64,
    pub coalition_multiplier: PerCoalition<f64>,
    /// Maximum distance from a unit camp to the objective it deploys to.
    pub frontline_range: UnitCampValues,
    pub units_per_group: usize,
    /// Maximum simultaneously en-route ground groups.
    pub max_en_route: PerCoalition<u32>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            score_threshold: UnitCampValues {
                barrack: 60_000.0,
                depot: 50_000.0,
            },
            rate_per_hour: 43_200.0,
            coalition_multiplier: PerCoalition::new(0.75, 5.0, 0.0),
            frontline_range: UnitCampValues::default(),
            units_per_group: 4,
            max_en_route: PerCoalition::new(6, 2, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeConfig {
    /// Hour of day a campaign starts and `skipToNextDay` lands on.
    pub day_start_hour: f64,
    /// Simulated seconds per step when skipping to the next day.
    pub skip_step: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            day_start_hour: 8.0,
            skip_step: 60.0,
        }
    }
}

/// Full tuning set carried by a campaign world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub inventory: InventoryConfig,
    pub packages: PerTask<PackageConfig>,
    pub defaults: Defaults,
    pub combat: CombatConfig,
    pub deployment: DeploymentConfig,
    pub time: TimeConfig,
    pub version: u32,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            inventory: InventoryConfig::default(),
            packages: PerTask {
                cap: package(1, 1, 100_000.0, 2, (15, 25)),
                cas: package(3, 2, 100_000.0, 2, (20, 35)),
                awacs: package(1, 1, 300_000.0, 1, (15, 25)),
                dead: package(2, 1, 200_000.0, 2, (15, 25)),
                strike: package(4, 3, 150_000.0, 2, (30, 60)),
            },
            defaults: Defaults::default(),
            combat: CombatConfig::default(),
            deployment: DeploymentConfig::default(),
            time: TimeConfig::default(),
            version: crate::constants::CAMPAIGN_VERSION,
        }
    }
}

impl CampaignConfig {
    /// Parse an override file. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn package(&self, task: Task) -> &PackageConfig {
        self.packages.get(task)
    }
}
