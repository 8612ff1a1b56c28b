//! Fixed campaign constants.
//!
//! Tuning values that a campaign may override live in [`crate::config`];
//! the values here shape routes and timing and are not configurable.

/// Worker tick rate (Hz) in real time.
pub const TICK_RATE: u32 = 4;

/// Real seconds per worker tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Schema version written into every serialized campaign.
pub const CAMPAIGN_VERSION: u32 = 1;

// --- Air-to-air pursuit ---

/// Speed of a flight group chasing its a2a target (m/s).
pub const PURSUIT_SPEED: f64 = 300.0;

/// Speed of a flight group orbiting its a2a target (m/s).
pub const ORBIT_SPEED: f64 = 150.0;

/// Distance below which a pursuing flight group orbits instead of closing.
pub const ORBIT_DISTANCE: f64 = 2_000.0;

// --- Ground combat ---

/// Delay before an unresolved ground battle is fought again (seconds).
pub const G2G_COMBAT_DURATION: f64 = 180.0;

// --- Flight plans ---

/// Distance of the landing nav point from the home base (meters).
pub const LANDING_NAV_DISTANCE: f64 = 25_000.0;

/// Distance of the CAS racetrack legs from the target (meters).
pub const CAS_RACETRACK_OFFSET: f64 = 7_500.0;

/// CAS time on station (seconds).
pub const CAS_ON_STATION: f64 = 1_800.0;

/// Distance of CAP racetrack points from the patrol center (meters).
pub const CAP_RACETRACK_OFFSET: f64 = 20_000.0;

/// Distance of a frontline CAP patrol center behind the defended objective (meters).
pub const CAP_FRONTLINE_OFFSET: f64 = 10_000.0;

/// Distance of an airdrome CAP patrol center from the airdrome (meters).
pub const CAP_AIRDROME_OFFSET: f64 = 30_000.0;

/// CAP and AWACS time on station (seconds).
pub const PATROL_ON_STATION: f64 = 3_600.0;

/// Standoff of the AWACS orbit from its home base, away from the enemy (meters).
pub const AWACS_STANDOFF: f64 = 20_000.0;

/// Distance of AWACS racetrack points from the orbit center (meters).
pub const AWACS_RACETRACK_OFFSET: f64 = 40_000.0;

/// Distance of the strike ingress point from the target (meters).
pub const STRIKE_INGRESS_DISTANCE: f64 = 15_000.0;

/// Distance of the strike egress point from the target (meters).
pub const STRIKE_EGRESS_DISTANCE: f64 = 20_000.0;

/// Distance of the DEAD ingress point from the SAM site (meters).
pub const DEAD_INGRESS_DISTANCE: f64 = 40_000.0;

/// First JTAC frequency handed out to CAS flight groups (MHz).
pub const JTAC_BASE_FREQUENCY: u32 = 240;

// --- Scenario generation ---

/// Effective engagement range of a SAM group (meters).
pub const SAM_RANGE: f64 = 40_000.0;

/// Distance of a generated SAM site from the airdrome it defends (meters).
pub const SAM_SITE_OFFSET: f64 = 5_000.0;

/// Ground units generated per SAM group.
pub const SAM_UNITS_PER_GROUP: usize = 4;

/// Buildings generated per structure.
pub const BUILDINGS_PER_STRUCTURE: usize = 3;
