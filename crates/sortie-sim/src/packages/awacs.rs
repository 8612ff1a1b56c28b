//! Airborne early warning orbit behind the own airdrome.

use log::debug;

use sortie_core::components::FlightGroupTask;
use sortie_core::constants::{AWACS_RACETRACK_OFFSET, AWACS_STANDOFF, PATROL_ON_STATION};
use sortie_core::enums::{Coalition, Task};
use sortie_core::error::Result;
use sortie_core::flightplan::WaypointTemplate;
use sortie_core::types::{add_heading, EntityId, Position};

use super::target_selection::nearest_opposing_airdrome;
use super::{bases_with_aircraft, below_max_active, create_package, PackageRequest};
use crate::world::World;

pub fn use_awacs(world: &mut World, coalition: Coalition) -> Result<Option<EntityId>> {
    if !below_max_active(world, coalition, Task::Awacs) {
        return Ok(None);
    }
    let Some((base, aircraft)) = bases_with_aircraft(world, coalition, Task::Awacs).into_iter().next() else {
        debug!("{coalition:?} has no AWACS aircraft");
        return Ok(None);
    };
    let Some(enemy_airdrome) = nearest_opposing_airdrome(world, coalition, base.position) else {
        return Ok(None);
    };
    let enemy = world.expect_airdrome(enemy_airdrome)?.position;
    let waypoints = awacs_route(base.position, enemy);
    create_package(
        world,
        PackageRequest {
            coalition,
            task: FlightGroupTask::Awacs,
            home_base: base,
            aircraft,
            waypoints,
        },
    )
    .map(Some)
}

/// Orbit a standoff point on the far side of the home base from the enemy.
pub fn awacs_route(home: Position, enemy: Position) -> Vec<WaypointTemplate> {
    let center = home.from_heading(enemy.heading_to(&home), AWACS_STANDOFF);
    let heading = center.heading_to(&enemy);
    let racetrack_start = center.from_heading(add_heading(heading, -90.0), AWACS_RACETRACK_OFFSET);
    let racetrack_end = center.from_heading(add_heading(heading, 90.0), AWACS_RACETRACK_OFFSET);
    vec![
        WaypointTemplate::take_off(home),
        WaypointTemplate::new("Track-race start", racetrack_start)
            .duration(PATROL_ON_STATION)
            .racetrack("Track-race end", racetrack_end)
            .task_start(),
        WaypointTemplate::landing(home),
    ]
}
