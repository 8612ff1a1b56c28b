//! Close air support: a racetrack next to an enemy ground group fighting
//! at an objective.

use log::debug;

use sortie_core::components::FlightGroupTask;
use sortie_core::constants::{CAS_ON_STATION, CAS_RACETRACK_OFFSET};
use sortie_core::enums::{Coalition, Task};
use sortie_core::error::Result;
use sortie_core::flightplan::WaypointTemplate;
use sortie_core::types::{add_heading, EntityId, Position};

use super::target_selection::cas_target;
use super::{below_max_active, create_package, next_jtac_frequency, select_base_and_target, PackageRequest};
use crate::world::World;

pub fn use_cas(world: &mut World, coalition: Coalition) -> Result<Option<EntityId>> {
    if !below_max_active(world, coalition, Task::Cas) {
        return Ok(None);
    }
    let Some(selection) = select_base_and_target(world, coalition, Task::Cas, cas_target) else {
        debug!("{coalition:?} found no CAS target");
        return Ok(None);
    };
    let jtac_frequency = next_jtac_frequency(world);
    let waypoints = cas_route(selection.base.position, selection.target_position);
    create_package(
        world,
        PackageRequest {
            coalition,
            task: FlightGroupTask::Cas {
                target: selection.target,
                jtac_frequency,
            },
            home_base: selection.base,
            aircraft: selection.aircraft,
            waypoints,
        },
    )
    .map(Some)
}

/// Take off, racetrack across the target's approach, land.
pub fn cas_route(home: Position, target: Position) -> Vec<WaypointTemplate> {
    let heading = target.heading_to(&home);
    let racetrack_start = target.from_heading(add_heading(heading, -90.0), CAS_RACETRACK_OFFSET);
    let racetrack_end = target.from_heading(add_heading(heading, 90.0), CAS_RACETRACK_OFFSET);
    vec![
        WaypointTemplate::take_off(home),
        WaypointTemplate::new("Track-race start", racetrack_start)
            .duration(CAS_ON_STATION)
            .racetrack("Track-race end", racetrack_end)
            .task_start(),
        WaypointTemplate::landing(home),
    ]
}
