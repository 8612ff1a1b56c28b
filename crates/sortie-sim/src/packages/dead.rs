//! Destruction of enemy air defenses.

use log::debug;

use sortie_core::components::FlightGroupTask;
use sortie_core::constants::DEAD_INGRESS_DISTANCE;
use sortie_core::enums::{Coalition, Task};
use sortie_core::error::Result;
use sortie_core::flightplan::WaypointTemplate;
use sortie_core::types::{EntityId, Position};

use super::target_selection::dead_target;
use super::{below_max_active, create_package, select_base_and_target, PackageRequest};
use crate::world::World;

pub fn use_dead(world: &mut World, coalition: Coalition) -> Result<Option<EntityId>> {
    if !below_max_active(world, coalition, Task::Dead) {
        return Ok(None);
    }
    let Some(selection) = select_base_and_target(world, coalition, Task::Dead, dead_target) else {
        debug!("{coalition:?} found no DEAD target");
        return Ok(None);
    };
    let waypoints = dead_route(selection.base.position, selection.target_position);
    create_package(
        world,
        PackageRequest {
            coalition,
            task: FlightGroupTask::Dead {
                target: selection.target,
            },
            home_base: selection.base,
            aircraft: selection.aircraft,
            waypoints,
        },
    )
    .map(Some)
}

pub fn dead_route(home: Position, target: Position) -> Vec<WaypointTemplate> {
    let ingress = target.from_heading(target.heading_to(&home), DEAD_INGRESS_DISTANCE);
    vec![
        WaypointTemplate::take_off(home),
        WaypointTemplate::new("Ingress", ingress),
        WaypointTemplate::new("DEAD", target).task_start(),
        WaypointTemplate::landing(home),
    ]
}
