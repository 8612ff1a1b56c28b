//! Pinpoint strike against an enemy structure.

use log::debug;

use sortie_core::components::FlightGroupTask;
use sortie_core::constants::{LANDING_NAV_DISTANCE, STRIKE_EGRESS_DISTANCE, STRIKE_INGRESS_DISTANCE};
use sortie_core::enums::{Coalition, Task};
use sortie_core::error::Result;
use sortie_core::flightplan::WaypointTemplate;
use sortie_core::types::{add_heading, EntityId, Position};

use super::target_selection::{nearest_opposing_airdrome, strike_target};
use super::{below_max_active, create_package, select_base_and_target, PackageRequest};
use crate::world::World;

pub fn use_strike(world: &mut World, coalition: Coalition) -> Result<Option<EntityId>> {
    if !below_max_active(world, coalition, Task::Strike) {
        return Ok(None);
    }
    let Some(selection) = select_base_and_target(world, coalition, Task::Strike, strike_target) else {
        debug!("{coalition:?} found no strike target");
        return Ok(None);
    };
    let enemy_airdrome = nearest_opposing_airdrome(world, coalition, selection.target_position)
        .and_then(|id| world.position_of(id));
    let waypoints = strike_route(selection.base.position, selection.target_position, enemy_airdrome);
    create_package(
        world,
        PackageRequest {
            coalition,
            task: FlightGroupTask::Strike {
                target: selection.target,
            },
            home_base: selection.base,
            aircraft: selection.aircraft,
            waypoints,
        },
    )
    .map(Some)
}

/// Ingress from the home side, egress away from the nearest enemy airdrome,
/// then a nav point behind the home base to line up for landing.
pub fn strike_route(home: Position, target: Position, enemy_airdrome: Option<Position>) -> Vec<WaypointTemplate> {
    let ingress = target.from_heading(target.heading_to(&home), STRIKE_INGRESS_DISTANCE);
    let egress_heading = match enemy_airdrome {
        Some(enemy) => target.heading_to(&enemy),
        None => target.heading_to(&home),
    };
    let egress = target.from_heading(add_heading(egress_heading, 180.0), STRIKE_EGRESS_DISTANCE);
    let landing_nav = home.from_heading(add_heading(egress.heading_to(&home), 180.0), LANDING_NAV_DISTANCE);
    vec![
        WaypointTemplate::take_off(home),
        WaypointTemplate::new("Ingress", ingress),
        WaypointTemplate::new("Strike", target).task_start(),
        WaypointTemplate::new("Egress", egress),
        WaypointTemplate::new("Nav", landing_nav),
        WaypointTemplate::landing(home),
    ]
}
