//! Combat air patrol over the frontline or over a friendly airdrome.

use log::debug;

use sortie_core::components::FlightGroupTask;
use sortie_core::constants::*;
use sortie_core::enums::{Coalition, Task};
use sortie_core::error::{CampaignError, Result};
use sortie_core::flightplan::WaypointTemplate;
use sortie_core::types::{add_heading, find_nearest, EntityId, Position};

use super::target_selection::{frontline_objective, nearest_opposing_airdrome};
use super::{bases_with_aircraft, below_max_active, create_package, PackageRequest};
use crate::world::World;

/// Where a CAP flight group patrols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapPatrol {
    /// The own objective closest to the enemy airdromes.
    Frontline,
    /// A named friendly airdrome.
    Airdrome(String),
}

pub fn use_cap(world: &mut World, coalition: Coalition, patrol: &CapPatrol) -> Result<Option<EntityId>> {
    if !below_max_active(world, coalition, Task::Cap) {
        return Ok(None);
    }
    let (target, target_position, offset_from_enemy) = match patrol {
        CapPatrol::Frontline => {
            let Some(objective) = frontline_objective(world, coalition) else {
                return Ok(None);
            };
            let position = world.expect_objective(objective)?.position;
            (objective, position, false)
        }
        CapPatrol::Airdrome(name) => {
            let airdrome = world
                .airdrome_by_name(coalition, name)
                .ok_or_else(|| CampaignError::AirdromeNotFound(name.clone()))?;
            let position = world.expect_airdrome(airdrome)?.position;
            (airdrome, position, true)
        }
    };
    if super::target_selection::already_targeted(world, coalition, target) {
        return Ok(None);
    }
    let Some(enemy_airdrome) = nearest_opposing_airdrome(world, coalition, target_position) else {
        return Ok(None);
    };
    let enemy_position = world.expect_airdrome(enemy_airdrome)?.position;

    let bases = bases_with_aircraft(world, coalition, Task::Cap);
    let max_distance = world.config.package(Task::Cap).max_distance;
    let candidates = bases
        .into_iter()
        .filter(|(base, _)| base.position.distance_to(&target_position) <= max_distance);
    let Some((base, aircraft)) = find_nearest(candidates, &target_position, |(base, _)| base.position) else {
        debug!("{coalition:?} has no CAP aircraft in range of {target}");
        return Ok(None);
    };

    let waypoints = cap_route(base.position, target_position, enemy_position, offset_from_enemy);
    create_package(
        world,
        PackageRequest {
            coalition,
            task: FlightGroupTask::Cap { target },
            home_base: base,
            aircraft,
            waypoints,
        },
    )
    .map(Some)
}

/// Patrol center and racetrack for a CAP.
///
/// A frontline patrol sits behind the objective, away from the enemy; an
/// airdrome patrol sits in front of the airdrome, towards the enemy.
pub fn cap_route(home: Position, target: Position, enemy: Position, towards_enemy: bool) -> Vec<WaypointTemplate> {
    let enemy_heading = target.heading_to(&enemy);
    let center = if towards_enemy {
        target.from_heading(enemy_heading, CAP_AIRDROME_OFFSET)
    } else {
        target.from_heading(add_heading(enemy_heading, 180.0), CAP_FRONTLINE_OFFSET)
    };
    let heading = center.heading_to(&enemy);
    let racetrack_start = center.from_heading(add_heading(heading, -90.0), CAP_RACETRACK_OFFSET);
    let racetrack_end = center.from_heading(add_heading(heading, 90.0), CAP_RACETRACK_OFFSET);
    vec![
        WaypointTemplate::take_off(home),
        WaypointTemplate::new("Track-race start", racetrack_start)
            .duration(PATROL_ON_STATION)
            .racetrack("Track-race end", racetrack_end)
            .task_start(),
        WaypointTemplate::landing(home),
    ]
}
