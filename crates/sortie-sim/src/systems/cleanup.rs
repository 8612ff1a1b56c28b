//! Cleanup system: removes wiped-out ground groups, empty flight groups and
//! empty packages, and drops engagements against vanished targets.

use log::error;

use sortie_core::enums::{GroundGroupState, QueryKey};

use crate::lifecycle;
use crate::systems::flight::all_flight_groups;
use crate::world::World;

pub fn run(world: &mut World) {
    for state in GroundGroupState::ALL {
        for id in world.query_all(QueryKey::GroundGroups(state)) {
            if lifecycle::has_alive_units(world, id) {
                continue;
            }
            if let Err(e) = lifecycle::destroy_ground_group(world, id) {
                error!("failed to remove ground group {id}: {e}");
            }
        }
    }

    for id in all_flight_groups(world) {
        let Some((empty, combat)) = world.flight_group(id).map(|fg| (fg.aircraft.is_empty(), fg.combat)) else {
            continue;
        };
        if empty {
            if let Err(e) = lifecycle::destroy_flight_group(world, id) {
                error!("failed to remove flight group {id}: {e}");
            }
            continue;
        }
        if combat.is_some_and(|c| !world.contains(c.target)) {
            if let Some(fg) = world.flight_group_mut(id) {
                fg.combat = None;
            }
        }
    }

    for id in world.query_all(QueryKey::Packages) {
        if world.package(id).is_some_and(|p| p.flight_groups.is_empty()) {
            world.despawn(id);
        }
    }
}
