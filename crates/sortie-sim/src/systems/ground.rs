//! Ground group movement towards target objectives.

use log::{debug, error};

use sortie_core::enums::{GroundGroupState, QueryKey};
use sortie_core::error::Result;
use sortie_core::types::EntityId;

use crate::lifecycle;
use crate::world::World;

pub fn run(world: &mut World, dt: f64) {
    for id in world.query_all(QueryKey::GroundGroups(GroundGroupState::EnRoute)) {
        if let Err(e) = move_ground_group(world, id, dt) {
            error!("ground group {id} movement failed: {e}");
        }
    }
}

/// Drive an en-route group towards its target and handle its arrival.
pub fn move_ground_group(world: &mut World, id: EntityId, dt: f64) -> Result<()> {
    let speed = world.config.defaults.ground_group_speed;
    let arrival_range = world.config.combat.g2g.range;
    let (target, position, name) = world
        .expect_ground_group(id)
        .map(|gg| (gg.target, gg.position, gg.name.clone()))?;
    let objective_position = world.expect_objective(target)?.position;
    let distance = position.distance_to(&objective_position);
    let step = speed * dt;

    if distance - step > arrival_range {
        let heading = position.heading_to(&objective_position);
        let next = position.from_heading(heading, step);
        world.expect_ground_group_mut(id)?.position = next;
        return Ok(());
    }

    let coalition = world.coalition_of(id).unwrap_or_default();
    let owner = world.coalition_of(target).unwrap_or_default();
    world.expect_ground_group_mut(id)?.position = objective_position;

    if owner == coalition {
        // Reinforcing an objective that is already ours.
        if let Some(objective) = world.objective_mut(target) {
            objective.incoming_ground_groups.remove(&coalition);
        }
        debug!("{name} reached friendly objective");
        lifecycle::set_ground_group_state(world, id, GroundGroupState::OnObjective)
    } else {
        debug!("{name} reached contested objective");
        lifecycle::set_ground_group_state(world, id, GroundGroupState::OnTarget)
    }
}
