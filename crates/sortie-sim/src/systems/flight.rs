//! Flight group movement and lifecycle: take-off, flight plan or pursuit
//! movement, landing.

use log::{error, info, warn};

use sortie_core::constants::{ORBIT_DISTANCE, ORBIT_SPEED, PURSUIT_SPEED};
use sortie_core::enums::{Coalition, QueryKey, Task};
use sortie_core::error::{CampaignError, Result};
use sortie_core::flightplan::racetrack_position;
use sortie_core::types::{add_heading, EntityId, Position};

use crate::lifecycle;
use crate::world::World;

/// Every flight group of both coalitions, in id order.
pub fn all_flight_groups(world: &World) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = Task::ALL
        .into_iter()
        .flat_map(|task| world.query_all(QueryKey::FlightGroups(task)))
        .collect();
    ids.sort();
    ids
}

pub fn flight_groups_of(world: &World, coalition: Coalition) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = Task::ALL
        .into_iter()
        .flat_map(|task| world.query_ids(QueryKey::FlightGroups(task), coalition))
        .collect();
    ids.sort();
    ids
}

pub fn is_airborne(world: &World, id: EntityId) -> bool {
    world.in_query(id, QueryKey::MapEntities)
}

pub fn run(world: &mut World, dt: f64) {
    for id in all_flight_groups(world) {
        if let Err(e) = update(world, id, dt) {
            error!("flight group {id} update failed: {e}");
        }
    }
}

fn update(world: &mut World, id: EntityId, dt: f64) -> Result<()> {
    let now = world.time;
    // Destroyed earlier in this tick.
    let Some(fg) = world.flight_group(id) else {
        return Ok(());
    };
    if now < fg.start_time {
        return Ok(());
    }
    let in_combat = fg.combat.is_some();
    let plan_done = fg.flightplan.current_index(fg.start_time, now).is_none();
    drop(fg);

    if !is_airborne(world, id) {
        if plan_done {
            // Start time passed while nobody was ticking.
            return land(world, id);
        }
        take_off(world, id)?;
    }
    if plan_done && !in_combat {
        return land(world, id);
    }
    move_flight_group(world, id, dt)
}

pub fn take_off(world: &mut World, id: EntityId) -> Result<()> {
    let home_base = world.expect_flight_group(id)?.home_base;
    let home = world
        .position_of(home_base)
        .ok_or(CampaignError::EntityNotFound(home_base))?;
    let fg = world.expect_flight_group_mut(id)?;
    fg.position = home;
    info!("{} took off", fg.name);
    world.add_to_query(id, QueryKey::MapEntities)
}

/// Land a flight group; its aircraft return to the inventory.
pub fn land(world: &mut World, id: EntityId) -> Result<()> {
    if let Some(fg) = world.flight_group(id) {
        info!("{} landed", fg.name);
    }
    lifecycle::destroy_flight_group(world, id)
}

pub fn move_flight_group(world: &mut World, id: EntityId, dt: f64) -> Result<()> {
    let combat = world.expect_flight_group(id)?.combat;
    if combat.is_some_and(|c| !world.contains(c.target)) {
        world.expect_flight_group_mut(id)?.combat = None;
        return Ok(());
    }
    if let Some(next) = next_position(world, id, dt)? {
        world.expect_flight_group_mut(id)?.position = next;
    }
    Ok(())
}

/// Position after `dt`: pursuit of the combat target, otherwise along the
/// flight plan. `None` when there is no waypoint to fly to.
fn next_position(world: &World, id: EntityId, dt: f64) -> Result<Option<Position>> {
    let now = world.time;
    let fg = world.expect_flight_group(id)?;

    let next = if let Some(combat) = fg.combat {
        let Some(target) = world.position_of(combat.target) else {
            return Ok(None);
        };
        pursuit_step(fg.position, target, dt)
    } else {
        let Some(index) = fg.flightplan.current_index(fg.start_time, now) else {
            warn!("no current waypoint for flight group {}", fg.name);
            return Ok(None);
        };
        let waypoint = &fg.flightplan.waypoints[index];
        let cruise_speed = world
            .package(fg.package)
            .map(|p| p.cruise_speed)
            .unwrap_or(waypoint.speed);

        if waypoint.is_racetrack() && fg.flightplan.is_active(fg.start_time, index, now) {
            let arrival = fg
                .flightplan
                .waypoint_arrival_time(fg.start_time, index)
                .unwrap_or(now);
            let flown = (now - arrival) * cruise_speed;
            racetrack_position(waypoint, flown).unwrap_or(waypoint.position)
        } else {
            let remaining = fg.flightplan.arrival_time(fg.start_time, now) - now;
            let distance = fg.position.distance_to(&waypoint.position);
            if remaining <= dt || distance <= f64::EPSILON {
                waypoint.position
            } else {
                let speed = distance / remaining;
                let heading = fg.position.heading_to(&waypoint.position);
                fg.position.from_heading(heading, (speed * dt).min(distance))
            }
        }
    };
    Ok(Some(next))
}

/// Chase a target at pursuit speed, orbiting once within orbit distance.
fn pursuit_step(position: Position, target: Position, dt: f64) -> Position {
    let distance = position.distance_to(&target);
    let heading = position.heading_to(&target);
    if distance < ORBIT_DISTANCE {
        position.from_heading(add_heading(heading, 90.0), ORBIT_SPEED * dt)
    } else {
        position.from_heading(heading, PURSUIT_SPEED * dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pursuit_closes_then_orbits() {
        let target = Position::new(10_000.0, 0.0);
        let step = pursuit_step(Position::new(0.0, 0.0), target, 1.0);
        assert!((step.x - PURSUIT_SPEED).abs() < 1e-6);

        let close = Position::new(9_000.0, 0.0);
        let step = pursuit_step(close, target, 1.0);
        // Heading north + 90 is east.
        assert!((step.y - ORBIT_SPEED).abs() < 1e-6);
        assert!((step.x - 9_000.0).abs() < 1e-6);
    }
}
