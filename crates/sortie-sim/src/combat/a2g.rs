//! Air-to-ground attacks performed from a flight group's task waypoint.
//!
//! Strike and DEAD flight groups attack once when they reach their task
//! waypoint. CAS flight groups attack repeatedly while on station.

use log::{debug, error};

use sortie_core::components::FlightGroupTask;
use sortie_core::enums::QueryKey;
use sortie_core::error::Result;
use sortie_core::types::EntityId;

use crate::lifecycle;
use crate::world::World;

pub fn run(world: &mut World) {
    for id in world.query_all(QueryKey::MapEntities) {
        if let Err(e) = update(world, id) {
            error!("air-to-ground attack of {id} failed: {e}");
        }
    }
}

fn update(world: &mut World, id: EntityId) -> Result<()> {
    let now = world.time;
    let interval = world.config.combat.a2g.cas_attack_interval;
    let Some(fg) = world.flight_group(id) else {
        return Ok(());
    };
    let Some(index) = fg.flightplan.task_waypoint_index() else {
        return Ok(());
    };
    let Some(arrival) = fg.flightplan.waypoint_arrival_time(fg.start_time, index) else {
        return Ok(());
    };
    if now < arrival || fg.combat.is_some() {
        return Ok(());
    }

    let task = fg.task.clone();
    let task_done = fg.task_done;
    let on_station = fg.flightplan.is_active(fg.start_time, index, now);
    let attack_due = fg.last_attack_time.map_or(true, |t| now - t >= interval);
    drop(fg);

    match task {
        FlightGroupTask::Strike { target } if !task_done => {
            strike_attack(world, id, target)?;
            world.expect_flight_group_mut(id)?.task_done = true;
        }
        FlightGroupTask::Dead { target } if !task_done => {
            ground_attack(world, id, target)?;
            world.expect_flight_group_mut(id)?.task_done = true;
        }
        FlightGroupTask::Cas { target, .. } if on_station && attack_due => {
            ground_attack(world, id, target)?;
            world.expect_flight_group_mut(id)?.last_attack_time = Some(now);
        }
        _ => {}
    }
    Ok(())
}

fn attacking_aircraft(world: &World, id: EntityId) -> usize {
    world.flight_group(id).map_or(0, |fg| fg.aircraft.len())
}

/// Each aircraft may destroy one living building of the target structure.
/// Returns the number of buildings destroyed.
pub fn strike_attack(world: &mut World, id: EntityId, target: EntityId) -> Result<u32> {
    let now = world.time;
    let hit_chance = world.config.combat.a2g.hit_chance;
    let mut destroyed = 0;
    for _ in 0..attacking_aircraft(world, id) {
        if world.roll_percent() > hit_chance {
            continue;
        }
        let Some(structure) = world.structure_mut(target) else {
            break;
        };
        let Some(building) = structure.buildings.iter_mut().find(|b| b.alive) else {
            break;
        };
        building.alive = false;
        building.destroyed_time = Some(now);
        destroyed += 1;
    }
    debug!("{id} destroyed {destroyed} buildings of {target}");
    Ok(destroyed)
}

/// Each aircraft may destroy one living unit of the target ground group.
/// Returns the number of units destroyed.
pub fn ground_attack(world: &mut World, id: EntityId, target: EntityId) -> Result<u32> {
    if !world.contains(target) {
        return Ok(0);
    }
    let hit_chance = world.config.combat.a2g.hit_chance;
    let mut destroyed = 0;
    for _ in 0..attacking_aircraft(world, id) {
        if world.roll_percent() > hit_chance {
            continue;
        }
        if !lifecycle::destroy_ground_unit(world, target)? {
            break;
        }
        destroyed += 1;
    }
    debug!("{id} destroyed {destroyed} units of {target}");
    Ok(destroyed)
}
