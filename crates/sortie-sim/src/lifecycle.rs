//! Entity lifecycle operations that keep cross-entity links consistent.
//!
//! Spawning and despawning single entities is the world's job; the
//! functions here handle the cascades: disbanding flight groups, clearing
//! packages, losing aircraft and ground units, and state transitions that
//! move entities between query sets.

use log::{debug, info};

use sortie_core::components::{EntityData, GroundGroup, GroundUnit};
use sortie_core::enums::*;
use sortie_core::error::Result;
use sortie_core::types::{EntityId, Position};

use crate::world::World;

/// Remove a flight group. Its living aircraft return to the inventory and
/// its package is removed once it has no flight groups left.
pub fn destroy_flight_group(world: &mut World, id: EntityId) -> Result<()> {
    let Some(record) = world.despawn(id) else {
        return Ok(());
    };
    let EntityData::FlightGroup(fg) = record.data else {
        return Ok(());
    };
    debug!("flight group {} removed", fg.name);

    for aircraft_id in &fg.aircraft {
        if let Some(aircraft) = world.aircraft_mut(*aircraft_id) {
            aircraft.flight_group = None;
        }
    }

    // Anyone fighting this flight group loses its target.
    for other in world.query_all(QueryKey::MapEntities) {
        if let Some(other_fg) = world.flight_group_mut(other) {
            if other_fg.combat.is_some_and(|c| c.target == id) {
                other_fg.combat = None;
            }
        }
    }

    let empty = match world.package_mut(fg.package) {
        Some(package) => {
            package.flight_groups.retain(|fg_id| *fg_id != id);
            package.flight_groups.is_empty()
        }
        None => false,
    };
    if empty {
        world.despawn(fg.package);
    }
    Ok(())
}

/// Disband every flight group of a package and remove the package.
pub fn clear_package(world: &mut World, id: EntityId) -> Result<()> {
    let Some((task, flight_groups)) = world.package(id).map(|p| (p.task, p.flight_groups.clone())) else {
        return Ok(());
    };
    info!("clearing {task} package {id}");
    for fg in flight_groups {
        destroy_flight_group(world, fg)?;
    }
    world.despawn(id);
    Ok(())
}

/// Lose the first aircraft of a flight group.
///
/// Returns `true` if that was the last aircraft and the flight group is gone.
pub fn destroy_aircraft(world: &mut World, flight_group: EntityId) -> Result<bool> {
    let now = world.time;
    let fg = world.expect_flight_group_mut(flight_group)?;
    if fg.aircraft.is_empty() {
        destroy_flight_group(world, flight_group)?;
        return Ok(true);
    }
    let aircraft_id = fg.aircraft.remove(0);
    let remaining = fg.aircraft.len();
    let name = fg.name.clone();

    let aircraft = world.expect_aircraft_mut(aircraft_id)?;
    aircraft.alive = false;
    aircraft.destroyed_time = Some(now);
    aircraft.flight_group = None;
    debug!("{name} lost an aircraft, {remaining} left");

    if remaining == 0 {
        destroy_flight_group(world, flight_group)?;
        return Ok(true);
    }
    Ok(false)
}

/// Mark the first living unit of a ground group destroyed.
///
/// Returns `false` if the group had no living unit.
pub fn destroy_ground_unit(world: &mut World, group: EntityId) -> Result<bool> {
    let now = world.time;
    let units = world.expect_ground_group(group)?.units.clone();
    for unit_id in units {
        if let Some(unit) = world.ground_unit_mut(unit_id) {
            if unit.alive {
                unit.alive = false;
                unit.destroyed_time = Some(now);
                return Ok(true);
            }
        }
    }
    Ok(false)
}

pub fn has_alive_units(world: &World, group: EntityId) -> bool {
    world.ground_group(group).is_some_and(|gg| {
        gg.units
            .iter()
            .any(|u| world.ground_unit(*u).is_some_and(|unit| unit.alive))
    })
}

/// Change a ground group's state and move it to the matching query set.
pub fn set_ground_group_state(world: &mut World, id: EntityId, state: GroundGroupState) -> Result<()> {
    let gg = world.expect_ground_group_mut(id)?;
    let previous = gg.state;
    if previous == state {
        return Ok(());
    }
    gg.state = state;
    if state != GroundGroupState::Combat {
        gg.combat_timer = None;
    }
    world.remove_from_query(id, QueryKey::GroundGroups(previous))?;
    world.add_to_query(id, QueryKey::GroundGroups(state))?;
    Ok(())
}

/// Remove a ground group and any incoming marker pointing at it.
pub fn destroy_ground_group(world: &mut World, id: EntityId) -> Result<()> {
    let Some((target, name)) = world.ground_group(id).map(|gg| (gg.target, gg.name.clone())) else {
        return Ok(());
    };
    info!("ground group {name} destroyed");
    if let Some(objective) = world.objective_mut(target) {
        objective.incoming_ground_groups.retain(|_, incoming| *incoming != id);
    }
    world.despawn(id);
    Ok(())
}

/// A ground group about to be created together with its units.
pub struct GroundGroupSpawn<'a> {
    pub coalition: Coalition,
    pub name: String,
    pub group_type: GroundGroupType,
    /// Unit types, cycled until `count` units exist.
    pub unit_types: &'a [String],
    pub count: usize,
    pub start: EntityId,
    pub target: EntityId,
    pub state: GroundGroupState,
    pub position: Position,
}

pub fn spawn_ground_group(world: &mut World, spawn: GroundGroupSpawn<'_>) -> EntityId {
    let category = match spawn.group_type {
        GroundGroupType::Armor => GroundUnitCategory::Armor,
        GroundGroupType::Infantry => GroundUnitCategory::Infantry,
        GroundGroupType::Sam => GroundUnitCategory::Sam,
    };
    let units = spawn
        .unit_types
        .iter()
        .cycle()
        .take(spawn.count)
        .enumerate()
        .map(|(i, unit_type)| {
            world.spawn(
                spawn.coalition,
                vec![QueryKey::GroundUnits],
                EntityData::GroundUnit(GroundUnit {
                    name: format!("{}|{}", spawn.name, i + 1),
                    unit_type: unit_type.clone(),
                    category,
                    alive: true,
                    destroyed_time: None,
                }),
            )
        })
        .collect();
    world.spawn(
        spawn.coalition,
        vec![QueryKey::GroundGroups(spawn.state)],
        EntityData::GroundGroup(GroundGroup {
            name: spawn.name,
            units,
            start: spawn.start,
            target: spawn.target,
            state: spawn.state,
            combat_timer: None,
            position: spawn.position,
            group_type: spawn.group_type,
        }),
    )
}
