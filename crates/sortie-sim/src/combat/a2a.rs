//! Air-to-air combat: engagement detection, pursuit targets and weapon fire.

use log::{debug, error, info};

use sortie_core::components::A2ACombat;
use sortie_core::enums::{Coalition, QueryKey, Task};
use sortie_core::error::{CampaignError, Result};
use sortie_core::types::{find_nearest, EntityId};

use crate::lifecycle;
use crate::world::World;

pub fn run(world: &mut World) {
    for coalition in Coalition::PLAYABLE {
        for id in world.query_ids(QueryKey::MapEntities, coalition) {
            if let Err(e) = detect(world, id) {
                error!("a2a detection for {id} failed: {e}");
            }
        }
    }
    for id in world.query_all(QueryKey::MapEntities) {
        if let Err(e) = resolve(world, id) {
            error!("a2a resolution for {id} failed: {e}");
        }
    }
}

/// Longest loaded a2a weapon range of a flight group.
pub fn a2a_range(world: &World, id: EntityId) -> f64 {
    world.flight_group(id).map_or(0.0, |fg| {
        fg.aircraft
            .iter()
            .filter_map(|a| world.aircraft(*a))
            .map(|a| a.a2a_range())
            .fold(0.0, f64::max)
    })
}

/// Let an idle CAP flight group engage the nearest airborne enemy in range.
fn detect(world: &mut World, id: EntityId) -> Result<()> {
    let Some((combat, task, position)) = world
        .flight_group(id)
        .map(|fg| (fg.combat, fg.task.task(), fg.position))
    else {
        return Ok(());
    };
    if combat.is_some() || task != Task::Cap {
        return Ok(());
    }
    let range = a2a_range(world, id);
    if range <= 0.0 {
        return Ok(());
    }
    let coalition = world.coalition_of(id).unwrap_or_default();
    let enemies = world
        .query(QueryKey::MapEntities, coalition.opposite())
        .iter()
        .copied()
        .filter_map(|e| world.flight_group(e).map(|efg| (e, efg.position)))
        .filter(|(_, p)| p.distance_to(&position) <= range);
    let Some((enemy, _)) = find_nearest(enemies, &position, |(_, p)| *p) else {
        return Ok(());
    };

    engage_a2a(world, id, enemy)?;
    // The target fights back if it carries missiles and is not busy.
    let enemy_idle = world.flight_group(enemy).is_some_and(|e| e.combat.is_none());
    if enemy_idle && a2a_range(world, enemy) > 0.0 {
        engage_a2a(world, enemy, id)?;
    }
    Ok(())
}

fn resolve(world: &mut World, id: EntityId) -> Result<()> {
    let now = world.time;
    let Some((combat, position)) = world.flight_group(id).map(|fg| (fg.combat, fg.position)) else {
        return Ok(());
    };
    let Some(combat) = combat else {
        return Ok(());
    };
    let Some(target_position) = world.flight_group(combat.target).map(|t| t.position) else {
        world.expect_flight_group_mut(id)?.combat = None;
        return Ok(());
    };
    if now < combat.cooldown_time {
        return Ok(());
    }
    let distance = position.distance_to(&target_position);
    if a2a_range(world, id) <= 0.0 {
        // Winchester: nothing left to shoot.
        world.expect_flight_group_mut(id)?.combat = None;
        return Ok(());
    }
    fire_a2a(world, id, distance)?;
    Ok(())
}

/// Enter combat against `enemy`. Firing is allowed immediately.
pub fn engage_a2a(world: &mut World, id: EntityId, enemy: EntityId) -> Result<()> {
    let now = world.time;
    let fg = world.expect_flight_group_mut(id)?;
    fg.combat = Some(A2ACombat {
        target: enemy,
        cooldown_time: now,
    });
    info!("{} engages {}", fg.name, enemy);
    Ok(())
}

/// Outcome of one [`fire_a2a`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireResult {
    /// No loaded weapon had the target in effective range.
    NoShot,
    Miss,
    Hit,
    /// The hit destroyed the target's last aircraft.
    Kill,
}

/// Resolve at most one missile shot at the current combat target.
///
/// Aircraft are searched in insertion order, then their weapons in
/// insertion order; the first loaded weapon whose effective range exceeds
/// `distance` fires.
pub fn fire_a2a(world: &mut World, id: EntityId, distance: f64) -> Result<FireResult> {
    let now = world.time;
    let range_multiplier = world.config.combat.a2a.range_multiplier;
    let cooldown = world.config.combat.a2a.cooldown_duration;
    let (combat, name, members) = {
        let fg = world.expect_flight_group(id)?;
        (fg.combat, fg.name.clone(), fg.aircraft.clone())
    };
    let combat = combat.ok_or_else(|| CampaignError::Invariant(format!("{name} fires without combat")))?;

    let mut shot = None;
    'search: for aircraft_id in members {
        let Some(aircraft) = world.aircraft(aircraft_id) else {
            continue;
        };
        for (index, weapon) in aircraft.a2a_weapons.iter().enumerate() {
            if weapon.count > 0 && distance < weapon.range * range_multiplier {
                shot = Some((aircraft_id, index, weapon.range, weapon.name.clone()));
                break 'search;
            }
        }
    }
    let Some((aircraft_id, index, weapon_range, weapon_name)) = shot else {
        return Ok(FireResult::NoShot);
    };

    let weapon = &mut world.expect_aircraft_mut(aircraft_id)?.a2a_weapons[index];
    weapon.count = weapon.count.saturating_sub(1);

    let hit_chance = 100.0 * (1.0 - distance / weapon_range);
    let roll = world.roll_percent();
    if f64::from(roll) > hit_chance {
        debug!("{name} missed {} with {weapon_name} (roll {roll})", combat.target);
        return Ok(FireResult::Miss);
    }

    debug!("{name} hit {} with {weapon_name} (roll {roll})", combat.target);
    world.expect_flight_group_mut(id)?.combat = Some(A2ACombat {
        target: combat.target,
        cooldown_time: now + cooldown,
    });
    let destroyed = lifecycle::destroy_aircraft(world, combat.target)?;
    if destroyed {
        if let Some(fg) = world.flight_group_mut(id) {
            fg.combat = None;
        }
        return Ok(FireResult::Kill);
    }
    Ok(FireResult::Hit)
}
