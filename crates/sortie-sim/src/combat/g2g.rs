//! Ground-to-ground combat: battles at contested objectives and conquest.

use log::{debug, error, info, warn};

use sortie_core::constants::G2G_COMBAT_DURATION;
use sortie_core::enums::*;
use sortie_core::error::Result;
use sortie_core::types::{find_nearest, EntityId, Position};

use crate::lifecycle::{self, has_alive_units, set_ground_group_state};
use crate::packages::target_selection::packages_targeting;
use crate::world::World;

pub fn run(world: &mut World) {
    for id in world.query_all(QueryKey::GroundGroups(GroundGroupState::OnTarget)) {
        if let Err(e) = g2g(world, id) {
            error!("ground battle of {id} failed: {e}");
        }
    }

    let now = world.time;
    for id in world.query_all(QueryKey::GroundGroups(GroundGroupState::Combat)) {
        let Some((timer, target)) = world.ground_group(id).map(|gg| (gg.combat_timer, gg.target)) else {
            continue;
        };
        if timer.is_some_and(|t| t > now) {
            continue;
        }
        let result = if world.coalition_of(target) == world.coalition_of(id) {
            hold_objective(world, id)
        } else {
            g2g(world, id)
        };
        if let Err(e) = result {
            error!("ground battle of {id} failed: {e}");
        }
    }
}

/// Opposing group holding the attacker's target objective.
pub fn find_defender(world: &World, attacker: EntityId) -> Option<EntityId> {
    let gg = world.ground_group(attacker)?;
    let coalition = world.coalition_of(attacker)?;
    [GroundGroupState::OnObjective, GroundGroupState::Combat]
        .into_iter()
        .flat_map(|state| world.query_ids(QueryKey::GroundGroups(state), coalition.opposite()))
        .find(|id| {
            world.ground_group(*id).is_some_and(|d| d.target == gg.target)
                && has_alive_units(world, *id)
        })
}

/// Resolve an attacker at its target: fight the defender or take the objective.
pub fn g2g(world: &mut World, attacker: EntityId) -> Result<()> {
    match find_defender(world, attacker) {
        Some(defender) => g2g_battle(world, attacker, defender).map(|_| ()),
        None => conquer_objective(world, attacker),
    }
}

/// Outcome of one battle round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleResult {
    /// Both sides survive and fight again later.
    Combat,
    AttackerWins,
    DefenderWins,
    /// Both sides were wiped out; ownership does not change.
    Draw,
}

/// One battle round: each side rolls once to destroy a unit of the other.
pub fn g2g_battle(world: &mut World, attacker: EntityId, defender: EntityId) -> Result<BattleResult> {
    let hit_chance = world.config.combat.g2g.hit_chance;

    if world.roll_percent() <= hit_chance {
        lifecycle::destroy_ground_unit(world, defender)?;
        debug!("{attacker} destroyed a unit of {defender}");
    } else {
        debug!("{attacker} missed {defender}");
    }
    if world.roll_percent() <= hit_chance {
        lifecycle::destroy_ground_unit(world, attacker)?;
        debug!("{defender} destroyed a unit of {attacker}");
    } else {
        debug!("{defender} missed {attacker}");
    }

    let attacker_alive = has_alive_units(world, attacker);
    let defender_alive = has_alive_units(world, defender);
    match (attacker_alive, defender_alive) {
        (true, true) => {
            let timer = world.time + G2G_COMBAT_DURATION;
            for id in [attacker, defender] {
                set_ground_group_state(world, id, GroundGroupState::Combat)?;
                world.expect_ground_group_mut(id)?.combat_timer = Some(timer);
            }
            Ok(BattleResult::Combat)
        }
        (true, false) => {
            conquer_objective(world, attacker)?;
            Ok(BattleResult::AttackerWins)
        }
        (false, true) => {
            conquer_objective(world, defender)?;
            Ok(BattleResult::DefenderWins)
        }
        (false, false) => {
            let target = world.expect_ground_group(attacker)?.target;
            info!("battle at {target} ended in a draw");
            let coalition = world.coalition_of(attacker).unwrap_or_default();
            if let Some(objective) = world.objective_mut(target) {
                objective.incoming_ground_groups.remove(&coalition);
            }
            Ok(BattleResult::Draw)
        }
    }
}

/// A defender whose attackers are gone returns to holding its objective.
fn hold_objective(world: &mut World, id: EntityId) -> Result<()> {
    let target = world.expect_ground_group(id)?.target;
    let coalition = world.coalition_of(id).unwrap_or_default();
    let attacked = [GroundGroupState::OnTarget, GroundGroupState::Combat]
        .into_iter()
        .flat_map(|state| world.query_ids(QueryKey::GroundGroups(state), coalition.opposite()))
        .any(|a| world.ground_group(a).is_some_and(|g| g.target == target) && has_alive_units(world, a));
    if !attacked {
        set_ground_group_state(world, id, GroundGroupState::OnObjective)?;
    }
    Ok(())
}

/// The group's coalition takes its target objective and every structure of
/// the losing faction there.
pub fn conquer_objective(world: &mut World, group: EntityId) -> Result<()> {
    let (objective_id, group_name) = world
        .expect_ground_group(group)
        .map(|gg| (gg.target, gg.name.clone()))?;
    let winner = world.coalition_of(group).unwrap_or_default();
    let loser = winner.opposite();
    let (objective_position, objective_name) = world
        .expect_objective(objective_id)
        .map(|o| (o.position, o.name.clone()))?;
    let previous_owner = world.coalition_of(objective_id);

    set_ground_group_state(world, group, GroundGroupState::OnObjective)?;
    world.expect_ground_group_mut(group)?.position = objective_position;
    world.set_coalition(objective_id, winner)?;
    world.expect_objective_mut(objective_id)?.incoming_ground_groups.clear();

    let contested: Vec<(String, EntityId)> = world
        .faction(loser)
        .map(|f| {
            f.structures
                .iter()
                .filter(|(_, id)| world.structure(**id).is_some_and(|s| s.objective == objective_id))
                .map(|(name, id)| (name.clone(), *id))
                .collect()
        })
        .unwrap_or_default();

    if previous_owner != Some(winner) {
        info!("{group_name} conquered {objective_name} for {winner:?}");
    }
    if contested.is_empty() {
        return Ok(());
    }

    let contested_ids: Vec<EntityId> = contested.iter().map(|(_, id)| *id).collect();
    for package in packages_targeting(world, &contested_ids) {
        lifecycle::clear_package(world, package)?;
    }

    for (name, id) in &contested {
        world.set_coalition(*id, winner)?;
        let structure = world.expect_structure_mut(*id)?;
        let structure_type = structure.structure_type;
        match structure_type {
            StructureType::Barrack | StructureType::Depot => {
                structure.deployment_score = 0.0;
                for building in &mut structure.buildings {
                    building.alive = true;
                    building.destroyed_time = None;
                }
            }
            StructureType::Farp => {
                let farp_position = structure.position;
                rehome_farp_aircraft(world, loser, *id, farp_position, &contested_ids)?;
            }
            _ => {}
        }
        if let Some(faction) = world.faction_mut(loser) {
            faction.structures.remove(name);
        }
        if let Some(faction) = world.faction_mut(winner) {
            faction.structures.insert(name.clone(), *id);
        }
        info!("{name} transferred to {winner:?}");
    }
    Ok(())
}

/// Move the losing faction's aircraft off a captured Farp: to its nearest
/// remaining Farp, otherwise to its nearest airdrome.
fn rehome_farp_aircraft(
    world: &mut World,
    coalition: Coalition,
    farp: EntityId,
    farp_position: Position,
    captured: &[EntityId],
) -> Result<()> {
    let stranded: Vec<EntityId> = world
        .query(QueryKey::Aircraft, coalition)
        .iter()
        .copied()
        .filter(|a| world.aircraft(*a).is_some_and(|ac| ac.home_base == farp))
        .collect();
    if stranded.is_empty() {
        return Ok(());
    }

    let farps = world
        .faction(coalition)
        .map(|f| f.structures.values().copied().collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .filter(|id| !captured.contains(id))
        .filter_map(|id| world.structure(id).map(|s| (id, s)))
        .filter(|(_, s)| s.structure_type == StructureType::Farp)
        .map(|(id, s)| (id, s.position));
    let new_home = find_nearest(farps, &farp_position, |(_, p)| *p).or_else(|| {
        let airdromes = world
            .query(QueryKey::Airdromes, coalition)
            .iter()
            .filter_map(|id| world.airdrome(*id).map(|a| (*id, a.position)));
        find_nearest(airdromes, &farp_position, |(_, p)| *p)
    });

    let Some((home, _)) = new_home else {
        warn!("no home base left for {} aircraft of {farp}", stranded.len());
        return Ok(());
    };
    for aircraft in &stranded {
        world.expect_aircraft_mut(*aircraft)?.home_base = home;
    }
    info!("re-homed {} aircraft from {farp} to {home}", stranded.len());
    Ok(())
}
