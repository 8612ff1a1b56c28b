//! Unit camp deployment: Barracks and Depots build up a deployment score
//! and send a new ground group towards the front once it is full.

use log::{error, info};

use sortie_core::enums::*;
use sortie_core::error::{CampaignError, Result};
use sortie_core::types::{find_nearest, EntityId};

use crate::lifecycle::{spawn_ground_group, GroundGroupSpawn};
use crate::world::World;

pub fn run(world: &mut World, dt: f64) {
    for coalition in Coalition::PLAYABLE {
        let camps: Vec<EntityId> = match world.faction(coalition) {
            Some(faction) => faction.structures.values().copied().collect(),
            None => continue,
        };
        for id in camps {
            if let Err(e) = update_camp(world, coalition, id, dt) {
                error!("deployment of structure {id} failed: {e}");
            }
        }
    }
}

fn update_camp(world: &mut World, coalition: Coalition, id: EntityId, dt: f64) -> Result<()> {
    let deployment = world.config.deployment.clone();
    let (structure_type, standing, current) = world
        .expect_structure(id)
        .map(|s| (s.structure_type, s.has_alive_building(), s.deployment_score))?;
    let Some(threshold) = deployment.score_threshold.get(structure_type) else {
        return Ok(());
    };
    if !standing {
        return Ok(());
    }
    let gain = deployment.rate_per_hour * deployment.coalition_multiplier.get(coalition) * dt / 3_600.0;
    let score = (current + gain).min(threshold);
    world.expect_structure_mut(id)?.deployment_score = score;

    if score < threshold {
        return Ok(());
    }
    let en_route = world
        .query(QueryKey::GroundGroups(GroundGroupState::EnRoute), coalition)
        .len() as u32;
    if en_route >= deployment.max_en_route.get(coalition) {
        return Ok(());
    }
    let Some(target) = deployment_target(world, coalition, id)? else {
        return Ok(());
    };
    deploy(world, coalition, id, target)?;
    world.expect_structure_mut(id)?.deployment_score = 0.0;
    Ok(())
}

/// Nearest objective not owned by `coalition` within the camp's frontline
/// range whose incoming slot for `coalition` is free.
pub fn deployment_target(world: &World, coalition: Coalition, camp: EntityId) -> Result<Option<EntityId>> {
    let structure = world.expect_structure(camp)?;
    let Some(range) = world
        .config
        .deployment
        .frontline_range
        .get(structure.structure_type)
    else {
        return Ok(None);
    };
    let origin = structure.position;
    let candidates = world
        .query_all(QueryKey::Objectives)
        .into_iter()
        .filter(|id| world.coalition_of(*id) != Some(coalition))
        .filter_map(|id| world.objective(id).map(|o| (id, o)))
        .filter(|(_, o)| !o.incoming_ground_groups.contains_key(&coalition))
        .filter(|(_, o)| o.position.distance_to(&origin) <= range);
    Ok(find_nearest(candidates, &origin, |(_, o)| o.position).map(|(id, _)| id))
}

/// Spawn a ground group at a camp heading for `target`.
pub fn deploy(world: &mut World, coalition: Coalition, camp: EntityId, target: EntityId) -> Result<EntityId> {
    let (start, position, camp_name, group_type) = {
        let structure = world.expect_structure(camp)?;
        let group_type = match structure.structure_type {
            StructureType::Barrack => GroundGroupType::Infantry,
            _ => GroundGroupType::Armor,
        };
        (structure.objective, structure.position, structure.name.clone(), group_type)
    };
    let vehicles = world
        .faction_definition(coalition)
        .map(|d| d.vehicles.clone())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CampaignError::InvalidFaction(format!("{coalition:?} has no vehicles")))?;
    let name = format!("{camp_name} Group {}", world.entity_count());
    let count = world.config.deployment.units_per_group;

    let id = spawn_ground_group(
        world,
        GroundGroupSpawn {
            coalition,
            name: name.clone(),
            group_type,
            unit_types: &vehicles,
            count,
            start,
            target,
            state: GroundGroupState::EnRoute,
            position,
        },
    );
    world
        .expect_objective_mut(target)?
        .incoming_ground_groups
        .insert(coalition, id);
    info!("{name} deployed from {camp_name}");
    Ok(id)
}
