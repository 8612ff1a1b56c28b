//! Target selection for package generators.
//!
//! Every selector returns the nearest eligible target within range, or
//! `None`. A target already assigned to a flight group of the same
//! coalition is never picked twice.

use sortie_core::components::Structure;
use sortie_core::enums::*;
use sortie_core::types::{find_nearest, EntityId, Position};

use crate::lifecycle::has_alive_units;
use crate::systems::flight::{all_flight_groups, flight_groups_of};
use crate::world::World;

/// Whether a flight group of `coalition` already has `target` as its task target.
pub fn already_targeted(world: &World, coalition: Coalition, target: EntityId) -> bool {
    flight_groups_of(world, coalition)
        .into_iter()
        .filter_map(|id| world.flight_group(id))
        .any(|fg| fg.task.target() == Some(target))
}

/// Packages with a flight group targeting any of `targets`.
pub fn packages_targeting(world: &World, targets: &[EntityId]) -> Vec<EntityId> {
    let mut packages: Vec<EntityId> = all_flight_groups(world)
        .into_iter()
        .filter_map(|id| world.flight_group(id))
        .filter(|fg| fg.task.target().is_some_and(|t| targets.contains(&t)))
        .map(|fg| fg.package)
        .collect();
    packages.sort();
    packages.dedup();
    packages
}

fn nearest_untargeted(
    world: &World,
    coalition: Coalition,
    candidates: Vec<(EntityId, Position)>,
    from: Position,
    max_distance: f64,
) -> Option<EntityId> {
    let eligible = candidates
        .into_iter()
        .filter(|(_, p)| p.distance_to(&from) <= max_distance)
        .filter(|(id, _)| !already_targeted(world, coalition, *id));
    find_nearest(eligible, &from, |(_, p)| *p).map(|(id, _)| id)
}

/// Enemy ground group fighting at an objective.
pub fn cas_target(world: &World, coalition: Coalition, from: Position, max_distance: f64) -> Option<EntityId> {
    let candidates = [GroundGroupState::OnTarget, GroundGroupState::Combat]
        .into_iter()
        .flat_map(|state| world.query_ids(QueryKey::GroundGroups(state), coalition.opposite()))
        .filter_map(|id| world.ground_group(id).map(|gg| (id, gg)))
        .filter(|(_, gg)| gg.group_type != GroundGroupType::Sam)
        .map(|(id, gg)| (id, gg.position))
        .collect();
    nearest_untargeted(world, coalition, candidates, from, max_distance)
}

/// Enemy SAM group with living units.
pub fn dead_target(world: &World, coalition: Coalition, from: Position, max_distance: f64) -> Option<EntityId> {
    let candidates = GroundGroupState::ALL
        .into_iter()
        .flat_map(|state| world.query_ids(QueryKey::GroundGroups(state), coalition.opposite()))
        .filter_map(|id| world.ground_group(id).map(|gg| (id, gg)))
        .filter(|(_, gg)| gg.group_type == GroundGroupType::Sam)
        .filter(|(id, _)| has_alive_units(world, *id))
        .map(|(id, gg)| (id, gg.position))
        .collect();
    nearest_untargeted(world, coalition, candidates, from, max_distance)
}

fn strikeable(structure: &Structure) -> bool {
    structure.structure_type != StructureType::Farp && structure.has_alive_building()
}

/// Enemy structure with at least one standing building.
pub fn strike_target(world: &World, coalition: Coalition, from: Position, max_distance: f64) -> Option<EntityId> {
    let candidates = world
        .query_ids(QueryKey::Structures, coalition.opposite())
        .into_iter()
        .filter_map(|id| world.structure(id).map(|s| (id, s)))
        .filter(|(_, s)| strikeable(s))
        .map(|(id, s)| (id, s.position))
        .collect();
    nearest_untargeted(world, coalition, candidates, from, max_distance)
}

/// Enemy airdrome nearest to `from`.
pub fn nearest_opposing_airdrome(world: &World, coalition: Coalition, from: Position) -> Option<EntityId> {
    let airdromes = world
        .query(QueryKey::Airdromes, coalition.opposite())
        .iter()
        .filter_map(|id| world.airdrome(*id).map(|a| (*id, a.position)));
    find_nearest(airdromes, &from, |(_, p)| *p).map(|(id, _)| id)
}

/// Own objective closest to any enemy airdrome.
pub fn frontline_objective(world: &World, coalition: Coalition) -> Option<EntityId> {
    let enemy_airdromes: Vec<Position> = world
        .query(QueryKey::Airdromes, coalition.opposite())
        .iter()
        .filter_map(|id| world.airdrome(*id).map(|a| a.position))
        .collect();
    world
        .query(QueryKey::Objectives, coalition)
        .iter()
        .filter_map(|id| world.objective(*id).map(|o| (*id, o.position)))
        .filter_map(|(id, position)| {
            enemy_airdromes
                .iter()
                .map(|a| a.distance_to(&position))
                .min_by(f64::total_cmp)
                .map(|d| (id, d))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
