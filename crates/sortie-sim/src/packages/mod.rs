//! Package generators for each mission task.
//!
//! A generator checks the coalition's `max_active` limit, finds a home base
//! with usable aircraft and a target, builds the route and registers the
//! package with its flight group. `Ok(None)` means the prerequisites are
//! not met; an error means a reference that had to exist was missing.

pub mod awacs;
pub mod cap;
pub mod cas;
pub mod dead;
pub mod strike;
pub mod target_selection;

use std::collections::BTreeMap;

use log::{error, info};

use sortie_core::components::{EntityData, FlightGroup, FlightGroupTask, Package};
use sortie_core::constants::JTAC_BASE_FREQUENCY;
use sortie_core::enums::*;
use sortie_core::error::{CampaignError, Result};
use sortie_core::flightplan::{Flightplan, WaypointTemplate};
use sortie_core::time::{minutes, to_full_minutes};
use sortie_core::types::{EntityId, Position};

use crate::systems::flight::all_flight_groups;
use crate::world::World;

pub use awacs::use_awacs;
pub use cap::{use_cap, CapPatrol};
pub use cas::use_cas;
pub use dead::use_dead;
pub use strike::use_strike;

/// An airdrome or Farp aircraft operate from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeBase {
    pub id: EntityId,
    pub position: Position,
}

/// Airdromes in faction order, then Farps in name order.
pub fn home_bases(world: &World, coalition: Coalition) -> Vec<HomeBase> {
    let Some(faction) = world.faction(coalition) else {
        return Vec::new();
    };
    let airdromes = faction
        .airdrome_names
        .iter()
        .filter_map(|name| world.airdrome_by_name(coalition, name))
        .filter_map(|id| world.airdrome(id).map(|a| HomeBase { id, position: a.position }));
    let farps = faction
        .structures
        .values()
        .filter_map(|id| world.structure(*id).map(|s| (*id, s)))
        .filter(|(_, s)| s.structure_type == StructureType::Farp)
        .map(|(id, s)| HomeBase { id, position: s.position });
    airdromes.chain(farps).collect()
}

/// Alive, unassigned aircraft able to fly `task`, per home base.
pub fn usable_aircraft(world: &World, coalition: Coalition, task: Task) -> BTreeMap<EntityId, Vec<EntityId>> {
    let mut by_base: BTreeMap<EntityId, Vec<EntityId>> = BTreeMap::new();
    let Some(definition) = world.faction_definition(coalition) else {
        return by_base;
    };
    for id in world.query(QueryKey::Aircraft, coalition) {
        let Some(aircraft) = world.aircraft(*id) else {
            continue;
        };
        if aircraft.is_available() && definition.can_fly(&aircraft.aircraft_type, task) {
            by_base.entry(aircraft.home_base).or_default().push(*id);
        }
    }
    by_base
}

/// Home bases that have at least one usable aircraft for `task`.
pub fn bases_with_aircraft(world: &World, coalition: Coalition, task: Task) -> Vec<(HomeBase, Vec<EntityId>)> {
    let mut usable = usable_aircraft(world, coalition, task);
    home_bases(world, coalition)
        .into_iter()
        .filter_map(|base| usable.remove(&base.id).map(|aircraft| (base, aircraft)))
        .collect()
}

pub fn active_packages(world: &World, coalition: Coalition, task: Task) -> usize {
    world
        .query(QueryKey::Packages, coalition)
        .iter()
        .filter(|id| world.package(**id).is_some_and(|p| p.task == task))
        .count()
}

/// Whether another package of `task` is allowed for `coalition`.
pub fn below_max_active(world: &World, coalition: Coalition, task: Task) -> bool {
    let max = world.config.package(task).max_active.get(coalition) as usize;
    active_packages(world, coalition, task) < max
}

/// First free `base-n` call sign among all flight groups of both sides.
pub fn generate_call_sign(world: &World, task: Task) -> String {
    let taken: Vec<String> = all_flight_groups(world)
        .into_iter()
        .filter_map(|id| world.flight_group(id).map(|fg| fg.name.clone()))
        .collect();
    let base = task.call_sign_base();
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|name| !taken.contains(name))
        .unwrap_or_else(|| base.to_string())
}

/// One above the highest JTAC frequency in use by any CAS flight group.
pub fn next_jtac_frequency(world: &World) -> u32 {
    all_flight_groups(world)
        .into_iter()
        .filter_map(|id| world.flight_group(id))
        .filter_map(|fg| match fg.task {
            FlightGroupTask::Cas { jtac_frequency, .. } => Some(jtac_frequency),
            _ => None,
        })
        .fold(JTAC_BASE_FREQUENCY, u32::max)
        + 1
}

/// Everything needed to register a package with a single flight group.
pub struct PackageRequest {
    pub coalition: Coalition,
    pub task: FlightGroupTask,
    pub home_base: HomeBase,
    pub aircraft: Vec<EntityId>,
    pub waypoints: Vec<WaypointTemplate>,
}

/// Register a package and its flight group, assigning the aircraft.
pub fn create_package(world: &mut World, request: PackageRequest) -> Result<EntityId> {
    let task = request.task.task();
    if request.aircraft.is_empty() {
        return Err(CampaignError::Invariant(format!("{task} package without aircraft")));
    }
    let package_config = world.config.package(task).clone();
    let cruise_speed = world.config.defaults.cruise_speed;
    let (min_delay, max_delay) = package_config.start_delay_minutes;
    let delay = world.random_range(min_delay, max_delay);
    let start_time = to_full_minutes(world.time + minutes(f64::from(delay)));

    let mut flightplan = Flightplan::new();
    flightplan.add(request.waypoints, cruise_speed);
    let end_time = start_time + flightplan.total_duration();

    let aircraft: Vec<EntityId> = request
        .aircraft
        .into_iter()
        .take(package_config.aircraft.max(1) as usize)
        .collect();
    for id in &aircraft {
        if !world.expect_aircraft(*id)?.is_available() {
            return Err(CampaignError::Invariant(format!("aircraft {id} is not available")));
        }
    }
    let name = generate_call_sign(world, task);

    let package = world.spawn(
        request.coalition,
        vec![QueryKey::Packages],
        EntityData::Package(Package {
            task,
            start_time,
            end_time,
            home_base: request.home_base.id,
            cruise_speed,
            flight_groups: Vec::new(),
        }),
    );
    let flight_group = world.spawn(
        request.coalition,
        vec![QueryKey::FlightGroups(task)],
        EntityData::FlightGroup(FlightGroup {
            name: name.clone(),
            task: request.task,
            package,
            home_base: request.home_base.id,
            start_time,
            position: request.home_base.position,
            aircraft: aircraft.clone(),
            flightplan,
            combat: None,
            last_attack_time: None,
            task_done: false,
        }),
    );
    world.expect_package_mut(package)?.flight_groups.push(flight_group);
    for id in &aircraft {
        world.expect_aircraft_mut(*id)?.flight_group = Some(flight_group);
    }
    info!(
        "{:?} {task} package {name} created with {} aircraft, start {start_time}",
        request.coalition,
        aircraft.len()
    );
    Ok(package)
}

/// Try every generator for both coalitions. A failing generator is logged
/// and does not stop the others.
pub fn generate_packages(world: &mut World) -> Vec<EntityId> {
    let mut created = Vec::new();
    for coalition in Coalition::PLAYABLE {
        if world.faction(coalition).is_none() {
            continue;
        }
        let mut attempts: Vec<(&str, Result<Option<EntityId>>)> = Vec::new();
        attempts.push(("AWACS", use_awacs(world, coalition)));
        attempts.push(("CAP", use_cap(world, coalition, &CapPatrol::Frontline)));
        let home_patrol = world
            .faction(coalition)
            .and_then(|f| f.airdrome_names.first().cloned());
        if let Some(airdrome) = home_patrol {
            attempts.push(("CAP", use_cap(world, coalition, &CapPatrol::Airdrome(airdrome))));
        }
        attempts.push(("CAS", use_cas(world, coalition)));
        attempts.push(("DEAD", use_dead(world, coalition)));
        attempts.push(("Strike", use_strike(world, coalition)));

        for (task, result) in attempts {
            match result {
                Ok(Some(id)) => created.push(id),
                Ok(None) => {}
                Err(e) => error!("{coalition:?} {task} package generation failed: {e}"),
            }
        }
    }
    created
}

/// A home base with aircraft for `task` and the target it reaches best.
pub struct Selection {
    pub base: HomeBase,
    pub aircraft: Vec<EntityId>,
    pub target: EntityId,
    pub target_position: Position,
}

/// Pair every base holding usable aircraft with its nearest target and keep
/// the closest pair.
pub fn select_base_and_target<F>(world: &World, coalition: Coalition, task: Task, select: F) -> Option<Selection>
where
    F: Fn(&World, Coalition, Position, f64) -> Option<EntityId>,
{
    let max_distance = world.config.package(task).max_distance;
    let mut best: Option<(Selection, f64)> = None;
    for (base, aircraft) in bases_with_aircraft(world, coalition, task) {
        let Some(target) = select(world, coalition, base.position, max_distance) else {
            continue;
        };
        let Some(target_position) = world.position_of(target) else {
            continue;
        };
        let distance = base.position.distance_to(&target_position);
        if best.as_ref().is_some_and(|(_, d)| *d <= distance) {
            continue;
        }
        best = Some((
            Selection {
                base,
                aircraft,
                target,
                target_position,
            },
            distance,
        ));
    }
    best.map(|(selection, _)| selection)
}
