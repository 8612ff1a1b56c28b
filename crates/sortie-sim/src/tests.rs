//! Tests for the campaign world, combat, package generation, serialization
//! and the engine command loop.

use sortie_core::commands::WorkerMessage;
use sortie_core::components::{EntityData, FlightGroupTask, Objective, Package, Structure};
use sortie_core::config::CampaignConfig;
use sortie_core::enums::*;
use sortie_core::error::CampaignError;
use sortie_core::events::{MapItem, WorkerEvent};
use sortie_core::types::{EntityId, Position};

use crate::combat::a2a::{engage_a2a, fire_a2a, FireResult};
use crate::combat::a2g::strike_attack;
use crate::combat::g2g::{self, BattleResult};
use crate::dice::{ScriptedDice, SeededDice};
use crate::engine::{SimConfig, SimulationEngine};
use crate::packages::{self, bases_with_aircraft, create_package, CapPatrol, PackageRequest};
use crate::serialization;
use crate::systems::{deployment, flight, ground};
use crate::testing::*;
use crate::world::{Notification, World};

fn cas_setup(world: &mut World) -> (EntityId, EntityId) {
    let alpha = find(world, "Alpha");
    let attacker = ground_group_at(world, Coalition::Red, "Red Attack", alpha, GroundGroupState::OnTarget, 4);
    let package = packages::use_cas(world, Coalition::Blue)
        .unwrap()
        .expect("CAS package created");
    let fg = world.expect_package(package).unwrap().flight_groups[0];
    (fg, attacker)
}

fn cap_flight_group(world: &mut World, coalition: Coalition) -> EntityId {
    let (base, aircraft) = bases_with_aircraft(world, coalition, Task::Cap)
        .into_iter()
        .next()
        .expect("CAP aircraft");
    let alpha = world.position_of(find(world, "Alpha")).unwrap();
    let package = create_package(
        world,
        PackageRequest {
            coalition,
            task: FlightGroupTask::Cap { target: base.id },
            home_base: base,
            aircraft,
            waypoints: packages::cap::cap_route(base.position, alpha, alpha, false),
        },
    )
    .unwrap();
    let fg = world.expect_package(package).unwrap().flight_groups[0];
    flight::take_off(world, fg).unwrap();
    fg
}

fn loaded_missiles(world: &World, fg: EntityId) -> u32 {
    world
        .expect_flight_group(fg)
        .unwrap()
        .aircraft
        .iter()
        .filter_map(|a| world.aircraft(*a))
        .map(|a| a.a2a_weapons.iter().map(|w| w.count).sum::<u32>())
        .sum()
}

/// A blue Farp at its own objective, away from the front.
fn rear_farp(world: &mut World, name: &str, position: Position) -> EntityId {
    let objective = world.spawn(
        Coalition::Blue,
        vec![QueryKey::Objectives],
        EntityData::Objective(Objective {
            name: format!("{name} Site"),
            position,
            incoming_ground_groups: Default::default(),
        }),
    );
    let farp = world.spawn(
        Coalition::Blue,
        vec![QueryKey::Structures],
        EntityData::Structure(Structure {
            name: name.into(),
            objective,
            structure_type: StructureType::Farp,
            buildings: Vec::new(),
            deployment_score: 0.0,
            position,
        }),
    );
    world
        .faction_mut(Coalition::Blue)
        .unwrap()
        .structures
        .insert(name.into(), farp);
    farp
}

// ---- World registry ----

#[test]
fn test_query_membership_lifecycle() {
    let mut world = empty_world(ScriptedDice::always_miss());
    let package = world.spawn(
        Coalition::Blue,
        vec![QueryKey::Packages],
        EntityData::Package(Package {
            task: Task::Cas,
            start_time: 0.0,
            end_time: 10.0,
            home_base: EntityId::new(99, 0),
            cruise_speed: 200.0,
            flight_groups: Vec::new(),
        }),
    );
    assert!(world.query(QueryKey::Packages, Coalition::Blue).contains(&package));
    assert!(world.in_query(package, QueryKey::Packages));

    world.set_coalition(package, Coalition::Red).unwrap();
    assert!(world.query(QueryKey::Packages, Coalition::Blue).is_empty());
    assert!(world.query(QueryKey::Packages, Coalition::Red).contains(&package));

    world.remove_from_query(package, QueryKey::Packages).unwrap();
    assert!(!world.in_query(package, QueryKey::Packages));
    world.add_to_query(package, QueryKey::Packages).unwrap();
    assert!(world.in_query(package, QueryKey::Packages));

    let removed = world.despawn(package).expect("despawned");
    assert_eq!(removed.id, package);
    assert!(world.query(QueryKey::Packages, Coalition::Red).is_empty());
    assert!(world.record(package).is_none());
    assert!(world.package(package).is_none());
    assert!(world.despawn(package).is_none(), "stale id is ignored");

    // The slot is reused with a new generation; the old id stays dead.
    let reused = world.spawn(
        Coalition::Blue,
        vec![QueryKey::Airdromes],
        EntityData::Airdrome(sortie_core::components::Airdrome {
            name: "Senaki".into(),
            position: Position::new(0.0, 0.0),
        }),
    );
    assert_eq!(reused.index, package.index);
    assert_ne!(reused, package);
    assert!(!world.contains(package));
    assert!(world.contains(reused));
}

#[test]
fn test_load_keeps_ids_and_rejects_shared_slots() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let (fg, _) = cas_setup(&mut world);
    // Leave a gap so restored ids are not contiguous.
    let defense = find(&world, "Alpha Defense");
    crate::lifecycle::destroy_ground_group(&mut world, defense).unwrap();
    let mut state = serialization::serialize(&world);

    let loaded = serialization::load(state.clone(), CampaignConfig::default(), Box::new(ScriptedDice::always_miss())).unwrap();
    assert_eq!(loaded.entity_count(), world.entity_count());
    for record in &state.entities {
        assert_eq!(loaded.record(record.id).as_ref(), Some(record));
    }
    assert_eq!(loaded.expect_flight_group(fg).unwrap().name, "Springfield-1");

    let duplicate = state.entities[0].clone();
    state.entities.push(duplicate);
    let err = serialization::load(state, CampaignConfig::default(), Box::new(ScriptedDice::always_miss())).err();
    assert!(matches!(err, Some(CampaignError::Invariant(_))));
}

#[test]
fn test_typed_accessor_wrong_kind() {
    let world = generated_world(ScriptedDice::always_miss());
    let kutaisi = find(&world, BLUE_AIRDROME);
    assert!(world.airdrome(kutaisi).is_some());
    assert!(world.flight_group(kutaisi).is_none());
    let err = world.expect_flight_group(kutaisi).err();
    assert!(matches!(err, Some(CampaignError::WrongEntityKind { .. })));
}

#[test]
fn test_blue_flight_group_changes_notify() {
    let mut world = generated_world(ScriptedDice::always_miss());
    world.take_notifications();
    let fg = cap_flight_group(&mut world, Coalition::Red);
    assert!(world.take_notifications().is_empty(), "red flight groups are not reported");
    crate::lifecycle::destroy_flight_group(&mut world, fg).unwrap();
    assert!(world.take_notifications().is_empty());

    cap_flight_group(&mut world, Coalition::Blue);
    assert_eq!(world.take_notifications(), vec![Notification::FlightGroupsChanged]);
}

// ---- Scenario generation ----

#[test]
fn test_generate_creates_campaign() {
    let world = generated_world(ScriptedDice::always_miss());

    assert_eq!(world.coalition_of(find(&world, "Alpha")), Some(Coalition::Blue));
    assert_eq!(world.coalition_of(find(&world, "Bravo")), Some(Coalition::Red));
    assert_eq!(world.coalition_of(find(&world, "Charlie")), Some(Coalition::Red));
    assert_eq!(world.coalition_of(find(&world, "Alpha FARP")), Some(Coalition::Blue));

    let blue = world.faction(Coalition::Blue).unwrap();
    assert_eq!(blue.airdrome_names, vec![BLUE_AIRDROME.to_string()]);
    assert!(blue.structures.contains_key("Alpha Barracks"));
    assert!(!blue.structures.contains_key("Bravo Depot"));

    // 12 CAP + 4 CAS + 3 AWACS + 4 DEAD + 8 Strike
    assert_eq!(world.query(QueryKey::Aircraft, Coalition::Blue).len(), 31);
    assert_eq!(world.query(QueryKey::Aircraft, Coalition::Red).len(), 31);

    let defense = find(&world, "Alpha Defense");
    assert_eq!(alive_units(&world, defense), 4);
    assert!(world.in_query(defense, QueryKey::GroundGroups(GroundGroupState::OnObjective)));

    let sam = world.expect_ground_group(find(&world, "Kutaisi SAM")).unwrap();
    assert_eq!(sam.group_type, GroundGroupType::Sam);
    assert!((sam.position.x - 5_000.0).abs() < 1e-6, "SAM sits towards the enemy");

    assert_eq!(world.time, 8.0 * 3_600.0);
    assert_eq!(world.meta.theatre, "Caucasus");
}

#[test]
fn test_generate_rejects_invalid_scenario_without_mutation() {
    let mut world = empty_world(ScriptedDice::always_miss());
    let mut scenario = test_scenario();
    scenario.red.airdrome_names.push("Nowhere".into());

    let err = crate::scenario::generate(&mut world, blue_faction(), red_faction(), &scenario).unwrap_err();
    assert!(matches!(err, CampaignError::AirdromeNotFound(ref name) if name == "Nowhere"));
    assert_eq!(world.entity_count(), 0);
    assert!(world.faction(Coalition::Blue).is_none());

    let mut faction = red_faction();
    faction.vehicles.clear();
    let err = crate::scenario::generate(&mut world, blue_faction(), faction, &test_scenario()).unwrap_err();
    assert!(matches!(err, CampaignError::InvalidFaction(_)));
    assert_eq!(world.entity_count(), 0);
}

// ---- Package generation ----

#[test]
fn test_cas_package_scenario() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let (fg_id, attacker) = cas_setup(&mut world);

    let fg = world.expect_flight_group(fg_id).unwrap();
    let package = world.expect_package(fg.package).unwrap();
    assert_eq!(package.task, Task::Cas);
    assert!(package.end_time > package.start_time);
    // Scripted dice pick the shortest delay: 08:00 + 20 min.
    assert_eq!(package.start_time, 8.0 * 3_600.0 + 20.0 * 60.0);

    assert_eq!(fg.name, "Springfield-1");
    assert_eq!(fg.task, FlightGroupTask::Cas { target: attacker, jtac_frequency: 241 });
    assert_eq!(fg.aircraft.len(), 2);
    let waypoints = &fg.flightplan.waypoints;
    assert_eq!(waypoints.len(), 3);
    assert_eq!(waypoints[0].name, "Take Off");
    assert_eq!(waypoints[0].arrival_duration, 0.0);
    assert!(waypoints[1].is_racetrack());
    assert!(waypoints[1].task_start);
    assert_eq!(waypoints[1].duration, Some(1_800.0));
    assert_eq!(waypoints[2].name, "Landing");

    for aircraft in &fg.aircraft {
        assert_eq!(world.expect_aircraft(*aircraft).unwrap().flight_group, Some(fg_id));
    }
}

#[test]
fn test_call_signs_and_jtac_do_not_collide() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let (first, _) = cas_setup(&mut world);
    let alpha = find(&world, "Alpha");
    ground_group_at(&mut world, Coalition::Red, "Red Attack 2", alpha, GroundGroupState::Combat, 4);

    let package = packages::use_cas(&mut world, Coalition::Blue).unwrap().unwrap();
    let second = world.expect_package(package).unwrap().flight_groups[0];
    let first = world.expect_flight_group(first).unwrap();
    let second = world.expect_flight_group(second).unwrap();
    assert_eq!(second.name, "Springfield-2");
    assert_ne!(first.task.target(), second.task.target(), "a target is never picked twice");
    assert!(matches!(second.task, FlightGroupTask::Cas { jtac_frequency: 242, .. }));
}

#[test]
fn test_call_signs_unique_across_coalitions() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let blue = cap_flight_group(&mut world, Coalition::Blue);
    let red = cap_flight_group(&mut world, Coalition::Red);
    assert_eq!(world.expect_flight_group(blue).unwrap().name, "Enfield-1");
    assert_eq!(world.expect_flight_group(red).unwrap().name, "Enfield-2");
}

#[test]
fn test_max_active_gate() {
    let mut world = generated_world(ScriptedDice::always_miss());
    assert!(packages::use_awacs(&mut world, Coalition::Blue).unwrap().is_some());
    assert!(packages::use_awacs(&mut world, Coalition::Blue).unwrap().is_none());
    assert_eq!(packages::active_packages(&world, Coalition::Blue, Task::Awacs), 1);
}

#[test]
fn test_no_cas_target_is_a_noop() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let before = world.entity_count();
    assert!(packages::use_cas(&mut world, Coalition::Blue).unwrap().is_none());
    assert_eq!(world.entity_count(), before);
}

#[test]
fn test_cap_missing_airdrome_errors() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let err = packages::use_cap(&mut world, Coalition::Blue, &CapPatrol::Airdrome("Nowhere".into())).unwrap_err();
    assert!(matches!(err, CampaignError::AirdromeNotFound(_)));

    let package = packages::use_cap(&mut world, Coalition::Blue, &CapPatrol::Frontline)
        .unwrap()
        .expect("frontline CAP");
    let fg = world.expect_package(package).unwrap().flight_groups[0];
    let fg = world.expect_flight_group(fg).unwrap();
    assert_eq!(fg.task.target(), Some(find(&world, "Alpha")));
    // The patrol sits behind the objective, away from the enemy.
    assert!(fg.flightplan.waypoints[1].position.x < 60_000.0);
}

#[test]
fn test_strike_route_shape() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let package = packages::use_strike(&mut world, Coalition::Blue).unwrap().unwrap();
    let fg = world.expect_package(package).unwrap().flight_groups[0];
    let fg = world.expect_flight_group(fg).unwrap();

    // Charlie Ammo is just beyond strike range.
    assert_eq!(fg.task.target(), Some(find(&world, "Bravo Depot")));
    let names: Vec<&str> = fg.flightplan.waypoints.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["Take Off", "Ingress", "Strike", "Egress", "Nav", "Landing"]);
    assert_eq!(fg.flightplan.task_waypoint_index(), Some(2));
    let ingress = fg.flightplan.waypoints[1].position;
    assert!((ingress.x - 90_000.0).abs() < 50.0, "ingress 15 km before the target");
}

#[test]
fn test_dead_targets_sam() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let package = packages::use_dead(&mut world, Coalition::Blue).unwrap().unwrap();
    let fg = world.expect_package(package).unwrap().flight_groups[0];
    let fg = world.expect_flight_group(fg).unwrap();
    assert_eq!(fg.task.target(), Some(find(&world, "Mozdok SAM")));
    assert_eq!(fg.flightplan.waypoints.len(), 4);
}

#[test]
fn test_generate_packages_isolates_failures() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let created = packages::generate_packages(&mut world);
    // Both sides get AWACS, frontline CAP, DEAD and Strike; no CAS targets yet.
    assert!(created.len() >= 6, "created {}", created.len());
    assert_eq!(packages::active_packages(&world, Coalition::Blue, Task::Cas), 0);
    assert_eq!(packages::active_packages(&world, Coalition::Red, Task::Awacs), 1);
}

// ---- Flight ----

#[test]
fn test_flight_group_takes_off_and_lands() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let (fg_id, _) = cas_setup(&mut world);
    let (package, aircraft, start, end) = {
        let fg = world.expect_flight_group(fg_id).unwrap();
        let start = fg.start_time;
        (fg.package, fg.aircraft.clone(), start, start + fg.flightplan.total_duration())
    };

    world.time = start - 1.0;
    world.advance(0.5);
    assert!(!flight::is_airborne(&world, fg_id));
    world.advance(1.0);
    assert!(flight::is_airborne(&world, fg_id));

    while world.time < end + 10.0 {
        world.advance(5.0);
    }
    assert!(world.flight_group(fg_id).is_none());
    assert!(world.package(package).is_none());
    for id in aircraft {
        let aircraft = world.expect_aircraft(id).unwrap();
        assert_eq!(aircraft.flight_group, None);
        assert!(aircraft.is_available());
    }
}

// ---- Air-to-air ----

#[test]
fn test_fire_a2a_at_most_one_shot() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let blue = cap_flight_group(&mut world, Coalition::Blue);
    let red = cap_flight_group(&mut world, Coalition::Red);
    engage_a2a(&mut world, blue, red).unwrap();

    assert_eq!(loaded_missiles(&world, blue), 8);
    for expected in (0..8).rev() {
        assert_eq!(fire_a2a(&mut world, blue, 10_000.0).unwrap(), FireResult::Miss);
        assert_eq!(loaded_missiles(&world, blue), expected);
    }
    assert_eq!(fire_a2a(&mut world, blue, 10_000.0).unwrap(), FireResult::NoShot);
    assert_eq!(loaded_missiles(&world, blue), 0);
}

#[test]
fn test_fire_a2a_out_of_effective_range() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let blue = cap_flight_group(&mut world, Coalition::Blue);
    let red = cap_flight_group(&mut world, Coalition::Red);
    engage_a2a(&mut world, blue, red).unwrap();
    // 50 km missile, 0.66 multiplier: 33 km effective.
    assert_eq!(fire_a2a(&mut world, blue, 34_000.0).unwrap(), FireResult::NoShot);
    assert_eq!(loaded_missiles(&world, blue), 8);
}

#[test]
fn test_a2a_hits_until_kill() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let blue = cap_flight_group(&mut world, Coalition::Blue);
    let red = cap_flight_group(&mut world, Coalition::Red);
    let red_package = world.expect_flight_group(red).unwrap().package;
    let first_lost = world.expect_flight_group(red).unwrap().aircraft[0];
    engage_a2a(&mut world, blue, red).unwrap();

    assert_eq!(fire_a2a(&mut world, blue, 10_000.0).unwrap(), FireResult::Hit);
    let combat = world.expect_flight_group(blue).unwrap().combat.unwrap();
    assert_eq!(combat.cooldown_time, world.time + 30.0);
    assert_eq!(world.expect_flight_group(red).unwrap().aircraft.len(), 1);
    assert!(!world.expect_aircraft(first_lost).unwrap().alive);
    assert!(world.in_query(first_lost, QueryKey::Aircraft), "losses stay in the inventory");

    assert_eq!(fire_a2a(&mut world, blue, 10_000.0).unwrap(), FireResult::Kill);
    assert!(world.flight_group(red).is_none());
    assert!(world.package(red_package).is_none());
    assert!(world.expect_flight_group(blue).unwrap().combat.is_none());
}

#[test]
fn test_cap_detects_and_engages() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let blue = cap_flight_group(&mut world, Coalition::Blue);
    let red = cap_flight_group(&mut world, Coalition::Red);
    world.expect_flight_group_mut(blue).unwrap().position = Position::new(100_000.0, 0.0);
    world.expect_flight_group_mut(red).unwrap().position = Position::new(130_000.0, 0.0);

    crate::combat::a2a::run(&mut world);
    assert_eq!(world.expect_flight_group(blue).unwrap().combat.map(|c| c.target), Some(red));
    assert_eq!(world.expect_flight_group(red).unwrap().combat.map(|c| c.target), Some(blue));
}

// ---- Ground-to-ground ----

#[test]
fn test_g2g_both_survive_enters_combat() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let alpha = find(&world, "Alpha");
    let defense = find(&world, "Alpha Defense");
    let attacker = ground_group_at(&mut world, Coalition::Red, "Red Attack", alpha, GroundGroupState::OnTarget, 4);

    let result = g2g::g2g_battle(&mut world, attacker, defense).unwrap();
    assert_eq!(result, BattleResult::Combat);
    assert_eq!(alive_units(&world, attacker), 3);
    assert_eq!(alive_units(&world, defense), 3);
    for id in [attacker, defense] {
        let gg = world.expect_ground_group(id).unwrap();
        assert_eq!(gg.state, GroundGroupState::Combat);
        assert_eq!(gg.combat_timer, Some(world.time + 180.0));
        assert!(world.in_query(id, QueryKey::GroundGroups(GroundGroupState::Combat)));
    }
    assert!(!world.in_query(attacker, QueryKey::GroundGroups(GroundGroupState::OnTarget)));

    // Nothing happens until the timer expires.
    g2g::run(&mut world);
    assert_eq!(alive_units(&world, attacker), 3);
    world.time += 180.0;
    g2g::run(&mut world);
    assert_eq!(alive_units(&world, attacker), 2);
}

#[test]
fn test_g2g_fights_defender_at_target() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let alpha = find(&world, "Alpha");
    let defense = find(&world, "Alpha Defense");
    let attacker = ground_group_at(&mut world, Coalition::Red, "Red Attack", alpha, GroundGroupState::OnTarget, 4);

    assert_eq!(g2g::find_defender(&world, attacker), Some(defense));
    g2g::g2g(&mut world, attacker).unwrap();
    for id in [attacker, defense] {
        assert_eq!(world.expect_ground_group(id).unwrap().state, GroundGroupState::Combat);
        assert_eq!(alive_units(&world, id), 3);
    }
    assert_eq!(world.coalition_of(alpha), Some(Coalition::Blue));
}

#[test]
fn test_conquest_transfers_structures() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let alpha = find(&world, "Alpha");
    let barracks = find(&world, "Alpha Barracks");
    let farp = find(&world, "Alpha FARP");
    let kutaisi = find(&world, BLUE_AIRDROME);
    let defense = find(&world, "Alpha Defense");
    {
        let structure = world.expect_structure_mut(barracks).unwrap();
        structure.deployment_score = 1_000.0;
        structure.buildings[0].alive = false;
    }
    let stationed: Vec<EntityId> = world.query_ids(QueryKey::Aircraft, Coalition::Blue).into_iter().take(3).collect();
    for id in &stationed {
        world.expect_aircraft_mut(*id).unwrap().home_base = farp;
    }
    let (base, aircraft) = bases_with_aircraft(&world, Coalition::Red, Task::Strike).remove(0);
    let red_strike = create_package(
        &mut world,
        PackageRequest {
            coalition: Coalition::Red,
            task: FlightGroupTask::Strike { target: barracks },
            home_base: base,
            aircraft,
            waypoints: packages::strike::strike_route(base.position, Position::new(60_000.0, 1_000.0), None),
        },
    )
    .unwrap();

    let attacker = ground_group_at(&mut world, Coalition::Red, "Red Attack", alpha, GroundGroupState::OnTarget, 4);
    world.expect_objective_mut(alpha).unwrap().incoming_ground_groups.insert(Coalition::Red, attacker);
    kill_all_units(&mut world, defense);
    g2g::g2g(&mut world, attacker).unwrap();

    assert_eq!(world.coalition_of(alpha), Some(Coalition::Red));
    assert!(world.expect_objective(alpha).unwrap().incoming_ground_groups.is_empty());
    assert_eq!(world.expect_ground_group(attacker).unwrap().state, GroundGroupState::OnObjective);

    for (name, id) in [("Alpha Barracks", barracks), ("Alpha FARP", farp)] {
        assert_eq!(world.coalition_of(id), Some(Coalition::Red));
        assert!(world.query(QueryKey::Structures, Coalition::Red).contains(&id));
        assert_eq!(world.faction(Coalition::Red).unwrap().structures.get(name), Some(&id));
        assert!(!world.faction(Coalition::Blue).unwrap().structures.contains_key(name));
    }
    let structure = world.expect_structure(barracks).unwrap();
    assert_eq!(structure.deployment_score, 0.0);
    assert!(structure.buildings.iter().all(|b| b.alive));

    // Aircraft stationed at the captured Farp fall back to the airdrome.
    for id in &stationed {
        assert_eq!(world.expect_aircraft(*id).unwrap().home_base, kutaisi);
    }
    assert!(world.package(red_strike).is_none(), "strike on a captured structure is cancelled");
}

#[test]
fn test_conquest_rehomes_to_nearest_remaining_farp() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let alpha = find(&world, "Alpha");
    let farp = find(&world, "Alpha FARP");
    let defense = find(&world, "Alpha Defense");
    let rear = rear_farp(&mut world, "Rear FARP", Position::new(30_000.0, 0.0));
    let far = rear_farp(&mut world, "Far FARP", Position::new(-80_000.0, 0.0));

    let stationed: Vec<EntityId> = world.query_ids(QueryKey::Aircraft, Coalition::Blue).into_iter().take(2).collect();
    for id in &stationed {
        world.expect_aircraft_mut(*id).unwrap().home_base = farp;
    }
    let attacker = ground_group_at(&mut world, Coalition::Red, "Red Attack", alpha, GroundGroupState::OnTarget, 4);
    kill_all_units(&mut world, defense);
    g2g::g2g(&mut world, attacker).unwrap();

    assert_eq!(world.coalition_of(farp), Some(Coalition::Red));
    for id in &stationed {
        assert_eq!(world.expect_aircraft(*id).unwrap().home_base, rear);
    }
    for id in [rear, far] {
        assert_eq!(world.coalition_of(id), Some(Coalition::Blue));
    }
    let home_bases = packages::home_bases(&world, Coalition::Blue);
    assert!(home_bases.iter().any(|b| b.id == rear));
    assert!(!home_bases.iter().any(|b| b.id == farp));
}

#[test]
fn test_draw_when_both_sides_wiped() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let alpha = find(&world, "Alpha");
    let defense = find(&world, "Alpha Defense");
    let units = world.expect_ground_group(defense).unwrap().units.clone();
    for unit in &units[..3] {
        world.expect_ground_unit_mut(*unit).unwrap().alive = false;
    }
    let attacker = ground_group_at(&mut world, Coalition::Red, "Red Attack", alpha, GroundGroupState::OnTarget, 1);
    world.expect_objective_mut(alpha).unwrap().incoming_ground_groups.insert(Coalition::Red, attacker);

    let result = g2g::g2g_battle(&mut world, attacker, defense).unwrap();
    assert_eq!(result, BattleResult::Draw);
    assert_eq!(world.coalition_of(alpha), Some(Coalition::Blue));
    assert!(world.expect_objective(alpha).unwrap().incoming_ground_groups.is_empty());

    crate::systems::cleanup::run(&mut world);
    assert!(world.ground_group(attacker).is_none());
    assert!(world.ground_group(defense).is_none());
}

// ---- Air-to-ground ----

#[test]
fn test_strike_attack_destroys_buildings() {
    let mut world = generated_world(ScriptedDice::always_hit());
    let package = packages::use_strike(&mut world, Coalition::Blue).unwrap().unwrap();
    let fg = world.expect_package(package).unwrap().flight_groups[0];
    let depot = find(&world, "Bravo Depot");

    assert_eq!(strike_attack(&mut world, fg, depot).unwrap(), 2);
    let alive = world
        .expect_structure(depot)
        .unwrap()
        .buildings
        .iter()
        .filter(|b| b.alive)
        .count();
    assert_eq!(alive, 1);
}

// ---- Deployment and ground movement ----

#[test]
fn test_barrack_deploys_ground_group() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let barracks = find(&world, "Alpha Barracks");
    let bravo = find(&world, "Bravo");
    world.expect_structure_mut(barracks).unwrap().deployment_score = 59_999.0;

    deployment::run(&mut world, 1.0);

    let en_route = world.query_ids(QueryKey::GroundGroups(GroundGroupState::EnRoute), Coalition::Blue);
    assert_eq!(en_route.len(), 1);
    let group = en_route[0];
    {
        let gg = world.expect_ground_group(group).unwrap();
        assert_eq!(gg.target, bravo);
        assert_eq!(gg.group_type, GroundGroupType::Infantry);
    }
    assert_eq!(alive_units(&world, group), 4);
    assert_eq!(
        world.expect_objective(bravo).unwrap().incoming_ground_groups.get(&Coalition::Blue),
        Some(&group)
    );
    assert_eq!(world.expect_structure(barracks).unwrap().deployment_score, 0.0);

    // The incoming slot is taken, so a full camp waits.
    world.expect_structure_mut(barracks).unwrap().deployment_score = 60_000.0;
    deployment::run(&mut world, 1.0);
    assert_eq!(
        world.query(QueryKey::GroundGroups(GroundGroupState::EnRoute), Coalition::Blue).len(),
        1
    );

    ground::move_ground_group(&mut world, group, 60.0).unwrap();
    assert!(world.expect_ground_group(group).unwrap().position.x > 60_000.0);
    ground::move_ground_group(&mut world, group, 100_000.0).unwrap();
    let gg = world.expect_ground_group(group).unwrap();
    assert_eq!(gg.state, GroundGroupState::OnTarget);
    assert_eq!(gg.position, Position::new(105_000.0, 0.0));
}

// ---- Serialization ----

#[test]
fn test_serialize_load_round_trip() {
    let mut world = generated_world(SeededDice::new(Some(3)));
    cas_setup(&mut world);
    let state = serialization::serialize(&world);
    let json = serde_json::to_string(&state).unwrap();
    let parsed = serde_json::from_str(&json).unwrap();

    let mut loaded = serialization::load(parsed, CampaignConfig::default(), Box::new(SeededDice::new(Some(3)))).unwrap();
    let again = serialization::serialize(&loaded);
    assert_eq!(serde_json::to_value(&state).unwrap(), serde_json::to_value(&again).unwrap());

    for coalition in Coalition::PLAYABLE {
        assert_eq!(loaded.faction(coalition), world.faction(coalition));
        assert_eq!(
            loaded.query(QueryKey::FlightGroups(Task::Cas), coalition),
            world.query(QueryKey::FlightGroups(Task::Cas), coalition)
        );
    }

    let fresh = loaded.spawn(
        Coalition::Blue,
        vec![QueryKey::Airdromes],
        EntityData::Airdrome(sortie_core::components::Airdrome {
            name: "Senaki".into(),
            position: Position::new(0.0, 0.0),
        }),
    );
    assert!(!world.contains(fresh), "a restored world never hands out a live id");
}

#[test]
fn test_load_rejects_version() {
    let world = generated_world(ScriptedDice::always_miss());
    let mut state = serialization::serialize(&world);
    state.version = 99;
    let err = serialization::load(state, CampaignConfig::default(), Box::new(ScriptedDice::always_miss())).err();
    assert!(matches!(err, Some(CampaignError::UnsupportedVersion { found: 99, expected: 1 })));
}

#[test]
fn test_map_update_contents() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let (fg, _) = cas_setup(&mut world);

    let items = serialization::map_update(&world);
    let count = |f: fn(&MapItem) -> bool| items.values().filter(|i| f(*i)).count();
    assert_eq!(count(|i| matches!(i, MapItem::Airdrome { .. })), 2);
    assert_eq!(count(|i| matches!(i, MapItem::Structure { .. })), 4);
    assert_eq!(count(|i| matches!(i, MapItem::Sam { active: true, .. })), 2);
    assert_eq!(count(|i| matches!(i, MapItem::FlightGroup { .. })), 0, "grounded flight groups are hidden");

    flight::take_off(&mut world, fg).unwrap();
    let items = serialization::map_update(&world);
    assert!(matches!(items.get(&fg.to_string()), Some(MapItem::FlightGroup { task: Task::Cas, .. })));
}

#[test]
fn test_ui_state_and_briefing() {
    let mut world = generated_world(ScriptedDice::always_miss());
    let (fg, attacker) = cas_setup(&mut world);

    let ui = serialization::ui_state(&world, false);
    assert_eq!(ui.flight_groups.len(), 1);
    assert_eq!(ui.flight_groups[0].jtac_frequency, Some(241));
    assert_eq!(ui.flight_groups[0].time_table.len(), 3);
    assert!(!ui.has_clients);
    assert_eq!(ui.entities.len(), world.entity_count());

    let briefing = serialization::briefing(&world, fg).unwrap();
    assert_eq!(briefing.package.task, Task::Cas);
    assert_eq!(briefing.flight_group.flightplan.len(), 3);
    assert!(briefing.entities.contains_key(&attacker.to_string()));
    assert!(briefing.entities.contains_key(&find(&world, BLUE_AIRDROME).to_string()));
}

// ---- Engine ----

fn generate_command() -> WorkerMessage {
    WorkerMessage::Generate {
        blue_faction_definition: Box::new(blue_faction()),
        red_faction_definition: Box::new(red_faction()),
        scenario: Box::new(test_scenario()),
    }
}

fn seeded_engine(seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: Some(seed),
        ..Default::default()
    });
    engine.queue_command(generate_command());
    engine.tick();
    engine
}

#[test]
fn test_engine_generate_and_serialize() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(generate_command());
    let events = engine.tick();
    assert!(events.iter().any(|e| matches!(e, WorkerEvent::StateUpdate { .. })));
    assert!(!events.iter().any(|e| matches!(e, WorkerEvent::Tick { .. })), "new campaigns start paused");

    engine.queue_command(WorkerMessage::Serialize);
    let events = engine.tick();
    let state = events
        .iter()
        .find_map(|e| match e {
            WorkerEvent::Serialized { state } => Some(state),
            _ => None,
        })
        .expect("serialized event");
    assert_eq!(state.name, "Test Campaign");
    assert!(state.active);
}

#[test]
fn test_engine_rejects_commands_without_campaign() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_commands([WorkerMessage::Resume { multiplier: 1.0 }, WorkerMessage::GetMapUpdate]);
    let events = engine.tick();
    let errors: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            WorkerEvent::Error { message } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(errors, ["no active campaign", "no active campaign"]);
}

#[test]
fn test_engine_pause_stops_time() {
    let mut engine = seeded_engine(1);
    let start = engine.world().unwrap().time;

    assert!(!engine.is_running());
    engine.queue_command(WorkerMessage::Resume { multiplier: 1.0 });
    let events = engine.tick();
    assert!(engine.is_running());
    assert!(events.iter().any(|e| matches!(e, WorkerEvent::Tick { dt } if *dt == 0.25)));
    assert!((engine.world().unwrap().time - (start + 0.25)).abs() < 1e-9);

    engine.queue_command(WorkerMessage::Pause);
    let events = engine.tick();
    assert!(!engine.is_running());
    assert!(!events.iter().any(|e| matches!(e, WorkerEvent::TimeUpdate { .. })));
    assert!((engine.world().unwrap().time - (start + 0.25)).abs() < 1e-9);
}

#[test]
fn test_engine_skip_to_next_day() {
    let mut engine = seeded_engine(2);
    engine.queue_command(WorkerMessage::SkipToNextDay);
    let events = engine.tick();
    let world = engine.world().unwrap();
    assert!((world.time - (24.0 + 8.0) * 3_600.0).abs() < 1e-6);
    assert!(world.paused);
    assert!(events.iter().any(|e| matches!(e, WorkerEvent::StateUpdate { .. })));
}

#[test]
fn test_client_start_time_pauses_campaign() {
    let mut engine = seeded_engine(4);
    let world = engine.world().unwrap();
    let fg = flight::flight_groups_of(world, Coalition::Blue)
        .into_iter()
        .min_by(|a, b| {
            let a = world.expect_flight_group(*a).unwrap().start_time;
            let b = world.expect_flight_group(*b).unwrap().start_time;
            a.total_cmp(&b)
        })
        .expect("packages generated with the campaign");
    let start_time = world.expect_flight_group(fg).unwrap().start_time;

    engine.queue_commands([
        WorkerMessage::SetClient { flight_group_id: fg, count: 1 },
        WorkerMessage::Resume { multiplier: 400.0 },
    ]);
    let mut reached_event = false;
    for _ in 0..100 {
        let events = engine.tick();
        reached_event |= events.iter().any(|e| {
            matches!(e, WorkerEvent::StateUpdate { state } if state.start_time_reached && state.has_clients)
        });
        if engine.start_time_reached() {
            break;
        }
    }
    assert!(engine.start_time_reached());
    assert!(reached_event);
    let world = engine.world().unwrap();
    assert!(world.paused);
    assert!(world.time >= start_time && world.time < start_time + 1.0 + 1e-9);
}

#[test]
fn test_engine_determinism_same_seed() {
    let mut engine_a = seeded_engine(99);
    let mut engine_b = seeded_engine(99);
    for engine in [&mut engine_a, &mut engine_b] {
        engine.queue_command(WorkerMessage::Resume { multiplier: 60.0 });
    }
    for _ in 0..40 {
        engine_a.tick();
        engine_b.tick();
    }
    let json_a = serde_json::to_string(&serialization::serialize(engine_a.world().unwrap())).unwrap();
    let json_b = serde_json::to_string(&serialization::serialize(engine_b.world().unwrap())).unwrap();
    assert_eq!(json_a, json_b, "same seed diverged");
}

#[test]
fn test_engine_load_and_close() {
    let mut engine = seeded_engine(5);
    let state = serialization::serialize(engine.world().unwrap());
    engine.queue_commands([WorkerMessage::CloseCampaign, WorkerMessage::Load { state: Box::new(state) }]);
    let events = engine.tick();
    assert!(events.iter().any(|e| matches!(e, WorkerEvent::StateUpdate { .. })));
    assert!(engine.world().is_some());

    engine.queue_commands([WorkerMessage::CloseCampaign, WorkerMessage::Serialize]);
    let events = engine.tick();
    assert!(engine.world().is_none());
    assert!(events.iter().any(|e| matches!(e, WorkerEvent::Error { .. })));
}
