//! Fixtures shared by the simulation tests.

use std::collections::BTreeMap;

use sortie_core::config::CampaignConfig;
use sortie_core::definitions::*;
use sortie_core::enums::*;
use sortie_core::types::{EntityId, Position};

use crate::dice::Dice;
use crate::lifecycle::{spawn_ground_group, GroundGroupSpawn};
use crate::scenario;
use crate::world::World;

pub const BLUE_AIRDROME: &str = "Kutaisi";
pub const RED_AIRDROME: &str = "Mozdok";

fn faction(name: &str, types: [&str; 5], cap_weapon: WeaponDefinition, sam: &str) -> FactionDefinition {
    let [cap, cas, awacs, dead, strike] = types;
    let aircraft_types = BTreeMap::from([
        (Task::Cap, vec![cap.to_string()]),
        (Task::Cas, vec![cas.to_string()]),
        (Task::Awacs, vec![awacs.to_string()]),
        (Task::Dead, vec![dead.to_string()]),
        (Task::Strike, vec![strike.to_string()]),
    ]);
    FactionDefinition {
        name: name.into(),
        country_name: name.into(),
        playable: true,
        aircraft_types,
        a2a_weapons: BTreeMap::from([(cap.to_string(), vec![cap_weapon])]),
        vehicles: vec!["Tank".into(), "APC".into()],
        sams: vec![sam.into()],
    }
}

pub fn blue_faction() -> FactionDefinition {
    faction(
        "USA",
        ["F-15C", "A-10C", "E-3A", "F-16C", "F/A-18C"],
        WeaponDefinition {
            name: "AIM-120C".into(),
            range: 50_000.0,
            count: 4,
        },
        "Hawk",
    )
}

pub fn red_faction() -> FactionDefinition {
    faction(
        "Russia",
        ["MiG-29S", "Su-25T", "A-50", "Su-24M", "Su-34"],
        WeaponDefinition {
            name: "R-77".into(),
            range: 40_000.0,
            count: 2,
        },
        "SA-11",
    )
}

fn structure(name: &str, structure_type: StructureType, position: Position) -> StructureDefinition {
    StructureDefinition {
        name: name.into(),
        structure_type,
        position,
    }
}

/// Two airdromes 200 km apart on the x axis with three objectives between them.
///
/// Alpha (60 km) is blue; Bravo (105 km) and Charlie (150 km) are red.
pub fn test_scenario() -> Scenario {
    Scenario {
        id: "test".into(),
        name: "Test Campaign".into(),
        theatre: "Caucasus".into(),
        start_day: 0,
        blue: ScenarioCoalition {
            airdrome_names: vec![BLUE_AIRDROME.into()],
        },
        red: ScenarioCoalition {
            airdrome_names: vec![RED_AIRDROME.into()],
        },
        airdromes: vec![
            AirdromeDefinition {
                name: BLUE_AIRDROME.into(),
                position: Position::new(0.0, 0.0),
            },
            AirdromeDefinition {
                name: RED_AIRDROME.into(),
                position: Position::new(200_000.0, 0.0),
            },
        ],
        objectives: vec![
            ObjectiveDefinition {
                name: "Alpha".into(),
                position: Position::new(60_000.0, 0.0),
                coalition: None,
                structures: vec![
                    structure("Alpha Barracks", StructureType::Barrack, Position::new(60_000.0, 1_000.0)),
                    structure("Alpha FARP", StructureType::Farp, Position::new(60_000.0, -1_000.0)),
                ],
            },
            ObjectiveDefinition {
                name: "Bravo".into(),
                position: Position::new(105_000.0, 0.0),
                coalition: None,
                structures: vec![structure("Bravo Depot", StructureType::Depot, Position::new(105_000.0, 1_000.0))],
            },
            ObjectiveDefinition {
                name: "Charlie".into(),
                position: Position::new(150_000.0, 0.0),
                coalition: None,
                structures: vec![structure("Charlie Ammo", StructureType::Ammo, Position::new(150_000.0, 1_000.0))],
            },
        ],
    }
}

pub fn empty_world(dice: impl Dice + 'static) -> World {
    World::new(CampaignConfig::default(), Box::new(dice))
}

/// A freshly generated campaign on [`test_scenario`].
pub fn generated_world(dice: impl Dice + 'static) -> World {
    let mut world = empty_world(dice);
    scenario::generate(&mut world, blue_faction(), red_faction(), &test_scenario())
        .expect("test scenario generates");
    world
}

/// First live entity with `name`.
pub fn find(world: &World, name: &str) -> EntityId {
    world
        .records()
        .into_iter()
        .find(|r| r.data.name() == Some(name))
        .map(|r| r.id)
        .unwrap_or_else(|| panic!("no entity named {name}"))
}

/// Place a ground group with `units` units of `coalition` at `target` in `state`.
pub fn ground_group_at(
    world: &mut World,
    coalition: Coalition,
    name: &str,
    target: EntityId,
    state: GroundGroupState,
    units: usize,
) -> EntityId {
    let position = world.position_of(target).expect("target has a position");
    let unit_types = vec!["Tank".to_string()];
    spawn_ground_group(
        world,
        GroundGroupSpawn {
            coalition,
            name: name.into(),
            group_type: GroundGroupType::Armor,
            unit_types: &unit_types,
            count: units,
            start: target,
            target,
            state,
            position,
        },
    )
}

pub fn alive_units(world: &World, group: EntityId) -> usize {
    world
        .expect_ground_group(group)
        .expect("ground group")
        .units
        .iter()
        .filter(|u| world.ground_unit(**u).is_some_and(|unit| unit.alive))
        .count()
}

pub fn kill_all_units(world: &mut World, group: EntityId) {
    let units = world.expect_ground_group(group).expect("ground group").units.clone();
    for unit in units {
        if let Some(unit) = world.ground_unit_mut(unit) {
            unit.alive = false;
        }
    }
}
