//! Campaign generation from a scenario and two faction definitions.
//!
//! Everything is validated before the world is touched, so a rejected
//! scenario leaves no partial campaign behind.

use log::info;

use sortie_core::components::*;
use sortie_core::constants::{BUILDINGS_PER_STRUCTURE, SAM_SITE_OFFSET, SAM_UNITS_PER_GROUP};
use sortie_core::definitions::{FactionDefinition, ObjectiveDefinition, Scenario};
use sortie_core::enums::*;
use sortie_core::error::{CampaignError, Result};
use sortie_core::state::Weather;
use sortie_core::time::{hours, SECONDS_PER_DAY};
use sortie_core::types::{find_nearest, EntityId, Position};

use crate::faction::Faction;
use crate::lifecycle::{spawn_ground_group, GroundGroupSpawn};
use crate::world::World;

/// Populate an empty world with a new campaign.
pub fn generate(world: &mut World, blue: FactionDefinition, red: FactionDefinition, scenario: &Scenario) -> Result<()> {
    blue.validate()?;
    red.validate()?;
    scenario.validate()?;
    if world.entity_count() > 0 {
        return Err(CampaignError::Invariant("campaign generated into a populated world".into()));
    }

    world.meta.id = scenario.id.clone();
    world.meta.name = scenario.name.clone();
    world.meta.theatre = scenario.theatre.clone();
    world.time = f64::from(scenario.start_day) * SECONDS_PER_DAY + hours(world.config.time.day_start_hour);
    world.blue = Some(Faction::new(blue, scenario.blue.airdrome_names.clone()));
    world.red = Some(Faction::new(red, scenario.red.airdrome_names.clone()));

    for coalition in Coalition::PLAYABLE {
        let Some(side) = scenario.coalition(coalition) else {
            continue;
        };
        for name in &side.airdrome_names {
            let definition = scenario
                .airdrome(name)
                .ok_or_else(|| CampaignError::AirdromeNotFound(name.clone()))?;
            world.spawn(
                coalition,
                vec![QueryKey::Airdromes],
                EntityData::Airdrome(Airdrome {
                    name: definition.name.clone(),
                    position: definition.position,
                }),
            );
        }
    }

    for definition in &scenario.objectives {
        let coalition = definition
            .coalition
            .unwrap_or_else(|| nearest_owner(world, definition.position));
        create_objective(world, coalition, definition)?;
    }

    for coalition in Coalition::PLAYABLE {
        create_inventory(world, coalition)?;
        create_sam_sites(world, coalition)?;
    }

    world.meta.weather = random_weather(world);
    info!(
        "campaign {} generated on {} with {} entities",
        scenario.name,
        scenario.theatre,
        world.entity_count()
    );
    Ok(())
}

/// The coalition whose airdrome is closest.
fn nearest_owner(world: &World, position: Position) -> Coalition {
    let airdromes = Coalition::PLAYABLE.into_iter().flat_map(|c| {
        world
            .query(QueryKey::Airdromes, c)
            .iter()
            .filter_map(move |id| world.airdrome(*id).map(|a| (c, a.position)))
    });
    find_nearest(airdromes, &position, |(_, p)| *p)
        .map(|(c, _)| c)
        .unwrap_or_default()
}

fn create_objective(world: &mut World, coalition: Coalition, definition: &ObjectiveDefinition) -> Result<EntityId> {
    let objective = world.spawn(
        coalition,
        vec![QueryKey::Objectives],
        EntityData::Objective(Objective {
            name: definition.name.clone(),
            position: definition.position,
            incoming_ground_groups: Default::default(),
        }),
    );

    for structure in &definition.structures {
        let buildings = (0..BUILDINGS_PER_STRUCTURE)
            .map(|i| Building {
                name: format!("{}|{}", structure.name, i + 1),
                alive: true,
                destroyed_time: None,
                offset: Position::new(20.0 * i as f64, 0.0),
            })
            .collect();
        let id = world.spawn(
            coalition,
            vec![QueryKey::Structures],
            EntityData::Structure(Structure {
                name: structure.name.clone(),
                objective,
                structure_type: structure.structure_type,
                buildings,
                deployment_score: 0.0,
                position: structure.position,
            }),
        );
        if let Some(faction) = world.faction_mut(coalition) {
            faction.structures.insert(structure.name.clone(), id);
        }
    }

    if let Some(vehicles) = world.faction_definition(coalition).map(|d| d.vehicles.clone()) {
        let count = world.config.deployment.units_per_group;
        spawn_ground_group(
            world,
            GroundGroupSpawn {
                coalition,
                name: format!("{} Defense", definition.name),
                group_type: GroundGroupType::Armor,
                unit_types: &vehicles,
                count,
                start: objective,
                target: objective,
                state: GroundGroupState::OnObjective,
                position: definition.position,
            },
        );
    }
    Ok(objective)
}

/// Aircraft per task type at every airdrome of the coalition.
fn create_inventory(world: &mut World, coalition: Coalition) -> Result<()> {
    let Some(definition) = world.faction_definition(coalition).cloned() else {
        return Ok(());
    };
    let airdromes = world.query_ids(QueryKey::Airdromes, coalition);
    let inventory = world.config.inventory.aircraft.clone();
    for airdrome in airdromes {
        let airdrome_name = world.expect_airdrome(airdrome)?.name.clone();
        for task in Task::ALL {
            let types = definition.aircraft_types_for(task);
            for (n, aircraft_type) in types.iter().cycle().take(*inventory.get(task) as usize).enumerate() {
                let a2a_weapons = definition
                    .a2a_weapons
                    .get(aircraft_type)
                    .map(|weapons| {
                        weapons
                            .iter()
                            .map(|w| A2AWeapon {
                                name: w.name.clone(),
                                range: w.range,
                                count: w.count,
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                world.spawn(
                    coalition,
                    vec![QueryKey::Aircraft],
                    EntityData::Aircraft(Aircraft {
                        aircraft_type: aircraft_type.clone(),
                        display_name: format!("{aircraft_type} {airdrome_name} {task} {}", n + 1),
                        home_base: airdrome,
                        flight_group: None,
                        alive: true,
                        destroyed_time: None,
                        a2a_weapons,
                        is_client: false,
                    }),
                );
            }
        }
    }
    Ok(())
}

/// One SAM group in front of each airdrome, facing the nearest enemy airdrome.
fn create_sam_sites(world: &mut World, coalition: Coalition) -> Result<()> {
    let sams = match world.faction_definition(coalition) {
        Some(definition) if !definition.sams.is_empty() => definition.sams.clone(),
        _ => return Ok(()),
    };
    for airdrome in world.query_ids(QueryKey::Airdromes, coalition) {
        let (name, home) = world
            .expect_airdrome(airdrome)
            .map(|site| (format!("{} SAM", site.name), site.position))?;
        let enemy = world
            .query(QueryKey::Airdromes, coalition.opposite())
            .iter()
            .filter_map(|id| world.airdrome(*id).map(|a| a.position));
        let position = match find_nearest(enemy, &home, |p| *p) {
            Some(enemy) => home.from_heading(home.heading_to(&enemy), SAM_SITE_OFFSET),
            None => home,
        };
        spawn_ground_group(
            world,
            GroundGroupSpawn {
                coalition,
                name,
                group_type: GroundGroupType::Sam,
                unit_types: &sams,
                count: SAM_UNITS_PER_GROUP,
                start: airdrome,
                target: airdrome,
                state: GroundGroupState::OnObjective,
                position,
            },
        );
    }
    Ok(())
}

fn random_weather(world: &mut World) -> Weather {
    Weather {
        temperature: f64::from(world.random_range(5, 30)),
        wind_direction: f64::from(world.random_range(0, 359)),
        wind_speed: f64::from(world.random_range(0, 12)),
        cloud_cover: world.random_range(0, 10),
    }
}
