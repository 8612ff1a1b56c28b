//! Conversion between the live world and its serializable forms: the full
//! campaign snapshot, the UI state, map updates and flight briefings.

use std::collections::BTreeMap;

use log::info;

use sortie_core::components::{EntityData, FlightGroupTask};
use sortie_core::config::CampaignConfig;
use sortie_core::constants::{CAMPAIGN_VERSION, SAM_RANGE};
use sortie_core::enums::*;
use sortie_core::error::{CampaignError, Result};
use sortie_core::events::MapItem;
use sortie_core::state::*;
use sortie_core::types::EntityId;

use crate::dice::Dice;
use crate::faction::Faction;
use crate::lifecycle::has_alive_units;
use crate::systems::flight::{flight_groups_of, is_airborne};
use crate::world::{CampaignMeta, World};

/// Snapshot every entity and the campaign identity.
pub fn serialize(world: &World) -> WorkerState {
    WorkerState {
        id: world.meta.id.clone(),
        name: world.meta.name.clone(),
        time: world.time,
        entities: world.records(),
        active: true,
        version: CAMPAIGN_VERSION,
        faction_definitions: world.faction_definitions(),
        theatre: world.meta.theatre.clone(),
        campaign_params: world.meta.params.clone(),
        weather: world.meta.weather.clone(),
    }
}

/// Rebuild a world from a snapshot. Ids, query memberships and links are
/// kept as stored; factions are rebuilt from the entities.
pub fn load(state: WorkerState, config: CampaignConfig, dice: Box<dyn Dice>) -> Result<World> {
    if state.version != CAMPAIGN_VERSION {
        return Err(CampaignError::UnsupportedVersion {
            found: state.version,
            expected: CAMPAIGN_VERSION,
        });
    }
    let definitions = state.faction_definitions;
    let mut world = World::from_records(config, dice, state.entities)?;
    world.time = state.time;
    world.meta = CampaignMeta {
        id: state.id,
        name: state.name,
        theatre: state.theatre,
        params: state.campaign_params,
        weather: state.weather,
    };
    for coalition in Coalition::PLAYABLE {
        let definition = definitions
            .get(coalition)
            .cloned()
            .ok_or_else(|| CampaignError::InvalidFaction(format!("{coalition:?} faction definition missing")))?;
        let faction = rebuild_faction(&world, coalition, definition);
        match coalition {
            Coalition::Blue => world.blue = Some(faction),
            _ => world.red = Some(faction),
        }
    }
    info!(
        "campaign {} loaded with {} entities",
        world.meta.name,
        world.entity_count()
    );
    Ok(world)
}

fn rebuild_faction(world: &World, coalition: Coalition, definition: sortie_core::definitions::FactionDefinition) -> Faction {
    let airdrome_names = world
        .query(QueryKey::Airdromes, coalition)
        .iter()
        .filter_map(|id| world.airdrome(*id).map(|a| a.name.clone()))
        .collect();
    let mut faction = Faction::new(definition, airdrome_names);
    faction.structures = world
        .query(QueryKey::Structures, coalition)
        .iter()
        .filter_map(|id| world.structure(*id).map(|s| (s.name.clone(), *id)))
        .collect();
    faction
}

/// Player-facing view of a flight group.
pub fn flight_group_view(world: &World, id: EntityId) -> Option<FlightGroupView> {
    let fg = world.flight_group(id)?;
    let coalition = world.coalition_of(id)?;
    let aircraft = fg
        .aircraft
        .iter()
        .filter_map(|a| world.aircraft(*a).map(|aircraft| (*a, aircraft)))
        .map(|(a, aircraft)| AircraftView {
            id: a,
            aircraft_type: aircraft.aircraft_type.clone(),
            display_name: aircraft.display_name.clone(),
            home_base: aircraft.home_base,
            is_client: aircraft.is_client,
        })
        .collect();
    let jtac_frequency = match fg.task {
        FlightGroupTask::Cas { jtac_frequency, .. } => Some(jtac_frequency),
        _ => None,
    };
    Some(FlightGroupView {
        id,
        name: fg.name.clone(),
        task: fg.task.task(),
        coalition,
        package: fg.package,
        start_time: fg.start_time,
        position: fg.position,
        airborne: is_airborne(world, id),
        aircraft,
        flightplan: fg.flightplan.waypoints.clone(),
        time_table: fg.flightplan.time_table(fg.start_time),
        jtac_frequency,
    })
}

/// Whether any aircraft is flown by a player.
pub fn has_clients(world: &World) -> bool {
    world
        .query_all(QueryKey::Aircraft)
        .into_iter()
        .any(|id| world.aircraft(id).is_some_and(|a| a.is_client))
}

pub fn ui_state(world: &World, start_time_reached: bool) -> UiState {
    let flight_groups = flight_groups_of(world, Coalition::Blue)
        .into_iter()
        .filter_map(|id| flight_group_view(world, id))
        .collect();
    UiState {
        id: world.meta.id.clone(),
        name: world.meta.name.clone(),
        time: world.time,
        time_multiplier: world.time_multiplier,
        flight_groups,
        entities: world.records().into_iter().map(|r| (r.id.to_string(), r)).collect(),
        faction_definitions: world.faction_definitions(),
        theatre: world.meta.theatre.clone(),
        campaign_params: world.meta.params.clone(),
        start_time_reached,
        has_clients: has_clients(world),
        weather: world.meta.weather.clone(),
    }
}

/// Everything drawable: structures, airdromes, airborne flight groups,
/// ground groups and SAM sites.
pub fn map_update(world: &World) -> BTreeMap<String, MapItem> {
    let mut items = BTreeMap::new();
    for record in world.records() {
        let id = record.id;
        let coalition = record.coalition;
        let item = match &record.data {
            EntityData::Structure(s) => MapItem::Structure {
                id,
                name: s.name.clone(),
                coalition,
                position: s.position,
                structure_type: s.structure_type,
            },
            EntityData::Airdrome(a) => MapItem::Airdrome {
                id,
                name: a.name.clone(),
                coalition,
                position: a.position,
            },
            EntityData::FlightGroup(fg) if world.in_query(id, QueryKey::MapEntities) => MapItem::FlightGroup {
                id,
                name: fg.name.clone(),
                coalition,
                position: fg.position,
                task: fg.task.task(),
            },
            EntityData::GroundGroup(gg) if gg.group_type == GroundGroupType::Sam => MapItem::Sam {
                id,
                name: gg.name.clone(),
                coalition,
                position: gg.position,
                range: SAM_RANGE,
                active: has_alive_units(world, id),
            },
            EntityData::GroundGroup(gg) => MapItem::GroundGroup {
                id,
                name: gg.name.clone(),
                coalition,
                position: gg.position,
                ground_group_type: gg.group_type,
            },
            _ => continue,
        };
        items.insert(id.to_string(), item);
    }
    items
}

/// Briefing for one flight group: its package, route and the entities the
/// route refers to.
pub fn briefing(world: &World, flight_group: EntityId) -> Result<BriefingDocument> {
    let fg = world.expect_flight_group(flight_group)?;
    let package = (*world.expect_package(fg.package)?).clone();
    let view = flight_group_view(world, flight_group).ok_or(CampaignError::EntityNotFound(flight_group))?;

    let mut referenced = vec![fg.home_base];
    if let Some(target) = fg.task.target() {
        referenced.push(target);
        if let Some(structure) = world.structure(target) {
            referenced.push(structure.objective);
        }
    }
    let entities = referenced
        .into_iter()
        .filter_map(|id| world.record(id))
        .map(|r| (r.id.to_string(), r))
        .collect();

    Ok(BriefingDocument {
        package,
        flight_group: view,
        theatre: world.meta.theatre.clone(),
        entities,
    })
}
