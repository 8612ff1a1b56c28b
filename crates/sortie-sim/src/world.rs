//! The campaign world: entity storage, query index and simulation clock.
//!
//! Every operation of the engine takes the world explicitly. Entities live
//! in a `hecs::World`, one component per payload kind; all links between
//! them are ids resolved here.

use std::collections::{BTreeSet, HashMap, HashSet};

use hecs::{ComponentError, DynamicBundle, Entity, QueryOneError, Ref};

use sortie_core::components::*;
use sortie_core::config::CampaignConfig;
use sortie_core::definitions::FactionDefinition;
use sortie_core::enums::{Coalition, QueryKey};
use sortie_core::error::{CampaignError, Result};
use sortie_core::state::{CampaignParams, FactionDefinitions, Weather};
use sortie_core::types::{EntityId, Position};

use crate::dice::Dice;
use crate::faction::Faction;

static EMPTY: BTreeSet<EntityId> = BTreeSet::new();

/// Pushed onto the outbound queue for the host boundary to drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A blue flight group was created or removed.
    FlightGroupsChanged,
}

/// Identity of a campaign session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignMeta {
    pub id: String,
    pub name: String,
    pub theatre: String,
    pub params: CampaignParams,
    pub weather: Weather,
}

/// Owning coalition and declared query sets, attached to every entity.
#[derive(Debug, Clone)]
struct Membership {
    coalition: Coalition,
    queries: Vec<QueryKey>,
}

fn handle(id: EntityId) -> Option<Entity> {
    Entity::from_bits((u64::from(id.generation) << 32) | u64::from(id.index))
}

fn entity_id(entity: Entity) -> EntityId {
    let bits = entity.to_bits().get();
    EntityId::new(bits as u32, (bits >> 32) as u32)
}

pub struct World {
    /// Seconds since the campaign epoch.
    pub time: f64,
    pub time_multiplier: f64,
    pub paused: bool,
    pub config: CampaignConfig,
    pub meta: CampaignMeta,
    pub blue: Option<Faction>,
    pub red: Option<Faction>,
    ecs: hecs::World,
    queries: HashMap<(QueryKey, Coalition), BTreeSet<EntityId>>,
    dice: Box<dyn Dice>,
    notifications: Vec<Notification>,
}

macro_rules! entity_components {
    ($($ty:ident, $get:ident, $get_mut:ident, $expect:ident, $expect_mut:ident;)*) => {
        $(
            pub fn $get(&self, id: EntityId) -> Option<Ref<'_, $ty>> {
                self.ecs.get::<&$ty>(handle(id)?).ok()
            }

            pub fn $get_mut(&mut self, id: EntityId) -> Option<&mut $ty> {
                self.ecs.query_one_mut::<&mut $ty>(handle(id)?).ok()
            }

            pub fn $expect(&self, id: EntityId) -> Result<Ref<'_, $ty>> {
                let entity = handle(id).ok_or(CampaignError::EntityNotFound(id))?;
                self.ecs.get::<&$ty>(entity).map_err(|e| match e {
                    ComponentError::NoSuchEntity => CampaignError::EntityNotFound(id),
                    ComponentError::MissingComponent(_) => CampaignError::WrongEntityKind {
                        id,
                        expected: stringify!($ty),
                    },
                })
            }

            pub fn $expect_mut(&mut self, id: EntityId) -> Result<&mut $ty> {
                let entity = handle(id).ok_or(CampaignError::EntityNotFound(id))?;
                self.ecs.query_one_mut::<&mut $ty>(entity).map_err(|e| match e {
                    QueryOneError::NoSuchEntity => CampaignError::EntityNotFound(id),
                    QueryOneError::Unsatisfied => CampaignError::WrongEntityKind {
                        id,
                        expected: stringify!($ty),
                    },
                })
            }
        )*

        /// Clone an entity's payload back into its tagged form.
        fn data_of(&self, entity: Entity) -> Option<EntityData> {
            $(
                if let Ok(data) = self.ecs.get::<&$ty>(entity) {
                    return Some(EntityData::$ty((*data).clone()));
                }
            )*
            None
        }

        /// Store a payload as its component, at `at` when restoring an id.
        fn insert(&mut self, at: Option<Entity>, membership: Membership, data: EntityData) -> Entity {
            match data {
                $(EntityData::$ty(data) => self.spawn_bundle(at, (membership, data)),)*
            }
        }
    };
}

impl World {
    pub fn new(config: CampaignConfig, dice: Box<dyn Dice>) -> Self {
        Self {
            time: 0.0,
            time_multiplier: 1.0,
            paused: true,
            config,
            meta: CampaignMeta::default(),
            blue: None,
            red: None,
            ecs: hecs::World::new(),
            queries: HashMap::new(),
            dice,
            notifications: Vec::new(),
        }
    }

    /// Rebuild a world from stored records, keeping their ids.
    pub(crate) fn from_records(
        config: CampaignConfig,
        dice: Box<dyn Dice>,
        records: Vec<EntityRecord>,
    ) -> Result<Self> {
        let mut slots = HashSet::new();
        let mut world = World::new(config, dice);
        for record in records {
            if !slots.insert(record.id.index) {
                return Err(CampaignError::Invariant("two entities share an id slot".into()));
            }
            let entity = handle(record.id)
                .ok_or_else(|| CampaignError::Invariant(format!("invalid entity id {}", record.id)))?;
            world.register(record.id, record.coalition, &record.queries);
            let membership = Membership {
                coalition: record.coalition,
                queries: record.queries,
            };
            world.insert(Some(entity), membership, record.data);
        }
        Ok(world)
    }

    fn spawn_bundle(&mut self, at: Option<Entity>, bundle: impl DynamicBundle) -> Entity {
        match at {
            Some(entity) => {
                self.ecs.spawn_at(entity, bundle);
                entity
            }
            None => self.ecs.spawn(bundle),
        }
    }

    fn register(&mut self, id: EntityId, coalition: Coalition, queries: &[QueryKey]) {
        for key in queries {
            self.queries.entry((*key, coalition)).or_default().insert(id);
        }
    }

    fn membership_mut(&mut self, id: EntityId) -> Result<&mut Membership> {
        let entity = handle(id).ok_or(CampaignError::EntityNotFound(id))?;
        self.ecs
            .query_one_mut::<&mut Membership>(entity)
            .map_err(|_| CampaignError::EntityNotFound(id))
    }

    // --- Registry ---

    /// Create an entity registered in every query of `queries`.
    pub fn spawn(&mut self, coalition: Coalition, queries: Vec<QueryKey>, data: EntityData) -> EntityId {
        let is_flight_group = matches!(data, EntityData::FlightGroup(_));
        let keys = queries.clone();
        let id = entity_id(self.insert(None, Membership { coalition, queries }, data));
        self.register(id, coalition, &keys);
        if is_flight_group && coalition == Coalition::Blue {
            self.notify(Notification::FlightGroupsChanged);
        }
        id
    }

    /// Remove an entity from every query and free its handle. Stale ids are ignored.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityRecord> {
        let record = self.record(id)?;
        let _ = self.ecs.despawn(handle(id)?);
        for key in &record.queries {
            if let Some(set) = self.queries.get_mut(&(*key, record.coalition)) {
                set.remove(&id);
            }
        }
        if matches!(record.data, EntityData::FlightGroup(_)) && record.coalition == Coalition::Blue {
            self.notify(Notification::FlightGroupsChanged);
        }
        Some(record)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        handle(id).is_some_and(|entity| self.ecs.contains(entity))
    }

    /// Owned copy of a live entity with its membership.
    pub fn record(&self, id: EntityId) -> Option<EntityRecord> {
        let entity = handle(id)?;
        let membership = self.ecs.get::<&Membership>(entity).ok()?;
        Some(EntityRecord {
            id,
            coalition: membership.coalition,
            queries: membership.queries.clone(),
            data: self.data_of(entity)?,
        })
    }

    pub fn coalition_of(&self, id: EntityId) -> Option<Coalition> {
        let membership = self.ecs.get::<&Membership>(handle(id)?).ok()?;
        Some(membership.coalition)
    }

    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        let entity = self.ecs.entity(handle(id)?).ok()?;
        entity
            .get::<&Airdrome>()
            .map(|d| d.position)
            .or_else(|| entity.get::<&Structure>().map(|d| d.position))
            .or_else(|| entity.get::<&Objective>().map(|d| d.position))
            .or_else(|| entity.get::<&GroundGroup>().map(|d| d.position))
            .or_else(|| entity.get::<&FlightGroup>().map(|d| d.position))
    }

    /// Live members of a query set.
    pub fn query(&self, key: QueryKey, coalition: Coalition) -> &BTreeSet<EntityId> {
        self.queries.get(&(key, coalition)).unwrap_or(&EMPTY)
    }

    /// Owned snapshot of a query set, safe to iterate while mutating the world.
    pub fn query_ids(&self, key: QueryKey, coalition: Coalition) -> Vec<EntityId> {
        self.query(key, coalition).iter().copied().collect()
    }

    /// Members of a query set across all coalitions, in id order.
    pub fn query_all(&self, key: QueryKey) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = [Coalition::Blue, Coalition::Red, Coalition::Neutrals]
            .into_iter()
            .flat_map(|c| self.query(key, c).iter().copied())
            .collect();
        ids.sort();
        ids
    }

    pub fn in_query(&self, id: EntityId, key: QueryKey) -> bool {
        self.coalition_of(id)
            .is_some_and(|coalition| self.query(key, coalition).contains(&id))
    }

    pub fn add_to_query(&mut self, id: EntityId, key: QueryKey) -> Result<()> {
        let membership = self.membership_mut(id)?;
        if membership.queries.contains(&key) {
            return Ok(());
        }
        membership.queries.push(key);
        let coalition = membership.coalition;
        self.queries.entry((key, coalition)).or_default().insert(id);
        Ok(())
    }

    pub fn remove_from_query(&mut self, id: EntityId, key: QueryKey) -> Result<()> {
        let membership = self.membership_mut(id)?;
        membership.queries.retain(|k| *k != key);
        let coalition = membership.coalition;
        if let Some(set) = self.queries.get_mut(&(key, coalition)) {
            set.remove(&id);
        }
        Ok(())
    }

    /// Move an entity to another coalition, re-partitioning its query memberships.
    pub fn set_coalition(&mut self, id: EntityId, coalition: Coalition) -> Result<()> {
        let membership = self.membership_mut(id)?;
        let previous = membership.coalition;
        if previous == coalition {
            return Ok(());
        }
        membership.coalition = coalition;
        let keys = membership.queries.clone();
        for key in keys {
            if let Some(set) = self.queries.get_mut(&(key, previous)) {
                set.remove(&id);
            }
            self.queries.entry((key, coalition)).or_default().insert(id);
        }
        Ok(())
    }

    /// Owned copies of all live entities, in id order.
    pub fn records(&self) -> Vec<EntityRecord> {
        let mut ids: Vec<EntityId> = self
            .ecs
            .query::<&Membership>()
            .iter()
            .map(|(entity, _)| entity_id(entity))
            .collect();
        ids.sort();
        ids.into_iter().filter_map(|id| self.record(id)).collect()
    }

    pub fn entity_count(&self) -> usize {
        self.ecs.len() as usize
    }

    entity_components! {
        Airdrome, airdrome, airdrome_mut, expect_airdrome, expect_airdrome_mut;
        Structure, structure, structure_mut, expect_structure, expect_structure_mut;
        Objective, objective, objective_mut, expect_objective, expect_objective_mut;
        GroundGroup, ground_group, ground_group_mut, expect_ground_group, expect_ground_group_mut;
        GroundUnit, ground_unit, ground_unit_mut, expect_ground_unit, expect_ground_unit_mut;
        Aircraft, aircraft, aircraft_mut, expect_aircraft, expect_aircraft_mut;
        Package, package, package_mut, expect_package, expect_package_mut;
        FlightGroup, flight_group, flight_group_mut, expect_flight_group, expect_flight_group_mut;
    }

    // --- Factions ---

    pub fn faction(&self, coalition: Coalition) -> Option<&Faction> {
        match coalition {
            Coalition::Blue => self.blue.as_ref(),
            Coalition::Red => self.red.as_ref(),
            Coalition::Neutrals => None,
        }
    }

    pub fn faction_mut(&mut self, coalition: Coalition) -> Option<&mut Faction> {
        match coalition {
            Coalition::Blue => self.blue.as_mut(),
            Coalition::Red => self.red.as_mut(),
            Coalition::Neutrals => None,
        }
    }

    pub fn faction_definition(&self, coalition: Coalition) -> Option<&FactionDefinition> {
        self.faction(coalition).map(|f| &f.definition)
    }

    pub fn faction_definitions(&self) -> FactionDefinitions {
        FactionDefinitions {
            blue: self.blue.as_ref().map(|f| f.definition.clone()),
            red: self.red.as_ref().map(|f| f.definition.clone()),
            neutrals: None,
        }
    }

    /// Resolve an airdrome by name among a coalition's airdromes.
    pub fn airdrome_by_name(&self, coalition: Coalition, name: &str) -> Option<EntityId> {
        self.query(QueryKey::Airdromes, coalition)
            .iter()
            .copied()
            .find(|id| self.airdrome(*id).is_some_and(|a| a.name == name))
    }

    // --- Randomness ---

    pub fn roll_percent(&mut self) -> u32 {
        self.dice.roll_percent()
    }

    pub fn random_range(&mut self, min: u32, max: u32) -> u32 {
        self.dice.range(min, max)
    }

    // --- Notifications ---

    pub fn notify(&mut self, notification: Notification) {
        if !self.notifications.contains(&notification) {
            self.notifications.push(notification);
        }
    }

    /// Drain the outbound queue.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // --- Time ---

    /// Advance simulated time by `dt` seconds and run every system once.
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
        crate::systems::run(self, dt);
    }
}
