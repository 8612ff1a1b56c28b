//! Per-coalition faction state.
//!
//! A faction only keeps what the query index cannot answer: its definition,
//! its ordered airdrome names and its structures by name. Aircraft, ground
//! units, ground groups and packages are coalition partitions of the
//! world's query sets.

use std::collections::BTreeMap;

use sortie_core::definitions::FactionDefinition;
use sortie_core::types::EntityId;

#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    pub definition: FactionDefinition,
    pub airdrome_names: Vec<String>,
    pub structures: BTreeMap<String, EntityId>,
}

impl Faction {
    pub fn new(definition: FactionDefinition, airdrome_names: Vec<String>) -> Self {
        Self {
            definition,
            airdrome_names,
            structures: BTreeMap::new(),
        }
    }
}
