//! Town registry

use otmap_core::{Position, TownId};
use serde::Serialize;
use std::collections::BTreeMap;

/// A town and its temple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Town {
    pub id: TownId,
    pub name: String,
    /// Where players of this town respawn
    pub temple: Position,
}

/// Towns keyed by id
#[derive(Debug, Clone, Default)]
pub struct Towns {
    towns: BTreeMap<TownId, Town>,
}

impl Towns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a town. Returns false (and keeps the existing entry) when the
    /// id is already taken.
    pub fn add(&mut self, town: Town) -> bool {
        if self.towns.contains_key(&town.id) {
            return false;
        }
        self.towns.insert(town.id, town);
        true
    }

    pub fn get(&self, id: TownId) -> Option<&Town> {
        self.towns.get(&id)
    }

    /// Case-insensitive lookup by name
    pub fn find_by_name(&self, name: &str) -> Option<&Town> {
        self.towns
            .values()
            .find(|town| town.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Town> {
        self.towns.values()
    }

    pub fn len(&self) -> usize {
        self.towns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
    }
}
