//! In-memory item type registry

use crate::item_type::ItemType;
use crate::{ItemsError, Result};
use otmap_core::ItemsVersion;
use std::collections::HashMap;

/// Capability queries the map loader needs about item ids
pub trait ItemTypeOracle {
    /// Look up an item type; `None` for unknown or deprecated ids
    fn item_type(&self, id: u16) -> Option<ItemType>;

    /// Version of the item database
    fn version(&self) -> ItemsVersion;

    /// Whether the id is a ground substrate
    fn is_ground(&self, id: u16) -> bool {
        self.item_type(id).map(|t| t.is_ground()).unwrap_or(false)
    }

    /// Whether the id may own nested items
    fn is_container(&self, id: u16) -> bool {
        self.item_type(id).map(|t| t.is_container()).unwrap_or(false)
    }
}

/// Item type registry keyed by server id
#[derive(Debug, Clone, Default)]
pub struct ItemTypes {
    version: ItemsVersion,
    build: u32,
    types: HashMap<u16, ItemType>,
}

impl ItemTypes {
    /// Create an empty registry reporting the given version
    pub fn new(version: ItemsVersion) -> Self {
        Self {
            version,
            build: 0,
            types: HashMap::new(),
        }
    }

    /// Set the build number reported by items.otb
    pub fn set_build(&mut self, build: u32) {
        self.build = build;
    }

    /// Build number reported by items.otb
    pub fn build(&self) -> u32 {
        self.build
    }

    /// Register a type, rejecting duplicate ids
    pub fn insert(&mut self, item_type: ItemType) -> Result<()> {
        if self.types.contains_key(&item_type.id) {
            return Err(ItemsError::Duplicate(item_type.id));
        }
        self.types.insert(item_type.id, item_type);
        Ok(())
    }

    /// Builder-style registration (later entries replace earlier ones)
    pub fn with(mut self, item_type: ItemType) -> Self {
        self.types.insert(item_type.id, item_type);
        self
    }

    /// Get a type by id
    pub fn get(&self, id: u16) -> Option<&ItemType> {
        self.types.get(&id)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ItemTypeOracle for ItemTypes {
    fn item_type(&self, id: u16) -> Option<ItemType> {
        self.types.get(&id).copied().filter(|t| !t.is_deprecated())
    }

    fn version(&self) -> ItemsVersion {
        self.version
    }
}
