//! In-memory world map
//!
//! A sparse grid of tiles plus the registries read alongside it. A `Map` is
//! built by [`MapLoader`](crate::MapLoader) and is read-only afterwards.

use crate::house::Houses;
use crate::spawn::Spawns;
use crate::tile::Tile;
use crate::town::Towns;
use crate::waypoint::Waypoints;
use otmap_core::{ItemsVersion, Position};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// World map
#[derive(Debug, Clone, Default)]
pub struct Map {
    /// Width in tiles (x < width)
    pub width: u16,

    /// Height in tiles (y < height)
    pub height: u16,

    /// OTBM format version of the file
    pub otbm_version: u32,

    /// items.otb version the map was saved with
    pub items_version: ItemsVersion,

    /// Free-form descriptions written by the editor
    pub descriptions: Vec<String>,

    /// Companion files; empty when the map names none
    pub monster_file: PathBuf,
    pub npc_file: PathBuf,
    pub house_file: PathBuf,

    pub towns: Towns,
    pub waypoints: Waypoints,
    pub houses: Houses,
    pub monsters: Spawns,
    pub npcs: Spawns,

    tiles: HashMap<Position, Tile>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a position lies inside the declared bounds
    #[inline]
    pub fn in_bounds(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height && position.has_valid_floor()
    }

    /// Insert a tile. A tile already at the same position is kept and the
    /// new one is handed back.
    pub fn insert_tile(&mut self, tile: Tile) -> Result<(), Tile> {
        if self.tiles.contains_key(&tile.position) {
            return Err(tile);
        }
        self.tiles.insert(tile.position, tile);
        Ok(())
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.tiles.get(&position)
    }

    pub fn has_tile(&self, position: Position) -> bool {
        self.tiles.contains_key(&position)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Items on all tiles, nested contents included
    pub fn item_count(&self) -> usize {
        self.tiles.values().map(Tile::item_count).sum()
    }

    /// Counts describing the loaded map
    pub fn summary(&self) -> MapSummary {
        MapSummary {
            width: self.width,
            height: self.height,
            otbm_version: self.otbm_version,
            items_version: self.items_version.to_string(),
            descriptions: self.descriptions.clone(),
            tiles: self.tile_count(),
            items: self.item_count(),
            towns: self.towns.len(),
            waypoints: self.waypoints.len(),
            houses: self.houses.len(),
            monster_spawns: self.monsters.entry_count(),
            npc_spawns: self.npcs.entry_count(),
        }
    }
}

/// Serializable overview of a map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    pub width: u16,
    pub height: u16,
    pub otbm_version: u32,
    pub items_version: String,
    pub descriptions: Vec<String>,
    pub tiles: usize,
    pub items: usize,
    pub towns: usize,
    pub waypoints: usize,
    pub houses: usize,
    pub monster_spawns: usize,
    pub npc_spawns: usize,
}
