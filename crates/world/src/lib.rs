//! # otmap world
//!
//! Builds the in-memory game world from an OTBM map file.
//!
//! ## Features
//! - Typed decoding of node properties (root header, tiles, items, towns, waypoints)
//! - Sparse tile grid with nested container reconstruction
//! - Town, waypoint and house registries
//! - Monster/NPC spawn and house companion XML files
//! - All-or-nothing loading: a failed load never hands out a partial map
//!
//! ## Map Format
//!
//! An OTBM file is an OTB tree:
//! - **Root**: header with format version, map size and items.otb version
//! - **Map data**: description and companion file names
//! - **Tile areas**: base position plus tiles at small offsets, each tile
//!   holding items that may nest further items
//! - **Towns / waypoints**: named positions

pub mod attributes;
pub mod error;
pub mod format;
pub mod house;
pub mod iomap;
pub mod item;
pub mod loader;
pub mod manager;
pub mod map;
pub mod resources;
pub mod spawn;
pub mod tile;
pub mod tile_area;
pub mod town;
pub mod waypoint;

mod xml;

#[cfg(test)]
mod fixtures;

pub use attributes::{Attribute, AttributeReader, RootHeader};
pub use error::{Entity, ErrorContext, ErrorKind, MapError, Result};
pub use house::{House, Houses};
pub use iomap::IoMap;
pub use item::{DecayState, Item, ItemAttributes};
pub use loader::MapLoader;
pub use manager::{SharedMap, WorldManager};
pub use map::{Map, MapSummary};
pub use resources::{load_houses, load_monsters, load_npcs, ResourceKind};
pub use spawn::{SpawnArea, SpawnEntry, SpawnKind, Spawns};
pub use tile::{Tile, TileFlags};
pub use tile_area::TileAreaParser;
pub use town::{Town, Towns};
pub use waypoint::{Waypoint, Waypoints};
