//! # Item type registry
//!
//! Classifies item ids for the map loader: ground substrate, container,
//! stackable, moveable. The loader only sees the [`ItemTypeOracle`] trait;
//! [`ItemTypes`] is the in-memory registry, filled programmatically or from
//! an `items.otb` file.

mod error;
mod item_type;
mod loader;
mod registry;

pub use error::{ItemsError, Result};
pub use item_type::{ItemGroup, ItemType, FLAG_MOVEABLE, FLAG_PICKUPABLE, FLAG_STACKABLE};
pub use loader::{load_items_otb, parse_items_tree};
pub use registry::{ItemTypeOracle, ItemTypes};
