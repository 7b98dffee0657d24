//! Map tiles and zone flags

use crate::format::*;
use crate::item::Item;
use otmap_core::{HouseId, Position};
use serde::Serialize;
use std::fmt;

/// Zone flags of a tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TileFlags(u8);

impl TileFlags {
    pub const NONE: TileFlags = TileFlags(0);
    pub const PROTECTION_ZONE: TileFlags = TileFlags(1 << 0);
    pub const NO_PVP_ZONE: TileFlags = TileFlags(1 << 1);
    pub const PVP_ZONE: TileFlags = TileFlags(1 << 2);
    pub const NO_LOGOUT: TileFlags = TileFlags(1 << 3);

    /// Translate the flag word stored in the file.
    ///
    /// A tile is in at most one of protection, no-PvP and PvP zone; the
    /// protection zone wins, then no-PvP. No-logout combines with any of them.
    pub fn from_otbm(raw: u32) -> Self {
        let mut flags = if raw & TILEFLAG_PROTECTIONZONE != 0 {
            Self::PROTECTION_ZONE
        } else if raw & TILEFLAG_NOPVPZONE != 0 {
            Self::NO_PVP_ZONE
        } else if raw & TILEFLAG_PVPZONE != 0 {
            Self::PVP_ZONE
        } else {
            Self::NONE
        };

        if raw & TILEFLAG_NOLOGOUT != 0 {
            flags = flags | Self::NO_LOGOUT;
        }
        flags
    }

    #[inline]
    pub fn contains(self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TileFlags {
    type Output = TileFlags;

    fn bitor(self, rhs: TileFlags) -> TileFlags {
        TileFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for TileFlags {
    fn bitor_assign(&mut self, rhs: TileFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for TileFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::PROTECTION_ZONE, "protection zone"),
            (Self::NO_PVP_ZONE, "no-pvp zone"),
            (Self::PVP_ZONE, "pvp zone"),
            (Self::NO_LOGOUT, "no logout"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&set.join(", "))
        }
    }
}

/// A single map tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub position: Position,

    /// Ground substrate, at most one
    pub ground: Option<Item>,

    /// Everything on top of the ground, bottom first
    pub items: Vec<Item>,

    pub flags: TileFlags,

    /// House owning this tile
    pub house_id: Option<HouseId>,
}

impl Tile {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            ground: None,
            items: Vec::new(),
            flags: TileFlags::NONE,
            house_id: None,
        }
    }

    /// A tile belonging to a house
    pub fn house(position: Position, house_id: HouseId) -> Self {
        Self {
            house_id: Some(house_id),
            ..Self::new(position)
        }
    }

    /// Place an item. A ground item replaces the current ground, anything
    /// else goes on top of the stack.
    pub fn add_item(&mut self, item: Item, is_ground: bool) {
        if is_ground {
            self.ground = Some(item);
        } else {
            self.items.push(item);
        }
    }

    /// Items on the tile, including the ground and nested contents
    pub fn item_count(&self) -> usize {
        self.ground.iter().chain(self.items.iter()).map(Item::total_items).sum()
    }
}
