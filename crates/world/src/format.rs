//! OTBM node types, attribute tags and tile flag bits

// Node types
pub const NODE_ROOTV1: u8 = 1;
pub const NODE_MAP_DATA: u8 = 2;
pub const NODE_ITEM_DEF: u8 = 3;
pub const NODE_TILE_AREA: u8 = 4;
pub const NODE_TILE: u8 = 5;
pub const NODE_ITEM: u8 = 6;
pub const NODE_TILE_SQUARE: u8 = 7;
pub const NODE_TILE_REF: u8 = 8;
pub const NODE_SPAWNS: u8 = 9;
pub const NODE_SPAWN_AREA: u8 = 10;
pub const NODE_MONSTER: u8 = 11;
pub const NODE_TOWNS: u8 = 12;
pub const NODE_TOWN: u8 = 13;
pub const NODE_HOUSETILE: u8 = 14;
pub const NODE_WAYPOINTS: u8 = 15;
pub const NODE_WAYPOINT: u8 = 16;

// Attribute tags
pub const ATTR_DESCRIPTION: u8 = 1;
pub const ATTR_EXT_FILE: u8 = 2;
pub const ATTR_TILE_FLAGS: u8 = 3;
pub const ATTR_ACTION_ID: u8 = 4;
pub const ATTR_UNIQUE_ID: u8 = 5;
pub const ATTR_TEXT: u8 = 6;
pub const ATTR_DESC: u8 = 7;
pub const ATTR_TELE_DEST: u8 = 8;
pub const ATTR_ITEM: u8 = 9;
pub const ATTR_DEPOT_ID: u8 = 10;
pub const ATTR_EXT_SPAWN_MONSTER_FILE: u8 = 11;
pub const ATTR_RUNE_CHARGES: u8 = 12;
pub const ATTR_EXT_HOUSE_FILE: u8 = 13;
pub const ATTR_HOUSEDOORID: u8 = 14;
pub const ATTR_COUNT: u8 = 15;
pub const ATTR_DURATION: u8 = 16;
pub const ATTR_DECAYING_STATE: u8 = 17;
pub const ATTR_WRITTENDATE: u8 = 18;
pub const ATTR_WRITTENBY: u8 = 19;
pub const ATTR_SLEEPERGUID: u8 = 20;
pub const ATTR_SLEEPSTART: u8 = 21;
pub const ATTR_CHARGES: u8 = 22;
pub const ATTR_EXT_SPAWN_NPC_FILE: u8 = 23;

// Tile flag bits as stored in the file
pub const TILEFLAG_PROTECTIONZONE: u32 = 1 << 0;
pub const TILEFLAG_NOPVPZONE: u32 = 1 << 2;
pub const TILEFLAG_NOLOGOUT: u32 = 1 << 3;
pub const TILEFLAG_PVPZONE: u32 = 1 << 4;

/// Highest OTBM format version understood
pub const MAX_OTBM_VERSION: u32 = 2;

/// Oldest items.otb major version a map may reference
pub const MIN_ITEMS_MAJOR_VERSION: u32 = 3;

/// Oldest items.otb minor version a map may reference (client 8.10)
pub const MIN_ITEMS_MINOR_VERSION: u32 = 8;

/// Human readable node type, for error messages
pub fn node_name(kind: u8) -> &'static str {
    match kind {
        NODE_ROOTV1 => "root",
        NODE_MAP_DATA => "map data",
        NODE_ITEM_DEF => "item definition",
        NODE_TILE_AREA => "tile area",
        NODE_TILE => "tile",
        NODE_ITEM => "item",
        NODE_TILE_SQUARE => "tile square",
        NODE_TILE_REF => "tile reference",
        NODE_SPAWNS => "spawns",
        NODE_SPAWN_AREA => "spawn area",
        NODE_MONSTER => "monster",
        NODE_TOWNS => "towns",
        NODE_TOWN => "town",
        NODE_HOUSETILE => "house tile",
        NODE_WAYPOINTS => "waypoints",
        NODE_WAYPOINT => "waypoint",
        _ => "unknown",
    }
}
