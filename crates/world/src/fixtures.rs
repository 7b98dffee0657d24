//! Test fixtures: property builders, node trees and OTB encoding

use crate::format::*;
use bytes::Bytes;
use otmap_core::{ItemsVersion, Position};
use otmap_items::{ItemType, ItemTypes};
use otmap_otb::{Node, NodeSource, TreeError};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

pub const GRASS: u16 = 4526;
pub const SAND: u16 = 231;
pub const BAG: u16 = 1987;
pub const BACKPACK: u16 = 1988;
pub const GOLD_COIN: u16 = 2148;
pub const WALL: u16 = 1026;
pub const DOOR: u16 = 1209;

/// Little-endian property byte builder
#[derive(Debug, Clone, Default)]
pub struct Props(Vec<u8>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.0.push(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.0.extend(value.to_le_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.0.extend(value.to_le_bytes());
        self
    }

    /// Latin-1 string with a u16 length prefix
    pub fn string(mut self, value: &str) -> Self {
        let raw: Vec<u8> = value.chars().map(|c| c as u32 as u8).collect();
        self.0.extend((raw.len() as u16).to_le_bytes());
        self.0.extend(raw);
        self
    }

    pub fn tile_offset(self, x: u8, y: u8) -> Self {
        self.u8(x).u8(y)
    }

    pub fn destination(self, position: Position) -> Self {
        self.u16(position.x).u16(position.y).u8(position.z)
    }

    pub fn u8_attr(self, tag: u8, value: u8) -> Self {
        self.u8(tag).u8(value)
    }

    pub fn u16_attr(self, tag: u8, value: u16) -> Self {
        self.u8(tag).u16(value)
    }

    pub fn u32_attr(self, tag: u8, value: u32) -> Self {
        self.u8(tag).u32(value)
    }

    pub fn string_attr(self, tag: u8, value: &str) -> Self {
        self.u8(tag).string(value)
    }

    pub fn destination_attr(self, tag: u8, position: Position) -> Self {
        self.u8(tag).destination(position)
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.0)
    }
}

impl From<Props> for Bytes {
    fn from(props: Props) -> Self {
        props.into_bytes()
    }
}

/// Item database used by the loader tests (version 3.57)
pub fn test_items() -> ItemTypes {
    ItemTypes::new(ItemsVersion::new(3, 57))
        .with(ItemType::ground(GRASS))
        .with(ItemType::ground(SAND))
        .with(ItemType::container(BAG))
        .with(ItemType::container(BACKPACK))
        .with(ItemType::stackable(GOLD_COIN))
        .with(ItemType::fixed(WALL))
        .with(ItemType::fixed(DOOR))
}

pub fn root(version: u32, width: u16, height: u16, map_data: Node) -> Node {
    let props = Props::new().u32(version).u16(width).u16(height).u32(3).u32(57);
    Node::new(NODE_ROOTV1, props).with_child(map_data)
}

pub fn map_data(props: Props) -> Node {
    Node::new(NODE_MAP_DATA, props)
}

pub fn tile_area(base: Position) -> Node {
    Node::new(NODE_TILE_AREA, Props::new().destination(base))
}

pub fn tile(dx: u8, dy: u8, attributes: Props) -> Node {
    let mut props = Props::new().tile_offset(dx, dy);
    props.0.extend(attributes.0);
    Node::new(NODE_TILE, props)
}

pub fn house_tile(dx: u8, dy: u8, house_id: u32, attributes: Props) -> Node {
    let mut props = Props::new().tile_offset(dx, dy).u32(house_id);
    props.0.extend(attributes.0);
    Node::new(NODE_HOUSETILE, props)
}

pub fn item(id: u16) -> Node {
    item_with(id, Props::new())
}

pub fn item_with(id: u16, attributes: Props) -> Node {
    let mut props = Props::new().u16(id);
    props.0.extend(attributes.0);
    Node::new(NODE_ITEM, props)
}

pub fn towns(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NODE_TOWNS, Bytes::new()).with_children(children)
}

pub fn town(id: u32, name: &str, temple: Position) -> Node {
    Node::new(
        NODE_TOWN,
        Props::new().u32(id).string(name).destination(temple),
    )
}

pub fn waypoints(children: impl IntoIterator<Item = Node>) -> Node {
    Node::new(NODE_WAYPOINTS, Bytes::new()).with_children(children)
}

pub fn waypoint(name: &str, position: Position) -> Node {
    Node::new(NODE_WAYPOINT, Props::new().string(name).destination(position))
}

/// Chain of `levels` containers below a top-level backpack, innermost
/// holding a stack of coins
pub fn nested_containers(levels: usize) -> Node {
    let mut innermost = item_with(GOLD_COIN, Props::new().u8_attr(ATTR_COUNT, 7));
    for level in 0..levels {
        let id = if level % 2 == 0 { BAG } else { BACKPACK };
        innermost = item_with(id, Props::new().u16_attr(ATTR_ACTION_ID, level as u16))
            .with_child(innermost);
    }
    item(BACKPACK).with_child(innermost)
}

/// Encode a tree as an OTB file with the given identifier
pub fn encode(root: &Node, identifier: [u8; 4]) -> Vec<u8> {
    fn write_node(node: &Node, out: &mut Vec<u8>) {
        out.push(0xFE);
        out.push(node.kind);
        for &byte in node.props.iter() {
            if matches!(byte, 0xFD | 0xFE | 0xFF) {
                out.push(0xFD);
            }
            out.push(byte);
        }
        for child in &node.children {
            write_node(child, out);
        }
        out.push(0xFF);
    }

    let mut out = identifier.to_vec();
    write_node(root, &mut out);
    out
}

/// Node source handing out a prepared tree and recording requested paths
pub struct StaticSource {
    tree: Node,
    pub requested: RefCell<Vec<PathBuf>>,
}

impl StaticSource {
    pub fn new(tree: Node) -> Self {
        Self {
            tree,
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl NodeSource for StaticSource {
    fn load_tree(&self, path: &Path) -> Result<Node, TreeError> {
        self.requested.borrow_mut().push(path.to_path_buf());
        Ok(self.tree.clone())
    }
}
