//! Tile area reconstruction
//!
//! A tile area node carries a base position; its children are tiles at a
//! small offset from that base. Tiles hold inline items (a bare id attribute)
//! and item nodes, and item nodes may nest further items when the item type
//! is a container.
//!
//! Nested items are rebuilt with an explicit stack so the depth of a file
//! never turns into call-stack depth; the configured container depth caps it.

use crate::attributes::{Attribute, AttributeReader};
use crate::error::{Entity, ErrorContext, MapError, Result};
use crate::format::*;
use crate::item::Item;
use crate::map::Map;
use crate::tile::{Tile, TileFlags};
use otmap_core::{HouseId, Position};
use otmap_items::{ItemType, ItemTypeOracle};
use otmap_otb::Node;
use std::slice;
use tracing::{debug, warn};

/// Item node being filled while its children are read
struct Frame<'n> {
    item: Item,
    item_type: ItemType,
    children: slice::Iter<'n, Node>,
}

/// Reads tile area nodes into a map
pub struct TileAreaParser<'a> {
    items: &'a dyn ItemTypeOracle,
    max_container_depth: usize,
}

impl<'a> TileAreaParser<'a> {
    pub fn new(items: &'a dyn ItemTypeOracle, max_container_depth: usize) -> Self {
        Self {
            items,
            max_container_depth,
        }
    }

    /// Read one tile area, returning the number of tiles added
    pub fn parse(&self, area: &Node, map: &mut Map) -> Result<usize> {
        let base = AttributeReader::new(area).read_destination("tile area base")?;

        for node in &area.children {
            self.parse_tile(node, base, map)?;
        }

        debug!("Tile area at {}: {} tiles", base, area.children.len());
        Ok(area.children.len())
    }

    fn parse_tile(&self, node: &Node, base: Position, map: &mut Map) -> Result<()> {
        if node.kind != NODE_TILE && node.kind != NODE_HOUSETILE {
            return Err(MapError::malformed_node(
                format!("expected tile node, found {} ({})", node_name(node.kind), node.kind),
                ErrorContext::node(node.offset),
            ));
        }

        let mut reader = AttributeReader::new(node);
        let (dx, dy) = reader.read_tile_offset()?;

        let position = match base.offset(dx, dy) {
            Some(position) if map.in_bounds(position) => position,
            // Reported widened, so a sum past u16 does not wrap
            _ => {
                return Err(MapError::OutOfRange {
                    x: base.x as u32 + dx as u32,
                    y: base.y as u32 + dy as u32,
                    z: base.z,
                    width: map.width,
                    height: map.height,
                    context: ErrorContext::node(node.offset),
                })
            }
        };

        if map.has_tile(position) {
            return Err(MapError::DuplicateEntity {
                entity: Entity::Tile,
                key: position.to_string(),
                context: ErrorContext::node(node.offset).with_position(position),
            });
        }

        let mut tile = if node.kind == NODE_HOUSETILE {
            let house_id = HouseId::new(reader.read_u32("house id").map_err(|e| e.at_position(position))?);
            map.houses.add_tile(house_id, position);
            Tile::house(position, house_id)
        } else {
            Tile::new(position)
        };

        self.parse_tile_contents(node, reader, &mut tile, map)
            .map_err(|e| e.at_position(position))?;

        map.insert_tile(tile).map_err(|tile| MapError::DuplicateEntity {
            entity: Entity::Tile,
            key: tile.position.to_string(),
            context: ErrorContext::node(node.offset).with_position(tile.position),
        })
    }

    fn parse_tile_contents(
        &self,
        node: &Node,
        mut reader: AttributeReader,
        tile: &mut Tile,
        map: &mut Map,
    ) -> Result<()> {
        let mut raw_flags = 0u32;

        loop {
            let context = reader.context();
            let Some(attribute) = reader.next_attribute()? else {
                break;
            };

            match attribute {
                Attribute::TileFlags(flags) => raw_flags |= flags,
                Attribute::Item(id) => {
                    let item_type = self.lookup(id, context)?;
                    let mut item = Item::new(id);
                    normalize_count(&mut item, &item_type);
                    self.place_item(tile, item, &item_type, map);
                }
                other => {
                    return Err(MapError::malformed_attribute(
                        format!("unexpected {} attribute on tile", other.name()),
                        context,
                    ));
                }
            }
        }

        tile.flags = TileFlags::from_otbm(raw_flags);

        for child in &node.children {
            let (item, item_type) = self.read_item(child)?;
            self.place_item(tile, item, &item_type, map);
        }

        Ok(())
    }

    /// Put a top-level item on the tile, applying the house tile rules
    fn place_item(&self, tile: &mut Tile, item: Item, item_type: &ItemType, map: &mut Map) {
        if let Some(house_id) = tile.house_id {
            if item_type.is_moveable() {
                warn!(
                    "Moveable item {} on house tile {} of house {} dropped",
                    item.id, tile.position, house_id
                );
                return;
            }
            if let Some(door_id) = item.attributes.house_door_id {
                map.houses.add_door(house_id, door_id, tile.position);
            }
        }

        tile.add_item(item, item_type.is_ground());
    }

    /// Rebuild an item node and everything nested in it
    fn read_item(&self, node: &Node) -> Result<(Item, ItemType)> {
        let mut current = self.open_item(node)?;
        let mut stack: Vec<Frame<'_>> = Vec::new();

        loop {
            if let Some(child) = current.children.next() {
                let depth = stack.len() + 1;
                if depth > self.max_container_depth {
                    return Err(MapError::NestingTooDeep {
                        limit: self.max_container_depth,
                        context: ErrorContext::node(child.offset),
                    });
                }
                let opened = self.open_item(child)?;
                stack.push(std::mem::replace(&mut current, opened));
                continue;
            }

            match stack.pop() {
                Some(parent) => {
                    let finished = std::mem::replace(&mut current, parent);
                    current.item.contents.push(finished.item);
                }
                None => return Ok((current.item, current.item_type)),
            }
        }
    }

    /// Decode one item node without its children
    fn open_item<'n>(&self, node: &'n Node) -> Result<Frame<'n>> {
        let context = ErrorContext::node(node.offset);
        if node.kind != NODE_ITEM {
            return Err(MapError::malformed_node(
                format!("expected item node, found {} ({})", node_name(node.kind), node.kind),
                context,
            ));
        }

        let mut reader = AttributeReader::new(node).until_zero_tag();
        let id = reader.read_u16("item id")?;
        let item_type = self.lookup(id, context)?;
        let mut item = Item::new(id);

        loop {
            let attribute_context = reader.context();
            let Some(attribute) = reader.next_attribute()? else {
                break;
            };
            item.apply_attribute(attribute).map_err(|rejected| {
                MapError::malformed_attribute(
                    format!("unexpected {} attribute on item {}", rejected.name(), id),
                    attribute_context,
                )
            })?;
        }
        normalize_count(&mut item, &item_type);

        if node.has_children() && !item_type.is_container() {
            return Err(MapError::malformed_node(
                format!(
                    "item {} is not a container but has {} nested items",
                    id,
                    node.children.len()
                ),
                context,
            ));
        }

        Ok(Frame {
            item,
            item_type,
            children: node.children.iter(),
        })
    }

    fn lookup(&self, id: u16, context: ErrorContext) -> Result<ItemType> {
        self.items
            .item_type(id)
            .ok_or_else(|| MapError::malformed_node(format!("unknown item id {}", id), context))
    }
}

/// Stackable items always carry a count of at least one
fn normalize_count(item: &mut Item, item_type: &ItemType) {
    if item_type.is_stackable() && matches!(item.attributes.count, None | Some(0)) {
        item.attributes.count = Some(1);
    }
}
