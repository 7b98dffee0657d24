//! House registry
//!
//! Houses are created while the map's house tiles are read; the house XML
//! file then fills in names, entries and rents for the registered ids.
//!
//! ```xml
//! <houses>
//!   <house name="Market Street 1" houseid="1" entryx="32368" entryy="32227"
//!          entryz="7" rent="1000" townid="1" size="32" />
//! </houses>
//! ```

use crate::error::{MapError, Result};
use crate::xml;
use otmap_core::{HouseId, Position, TownId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// A house and the tiles it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct House {
    pub id: HouseId,
    pub name: String,
    /// Where players are placed when entering
    pub entry: Option<Position>,
    pub rent: u32,
    pub town_id: Option<TownId>,
    /// Size in tiles as declared by the house file
    pub size: u32,
    /// Tiles registered while reading the map
    pub tiles: Vec<Position>,
    /// Door ids and where they are
    pub doors: Vec<(u8, Position)>,
}

impl House {
    pub fn new(id: HouseId) -> Self {
        Self {
            id,
            name: String::new(),
            entry: None,
            rent: 0,
            town_id: None,
            size: 0,
            tiles: Vec::new(),
            doors: Vec::new(),
        }
    }
}

/// Houses keyed by id
#[derive(Debug, Clone, Default)]
pub struct Houses {
    houses: BTreeMap<HouseId, House>,
}

impl Houses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tile with its house, creating the house on first sight
    pub fn add_tile(&mut self, id: HouseId, position: Position) -> &mut House {
        let house = self.houses.entry(id).or_insert_with(|| House::new(id));
        house.tiles.push(position);
        house
    }

    /// Register a door of an already known house
    pub fn add_door(&mut self, id: HouseId, door_id: u8, position: Position) -> bool {
        match self.houses.get_mut(&id) {
            Some(house) => {
                house.doors.push((door_id, position));
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: HouseId) -> Option<&House> {
        self.houses.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &House> {
        self.houses.values()
    }

    pub fn len(&self) -> usize {
        self.houses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
    }

    /// Load house details from the companion XML file
    pub fn load_from_xml(&mut self, path: &Path) -> Result<()> {
        let source = xml::read_file(path)?;
        let updated = self.parse_xml(&source, path)?;
        info!("Loaded {} houses from {}", updated, path.display());
        Ok(())
    }

    /// Apply house XML content; every house must already be registered by the map
    pub fn parse_xml(&mut self, source: &str, path: &Path) -> Result<usize> {
        let document = xml::parse_document(source, "houses", path)?;
        let mut updated = 0;

        for node in document.root_element().children().filter(|n| n.is_element()) {
            if !node.has_tag_name("house") {
                debug!("Ignoring <{}> in {}", node.tag_name().name(), path.display());
                continue;
            }

            let Some(id) = xml::attr::<u32>(node, "houseid").map(HouseId::new) else {
                return Err(MapError::resource(
                    path,
                    format!("house without houseid on line {}", xml::line_of(node)),
                ));
            };

            let Some(house) = self.houses.get_mut(&id) else {
                return Err(MapError::resource(
                    path,
                    format!("unknown house id {} on line {}", id, xml::line_of(node)),
                ));
            };

            house.name = node.attribute("name").unwrap_or_default().to_string();

            let entry = (
                xml::attr::<u16>(node, "entryx"),
                xml::attr::<u16>(node, "entryy"),
                xml::attr::<u8>(node, "entryz"),
            );
            match entry {
                (Some(x), Some(y), Some(z)) if x != 0 || y != 0 => {
                    house.entry = Some(Position::new(x, y, z));
                }
                _ => {
                    warn!("House {} ({}) has no entry position", id, house.name);
                    house.entry = None;
                }
            }

            house.rent = xml::attr(node, "rent").unwrap_or(0);
            house.town_id = xml::attr::<u32>(node, "townid").map(TownId::new);
            house.size = xml::attr(node, "size").unwrap_or(0);
            updated += 1;
        }

        Ok(updated)
    }
}
