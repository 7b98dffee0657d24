//! Monster and NPC spawns
//!
//! Spawn files list areas around a center; entry coordinates are relative to
//! the center and share its floor.
//!
//! ```xml
//! <spawns>
//!   <spawn centerx="100" centery="100" centerz="7" radius="3">
//!     <monster name="Rat" x="-1" y="2" z="7" spawntime="60" />
//!   </spawn>
//! </spawns>
//! ```

use crate::error::{MapError, Result};
use crate::xml;
use otmap_core::Position;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Respawn interval used when an entry does not name one
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(60);

/// What a spawn file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Monster,
    Npc,
}

impl SpawnKind {
    /// Element name of one entry
    pub fn tag(&self) -> &'static str {
        match self {
            SpawnKind::Monster => "monster",
            SpawnKind::Npc => "npc",
        }
    }
}

/// One creature placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnEntry {
    pub name: String,
    pub position: Position,
    pub interval: Duration,
}

/// A spawn area and its creatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnArea {
    pub center: Position,
    pub radius: i32,
    pub entries: Vec<SpawnEntry>,
}

/// All spawn areas of one kind
#[derive(Debug, Clone, Default)]
pub struct Spawns {
    areas: Vec<SpawnArea>,
}

impl Spawns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn areas(&self) -> &[SpawnArea] {
        &self.areas
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Number of creatures over all areas
    pub fn entry_count(&self) -> usize {
        self.areas.iter().map(|area| area.entries.len()).sum()
    }

    /// Load a spawn file, appending its areas
    pub fn load_from_xml(&mut self, path: &Path, kind: SpawnKind) -> Result<()> {
        let source = xml::read_file(path)?;
        let added = self.parse_xml(&source, path, kind)?;
        info!(
            "Loaded {} {} spawn areas from {}",
            added,
            kind.tag(),
            path.display()
        );
        Ok(())
    }

    /// Parse spawn XML content, returning how many areas were added
    pub fn parse_xml(&mut self, source: &str, path: &Path, kind: SpawnKind) -> Result<usize> {
        let document = xml::parse_document(source, "spawns", path)?;
        let mut added = 0;

        for node in document.root_element().children().filter(|n| n.is_element()) {
            if !node.has_tag_name("spawn") {
                debug!("Ignoring <{}> in {}", node.tag_name().name(), path.display());
                continue;
            }

            let center = match (
                xml::attr::<u16>(node, "centerx"),
                xml::attr::<u16>(node, "centery"),
                xml::attr::<u8>(node, "centerz"),
            ) {
                (Some(x), Some(y), Some(z)) => Position::new(x, y, z),
                _ => {
                    warn!(
                        "Spawn without a valid center on line {} of {}",
                        xml::line_of(node),
                        path.display()
                    );
                    continue;
                }
            };

            let Some(radius) = xml::attr::<i32>(node, "radius").filter(|r| *r >= 0) else {
                warn!("Spawn at {} has no valid radius", center);
                continue;
            };

            let mut area = SpawnArea {
                center,
                radius,
                entries: Vec::new(),
            };

            for child in node.children().filter(|n| n.is_element()) {
                if !child.has_tag_name(kind.tag()) {
                    debug!(
                        "Ignoring <{}> in {} spawn file",
                        child.tag_name().name(),
                        kind.tag()
                    );
                    continue;
                }

                let name = child.attribute("name").unwrap_or_default().trim();
                if name.is_empty() {
                    warn!("Unnamed {} in spawn at {}", kind.tag(), center);
                    continue;
                }

                let dx = xml::attr::<i32>(child, "x").unwrap_or(0);
                let dy = xml::attr::<i32>(child, "y").unwrap_or(0);
                let Some(position) = center.translate(dx, dy, 0) else {
                    warn!("{} '{}' of spawn at {} is outside the map", kind.tag(), name, center);
                    continue;
                };

                let interval = xml::attr::<u64>(child, "spawntime")
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_SPAWN_INTERVAL);

                area.entries.push(SpawnEntry {
                    name: name.to_string(),
                    position,
                    interval,
                });
            }

            self.areas.push(area);
            added += 1;
        }

        if added == 0 && document.root_element().children().any(|n| n.has_tag_name("spawn")) {
            return Err(MapError::resource(path, "no usable spawn areas"));
        }

        Ok(added)
    }
}
