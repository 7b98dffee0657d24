//! World startup
//!
//! Runs the load sequence driven by the configuration: item database, map,
//! then the companion files. The finished map is handed out behind a lock so
//! game systems can share it.

use crate::loader::MapLoader;
use crate::map::Map;
use crate::resources;
use otmap_config::WorldConfig;
use otmap_core::Result;
use otmap_items::{load_items_otb, ItemTypeOracle, ItemTypes};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Map shared with the rest of the server
pub type SharedMap = Arc<RwLock<Map>>;

/// World manager
pub struct WorldManager {
    config: WorldConfig,
}

impl WorldManager {
    pub fn from_config(config: WorldConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Load items.otb from the configured path
    pub fn load_items(&self) -> Result<ItemTypes> {
        Ok(load_items_otb(self.config.items_path())?)
    }

    /// Load items.otb, then the world
    pub fn load_world(&self) -> Result<SharedMap> {
        let items = self.load_items()?;
        self.load_world_with(&items)
    }

    /// Load the world against an already loaded item database.
    ///
    /// The map itself must load; companion files that fail are logged and
    /// skipped.
    pub fn load_world_with(&self, items: &dyn ItemTypeOracle) -> Result<SharedMap> {
        let start = Instant::now();
        let path = self.config.map_path();

        info!("Loading map {}", path.display());
        let mut map = MapLoader::new(items, &self.config).load(&path)?;

        if let Err(err) = resources::load_monsters(&mut map, &self.config) {
            warn!("Monster spawns not loaded: {}", err);
        }
        if let Err(err) = resources::load_npcs(&mut map, &self.config) {
            warn!("NPC spawns not loaded: {}", err);
        }
        if let Err(err) = resources::load_houses(&mut map, &self.config) {
            warn!("Houses not loaded: {}", err);
        }

        info!(
            "World ready: {} tiles, {} houses, {} monsters, {} npcs ({:.2?})",
            map.tile_count(),
            map.houses.len(),
            map.monsters.entry_count(),
            map.npcs.entry_count(),
            start.elapsed()
        );

        Ok(Arc::new(RwLock::new(map)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::format::*;
    use otmap_core::{HouseId, OtmapError, Position};
    use std::fs;
    use tempfile::TempDir;

    fn write_world(dir: &TempDir) -> WorldConfig {
        let world = dir.path().join("world");
        fs::create_dir_all(&world).unwrap();

        let data = map_data(
            Props::new()
                .string_attr(ATTR_EXT_SPAWN_MONSTER_FILE, "test-monster.xml")
                .string_attr(ATTR_EXT_HOUSE_FILE, "test-house.xml"),
        )
        .with_child(
            tile_area(Position::new(100, 100, 7))
                .with_child(tile(0, 0, Props::new().u16_attr(ATTR_ITEM, GRASS)))
                .with_child(house_tile(1, 0, 5, Props::new().u16_attr(ATTR_ITEM, GRASS))),
        );
        fs::write(world.join("test.otbm"), encode(&root(2, 512, 512, data), *b"OTBM")).unwrap();
        fs::write(
            world.join("test-monster.xml"),
            r#"<spawns><spawn centerx="100" centery="100" centerz="7" radius="1"><monster name="Rat" x="0" y="0" z="7" /></spawn></spawns>"#,
        )
        .unwrap();
        fs::write(
            world.join("test-house.xml"),
            r#"<houses><house name="Shack" houseid="5" entryx="101" entryy="101" entryz="7" rent="20" townid="1" size="1" /></houses>"#,
        )
        .unwrap();

        WorldConfig {
            map_name: "test".into(),
            data_dir: dir.path().to_path_buf(),
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_load_world_with_companions() {
        let dir = TempDir::new().unwrap();
        let manager = WorldManager::from_config(write_world(&dir));

        let shared = manager.load_world_with(&test_items()).unwrap();
        let map = shared.read();
        assert_eq!(map.tile_count(), 2);
        assert_eq!(map.monsters.entry_count(), 1);
        // NPC file is absent: logged, not fatal
        assert_eq!(map.npcs.entry_count(), 0);
        assert_eq!(map.houses.get(HouseId::new(5)).map(|h| h.name.as_str()), Some("Shack"));
    }

    #[test]
    fn test_missing_map_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = WorldConfig {
            data_dir: dir.path().to_path_buf(),
            ..WorldConfig::default()
        };
        let manager = WorldManager::from_config(config);

        assert!(matches!(manager.load_world_with(&test_items()), Err(OtmapError::Map(_))));
        // No items.otb either
        assert!(matches!(manager.load_world(), Err(OtmapError::Items(_))));
    }
}
