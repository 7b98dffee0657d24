//! Companion files of a map
//!
//! Spawns and houses live in XML files next to the map. The map names them
//! in its map data node; when it does not, the names are derived from the
//! configured map name. A failed companion never touches the tiles.

use crate::error::Result;
use crate::house::Houses;
use crate::map::Map;
use crate::spawn::{SpawnKind, Spawns};
use otmap_config::WorldConfig;
use std::fmt;
use std::path::PathBuf;

/// Kinds of companion files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Monsters,
    Npcs,
    Houses,
}

impl ResourceKind {
    /// Suffix appended to the map name for the default file name
    pub fn suffix(&self) -> &'static str {
        match self {
            ResourceKind::Monsters => "-monster.xml",
            ResourceKind::Npcs => "-npc.xml",
            ResourceKind::Houses => "-house.xml",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Monsters => "monsters",
            ResourceKind::Npcs => "npcs",
            ResourceKind::Houses => "houses",
        };
        f.write_str(name)
    }
}

/// Default file name, e.g. `forgotten-monster.xml`
pub fn default_resource_path(map_name: &str, kind: ResourceKind) -> PathBuf {
    PathBuf::from(format!("{}{}", map_name, kind.suffix()))
}

/// Path the map records for `kind`, filled with the default when empty
pub fn resolve_resource_path(map: &mut Map, kind: ResourceKind, config: &WorldConfig) -> PathBuf {
    let slot = match kind {
        ResourceKind::Monsters => &mut map.monster_file,
        ResourceKind::Npcs => &mut map.npc_file,
        ResourceKind::Houses => &mut map.house_file,
    };
    if slot.as_os_str().is_empty() {
        *slot = default_resource_path(&config.map_name, kind);
    }
    slot.clone()
}

/// Load the monster spawns
pub fn load_monsters(map: &mut Map, config: &WorldConfig) -> Result<()> {
    let path = resolve_resource_path(map, ResourceKind::Monsters, config);
    let mut spawns = Spawns::new();
    spawns.load_from_xml(&path, SpawnKind::Monster)?;
    map.monsters = spawns;
    Ok(())
}

/// Load the NPC spawns
pub fn load_npcs(map: &mut Map, config: &WorldConfig) -> Result<()> {
    let path = resolve_resource_path(map, ResourceKind::Npcs, config);
    let mut spawns = Spawns::new();
    spawns.load_from_xml(&path, SpawnKind::Npc)?;
    map.npcs = spawns;
    Ok(())
}

/// Load house details for the houses registered by the map
pub fn load_houses(map: &mut Map, config: &WorldConfig) -> Result<()> {
    let path = resolve_resource_path(map, ResourceKind::Houses, config);
    // Work on a copy so a broken file leaves the registry as the map built it
    let mut houses: Houses = map.houses.clone();
    houses.load_from_xml(&path)?;
    map.houses = houses;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, MapError};
    use crate::tile::Tile;
    use otmap_core::{HouseId, Position};

    fn config(map_name: &str) -> WorldConfig {
        WorldConfig {
            map_name: map_name.into(),
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_default_names() {
        let config = config("myworld");
        let mut map = Map::new();
        map.insert_tile(Tile::new(Position::new(1, 1, 7))).unwrap();

        let mut attempted = Vec::new();
        for result in [
            load_monsters(&mut map, &config),
            load_npcs(&mut map, &config),
            load_houses(&mut map, &config),
        ] {
            match result {
                Err(MapError::ResourceMissing { path, .. }) => attempted.push(path),
                other => panic!("expected a missing resource, got {:?}", other),
            }
        }

        assert_eq!(
            attempted,
            vec![
                PathBuf::from("myworld-monster.xml"),
                PathBuf::from("myworld-npc.xml"),
                PathBuf::from("myworld-house.xml"),
            ]
        );
        assert_eq!(map.monster_file, PathBuf::from("myworld-monster.xml"));
        assert_eq!(map.npc_file, PathBuf::from("myworld-npc.xml"));
        assert_eq!(map.house_file, PathBuf::from("myworld-house.xml"));
        // Tiles survive failed companions
        assert_eq!(map.tile_count(), 1);
    }

    #[test]
    fn test_recorded_path_is_kept() {
        let config = config("myworld");
        let mut map = Map::new();
        map.npc_file = PathBuf::from("data/world/custom-npc.xml");
        assert_eq!(
            resolve_resource_path(&mut map, ResourceKind::Npcs, &config),
            PathBuf::from("data/world/custom-npc.xml")
        );
        assert_eq!(
            default_resource_path("forgotten", ResourceKind::Houses),
            PathBuf::from("forgotten-house.xml")
        );
    }

    #[test]
    fn test_load_companions_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let monsters = dir.path().join("w-monster.xml");
        let houses = dir.path().join("w-house.xml");
        std::fs::write(
            &monsters,
            r#"<spawns><spawn centerx="50" centery="50" centerz="7" radius="2"><monster name="Rat" x="1" y="1" z="7" /></spawn></spawns>"#,
        )
        .unwrap();
        std::fs::write(
            &houses,
            r#"<houses><house name="Hut" houseid="3" entryx="50" entryy="51" entryz="7" rent="10" townid="1" size="2" /></houses>"#,
        )
        .unwrap();

        let config = config("w");
        let mut map = Map::new();
        map.monster_file = monsters;
        map.house_file = houses.clone();
        map.houses.add_tile(HouseId::new(3), Position::new(50, 52, 7));

        load_monsters(&mut map, &config).unwrap();
        assert_eq!(map.monsters.entry_count(), 1);
        assert_eq!(map.monsters.areas()[0].entries[0].position, Position::new(51, 51, 7));

        load_houses(&mut map, &config).unwrap();
        assert_eq!(map.houses.get(HouseId::new(3)).map(|h| h.name.as_str()), Some("Hut"));

        // Unknown id leaves the registry untouched
        std::fs::write(&houses, r#"<houses><house name="Other" houseid="9" /></houses>"#).unwrap();
        let err = load_houses(&mut map, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceMissing);
        assert_eq!(map.houses.get(HouseId::new(3)).map(|h| h.name.as_str()), Some("Hut"));
    }
}
