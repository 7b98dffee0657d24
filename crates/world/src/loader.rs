//! OTBM map loader
//!
//! Walks the node tree top-down: the root header, the single map data node
//! and its tile areas, towns and waypoints. The map is built as a local value
//! and only handed back when the whole tree was read without error.

use crate::attributes::{Attribute, AttributeReader, RootHeader};
use crate::error::{Entity, ErrorContext, MapError, Result};
use crate::format::*;
use crate::map::Map;
use crate::tile_area::TileAreaParser;
use crate::town::Town;
use crate::waypoint::Waypoint;
use otmap_config::{DuplicatePolicy, WorldConfig, MAX_CONTAINER_DEPTH};
use otmap_core::{ItemsVersion, TownId};
use otmap_items::ItemTypeOracle;
use otmap_otb::{Identifier, Node, NodeSource, OtbReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tree levels above the first item: root, map data, tile area, tile
const LEVELS_ABOVE_ITEMS: usize = 4;

/// Map loader
pub struct MapLoader<'a> {
    items: &'a dyn ItemTypeOracle,
    config: &'a WorldConfig,
    source: Option<&'a dyn NodeSource>,
}

impl<'a> MapLoader<'a> {
    pub fn new(items: &'a dyn ItemTypeOracle, config: &'a WorldConfig) -> Self {
        Self {
            items,
            config,
            source: None,
        }
    }

    /// Read trees through another node source instead of the OTB reader
    pub fn with_source(mut self, source: &'a dyn NodeSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Container limit in effect; values set past the ceiling are capped
    fn container_depth(&self) -> usize {
        self.config.max_container_depth.min(MAX_CONTAINER_DEPTH)
    }

    /// OTB reader allowing one level more than the container limit, so
    /// over-deep items reach the loader and are reported as nesting errors
    fn reader(&self) -> OtbReader {
        let max_depth = LEVELS_ABOVE_ITEMS
            .saturating_add(self.container_depth())
            .saturating_add(2);
        OtbReader::new(Identifier::OTBM).with_max_depth(max_depth)
    }

    /// Load a map file
    pub fn load(&self, path: &Path) -> Result<Map> {
        let start = Instant::now();

        let root = match self.source {
            Some(source) => source.load_tree(path)?,
            None => self.reader().load_tree(path)?,
        };

        let map_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let map = self.load_from_tree(&root, map_dir)?;

        info!(
            "Loaded map {} ({}x{}, {} tiles, {} towns, {} waypoints) in {:.2?}",
            path.display(),
            map.width,
            map.height,
            map.tile_count(),
            map.towns.len(),
            map.waypoints.len(),
            start.elapsed()
        );
        Ok(map)
    }

    /// Interpret a decoded tree. Companion file names found in the map are
    /// resolved against `map_dir`.
    pub fn load_from_tree(&self, root: &Node, map_dir: &Path) -> Result<Map> {
        if root.kind != NODE_ROOTV1 {
            return Err(MapError::InvalidRoot {
                found: root.kind,
                expected: NODE_ROOTV1,
            });
        }

        let header = AttributeReader::new(root).read_root_header()?;
        self.check_versions(&header)?;

        let mut map = Map::new();
        map.otbm_version = header.version;
        map.width = header.width;
        map.height = header.height;
        map.items_version = ItemsVersion::new(header.items_major, header.items_minor);

        let map_data = match root.children.as_slice() {
            [node] if node.kind == NODE_MAP_DATA => node,
            [node] => {
                return Err(MapError::malformed_node(
                    format!("expected map data node, found {} ({})", node_name(node.kind), node.kind),
                    ErrorContext::node(node.offset),
                ));
            }
            nodes => {
                return Err(MapError::malformed_node(
                    format!("root must hold exactly one map data node, found {} children", nodes.len()),
                    ErrorContext::node(root.offset),
                ));
            }
        };

        self.parse_map_data(map_data, map_dir, &mut map)?;

        let tiles = TileAreaParser::new(self.items, self.container_depth());
        for node in &map_data.children {
            match node.kind {
                NODE_TILE_AREA => {
                    tiles.parse(node, &mut map)?;
                }
                NODE_TOWNS => self.parse_towns(node, &mut map)?,
                NODE_WAYPOINTS if map.otbm_version > 1 => self.parse_waypoints(node, &mut map)?,
                kind => {
                    return Err(MapError::malformed_node(
                        format!("unexpected {} node ({}) in map data", node_name(kind), kind),
                        ErrorContext::node(node.offset),
                    ));
                }
            }
        }

        Ok(map)
    }

    fn check_versions(&self, header: &RootHeader) -> Result<()> {
        if header.version == 0 {
            return Err(MapError::VersionMismatch(
                "this map needs to be upgraded with a newer map editor".into(),
            ));
        }
        if header.version > MAX_OTBM_VERSION {
            return Err(MapError::VersionMismatch(format!(
                "unknown OTBM version {}",
                header.version
            )));
        }

        let supported = self.items.version();
        if header.items_major < MIN_ITEMS_MAJOR_VERSION {
            return Err(MapError::VersionMismatch(format!(
                "items major version {} is too old, at least {} is required",
                header.items_major, MIN_ITEMS_MAJOR_VERSION
            )));
        }
        if header.items_major > supported.major {
            return Err(MapError::VersionMismatch(format!(
                "map was saved with items major version {}, items.otb is {}",
                header.items_major, supported
            )));
        }
        if header.items_minor < MIN_ITEMS_MINOR_VERSION {
            return Err(MapError::VersionMismatch(format!(
                "items minor version {} is too old, at least {} is required",
                header.items_minor, MIN_ITEMS_MINOR_VERSION
            )));
        }
        if header.items_minor > supported.minor {
            if self.config.strict_items_version {
                return Err(MapError::VersionMismatch(format!(
                    "map needs items.otb {}.{}, loaded {}",
                    header.items_major, header.items_minor, supported
                )));
            }
            warn!(
                "Map needs an updated items.otb ({}.{}, loaded {})",
                header.items_major, header.items_minor, supported
            );
        }

        debug!(
            "OTBM version {}, {}x{}, items {}.{}",
            header.version, header.width, header.height, header.items_major, header.items_minor
        );
        Ok(())
    }

    fn parse_map_data(&self, node: &Node, map_dir: &Path, map: &mut Map) -> Result<()> {
        let mut reader = AttributeReader::new(node);
        loop {
            let context = reader.context();
            let Some(attribute) = reader.next_attribute()? else {
                break;
            };

            match attribute {
                Attribute::Description(text) => map.descriptions.push(text),
                Attribute::SpawnMonsterFile(file) => map.monster_file = companion_path(map_dir, &file),
                Attribute::SpawnNpcFile(file) => map.npc_file = companion_path(map_dir, &file),
                Attribute::HouseFile(file) => map.house_file = companion_path(map_dir, &file),
                other => {
                    return Err(MapError::malformed_attribute(
                        format!("unexpected {} attribute in map data", other.name()),
                        context,
                    ));
                }
            }
        }
        Ok(())
    }

    fn parse_towns(&self, node: &Node, map: &mut Map) -> Result<()> {
        for child in &node.children {
            let context = ErrorContext::node(child.offset);
            if child.kind != NODE_TOWN {
                return Err(MapError::malformed_node(
                    format!("expected town node, found {} ({})", node_name(child.kind), child.kind),
                    context,
                ));
            }

            let mut reader = AttributeReader::new(child);
            let id = TownId::new(reader.read_u32("town id")?);
            let name = reader.read_string("town name")?;
            let temple = reader.read_destination("temple position")?;

            if !map.towns.add(Town { id, name, temple }) {
                return Err(MapError::DuplicateEntity {
                    entity: Entity::Town,
                    key: id.to_string(),
                    context,
                });
            }
        }

        debug!("Read {} towns", map.towns.len());
        Ok(())
    }

    fn parse_waypoints(&self, node: &Node, map: &mut Map) -> Result<()> {
        for child in &node.children {
            let context = ErrorContext::node(child.offset);
            if child.kind != NODE_WAYPOINT {
                return Err(MapError::malformed_node(
                    format!("expected waypoint node, found {} ({})", node_name(child.kind), child.kind),
                    context,
                ));
            }

            let mut reader = AttributeReader::new(child);
            let name = reader.read_string("waypoint name")?;
            let position = reader.read_destination("waypoint position")?;

            if map.waypoints.contains(&name) {
                match self.config.waypoint_duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(MapError::DuplicateEntity {
                            entity: Entity::Waypoint,
                            key: name,
                            context,
                        });
                    }
                    DuplicatePolicy::Overwrite => {
                        warn!("Waypoint '{}' defined twice, keeping {}", name, position);
                    }
                }
            }
            map.waypoints.insert(Waypoint { name, position });
        }

        debug!("Read {} waypoints", map.waypoints.len());
        Ok(())
    }
}

/// Companion file named by the map, relative to the map's directory
fn companion_path(map_dir: &Path, file: &str) -> PathBuf {
    if file.is_empty() {
        PathBuf::new()
    } else {
        map_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures::*;
    use crate::tile::TileFlags;
    use otmap_core::Position;
    use otmap_items::ItemTypes;

    fn load(items: &ItemTypes, config: &WorldConfig, tree: &Node) -> Result<Map> {
        MapLoader::new(items, config).load_from_tree(tree, Path::new("data/world"))
    }

    fn small_world() -> Node {
        let data = map_data(
            Props::new()
                .string_attr(ATTR_DESCRIPTION, "Saved with Remere's Map Editor 3.5")
                .string_attr(ATTR_DESCRIPTION, "No spawns yet")
                .string_attr(ATTR_EXT_SPAWN_MONSTER_FILE, "small-monster.xml")
                .string_attr(ATTR_EXT_HOUSE_FILE, "small-house.xml"),
        )
        .with_child(
            tile_area(Position::new(256, 256, 7))
                .with_child(tile(0, 0, Props::new().u16_attr(ATTR_ITEM, GRASS)))
                .with_child(tile(1, 0, Props::new().u32_attr(ATTR_TILE_FLAGS, TILEFLAG_PROTECTIONZONE))),
        )
        .with_child(towns([
            town(1, "Thais", Position::new(256, 256, 7)),
            town(2, "Carlin", Position::new(257, 256, 7)),
        ]))
        .with_child(waypoints([waypoint("temple", Position::new(256, 256, 7))]));

        root(2, 1024, 1024, data)
    }

    #[test]
    fn test_load_small_world() {
        let items = test_items();
        let config = WorldConfig::default();
        let map = load(&items, &config, &small_world()).unwrap();

        assert_eq!(map.otbm_version, 2);
        assert_eq!((map.width, map.height), (1024, 1024));
        assert_eq!(map.items_version, ItemsVersion::new(3, 57));
        assert_eq!(map.descriptions.len(), 2);
        assert_eq!(map.monster_file, PathBuf::from("data/world/small-monster.xml"));
        assert_eq!(map.house_file, PathBuf::from("data/world/small-house.xml"));
        assert!(map.npc_file.as_os_str().is_empty());

        assert_eq!(map.tile_count(), 2);
        let ground = map.tile(Position::new(256, 256, 7)).and_then(|t| t.ground.as_ref());
        assert_eq!(ground.map(|g| g.id), Some(GRASS));
        assert_eq!(
            map.tile(Position::new(257, 256, 7)).map(|t| t.flags),
            Some(TileFlags::PROTECTION_ZONE)
        );

        assert_eq!(map.towns.len(), 2);
        assert_eq!(map.towns.get(TownId::new(2)).map(|t| t.temple), Some(Position::new(257, 256, 7)));
        assert_eq!(map.waypoints.get("temple").map(|w| w.position), Some(Position::new(256, 256, 7)));
    }

    #[test]
    fn test_wrong_root_type() {
        let items = test_items();
        let config = WorldConfig::default();
        // The map data would fail too; the root check must come first
        let broken_data = map_data(Props::new().u8(200));
        let mut tree = root(2, 100, 100, broken_data);
        tree.kind = NODE_MAP_DATA;

        let err = load(&items, &config, &tree).unwrap_err();
        assert!(matches!(
            err,
            MapError::InvalidRoot {
                found: NODE_MAP_DATA,
                expected: NODE_ROOTV1
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_unknown_map_data_attribute() {
        let items = test_items();
        let config = WorldConfig::default();
        let tree = root(2, 100, 100, map_data(Props::new().u16_attr(ATTR_ACTION_ID, 5)));
        let err = load(&items, &config, &tree).unwrap_err();
        assert!(matches!(err, MapError::MalformedAttribute { .. }));

        let tree = root(2, 100, 100, map_data(Props::new().u8(99)));
        let err = load(&items, &config, &tree).unwrap_err();
        assert!(err.to_string().contains("unknown attribute tag 99"));
    }

    #[test]
    fn test_map_data_shape() {
        let items = test_items();
        let config = WorldConfig::default();

        let tree = root(2, 100, 100, map_data(Props::new())).with_child(map_data(Props::new()));
        assert!(matches!(load(&items, &config, &tree), Err(MapError::MalformedNode { .. })));

        let tree = root(2, 100, 100, towns([]));
        assert!(matches!(load(&items, &config, &tree), Err(MapError::MalformedNode { .. })));

        // Legacy spawn nodes are not part of the map data
        let tree = root(2, 100, 100, map_data(Props::new()).with_child(Node::new(NODE_SPAWNS, Props::new())));
        assert!(matches!(load(&items, &config, &tree), Err(MapError::MalformedNode { .. })));
    }

    #[test]
    fn test_version_rules() {
        let items = test_items();
        let config = WorldConfig::default();
        let with_header = |version: u32, major: u32, minor: u32| {
            let props = Props::new().u32(version).u16(100).u16(100).u32(major).u32(minor);
            Node::new(NODE_ROOTV1, props).with_child(map_data(Props::new()))
        };

        assert!(load(&items, &config, &with_header(1, 3, 57)).is_ok());
        assert!(load(&items, &config, &with_header(2, 3, 8)).is_ok());
        for (version, major, minor) in [(0, 3, 57), (3, 3, 57), (2, 2, 57), (2, 4, 57), (2, 3, 7)] {
            let err = load(&items, &config, &with_header(version, major, minor)).unwrap_err();
            assert!(
                matches!(err, MapError::VersionMismatch(_)),
                "{}/{}.{} gave {}",
                version,
                major,
                minor,
                err
            );
        }

        // Newer minor version: tolerated unless strict
        assert!(load(&items, &config, &with_header(2, 3, 60)).is_ok());
        let strict = WorldConfig {
            strict_items_version: true,
            ..WorldConfig::default()
        };
        assert!(matches!(
            load(&items, &strict, &with_header(2, 3, 60)),
            Err(MapError::VersionMismatch(_))
        ));

        // Header shorter than 16 bytes
        let tree = Node::new(NODE_ROOTV1, Props::new().u32(2)).with_child(map_data(Props::new()));
        assert!(matches!(load(&items, &config, &tree), Err(MapError::MalformedAttribute { .. })));
    }

    #[test]
    fn test_waypoints_need_version_two() {
        let items = test_items();
        let config = WorldConfig::default();
        let data = map_data(Props::new()).with_child(waypoints([waypoint("a", Position::new(1, 1, 7))]));
        let err = load(&items, &config, &root(1, 100, 100, data)).unwrap_err();
        assert!(matches!(err, MapError::MalformedNode { .. }));
    }

    #[test]
    fn test_duplicate_town() {
        let items = test_items();
        let config = WorldConfig::default();
        let data = map_data(Props::new()).with_child(towns([
            town(1, "Thais", Position::new(10, 10, 7)),
            town(1, "Venore", Position::new(20, 20, 7)),
        ]));
        let err = load(&items, &config, &root(2, 100, 100, data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateEntity);
        assert!(matches!(err, MapError::DuplicateEntity { entity: Entity::Town, .. }));
    }

    #[test]
    fn test_duplicate_waypoint_policy() {
        let items = test_items();
        let data = map_data(Props::new()).with_child(waypoints([
            waypoint("depot", Position::new(10, 10, 7)),
            waypoint("depot", Position::new(20, 20, 6)),
        ]));
        let tree = root(2, 100, 100, data);

        let map = load(&items, &WorldConfig::default(), &tree).unwrap();
        assert_eq!(map.waypoints.len(), 1);
        assert_eq!(map.waypoints.get("depot").map(|w| w.position), Some(Position::new(20, 20, 6)));

        let reject = WorldConfig {
            waypoint_duplicates: DuplicatePolicy::Reject,
            ..WorldConfig::default()
        };
        let err = load(&items, &reject, &tree).unwrap_err();
        assert!(matches!(err, MapError::DuplicateEntity { entity: Entity::Waypoint, .. }));
    }

    #[test]
    fn test_load_through_node_source() {
        let items = test_items();
        let config = WorldConfig::default();
        let source = StaticSource::new(small_world());

        let map = MapLoader::new(&items, &config)
            .with_source(&source)
            .load(Path::new("maps/small.otbm"))
            .unwrap();
        assert_eq!(map.tile_count(), 2);
        assert_eq!(map.monster_file, PathBuf::from("maps/small-monster.xml"));
        assert_eq!(source.requested.borrow().as_slice(), &[PathBuf::from("maps/small.otbm")]);
    }

    #[test]
    fn test_load_file_from_disk() {
        let items = test_items();
        let config = WorldConfig::default();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("small.otbm");
        std::fs::write(&path, encode(&small_world(), *b"OTBM")).unwrap();

        let map = MapLoader::new(&items, &config).load(&path).unwrap();
        assert_eq!(map.tile_count(), 2);
        assert_eq!(map.towns.len(), 2);
        assert_eq!(map.monster_file, dir.path().join("small-monster.xml"));

        let err = MapLoader::new(&items, &config)
            .load(&dir.path().join("missing.otbm"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);

        std::fs::write(&path, &encode(&small_world(), *b"OTBM")[..40]).unwrap();
        let err = MapLoader::new(&items, &config).load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_deep_file_reports_nesting() {
        let items = test_items();
        let config = WorldConfig {
            max_container_depth: 3,
            ..WorldConfig::default()
        };
        let deep = |levels| {
            let data = map_data(Props::new()).with_child(
                tile_area(Position::new(0, 0, 7))
                    .with_child(tile(0, 0, Props::new()).with_child(nested_containers(levels))),
            );
            encode(&root(2, 100, 100, data), *b"OTBM")
        };

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("deep.otbm");

        std::fs::write(&path, deep(2)).unwrap();
        assert!(MapLoader::new(&items, &config).load(&path).is_ok());

        for levels in [3, 10] {
            std::fs::write(&path, deep(levels)).unwrap();
            let err = MapLoader::new(&items, &config).load(&path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{}", err);
        }
    }

    #[test]
    fn test_unbounded_depth_setting_is_capped() {
        let items = test_items();
        let config = WorldConfig {
            max_container_depth: usize::MAX,
            ..WorldConfig::default()
        };
        let data = map_data(Props::new()).with_child(
            tile_area(Position::new(0, 0, 7))
                .with_child(tile(0, 0, Props::new()).with_child(nested_containers(10))),
        );

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("capped.otbm");
        std::fs::write(&path, encode(&root(2, 100, 100, data), *b"OTBM")).unwrap();

        let loader = MapLoader::new(&items, &config);
        assert_eq!(loader.container_depth(), MAX_CONTAINER_DEPTH);
        let map = loader.load(&path).unwrap();
        assert_eq!(map.tile_count(), 1);
    }
}
