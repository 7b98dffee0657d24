//! items.otb loader
//!
//! The root node carries the database version; every child node is one item
//! type whose node type is its [`ItemGroup`].

use crate::item_type::{ItemGroup, ItemType};
use crate::registry::{ItemTypeOracle, ItemTypes};
use crate::{ItemsError, Result};
use bytes::{Buf, Bytes};
use otmap_core::ItemsVersion;
use otmap_otb::{Identifier, Node, OtbReader};
use std::path::Path;
use tracing::{debug, info};

/// Root attribute holding the version record
const ROOT_ATTR_VERSION: u8 = 0x01;

/// Size of the version record: major, minor, build and a 128 byte CSD string
const VERSION_INFO_LEN: usize = 4 * 3 + 128;

/// Item attribute: server id
const ITEM_ATTR_SERVER_ID: u8 = 0x10;

/// Item attribute: client id
const ITEM_ATTR_CLIENT_ID: u8 = 0x11;

/// Load an items.otb file into a registry
pub fn load_items_otb<P: AsRef<Path>>(path: P) -> Result<ItemTypes> {
    let path = path.as_ref();
    let root = OtbReader::new(Identifier::WILDCARD).read_file(path)?;
    let types = parse_items_tree(&root)?;

    info!(
        "Loaded {} item types from {} (version {}, build {})",
        types.len(),
        path.display(),
        types.version(),
        types.build()
    );
    Ok(types)
}

/// Interpret a decoded items.otb tree
pub fn parse_items_tree(root: &Node) -> Result<ItemTypes> {
    let (version, build) = parse_root_props(root.props.clone())?;
    let mut types = ItemTypes::new(version);
    types.set_build(build);

    for node in &root.children {
        let Some(group) = ItemGroup::from_u8(node.kind) else {
            return Err(ItemsError::InvalidData(format!(
                "unknown item group {} at byte {}",
                node.kind, node.offset
            )));
        };

        let item_type = parse_item_node(node, group)?;
        if item_type.id == 0 {
            debug!("Skipping item node without server id at byte {}", node.offset);
            continue;
        }
        types.insert(item_type)?;
    }

    Ok(types)
}

fn parse_root_props(mut props: Bytes) -> Result<(ItemsVersion, u32)> {
    if props.remaining() < 4 {
        return Err(ItemsError::InvalidData("root node is missing its flags".into()));
    }
    let _flags = props.get_u32_le();

    if !props.has_remaining() || props.get_u8() != ROOT_ATTR_VERSION {
        // Databases without a version record are accepted as 0.0
        return Ok((ItemsVersion::default(), 0));
    }

    if props.remaining() < 2 {
        return Err(ItemsError::InvalidData("truncated root version attribute".into()));
    }
    let len = props.get_u16_le() as usize;
    if len != VERSION_INFO_LEN || props.remaining() < len {
        return Err(ItemsError::InvalidData(format!(
            "root version attribute has {} bytes, expected {}",
            len, VERSION_INFO_LEN
        )));
    }

    let major = props.get_u32_le();
    let minor = props.get_u32_le();
    let build = props.get_u32_le();
    Ok((ItemsVersion::new(major, minor), build))
}

fn parse_item_node(node: &Node, group: ItemGroup) -> Result<ItemType> {
    let mut props = node.props.clone();
    let truncated = || ItemsError::InvalidData(format!("truncated item node at byte {}", node.offset));

    if props.remaining() < 4 {
        return Err(truncated());
    }
    let flags = props.get_u32_le();
    let mut item_type = ItemType::new(0, group).with_flags(flags);

    while props.has_remaining() {
        let attr = props.get_u8();
        if props.remaining() < 2 {
            return Err(truncated());
        }
        let len = props.get_u16_le() as usize;
        if props.remaining() < len {
            return Err(truncated());
        }

        match attr {
            ITEM_ATTR_SERVER_ID | ITEM_ATTR_CLIENT_ID if len != 2 => {
                return Err(ItemsError::InvalidData(format!(
                    "id attribute of length {} at byte {}",
                    len, node.offset
                )));
            }
            ITEM_ATTR_SERVER_ID => item_type.id = props.get_u16_le(),
            ITEM_ATTR_CLIENT_ID => item_type.client_id = props.get_u16_le(),
            _ => props.advance(len),
        }
    }

    Ok(item_type)
}
