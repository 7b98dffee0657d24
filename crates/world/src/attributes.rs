//! Attribute decoder
//!
//! A cursor over a node's property bytes. Fixed records (root header, tile
//! offsets, destinations) are read with the `read_*` methods; the tagged part
//! of the stream is consumed lazily through [`AttributeReader::next_attribute`]
//! or the `Iterator` impl. The width of every value follows from its tag.
//!
//! All integers are little-endian. Strings are a `u16` length followed by
//! Latin-1 bytes.

use crate::error::{ErrorContext, MapError, Result};
use crate::format::*;
use bytes::{Buf, Bytes};
use otmap_core::Position;
use otmap_otb::Node;

/// Size of the root header record
pub const ROOT_HEADER_LEN: usize = 16;

/// Size of a destination record (x: u16, y: u16, z: u8)
pub const DESTINATION_LEN: usize = 5;

/// Fixed header of the root node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootHeader {
    pub version: u32,
    pub width: u16,
    pub height: u16,
    pub items_major: u32,
    pub items_minor: u32,
}

/// A decoded tagged attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Description(String),
    SpawnMonsterFile(String),
    SpawnNpcFile(String),
    HouseFile(String),
    TileFlags(u32),
    ActionId(u16),
    UniqueId(u16),
    Text(String),
    ItemDescription(String),
    TeleportDestination(Position),
    Item(u16),
    DepotId(u16),
    RuneCharges(u8),
    HouseDoorId(u8),
    Count(u8),
    Duration(u32),
    DecayingState(u8),
    WrittenDate(u32),
    WrittenBy(String),
    SleeperGuid(u32),
    SleepStart(u32),
    Charges(u16),
}

impl Attribute {
    /// Tag byte of this attribute
    pub fn tag(&self) -> u8 {
        match self {
            Attribute::Description(_) => ATTR_DESCRIPTION,
            Attribute::SpawnMonsterFile(_) => ATTR_EXT_SPAWN_MONSTER_FILE,
            Attribute::SpawnNpcFile(_) => ATTR_EXT_SPAWN_NPC_FILE,
            Attribute::HouseFile(_) => ATTR_EXT_HOUSE_FILE,
            Attribute::TileFlags(_) => ATTR_TILE_FLAGS,
            Attribute::ActionId(_) => ATTR_ACTION_ID,
            Attribute::UniqueId(_) => ATTR_UNIQUE_ID,
            Attribute::Text(_) => ATTR_TEXT,
            Attribute::ItemDescription(_) => ATTR_DESC,
            Attribute::TeleportDestination(_) => ATTR_TELE_DEST,
            Attribute::Item(_) => ATTR_ITEM,
            Attribute::DepotId(_) => ATTR_DEPOT_ID,
            Attribute::RuneCharges(_) => ATTR_RUNE_CHARGES,
            Attribute::HouseDoorId(_) => ATTR_HOUSEDOORID,
            Attribute::Count(_) => ATTR_COUNT,
            Attribute::Duration(_) => ATTR_DURATION,
            Attribute::DecayingState(_) => ATTR_DECAYING_STATE,
            Attribute::WrittenDate(_) => ATTR_WRITTENDATE,
            Attribute::WrittenBy(_) => ATTR_WRITTENBY,
            Attribute::SleeperGuid(_) => ATTR_SLEEPERGUID,
            Attribute::SleepStart(_) => ATTR_SLEEPSTART,
            Attribute::Charges(_) => ATTR_CHARGES,
        }
    }

    /// Attribute name, for error messages
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Description(_) => "description",
            Attribute::SpawnMonsterFile(_) => "monster spawn file",
            Attribute::SpawnNpcFile(_) => "npc spawn file",
            Attribute::HouseFile(_) => "house file",
            Attribute::TileFlags(_) => "tile flags",
            Attribute::ActionId(_) => "action id",
            Attribute::UniqueId(_) => "unique id",
            Attribute::Text(_) => "text",
            Attribute::ItemDescription(_) => "item description",
            Attribute::TeleportDestination(_) => "teleport destination",
            Attribute::Item(_) => "item",
            Attribute::DepotId(_) => "depot id",
            Attribute::RuneCharges(_) => "rune charges",
            Attribute::HouseDoorId(_) => "house door id",
            Attribute::Count(_) => "count",
            Attribute::Duration(_) => "duration",
            Attribute::DecayingState(_) => "decaying state",
            Attribute::WrittenDate(_) => "written date",
            Attribute::WrittenBy(_) => "written by",
            Attribute::SleeperGuid(_) => "sleeper guid",
            Attribute::SleepStart(_) => "sleep start",
            Attribute::Charges(_) => "charges",
        }
    }
}

/// Cursor over a node's property bytes
#[derive(Debug, Clone)]
pub struct AttributeReader {
    buf: Bytes,
    len: usize,
    node_offset: usize,
    stop_at_zero: bool,
    done: bool,
}

impl AttributeReader {
    /// Read the properties of a node
    pub fn new(node: &Node) -> Self {
        Self::from_bytes(node.props.clone(), node.offset)
    }

    /// Read raw property bytes belonging to the node at `node_offset`
    pub fn from_bytes(props: Bytes, node_offset: usize) -> Self {
        Self {
            len: props.len(),
            buf: props,
            node_offset,
            stop_at_zero: false,
            done: false,
        }
    }

    /// Treat a zero tag as the end of the stream (item nodes)
    pub fn until_zero_tag(mut self) -> Self {
        self.stop_at_zero = true;
        self
    }

    /// Current offset inside the property bytes
    #[inline]
    pub fn offset(&self) -> usize {
        self.len - self.buf.remaining()
    }

    /// Bytes left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Error context at the current offset
    pub fn context(&self) -> ErrorContext {
        ErrorContext::node(self.node_offset).with_byte(self.offset())
    }

    fn need(&self, bytes: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < bytes {
            return Err(MapError::malformed_attribute(
                format!(
                    "truncated {}: need {} bytes, {} left",
                    what,
                    bytes,
                    self.buf.remaining()
                ),
                self.context(),
            ));
        }
        Ok(())
    }

    pub fn read_u8(&mut self, what: &str) -> Result<u8> {
        self.need(1, what)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self, what: &str) -> Result<u16> {
        self.need(2, what)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_u32(&mut self, what: &str) -> Result<u32> {
        self.need(4, what)?;
        Ok(self.buf.get_u32_le())
    }

    /// Length-prefixed Latin-1 string
    pub fn read_string(&mut self, what: &str) -> Result<String> {
        self.need(2, what)?;
        let len = self.buf.get_u16_le() as usize;
        self.need(len, what)?;
        let raw = self.buf.split_to(len);
        Ok(raw.iter().map(|&b| b as char).collect())
    }

    /// Destination record: x: u16, y: u16, z: u8
    pub fn read_destination(&mut self, what: &str) -> Result<Position> {
        self.need(DESTINATION_LEN, what)?;
        let x = self.buf.get_u16_le();
        let y = self.buf.get_u16_le();
        let z = self.buf.get_u8();
        Ok(Position::new(x, y, z))
    }

    /// Relative tile offset record: x: u8, y: u8
    pub fn read_tile_offset(&mut self) -> Result<(u8, u8)> {
        self.need(2, "tile offset")?;
        let x = self.buf.get_u8();
        let y = self.buf.get_u8();
        Ok((x, y))
    }

    /// Root header record
    pub fn read_root_header(&mut self) -> Result<RootHeader> {
        self.need(ROOT_HEADER_LEN, "root header")?;
        Ok(RootHeader {
            version: self.buf.get_u32_le(),
            width: self.buf.get_u16_le(),
            height: self.buf.get_u16_le(),
            items_major: self.buf.get_u32_le(),
            items_minor: self.buf.get_u32_le(),
        })
    }

    /// Decode the next tagged attribute, `None` at the end of the stream
    pub fn next_attribute(&mut self) -> Result<Option<Attribute>> {
        if self.done || !self.buf.has_remaining() {
            return Ok(None);
        }

        let context = self.context();
        let tag = self.buf.get_u8();
        if tag == 0 && self.stop_at_zero {
            self.done = true;
            return Ok(None);
        }

        let attribute = match tag {
            ATTR_DESCRIPTION => Attribute::Description(self.read_string("description")?),
            ATTR_EXT_SPAWN_MONSTER_FILE => {
                Attribute::SpawnMonsterFile(self.read_string("monster spawn file")?)
            }
            ATTR_EXT_SPAWN_NPC_FILE => Attribute::SpawnNpcFile(self.read_string("npc spawn file")?),
            ATTR_EXT_HOUSE_FILE => Attribute::HouseFile(self.read_string("house file")?),
            ATTR_TILE_FLAGS => Attribute::TileFlags(self.read_u32("tile flags")?),
            ATTR_ACTION_ID => Attribute::ActionId(self.read_u16("action id")?),
            ATTR_UNIQUE_ID => Attribute::UniqueId(self.read_u16("unique id")?),
            ATTR_TEXT => Attribute::Text(self.read_string("text")?),
            ATTR_DESC => Attribute::ItemDescription(self.read_string("item description")?),
            ATTR_TELE_DEST => {
                Attribute::TeleportDestination(self.read_destination("teleport destination")?)
            }
            ATTR_ITEM => Attribute::Item(self.read_u16("item id")?),
            ATTR_DEPOT_ID => Attribute::DepotId(self.read_u16("depot id")?),
            ATTR_RUNE_CHARGES => Attribute::RuneCharges(self.read_u8("rune charges")?),
            ATTR_HOUSEDOORID => Attribute::HouseDoorId(self.read_u8("house door id")?),
            ATTR_COUNT => Attribute::Count(self.read_u8("count")?),
            ATTR_DURATION => Attribute::Duration(self.read_u32("duration")?),
            ATTR_DECAYING_STATE => Attribute::DecayingState(self.read_u8("decaying state")?),
            ATTR_WRITTENDATE => Attribute::WrittenDate(self.read_u32("written date")?),
            ATTR_WRITTENBY => Attribute::WrittenBy(self.read_string("written by")?),
            ATTR_SLEEPERGUID => Attribute::SleeperGuid(self.read_u32("sleeper guid")?),
            ATTR_SLEEPSTART => Attribute::SleepStart(self.read_u32("sleep start")?),
            ATTR_CHARGES => Attribute::Charges(self.read_u16("charges")?),
            unknown => {
                return Err(MapError::malformed_attribute(
                    format!("unknown attribute tag {}", unknown),
                    context,
                ));
            }
        };

        Ok(Some(attribute))
    }
}

impl Iterator for AttributeReader {
    type Item = Result<Attribute>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_attribute() {
            Ok(Some(attribute)) => Some(Ok(attribute)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                // Nothing after a decoding error is trustworthy
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
