//! Error types for the world crate

use otmap_core::{OtmapError, Position};
use otmap_otb::TreeError;
use std::fmt;
use std::path::PathBuf;

/// Failure category, for callers that branch on the kind of problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File unreadable
    Io,
    /// Wrong node types, versions, unknown or truncated attributes
    Format,
    /// Coordinate outside the declared map bounds
    Range,
    /// Key defined twice
    DuplicateEntity,
    /// Companion XML absent or unparsable
    ResourceMissing,
}

/// Where in the file a problem was found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Offset of the node start marker
    pub node_offset: Option<usize>,

    /// Offset inside the node's property bytes
    pub byte_offset: Option<usize>,

    /// Tile being parsed
    pub position: Option<Position>,
}

impl ErrorContext {
    pub fn node(offset: usize) -> Self {
        Self {
            node_offset: Some(offset),
            ..Self::default()
        }
    }

    pub fn with_byte(mut self, offset: usize) -> Self {
        self.byte_offset = Some(offset);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(position) = self.position {
            write!(f, " {}", position)?;
        }
        match (self.node_offset, self.byte_offset) {
            (Some(node), Some(byte)) => write!(f, " (node at byte {}, property byte {})", node, byte),
            (Some(node), None) => write!(f, " (node at byte {})", node),
            (None, Some(byte)) => write!(f, " (property byte {})", byte),
            (None, None) => Ok(()),
        }
    }
}

/// Keyed entities of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Tile,
    Town,
    Waypoint,
    House,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Tile => "tile",
            Entity::Town => "town",
            Entity::Waypoint => "waypoint",
            Entity::House => "house",
        };
        f.write_str(name)
    }
}

/// Map loading errors
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// File could not be read
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OTB container itself is broken
    #[error("Invalid OTB tree: {0}")]
    Tree(TreeError),

    /// Root node has the wrong type
    #[error("Unexpected root node type {found}, expected {expected}")]
    InvalidRoot { found: u8, expected: u8 },

    /// Format or item database version not supported
    #[error("Version mismatch: {0}")]
    VersionMismatch(String),

    /// Unexpected node type or node content
    #[error("Malformed node{context}: {message}")]
    MalformedNode {
        message: String,
        context: ErrorContext,
    },

    /// Unknown tag or truncated value in an attribute stream
    #[error("Malformed attribute{context}: {message}")]
    MalformedAttribute {
        message: String,
        context: ErrorContext,
    },

    /// Containers nested deeper than allowed
    #[error("Container nesting exceeds {limit} levels{context}")]
    NestingTooDeep { limit: usize, context: ErrorContext },

    /// Tile coordinate outside the map
    #[error("Tile [x: {x}, y: {y}, z: {z}] is outside the map ({width}x{height}){context}")]
    OutOfRange {
        x: u32,
        y: u32,
        z: u8,
        width: u16,
        height: u16,
        context: ErrorContext,
    },

    /// Key defined twice
    #[error("Duplicate {entity} '{key}'{context}")]
    DuplicateEntity {
        entity: Entity,
        key: String,
        context: ErrorContext,
    },

    /// Companion file absent or unparsable
    #[error("Could not load {path}: {reason}")]
    ResourceMissing { path: PathBuf, reason: String },
}

impl MapError {
    pub fn malformed_node(message: impl Into<String>, context: ErrorContext) -> Self {
        MapError::MalformedNode {
            message: message.into(),
            context,
        }
    }

    pub fn malformed_attribute(message: impl Into<String>, context: ErrorContext) -> Self {
        MapError::MalformedAttribute {
            message: message.into(),
            context,
        }
    }

    pub fn resource(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MapError::ResourceMissing {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Io { .. } => ErrorKind::Io,
            MapError::Tree(err) if err.is_io() => ErrorKind::Io,
            MapError::Tree(_)
            | MapError::InvalidRoot { .. }
            | MapError::VersionMismatch(_)
            | MapError::MalformedNode { .. }
            | MapError::MalformedAttribute { .. }
            | MapError::NestingTooDeep { .. } => ErrorKind::Format,
            MapError::OutOfRange { .. } => ErrorKind::Range,
            MapError::DuplicateEntity { .. } => ErrorKind::DuplicateEntity,
            MapError::ResourceMissing { .. } => ErrorKind::ResourceMissing,
        }
    }

    /// File location of the problem, when known
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            MapError::MalformedNode { context, .. }
            | MapError::MalformedAttribute { context, .. }
            | MapError::NestingTooDeep { context, .. }
            | MapError::OutOfRange { context, .. }
            | MapError::DuplicateEntity { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Attach the tile position being parsed, keeping any position already set
    pub fn at_position(mut self, position: Position) -> Self {
        match &mut self {
            MapError::MalformedNode { context, .. }
            | MapError::MalformedAttribute { context, .. }
            | MapError::NestingTooDeep { context, .. }
            | MapError::DuplicateEntity { context, .. } => {
                context.position.get_or_insert(position);
            }
            _ => {}
        }
        self
    }
}

impl From<TreeError> for MapError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::Io { path, source } => MapError::Io { path, source },
            other => MapError::Tree(other),
        }
    }
}

impl From<MapError> for OtmapError {
    fn from(err: MapError) -> Self {
        OtmapError::Map(err.to_string())
    }
}

/// Result type for map operations
pub type Result<T> = std::result::Result<T, MapError>;
