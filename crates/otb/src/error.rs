//! Error types for the OTB reader

use std::path::PathBuf;

/// Errors raised while decoding an OTB container
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// File could not be read
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is shorter than identifier + root node
    #[error("File too short to contain an OTB tree ({len} bytes)")]
    TooShort { len: usize },

    /// Identifier does not match the expected file kind
    #[error("Invalid file identifier {found:?}, expected {expected:?}")]
    IdentifierMismatch { expected: [u8; 4], found: [u8; 4] },

    /// First byte after the identifier is not a node start
    #[error("Missing root node start at byte {offset}")]
    MissingRoot { offset: usize },

    /// Stream ended while a node was still open
    #[error("Unexpected end of file inside node opened at byte {offset}")]
    Truncated { offset: usize },

    /// Node end marker without a matching start
    #[error("Unbalanced node end at byte {offset}")]
    UnbalancedEnd { offset: usize },

    /// Bytes after the root node was closed
    #[error("Trailing data after root node at byte {offset}")]
    TrailingData { offset: usize },

    /// Nesting deeper than the reader allows
    #[error("Node nesting exceeds {limit} levels at byte {offset}")]
    TooDeep { limit: usize, offset: usize },
}

impl TreeError {
    /// Whether the error comes from the file system rather than the content
    pub fn is_io(&self) -> bool {
        matches!(self, TreeError::Io { .. })
    }
}

/// Result type for OTB operations
pub type Result<T> = std::result::Result<T, TreeError>;
