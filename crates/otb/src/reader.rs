//! OTB container reader
//!
//! Parses the whole file in one pass with an explicit node stack, so deep
//! trees never recurse. Property bytes are unescaped while parsing.

use crate::node::Node;
use crate::{Result, TreeError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Node start marker
pub const NODE_START: u8 = 0xFE;

/// Node end marker
pub const NODE_END: u8 = 0xFF;

/// Escape marker (next byte is literal)
pub const ESCAPE_CHAR: u8 = 0xFD;

/// Default nesting limit for decoded trees
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// 4-byte file identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier(pub [u8; 4]);

impl Identifier {
    /// Map files
    pub const OTBM: Identifier = Identifier(*b"OTBM");

    /// Accepts any identifier (items.otb is written with zeros)
    pub const WILDCARD: Identifier = Identifier([0; 4]);

    /// Check a file identifier against this one; all-zero matches anything
    pub fn accepts(&self, found: [u8; 4]) -> bool {
        self.0 == [0; 4] || found == [0; 4] || found == self.0
    }
}

/// Anything that can produce a node tree for a file path
///
/// The map loader only depends on this seam; tests can hand it in-memory trees.
pub trait NodeSource {
    fn load_tree(&self, path: &Path) -> Result<Node>;
}

/// Node under construction
struct OpenNode {
    kind: u8,
    offset: usize,
    props: Vec<u8>,
    props_done: bool,
    children: Vec<Node>,
}

impl OpenNode {
    fn new(kind: u8, offset: usize) -> Self {
        Self {
            kind,
            offset,
            props: Vec::new(),
            props_done: false,
            children: Vec::new(),
        }
    }

    #[inline]
    fn push_prop(&mut self, byte: u8) {
        // Only bytes before the first child belong to the node's properties
        if !self.props_done {
            self.props.push(byte);
        }
    }

    fn finish(self) -> Node {
        Node {
            kind: self.kind,
            props: self.props.into(),
            children: self.children,
            offset: self.offset,
        }
    }
}

/// OTB file reader
#[derive(Debug, Clone)]
pub struct OtbReader {
    identifier: Identifier,
    max_depth: usize,
}

impl OtbReader {
    /// Create a reader accepting the given identifier
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply nodes may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Read and parse a file
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<Node> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| TreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let root = self.parse(&data)?;
        debug!(
            "Parsed OTB tree from {} ({} bytes, {} nodes)",
            path.display(),
            data.len(),
            root.subtree_len()
        );
        Ok(root)
    }

    /// Parse an in-memory OTB container
    pub fn parse(&self, data: &[u8]) -> Result<Node> {
        // identifier + start + type + end
        if data.len() < 7 {
            return Err(TreeError::TooShort { len: data.len() });
        }

        let found = [data[0], data[1], data[2], data[3]];
        if !self.identifier.accepts(found) {
            return Err(TreeError::IdentifierMismatch {
                expected: self.identifier.0,
                found,
            });
        }

        if data[4] != NODE_START {
            return Err(TreeError::MissingRoot { offset: 4 });
        }

        let mut stack: Vec<OpenNode> = Vec::new();
        let mut root: Option<Node> = None;
        let mut i = 4;

        while i < data.len() {
            if root.is_some() {
                return Err(TreeError::TrailingData { offset: i });
            }

            match data[i] {
                NODE_START => {
                    if stack.len() >= self.max_depth {
                        return Err(TreeError::TooDeep {
                            limit: self.max_depth,
                            offset: i,
                        });
                    }
                    let kind = *data.get(i + 1).ok_or(TreeError::Truncated { offset: i })?;
                    if let Some(parent) = stack.last_mut() {
                        parent.props_done = true;
                    }
                    stack.push(OpenNode::new(kind, i));
                    i += 2;
                    continue;
                }
                NODE_END => {
                    let node = stack
                        .pop()
                        .ok_or(TreeError::UnbalancedEnd { offset: i })?
                        .finish();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
                ESCAPE_CHAR => {
                    let open_offset = stack.last().map(|n| n.offset).unwrap_or(i);
                    let literal = *data
                        .get(i + 1)
                        .ok_or(TreeError::Truncated { offset: open_offset })?;
                    if let Some(current) = stack.last_mut() {
                        current.push_prop(literal);
                    }
                    i += 2;
                    continue;
                }
                byte => {
                    if let Some(current) = stack.last_mut() {
                        current.push_prop(byte);
                    }
                }
            }

            i += 1;
        }

        root.ok_or_else(|| TreeError::Truncated {
            offset: stack.last().map(|n| n.offset).unwrap_or(4),
        })
    }
}

impl Default for OtbReader {
    fn default() -> Self {
        Self::new(Identifier::OTBM)
    }
}

impl NodeSource for OtbReader {
    fn load_tree(&self, path: &Path) -> Result<Node> {
        self.read_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Escape special bytes the way map editors do
    fn escaped(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for &b in bytes {
            if b == NODE_START || b == NODE_END || b == ESCAPE_CHAR {
                out.push(ESCAPE_CHAR);
            }
            out.push(b);
        }
        out
    }

    #[test]
    fn test_parse_nested_tree() {
        let mut data = b"OTBM".to_vec();
        data.extend([NODE_START, 1, 0xAA, 0xBB]);
        data.extend([NODE_START, 2, 0x01]);
        data.extend([NODE_START, 4, NODE_END]);
        data.push(NODE_END);
        data.extend([NODE_START, 12, NODE_END]);
        data.push(NODE_END);

        let root = OtbReader::default().parse(&data).unwrap();
        assert_eq!(root.kind, 1);
        assert_eq!(&root.props[..], &[0xAA, 0xBB]);
        assert_eq!(root.offset, 4);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].kind, 2);
        assert_eq!(&root.children[0].props[..], &[0x01]);
        assert_eq!(root.children[0].children[0].kind, 4);
        assert!(root.children[0].children[0].props.is_empty());
        assert_eq!(root.children[1].kind, 12);
    }

    #[test]
    fn test_escaped_props_are_literal() {
        let props = [0xFE, 0x10, 0xFF, 0xFD, 0x20];
        let mut data = b"OTBM".to_vec();
        data.extend([NODE_START, 1]);
        data.extend(escaped(&props));
        data.push(NODE_END);

        let root = OtbReader::default().parse(&data).unwrap();
        assert_eq!(&root.props[..], &props);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_wildcard_identifier() {
        let data = [0, 0, 0, 0, NODE_START, 0, 0x01, NODE_END];
        let root = OtbReader::default().parse(&data).unwrap();
        assert_eq!(root.kind, 0);

        let data = [b'X', b'Y', b'Z', b'W', NODE_START, 0, 0x01, NODE_END];
        let root = OtbReader::new(Identifier::WILDCARD).parse(&data).unwrap();
        assert_eq!(&root.props[..], &[0x01]);
    }

    #[test]
    fn test_identifier_mismatch() {
        let data = [b'O', b'T', b'B', b'X', NODE_START, 1, NODE_END];
        let result = OtbReader::default().parse(&data);
        assert!(matches!(result, Err(TreeError::IdentifierMismatch { .. })));
    }

    #[test]
    fn test_missing_root() {
        let data = [b'O', b'T', b'B', b'M', 0x01, 1, NODE_END];
        let result = OtbReader::default().parse(&data);
        assert!(matches!(result, Err(TreeError::MissingRoot { offset: 4 })));
    }

    #[test]
    fn test_truncated_tree() {
        let mut data = b"OTBM".to_vec();
        data.extend([NODE_START, 1, 0x00, NODE_START, 2, 0x00]);
        let result = OtbReader::default().parse(&data);
        assert!(matches!(result, Err(TreeError::Truncated { offset: 7 })));

        let mut data = b"OTBM".to_vec();
        data.extend([NODE_START, 1, 0x00, ESCAPE_CHAR]);
        let result = OtbReader::default().parse(&data);
        assert!(matches!(result, Err(TreeError::Truncated { offset: 4 })));
    }

    #[test]
    fn test_trailing_data() {
        let mut data = b"OTBM".to_vec();
        data.extend([NODE_START, 1, 0x00, NODE_END, NODE_START, 2, NODE_END]);
        let result = OtbReader::default().parse(&data);
        assert!(matches!(result, Err(TreeError::TrailingData { offset: 8 })));
    }

    #[test]
    fn test_depth_limit() {
        let mut data = b"OTBM".to_vec();
        for _ in 0..5 {
            data.extend([NODE_START, 6]);
        }
        for _ in 0..5 {
            data.push(NODE_END);
        }

        assert!(OtbReader::default().with_max_depth(5).parse(&data).is_ok());
        let result = OtbReader::default().with_max_depth(4).parse(&data);
        assert!(matches!(result, Err(TreeError::TooDeep { limit: 4, .. })));
    }

    #[test]
    fn test_read_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = OtbReader::default().read_file(dir.path().join("missing.otbm"));
        match result {
            Err(err) => assert!(err.is_io()),
            Ok(_) => panic!("expected an I/O error"),
        }
    }

    #[test]
    fn test_node_source_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tiny.otbm");
        std::fs::write(&path, [b'O', b'T', b'B', b'M', NODE_START, 1, 0x07, NODE_END]).unwrap();

        let source: &dyn NodeSource = &OtbReader::default();
        let root = source.load_tree(&path).unwrap();
        assert_eq!(root.kind, 1);
        assert_eq!(&root.props[..], &[0x07]);
    }
}
