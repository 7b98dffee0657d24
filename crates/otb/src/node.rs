//! Generic OTB tree node

use bytes::Bytes;

/// A typed node of an OTB tree
///
/// Properties are stored unescaped; their meaning depends on `kind` and is
/// left to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Node type byte
    pub kind: u8,

    /// Unescaped property bytes
    pub props: Bytes,

    /// Child nodes in file order
    pub children: Vec<Node>,

    /// Byte offset of the node start marker in the source (0 for built nodes)
    pub offset: usize,
}

impl Node {
    /// Create a node without children
    pub fn new(kind: u8, props: impl Into<Bytes>) -> Self {
        Self {
            kind,
            props: props.into(),
            children: Vec::new(),
            offset: 0,
        }
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style children append
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Whether the node has any children
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let node = Node::new(2, vec![1, 2, 3])
            .with_child(Node::new(4, Vec::new()))
            .with_children([Node::new(12, Vec::new()), Node::new(15, Vec::new())]);

        assert_eq!(node.kind, 2);
        assert_eq!(&node.props[..], &[1, 2, 3]);
        assert_eq!(node.children.len(), 3);
        assert!(node.has_children());
        assert_eq!(node.subtree_len(), 4);
    }
}
