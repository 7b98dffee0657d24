//! Helpers shared by the companion XML loaders

use crate::error::{MapError, Result};
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Read a companion file, mapping every failure to `ResourceMissing`
pub(crate) fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| MapError::resource(path, e.to_string()))
}

/// Parse a document and return its root element, checking the tag name
pub(crate) fn parse_document<'a>(source: &'a str, root_tag: &str, path: &Path) -> Result<Document<'a>> {
    let document = Document::parse(source).map_err(|e| MapError::resource(path, e.to_string()))?;

    let root = document.root_element();
    if !root.tag_name().name().eq_ignore_ascii_case(root_tag) {
        return Err(MapError::resource(
            path,
            format!(
                "expected <{}> root element, found <{}>",
                root_tag,
                root.tag_name().name()
            ),
        ));
    }

    Ok(document)
}

/// Typed attribute value; `None` when absent or not parsable
pub(crate) fn attr<T: FromStr>(node: Node<'_, '_>, name: &str) -> Option<T> {
    node.attribute(name).and_then(|value| value.trim().parse().ok())
}

/// Line number of a node, for diagnostics
pub(crate) fn line_of(node: Node<'_, '_>) -> u32 {
    node.document().text_pos_at(node.range().start).row
}
