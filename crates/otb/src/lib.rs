//! # OTB tree node source
//!
//! Decodes the escaped OTB container format shared by `.otbm` maps and
//! `items.otb` into a generic tree of typed nodes.
//!
//! ## Format
//!
//! - **Identifier**: 4 bytes (`"OTBM"`, or all zero as a wildcard)
//! - **Node start** `0xFE` followed by the node type byte
//! - **Properties**: raw bytes up to the first child or the node end
//! - **Node end** `0xFF`
//! - **Escape** `0xFD`: the next byte is literal property data

pub mod error;
pub mod node;
pub mod reader;

pub use error::{TreeError, Result};
pub use node::Node;
pub use reader::{Identifier, NodeSource, OtbReader, DEFAULT_MAX_DEPTH};
