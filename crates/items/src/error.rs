//! Item registry errors

use otmap_core::OtmapError;
use otmap_otb::TreeError;
use thiserror::Error;

/// Item registry errors
#[derive(Error, Debug)]
pub enum ItemsError {
    #[error("items.otb tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Invalid items.otb data: {0}")]
    InvalidData(String),

    #[error("Duplicate item type {0}")]
    Duplicate(u16),
}

impl From<ItemsError> for OtmapError {
    fn from(err: ItemsError) -> Self {
        OtmapError::Items(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ItemsError>;
