//! Core error types for otmap

#[derive(thiserror::Error, Debug)]
pub enum OtmapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Item database error: {0}")]
    Items(String),

    #[error("Map error: {0}")]
    Map(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, OtmapError>;
