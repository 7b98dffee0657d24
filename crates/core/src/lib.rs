//! otmap core - fundamental types shared by the map crates

mod error;
mod types;
mod positions;

pub use error::*;
pub use types::*;
pub use positions::*;
