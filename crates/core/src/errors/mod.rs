//! Error types and validation helpers for crawlgate operations

mod builders;
mod conversions;
mod types;
mod validate;

pub use types::{Error, Result};
pub use validate::Validate;
