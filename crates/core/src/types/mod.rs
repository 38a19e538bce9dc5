//! Core domain types for crawlgate.
//!
//! - **`action`**: the validated worker action identifier
//! - **`arguments`**: fixed launch arguments for a worker profile
//! - **`environment`**: extra environment bindings passed to a worker

pub mod action;
pub mod arguments;
pub mod environment;

pub use action::*;
pub use arguments::*;
pub use environment::*;
