//! Core domain types, errors, and constants for the `crawlgate` workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: the workspace-level `Error` enum and `Result` alias used by
//!   configuration, the diagnostic sink, and the command-line front end.
//! - **`types`**: validated newtypes (`ActionName`) and the argument and
//!   environment wrappers handed to worker processes.
//! - **`constants`**: environment variable names, worker action names, and
//!   the default lifetimes of cached results and diagnostic records.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, Validate},
    types::*,
};
