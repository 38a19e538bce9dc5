//! Command-line front end and library façade for crawlgate
//!
//! [`Gateway`] ties the worker bridges, the result cache, the login flow and
//! the diagnostic record sink together behind the operations a front end
//! needs. Every failure it reports is a [`ServiceError`].

pub mod commands;
mod execute;
pub mod gateway;
pub mod service_error;

pub use commands::{Cli, Commands};
pub use gateway::{BulkQuery, Gateway};
pub use service_error::{ErrorCategory, ServiceError};
