//! Shared runtime plumbing for crawlgate
//!
//! Logging initialization, the diagnostic record sink, and atomic file
//! writes used by the command-line front end.

pub mod atomic_file;
pub mod error_log;
pub mod tracing;

pub use atomic_file::write_atomic;
pub use error_log::{DiagnosticRecord, ErrorLog};
pub use self::tracing::init as init_tracing;
