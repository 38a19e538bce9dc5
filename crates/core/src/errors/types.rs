//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for crawlgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Workspace-level error type.
///
/// Worker failures are not represented here: the bridge reports them as a
/// typed `BridgeOutcome`, and the cache and login flow carry their own error
/// enums. This type covers environment, file system, and input validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Environment variable related errors
    #[error("environment variable '{variable}' error: {message}")]
    Environment { variable: String, message: String },

    /// A caller-supplied value failed validation
    #[error("invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}
