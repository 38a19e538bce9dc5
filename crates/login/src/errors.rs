//! Errors raised while starting a login or reading persisted credentials

use crawlgate_bridge::{BridgeFailure, FailureKind};
use std::path::PathBuf;

/// Why a login could not be started.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The worker call failed or the worker answered `"status": "error"`
    #[error("login worker failed: {0}")]
    Bridge(#[from] BridgeFailure),

    #[error("invalid login request: {0}")]
    InvalidRequest(#[from] crawlgate_core::Error),

    #[error("login challenge is missing '{field}'")]
    MalformedChallenge { field: &'static str },

    #[error("login challenge image is not valid base64: {0}")]
    InvalidImage(#[source] base64::DecodeError),
}

impl LoginError {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            LoginError::Bridge(failure) => Some(failure.kind),
            _ => None,
        }
    }

    /// Text suitable for a diagnostic record
    pub fn report(&self) -> String {
        match self {
            LoginError::Bridge(failure) => failure.report(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoginError>;

/// The credential file exists but could not be used.
#[derive(Debug, thiserror::Error)]
pub enum CredentialFileError {
    #[error(transparent)]
    Unreadable(#[from] crawlgate_core::Error),

    #[error("credential file '{}' is not valid TOML: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
