//! Failures as the gateway reports them to its callers

use crawlgate_bridge::{BridgeFailure, FailureKind};
use crawlgate_cache::CacheError;
use crawlgate_config::Workload;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "kind", rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The worker call failed
    Worker(FailureKind),
    /// The worker answered, but not with a result set
    UnexpectedResponse,
    /// Unknown, released or expired result token
    NotFound,
    /// The caller's request was rejected before any worker ran
    InvalidRequest,
    /// The login worker's persisted credentials could not be read
    CredentialFile,
}

/// A failure mapped for callers: a public message, an optional detail and
/// the locator of the diagnostic record, when one was written.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    pub category: ErrorCategory,
    pub message: String,
    /// Omitted in production mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_locator: Option<PathBuf>,
}

impl ServiceError {
    pub(crate) fn worker(
        workload: Workload,
        failure: &BridgeFailure,
        log_locator: Option<PathBuf>,
        production: bool,
    ) -> Self {
        let (message, detail) = if production {
            (unavailable(workload), None)
        } else {
            (failure.diagnostic.clone(), Some(failure.to_string()))
        };
        Self {
            category: ErrorCategory::Worker(failure.kind),
            message,
            detail,
            log_locator,
        }
    }

    pub(crate) fn unexpected_response(
        workload: Workload,
        detail: impl Into<String>,
        log_locator: Option<PathBuf>,
        production: bool,
    ) -> Self {
        let detail = detail.into();
        let (message, detail) = if production {
            (unavailable(workload), None)
        } else {
            (detail.clone(), Some(detail))
        };
        Self {
            category: ErrorCategory::UnexpectedResponse,
            message,
            detail,
            log_locator,
        }
    }

    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::InvalidRequest,
            message: message.into(),
            detail: None,
            log_locator: None,
        }
    }

    pub(crate) fn credential_file(detail: impl Into<String>, log_locator: Option<PathBuf>, production: bool) -> Self {
        let detail = detail.into();
        let (message, detail) = if production {
            ("failed to read the saved login cookies".to_string(), None)
        } else {
            (detail.clone(), Some(detail))
        };
        Self {
            category: ErrorCategory::CredentialFile,
            message,
            detail,
            log_locator,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category == ErrorCategory::NotFound
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.category {
            ErrorCategory::Worker(kind) => Some(kind),
            _ => None,
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(error: CacheError) -> Self {
        let category = if error.is_not_found() {
            ErrorCategory::NotFound
        } else {
            ErrorCategory::InvalidRequest
        };
        Self {
            category,
            message: error.to_string(),
            detail: None,
            log_locator: None,
        }
    }
}

fn unavailable(workload: Workload) -> String {
    format!("{workload} service temporarily unavailable")
}
