//! Login session state

use chrono::{DateTime, Utc};
use crawlgate_bridge::FailureKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where a login attempt stands.
///
/// Moves only forward: `Pending` to one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

impl LoginStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LoginStatus::Pending)
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoginStatus::Pending => "pending",
            LoginStatus::Succeeded => "succeeded",
            LoginStatus::Failed => "failed",
            LoginStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Credential material obtained by a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Cookie name/value pairs, passed through as the worker returned them
    pub cookies: Value,
    /// Worker-reported timestamp of the credential refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "kind")]
pub enum FailureReason {
    /// The check call itself failed
    Bridge(FailureKind),
    /// The worker answered with an error status
    WorkerRejected,
    /// The worker no longer recognizes the session (expired or corrupt handle)
    InvalidSessionState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginFailure {
    pub reason: FailureReason,
    pub message: String,
}

/// One login attempt, handed back to the caller after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginSession {
    /// Challenge id (`qrid`)
    pub challenge_id: String,
    /// Opaque serialized client state owned by the worker
    pub client_handle: String,
    /// Endpoint the worker polls to learn the challenge state
    pub challenge_url: String,
    status: LoginStatus,
    last_polled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<Credentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<LoginFailure>,
}

impl LoginSession {
    pub fn new(
        challenge_id: impl Into<String>,
        client_handle: impl Into<String>,
        challenge_url: impl Into<String>,
    ) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            client_handle: client_handle.into(),
            challenge_url: challenge_url.into(),
            status: LoginStatus::Pending,
            last_polled_at: None,
            credentials: None,
            failure: None,
        }
    }

    pub fn status(&self) -> LoginStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn last_polled_at(&self) -> Option<DateTime<Utc>> {
        self.last_polled_at
    }

    /// Present only once the session has `Succeeded`
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Present only once the session has `Failed`
    pub fn failure(&self) -> Option<&LoginFailure> {
        self.failure.as_ref()
    }

    /// Stop polling this session. Terminal sessions are returned unchanged.
    #[must_use]
    pub fn cancel(mut self) -> Self {
        if !self.is_terminal() {
            self.status = LoginStatus::Cancelled;
        }
        self
    }

    /// Swap in credentials read back from the worker's persisted copy.
    /// Only a `Succeeded` session carries credentials, so any other status
    /// is returned unchanged.
    #[must_use]
    pub fn with_persisted_credentials(mut self, credentials: Credentials) -> Self {
        if self.status == LoginStatus::Succeeded {
            self.credentials = Some(credentials);
        }
        self
    }

    pub(crate) fn touch(mut self) -> Self {
        self.last_polled_at = Some(Utc::now());
        self
    }

    pub(crate) fn succeed(mut self, credentials: Credentials) -> Self {
        if !self.is_terminal() {
            self.status = LoginStatus::Succeeded;
            self.credentials = Some(credentials);
        }
        self
    }

    pub(crate) fn fail(mut self, reason: FailureReason, message: impl Into<String>) -> Self {
        if !self.is_terminal() {
            self.status = LoginStatus::Failed;
            self.failure = Some(LoginFailure {
                reason,
                message: message.into(),
            });
        }
        self
    }
}
