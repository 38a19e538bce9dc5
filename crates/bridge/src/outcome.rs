//! Bridge outcome and failure taxonomy

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Why a worker call did not produce a usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The process could not be started (missing executable, permissions)
    LaunchFailure,
    /// The process exited with a nonzero status or was killed by a signal
    NonZeroExit,
    /// The process wrote to stderr; treated as failure even on exit zero
    DiagnosticOutputPresent,
    /// Stdout was not a well-formed JSON document
    DecodeFailure,
    /// The call exceeded its deadline and the process was killed
    Timeout,
    /// The worker returned `{"status": "error", ...}` in its payload
    WorkerReportedError,
    /// Reading or writing a pipe failed after a successful launch
    ChannelFailure,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::LaunchFailure => "launch_failure",
            FailureKind::NonZeroExit => "non_zero_exit",
            FailureKind::DiagnosticOutputPresent => "diagnostic_output_present",
            FailureKind::DecodeFailure => "decode_failure",
            FailureKind::Timeout => "timeout",
            FailureKind::WorkerReportedError => "worker_reported_error",
            FailureKind::ChannelFailure => "channel_failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified worker failure with everything captured for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind}: {diagnostic}")]
pub struct BridgeFailure {
    pub kind: FailureKind,
    /// Decoded stderr when the worker wrote any, otherwise a description of
    /// the rule that was violated
    pub diagnostic: String,
    /// Decoded stdout, kept verbatim
    pub stdout: String,
    /// Decoded stderr, kept verbatim
    pub stderr: String,
    /// `None` when the worker never exited normally (launch failure, signal, timeout)
    pub exit_code: Option<i32>,
}

impl BridgeFailure {
    pub fn new(kind: FailureKind, diagnostic: impl Into<String>) -> Self {
        Self {
            kind,
            diagnostic: diagnostic.into(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
        }
    }

    #[must_use]
    pub fn with_streams(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    #[must_use]
    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Multi-line report suitable for a diagnostic record
    pub fn report(&self) -> String {
        let exit = self
            .exit_code
            .map_or_else(|| "none".to_string(), |code| code.to_string());
        format!(
            "Kind: {}\nExit code: {}\nDiagnostic: {}\nStderr: {}\nStdout: {}",
            self.kind, exit, self.diagnostic, self.stderr, self.stdout
        )
    }
}

/// Result of one worker call. Exactly one variant; never partially successful.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeOutcome {
    Success(Value),
    Failure(BridgeFailure),
}

impl BridgeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BridgeOutcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            BridgeOutcome::Success(_) => None,
            BridgeOutcome::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn into_result(self) -> Result<Value, BridgeFailure> {
        match self {
            BridgeOutcome::Success(value) => Ok(value),
            BridgeOutcome::Failure(failure) => Err(failure),
        }
    }

    /// Turn a successful payload of the form `{"status": "error", "message": ...}`
    /// into a [`FailureKind::WorkerReportedError`].
    ///
    /// Only the top-level `status` field is inspected; payload text is never
    /// searched for error-like substrings.
    #[must_use]
    pub fn reject_reported_errors(self) -> Self {
        match self {
            BridgeOutcome::Success(value) if reported_error(&value) => {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("worker reported an error without a message")
                    .to_string();
                BridgeOutcome::Failure(
                    BridgeFailure::new(FailureKind::WorkerReportedError, message)
                        .with_streams(value.to_string(), String::new())
                        .with_exit_code(Some(0)),
                )
            }
            other => other,
        }
    }
}

fn reported_error(value: &Value) -> bool {
    value.get("status").and_then(Value::as_str) == Some("error")
}

impl From<BridgeFailure> for BridgeOutcome {
    fn from(failure: BridgeFailure) -> Self {
        BridgeOutcome::Failure(failure)
    }
}
