//! The login state machine

use crate::challenge::LoginChallenge;
use crate::errors::Result;
use crate::session::{Credentials, FailureReason, LoginSession};
use crawlgate_bridge::{BridgeOutcome, BridgeRequest, ProcessBridge};
use crawlgate_core::{BEGIN_LOGIN_ACTION, CHECK_LOGIN_ACTION};
use serde_json::{json, Value};

/// Worker message prefix for a client handle it cannot rebuild
const INVALID_SESSION_PREFIX: &str = "会话无效";

/// Drives QR-code logins through a login worker.
///
/// The flow holds no session state of its own; every transition takes a
/// session and returns the next one. Pacing and give-up policy belong to
/// the caller (see [`poll_until_terminal`](crate::poll_until_terminal)).
#[derive(Debug, Clone)]
pub struct LoginFlow {
    bridge: ProcessBridge,
}

impl LoginFlow {
    pub fn new(bridge: ProcessBridge) -> Self {
        Self { bridge }
    }

    /// Ask the worker for a new challenge. No session exists on failure.
    pub async fn start(&self) -> Result<(LoginChallenge, LoginSession)> {
        let request = BridgeRequest::without_params(BEGIN_LOGIN_ACTION)?;
        let payload = self.bridge.invoke_checked(&request).await.into_result()?;
        let challenge = LoginChallenge::from_payload(&payload)?;
        let session = LoginSession::new(
            challenge.qrid.clone(),
            challenge.client.clone(),
            challenge.login_signin_url.clone(),
        );
        tracing::info!(qrid = %session.challenge_id, "login challenge issued");
        Ok((challenge, session))
    }

    /// Check a session once. Terminal sessions are returned without a worker call.
    pub async fn poll(&self, session: LoginSession) -> LoginSession {
        if session.is_terminal() {
            return session;
        }

        let params = json!({
            "client": session.client_handle,
            "login_signin_url": session.challenge_url,
            "qrid": session.challenge_id,
        });
        let request = match BridgeRequest::new(CHECK_LOGIN_ACTION, params) {
            Ok(request) => request,
            Err(e) => return session.touch().fail(FailureReason::WorkerRejected, e.to_string()),
        };

        let session = session.touch();
        let next = match self.bridge.invoke(&request).await {
            BridgeOutcome::Success(payload) => apply_status(session, &payload),
            BridgeOutcome::Failure(failure) => {
                session.fail(FailureReason::Bridge(failure.kind), failure.diagnostic)
            }
        };

        if next.is_terminal() {
            tracing::info!(qrid = %next.challenge_id, status = %next.status(), "login finished");
        } else {
            tracing::debug!(qrid = %next.challenge_id, "login still pending");
        }
        next
    }

    /// Stop polling a session; no worker call is made.
    pub fn cancel(&self, session: LoginSession) -> LoginSession {
        session.cancel()
    }
}

fn apply_status(session: LoginSession, payload: &Value) -> LoginSession {
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match payload.get("status").and_then(Value::as_str) {
        Some("pending") => session,
        Some("success") => session.succeed(Credentials {
            cookies: payload.get("cookies").cloned().unwrap_or(Value::Null),
            update_time: payload
                .get("update_time")
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        Some("invalid_session" | "expired") => {
            session.fail(FailureReason::InvalidSessionState, message)
        }
        Some("error") if message.starts_with(INVALID_SESSION_PREFIX) => {
            session.fail(FailureReason::InvalidSessionState, message)
        }
        Some("error") => session.fail(FailureReason::WorkerRejected, message),
        Some(other) if message.is_empty() => session.fail(
            FailureReason::WorkerRejected,
            format!("unrecognized login status '{other}'"),
        ),
        Some(_) => session.fail(FailureReason::WorkerRejected, message),
        None => session.fail(
            FailureReason::WorkerRejected,
            "login check returned no status",
        ),
    }
}
