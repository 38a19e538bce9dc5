//! Fixed-interval polling of a login session until it settles

use crate::flow::LoginFlow;
use crate::session::LoginSession;
use std::time::Duration;
use tokio::time::Instant;

/// Poll `session` every `interval` until it is terminal, giving up after
/// `give_up_after` by cancelling it.
///
/// The first poll happens immediately.
pub async fn poll_until_terminal(
    flow: &LoginFlow,
    mut session: LoginSession,
    interval: Duration,
    give_up_after: Duration,
) -> LoginSession {
    let deadline = Instant::now() + give_up_after;
    loop {
        session = flow.poll(session).await;
        if session.is_terminal() {
            return session;
        }
        if Instant::now() >= deadline {
            tracing::info!(qrid = %session.challenge_id, "login not completed in time; cancelling");
            return flow.cancel(session);
        }
        tokio::time::sleep(interval).await;
    }
}
