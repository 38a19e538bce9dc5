//! QR-code login sessions
//!
//! A login is a small state machine driven entirely through a login worker:
//!
//! ```text
//! start() ──► Pending ──poll()──► Succeeded
//!               │   ▲              Failed
//!               │   └─ pending     Cancelled ◄── cancel()
//! ```
//!
//! Sessions are plain values handed back to the caller after every
//! transition; nothing is persisted here. The worker itself persists the
//! cookies of the last successful login, which `read_persisted_credentials`
//! reads back. Terminal sessions never change and
//! polling them makes no worker call.

mod challenge;
mod errors;
mod flow;
mod persisted;
mod poll;
mod session;

pub use challenge::LoginChallenge;
pub use errors::{CredentialFileError, LoginError, Result};
pub use flow::LoginFlow;
pub use persisted::read_persisted_credentials;
pub use poll::poll_until_terminal;
pub use session::{Credentials, FailureReason, LoginFailure, LoginSession, LoginStatus};
