//! Process bridge for crawlgate
//!
//! One logical call becomes one worker process: the request is written to the
//! worker's stdin as a single UTF-8 JSON document, stdin is closed, and stdout
//! and stderr are read to completion concurrently. The call resolves to a
//! [`BridgeOutcome`]: either the decoded JSON value or a classified failure.
//!
//! The success rule is strict. A call succeeds only when the worker exits with
//! status zero, wrote nothing at all to stderr, and produced well-formed JSON
//! on stdout. Workers that need to report soft errors must put them inside
//! the JSON payload.
//!
//! ```no_run
//! use crawlgate_bridge::{ActionDelivery, BridgeRequest, ProcessBridge, WorkerProfile};
//! use serde_json::json;
//!
//! # async fn demo() -> crawlgate_core::Result<()> {
//! let profile = WorkerProfile::new("query", "python")
//!     .with_args(["analysisBridge.py"])
//!     .with_delivery(ActionDelivery::Argument);
//! let bridge = ProcessBridge::new(profile);
//!
//! let request = BridgeRequest::new("execute_query", json!({"collection": "list", "limit": 0}))?;
//! match bridge.invoke(&request).await.into_result() {
//!     Ok(rows) => println!("{rows}"),
//!     Err(failure) => eprintln!("{failure}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod encoding;
pub mod envelope;
pub mod executor;
pub mod options;
pub mod outcome;
pub mod profile;
pub mod request;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bridge::{classify, ProcessBridge};
pub use encoding::ChannelEncoding;
pub use envelope::{decode_stdout, DecodeMode};
pub use executor::{ExecError, LaunchSpec, RawOutput, SystemWorkerExecutor, WorkerExecutor};
pub use options::InvokeOptions;
pub use outcome::{BridgeFailure, BridgeOutcome, FailureKind};
pub use profile::{ActionDelivery, WorkerProfile};
pub use request::BridgeRequest;
