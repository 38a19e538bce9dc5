//! Scripted executor for tests
//!
//! Responses are consumed in order, one per call. Every call is recorded so
//! tests can assert on the launch arguments and stdin document.

use crate::executor::{ExecError, LaunchSpec, RawOutput, WorkerExecutor};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// A call observed by [`ScriptedExecutor`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub spec: LaunchSpec,
    pub stdin: Vec<u8>,
}

impl RecordedCall {
    /// Stdin parsed as JSON
    pub fn stdin_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.stdin).unwrap_or(serde_json::Value::Null)
    }
}

enum Scripted {
    Output(RawOutput),
    Launch(io::ErrorKind),
    Timeout {
        elapsed: Duration,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    Channel(io::ErrorKind),
}

#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_output(&self, output: RawOutput) {
        self.responses.lock().push_back(Scripted::Output(output));
    }

    /// Queue a clean exit whose stdout is `value`
    pub fn push_json(&self, value: serde_json::Value) {
        self.push_output(RawOutput::new(Some(0), value.to_string(), ""));
    }

    pub fn push_launch_error(&self, kind: io::ErrorKind) {
        self.responses.lock().push_back(Scripted::Launch(kind));
    }

    pub fn push_timeout(&self, elapsed: Duration, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) {
        self.responses.lock().push_back(Scripted::Timeout {
            elapsed,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }

    pub fn push_channel_error(&self, kind: io::ErrorKind) {
        self.responses.lock().push_back(Scripted::Channel(kind));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call(&self, index: usize) -> Option<RecordedCall> {
        self.calls.lock().get(index).cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl WorkerExecutor for ScriptedExecutor {
    async fn run(&self, spec: &LaunchSpec, stdin: Vec<u8>) -> Result<RawOutput, ExecError> {
        self.calls.lock().push(RecordedCall {
            spec: spec.clone(),
            stdin,
        });
        let next = self.responses.lock().pop_front();
        match next {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::Launch(kind)) => Err(ExecError::Launch(io::Error::from(kind))),
            Some(Scripted::Timeout {
                elapsed,
                stdout,
                stderr,
            }) => Err(ExecError::Timeout {
                elapsed,
                stdout,
                stderr,
            }),
            Some(Scripted::Channel(kind)) => Err(ExecError::Channel(io::Error::from(kind))),
            None => Err(ExecError::Launch(io::Error::new(
                io::ErrorKind::Other,
                "no scripted response left",
            ))),
        }
    }
}
