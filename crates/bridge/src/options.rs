//! Per-invocation options

use crate::encoding::ChannelEncoding;
use crate::envelope::DecodeMode;
use crawlgate_core::EnvironmentVariables;
use std::path::PathBuf;
use std::time::Duration;

/// Options applied to one worker call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokeOptions {
    /// Working directory for the worker; inherits the gateway's when `None`
    pub working_dir: Option<PathBuf>,
    /// Extra environment bindings layered over the inherited environment
    pub env: EnvironmentVariables,
    /// Deadline for the whole call; the worker is killed when it elapses
    pub timeout: Option<Duration>,
    pub decode_mode: DecodeMode,
    pub stdout_encoding: ChannelEncoding,
    pub stderr_encoding: ChannelEncoding,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    #[must_use]
    pub fn with_stdout_encoding(mut self, encoding: ChannelEncoding) -> Self {
        self.stdout_encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_stderr_encoding(mut self, encoding: ChannelEncoding) -> Self {
        self.stderr_encoding = encoding;
        self
    }
}
