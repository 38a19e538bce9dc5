//! Launch arguments for worker processes

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Fixed arguments a worker is launched with (typically the script path).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerArguments(Vec<String>);

impl WorkerArguments {
    /// Create new empty arguments
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create from a vector of strings
    #[must_use]
    pub fn from_vec(args: Vec<String>) -> Self {
        Self(args)
    }

    /// Add an argument
    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// Return a copy with one more trailing argument
    #[must_use]
    pub fn with_trailing(&self, arg: impl Into<String>) -> Self {
        let mut args = self.clone();
        args.push(arg);
        args
    }

    /// Get a slice of the arguments
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Deref for WorkerArguments {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for WorkerArguments {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl<const N: usize> From<[&str; N]> for WorkerArguments {
    fn from(args: [&str; N]) -> Self {
        Self(args.iter().map(|s| (*s).to_string()).collect())
    }
}
