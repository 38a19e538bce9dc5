//! Worker launch profiles

use crate::options::InvokeOptions;
use crate::request::BridgeRequest;
use crawlgate_core::WorkerArguments;

/// How the action identifier reaches the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionDelivery {
    /// `worker <args> <action>`; stdin carries the bare params document
    #[default]
    Argument,
    /// `worker <args>`; stdin carries `{"action": ..., "params": ...}`
    Envelope,
    /// `worker <args>`; stdin carries the bare params document and the
    /// action is not transmitted (single-purpose workers)
    StdinOnly,
}

/// A configured recipe for launching one kind of worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerProfile {
    /// Short name used in logs and diagnostic records
    pub name: String,
    pub program: String,
    pub args: WorkerArguments,
    pub delivery: ActionDelivery,
    /// Defaults applied to every call made through this profile
    pub options: InvokeOptions,
}

impl WorkerProfile {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: WorkerArguments::new(),
            delivery: ActionDelivery::default(),
            options: InvokeOptions::default(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: impl Into<WorkerArguments>) -> Self {
        self.args = args.into();
        self
    }

    #[must_use]
    pub fn with_delivery(mut self, delivery: ActionDelivery) -> Self {
        self.delivery = delivery;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: InvokeOptions) -> Self {
        self.options = options;
        self
    }

    /// Launch arguments and stdin document for `request`
    pub fn wire_format(&self, request: &BridgeRequest) -> (WorkerArguments, Vec<u8>) {
        match self.delivery {
            ActionDelivery::Argument => (
                self.args.with_trailing(request.action().as_str()),
                request.params_document(),
            ),
            ActionDelivery::Envelope => (self.args.clone(), request.envelope_document()),
            ActionDelivery::StdinOnly => (self.args.clone(), request.params_document()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn request() -> BridgeRequest {
        BridgeRequest::new("execute_query", json!({"collection": "list", "limit": 5})).unwrap()
    }

    #[test]
    fn test_argument_delivery_appends_action() {
        let profile = WorkerProfile::new("query", "python").with_args(["analysisBridge.py"]);
        let (args, stdin) = profile.wire_format(&request());
        assert_eq!(args.as_slice(), ["analysisBridge.py", "execute_query"]);
        let params: Value = serde_json::from_slice(&stdin).unwrap();
        assert_eq!(params, json!({"collection": "list", "limit": 5}));
    }

    #[test]
    fn test_envelope_delivery_wraps_params() {
        let profile = WorkerProfile::new("login", "python")
            .with_args(["cookieBridge.py"])
            .with_delivery(ActionDelivery::Envelope);
        let (args, stdin) = profile.wire_format(&request());
        assert_eq!(args.as_slice(), ["cookieBridge.py"]);
        let envelope: Value = serde_json::from_slice(&stdin).unwrap();
        assert_eq!(envelope["action"], "execute_query");
        assert_eq!(envelope["params"]["limit"], 5);
    }

    #[test]
    fn test_stdin_only_delivery_drops_action() {
        let profile = WorkerProfile::new("search", "python")
            .with_args(["listSearchBridge.py"])
            .with_delivery(ActionDelivery::StdinOnly);
        let (args, stdin) = profile.wire_format(&request());
        assert_eq!(args.as_slice(), ["listSearchBridge.py"]);
        let params: Value = serde_json::from_slice(&stdin).unwrap();
        assert!(params.get("action").is_none());
    }
}
