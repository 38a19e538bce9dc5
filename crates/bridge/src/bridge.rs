//! Request/response bridge over one worker process per call

use crate::envelope::decode_stdout;
use crate::executor::{ExecError, LaunchSpec, RawOutput, SystemWorkerExecutor, WorkerExecutor};
use crate::options::InvokeOptions;
use crate::outcome::{BridgeFailure, BridgeOutcome, FailureKind};
use crate::profile::WorkerProfile;
use crate::request::BridgeRequest;
use std::sync::Arc;

/// Invokes one configured worker.
///
/// Cloning is cheap; every clone shares the same executor. Each call owns
/// its own process, pipes and buffers, so calls may run concurrently.
#[derive(Clone)]
pub struct ProcessBridge {
    profile: Arc<WorkerProfile>,
    executor: Arc<dyn WorkerExecutor>,
}

impl std::fmt::Debug for ProcessBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessBridge")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl ProcessBridge {
    /// Bridge that spawns real processes
    pub fn new(profile: WorkerProfile) -> Self {
        Self::with_executor(profile, Arc::new(SystemWorkerExecutor::new()))
    }

    pub fn with_executor(profile: WorkerProfile, executor: Arc<dyn WorkerExecutor>) -> Self {
        Self {
            profile: Arc::new(profile),
            executor,
        }
    }

    pub fn profile(&self) -> &WorkerProfile {
        &self.profile
    }

    /// Call the worker with the profile's default options.
    pub async fn invoke(&self, request: &BridgeRequest) -> BridgeOutcome {
        self.execute(request, &self.profile.options).await
    }

    /// Call the worker with per-call options.
    ///
    /// Decode mode and encodings are taken from `options`. Working directory
    /// and timeout fall back to the profile's when unset, and `options.env`
    /// is layered over the profile's environment.
    pub async fn invoke_with(&self, request: &BridgeRequest, options: &InvokeOptions) -> BridgeOutcome {
        let base = &self.profile.options;
        let mut env = base.env.clone();
        env.merge(&options.env);
        let effective = InvokeOptions {
            working_dir: options.working_dir.clone().or_else(|| base.working_dir.clone()),
            env,
            timeout: options.timeout.or(base.timeout),
            ..options.clone()
        };
        self.execute(request, &effective).await
    }

    /// [`invoke`](Self::invoke), then reject payloads carrying `"status": "error"`.
    pub async fn invoke_checked(&self, request: &BridgeRequest) -> BridgeOutcome {
        self.invoke(request).await.reject_reported_errors()
    }

    #[tracing::instrument(
        name = "bridge_invoke",
        skip_all,
        fields(worker = %self.profile.name, action = %request.action())
    )]
    async fn execute(&self, request: &BridgeRequest, options: &InvokeOptions) -> BridgeOutcome {
        let (args, stdin) = self.profile.wire_format(request);
        let spec = LaunchSpec {
            program: self.profile.program.clone(),
            args,
            working_dir: options.working_dir.clone(),
            env: options.env.clone(),
            timeout: options.timeout,
        };

        let outcome = match self.executor.run(&spec, stdin).await {
            Ok(raw) => classify(&raw, options),
            Err(e) => exec_failure(&spec, e, options).into(),
        };

        match &outcome {
            BridgeOutcome::Success(_) => tracing::debug!("worker call succeeded"),
            BridgeOutcome::Failure(failure) => tracing::warn!(
                kind = %failure.kind,
                exit_code = ?failure.exit_code,
                diagnostic = %failure.diagnostic,
                "worker call failed"
            ),
        }
        outcome
    }
}

/// Apply the success rule to a completed worker run.
///
/// Success requires exit status zero, an empty stderr and well-formed JSON on
/// stdout. When several rules are violated the exit status wins over stderr,
/// and stderr wins over stdout decoding.
pub fn classify(raw: &RawOutput, options: &InvokeOptions) -> BridgeOutcome {
    let stdout = options.stdout_encoding.decode(&raw.stdout);
    let stderr = options.stderr_encoding.decode(&raw.stderr);
    let diagnostic_or = |rule: String| {
        let trimmed = stderr.trim_end();
        if trimmed.is_empty() {
            rule
        } else {
            trimmed.to_string()
        }
    };

    let violated = match raw.exit_code {
        Some(0) => None,
        Some(code) => Some((
            FailureKind::NonZeroExit,
            diagnostic_or(format!("worker exited with status {code}")),
        )),
        None => Some((
            FailureKind::NonZeroExit,
            diagnostic_or("worker was terminated by a signal".to_string()),
        )),
    };

    let violated = violated.or_else(|| {
        (!raw.stderr.is_empty()).then(|| {
            (
                FailureKind::DiagnosticOutputPresent,
                diagnostic_or("worker wrote to stderr".to_string()),
            )
        })
    });

    let violated = match violated {
        Some(v) => v,
        None => match decode_stdout(&stdout, options.decode_mode) {
            Ok(value) => return BridgeOutcome::Success(value),
            Err(e) => (
                FailureKind::DecodeFailure,
                format!("worker stdout is not valid JSON: {e}"),
            ),
        },
    };

    let (kind, diagnostic) = violated;
    BridgeFailure::new(kind, diagnostic)
        .with_streams(stdout, stderr)
        .with_exit_code(raw.exit_code)
        .into()
}

fn exec_failure(spec: &LaunchSpec, error: ExecError, options: &InvokeOptions) -> BridgeFailure {
    match error {
        ExecError::Launch(e) => BridgeFailure::new(
            FailureKind::LaunchFailure,
            format!("failed to launch worker '{}': {e}", spec.program),
        ),
        ExecError::Timeout {
            elapsed,
            stdout,
            stderr,
        } => {
            let stdout = options.stdout_encoding.decode(&stdout);
            let stderr = options.stderr_encoding.decode(&stderr);
            let trimmed = stderr.trim_end();
            let diagnostic = if trimmed.is_empty() {
                format!("worker did not finish within {:.1}s", elapsed.as_secs_f64())
            } else {
                trimmed.to_string()
            };
            BridgeFailure::new(FailureKind::Timeout, diagnostic).with_streams(stdout, stderr)
        }
        ExecError::Channel(e) => {
            BridgeFailure::new(FailureKind::ChannelFailure, format!("worker pipe failed: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ChannelEncoding;
    use crate::envelope::DecodeMode;
    use crate::profile::ActionDelivery;
    use crate::testing::ScriptedExecutor;
    use serde_json::json;
    use std::time::Duration;

    fn options() -> InvokeOptions {
        InvokeOptions::default()
    }

    #[test]
    fn test_clean_run_is_success() {
        let raw = RawOutput::new(Some(0), r#"{"rows": [1, 2]}"#, "");
        assert_eq!(
            classify(&raw, &options()),
            BridgeOutcome::Success(json!({"rows": [1, 2]}))
        );
    }

    #[test]
    fn test_stderr_fails_even_with_valid_output() {
        let raw = RawOutput::new(Some(0), "{}", "DeprecationWarning: something\n");
        let failure = classify(&raw, &options()).into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::DiagnosticOutputPresent);
        assert_eq!(failure.diagnostic, "DeprecationWarning: something");
        assert_eq!(failure.stdout, "{}");
    }

    #[test]
    fn test_nonzero_exit_outranks_stderr_and_stdout() {
        let raw = RawOutput::new(Some(1), r#"{"ok": true}"#, "boom");
        let failure = classify(&raw, &options()).into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::NonZeroExit);
        assert_eq!(failure.diagnostic, "boom");
        assert_eq!(failure.exit_code, Some(1));
    }

    #[test]
    fn test_nonzero_exit_without_stderr_describes_rule() {
        let raw = RawOutput::new(Some(3), "", "");
        let failure = classify(&raw, &options()).into_result().unwrap_err();
        assert_eq!(failure.diagnostic, "worker exited with status 3");
    }

    #[test]
    fn test_signal_exit_is_nonzero() {
        let raw = RawOutput::new(None, "{}", "");
        assert_eq!(
            classify(&raw, &options()).failure_kind(),
            Some(FailureKind::NonZeroExit)
        );
    }

    #[test]
    fn test_malformed_stdout_is_decode_failure() {
        let raw = RawOutput::new(Some(0), "not json", "");
        let failure = classify(&raw, &options()).into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::DecodeFailure);
        assert_eq!(failure.stdout, "not json");
    }

    #[test]
    fn test_banner_mode_applies_during_classification() {
        let raw = RawOutput::new(Some(0), "Loading...\n[1]", "");
        let opts = options().with_decode_mode(DecodeMode::SkipBanner);
        assert_eq!(classify(&raw, &opts), BridgeOutcome::Success(json!([1])));
    }

    #[test]
    fn test_gbk_stderr_is_decoded_into_diagnostic() {
        let raw = RawOutput::new(Some(1), "", vec![0xD6, 0xD0, 0xCE, 0xC4]);
        let opts = options().with_stderr_encoding(ChannelEncoding::gbk());
        let failure = classify(&raw, &opts).into_result().unwrap_err();
        assert_eq!(failure.diagnostic, "中文");
    }

    #[tokio::test]
    async fn test_invoke_uses_profile_wire_format() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.push_output(RawOutput::new(Some(0), r#"{"status": "ok"}"#, ""));
        let profile = WorkerProfile::new("query", "python")
            .with_args(["analysisBridge.py"])
            .with_delivery(ActionDelivery::Argument);
        let bridge = ProcessBridge::with_executor(profile, executor.clone());

        let request = BridgeRequest::new("get_collections", ()).unwrap();
        assert!(bridge.invoke(&request).await.is_success());

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].spec.args.as_slice(), ["analysisBridge.py", "get_collections"]);
        assert_eq!(calls[0].stdin, b"{}");
    }

    #[tokio::test]
    async fn test_invoke_with_layers_env_and_keeps_profile_timeout() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.push_output(RawOutput::new(Some(0), "{}", ""));
        let profile = WorkerProfile::new("search", "python").with_options(
            InvokeOptions::new()
                .with_env("PYTHONUTF8", "1")
                .with_timeout(Some(Duration::from_secs(30))),
        );
        let bridge = ProcessBridge::with_executor(profile, executor.clone());

        let request = BridgeRequest::without_params("list_search").unwrap();
        let call_options = InvokeOptions::new().with_env("PYTHONPATH", "/opt/workers");
        bridge.invoke_with(&request, &call_options).await;

        let spec = executor.call(0).unwrap().spec;
        assert_eq!(spec.env.get("PYTHONUTF8").map(String::as_str), Some("1"));
        assert_eq!(spec.env.get("PYTHONPATH").map(String::as_str), Some("/opt/workers"));
        assert_eq!(spec.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_invoke_checked_rejects_status_error() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.push_output(RawOutput::new(
            Some(0),
            r#"{"status": "error", "message": "collection not found"}"#,
            "",
        ));
        let bridge = ProcessBridge::with_executor(WorkerProfile::new("query", "python"), executor);

        let request = BridgeRequest::without_params("get_collection_data").unwrap();
        let failure = bridge.invoke_checked(&request).await.into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::WorkerReportedError);
        assert_eq!(failure.diagnostic, "collection not found");
    }

    #[tokio::test]
    async fn test_executor_errors_are_classified() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.push_launch_error(std::io::ErrorKind::NotFound);
        executor.push_timeout(Duration::from_secs(5), "partial", "");
        let bridge = ProcessBridge::with_executor(WorkerProfile::new("query", "missing-python"), executor);
        let request = BridgeRequest::without_params("get_collections").unwrap();

        let launch = bridge.invoke(&request).await.into_result().unwrap_err();
        assert_eq!(launch.kind, FailureKind::LaunchFailure);
        assert!(launch.diagnostic.contains("missing-python"));

        let timeout = bridge.invoke(&request).await.into_result().unwrap_err();
        assert_eq!(timeout.kind, FailureKind::Timeout);
        assert_eq!(timeout.stdout, "partial");
    }

    #[tokio::test]
    async fn test_broken_pipe_is_channel_failure() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.push_channel_error(std::io::ErrorKind::BrokenPipe);
        let bridge = ProcessBridge::with_executor(WorkerProfile::new("query", "python"), executor);
        let request = BridgeRequest::new("execute_query", json!({"limit": 5})).unwrap();

        let failure = bridge.invoke(&request).await.into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::ChannelFailure);
        assert!(failure.diagnostic.starts_with("worker pipe failed"));
        assert_eq!(failure.exit_code, None);
    }
}
