//! End-to-end tests against real `sh` workers

#![cfg(unix)]

use crawlgate_bridge::{
    ActionDelivery, BridgeRequest, ChannelEncoding, DecodeMode, FailureKind, InvokeOptions,
    ProcessBridge, WorkerProfile,
};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn write_worker(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    path
}

fn sh_bridge(script: &PathBuf, delivery: ActionDelivery) -> ProcessBridge {
    let profile = WorkerProfile::new("test", "sh")
        .with_args(vec![script.display().to_string()])
        .with_delivery(delivery);
    ProcessBridge::new(profile)
}

#[tokio::test]
async fn test_params_reach_worker_stdin() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "echo.sh", "cat");
    let bridge = sh_bridge(&script, ActionDelivery::StdinOnly);

    let params = json!({"keyword": "综合", "limit": 20});
    let request = BridgeRequest::new("list_search", params.clone()).unwrap();
    let value = bridge.invoke(&request).await.into_result().unwrap();
    assert_eq!(value, params);
}

#[tokio::test]
async fn test_action_is_passed_as_last_argument() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "action.sh", r#"cat > /dev/null; printf '{"action":"%s"}' "$1""#);
    let bridge = sh_bridge(&script, ActionDelivery::Argument);

    let request = BridgeRequest::without_params("get_collections").unwrap();
    let value = bridge.invoke(&request).await.into_result().unwrap();
    assert_eq!(value, json!({"action": "get_collections"}));
}

#[tokio::test]
async fn test_envelope_delivery() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "envelope.sh", "cat");
    let bridge = sh_bridge(&script, ActionDelivery::Envelope);

    let request = BridgeRequest::new("check_login", json!({"qrid": "q-1"})).unwrap();
    let value = bridge.invoke(&request).await.into_result().unwrap();
    assert_eq!(value, json!({"action": "check_login", "params": {"qrid": "q-1"}}));
}

#[tokio::test]
async fn test_stderr_on_clean_exit_is_failure() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "warn.sh", "echo '{}'; echo 'UserWarning: slow path' >&2");
    let bridge = sh_bridge(&script, ActionDelivery::Argument);

    let request = BridgeRequest::without_params("get_collections").unwrap();
    let failure = bridge.invoke(&request).await.into_result().unwrap_err();
    assert_eq!(failure.kind, FailureKind::DiagnosticOutputPresent);
    assert_eq!(failure.diagnostic, "UserWarning: slow path");
    assert_eq!(failure.exit_code, Some(0));
    assert_eq!(failure.stdout.trim(), "{}");
}

#[tokio::test]
async fn test_nonzero_exit_reports_stderr() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "boom.sh", r#"echo '{"ok":true}'; echo boom >&2; exit 1"#);
    let bridge = sh_bridge(&script, ActionDelivery::Argument);

    let request = BridgeRequest::without_params("execute_query").unwrap();
    let failure = bridge.invoke(&request).await.into_result().unwrap_err();
    assert_eq!(failure.kind, FailureKind::NonZeroExit);
    assert_eq!(failure.diagnostic, "boom");
    assert_eq!(failure.exit_code, Some(1));
}

#[tokio::test]
async fn test_missing_executable_is_launch_failure() {
    let profile = WorkerProfile::new("test", "/nonexistent/crawlgate-worker");
    let bridge = ProcessBridge::new(profile);

    let request = BridgeRequest::without_params("get_collections").unwrap();
    let failure = bridge.invoke(&request).await.into_result().unwrap_err();
    assert_eq!(failure.kind, FailureKind::LaunchFailure);
    assert!(failure.diagnostic.contains("/nonexistent/crawlgate-worker"));
}

#[tokio::test]
async fn test_slow_worker_times_out() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("worker.pid");
    let script = write_worker(
        &dir,
        "slow.sh",
        &format!("echo $$ > '{}'; printf 'started'; exec sleep 10", pid_file.display()),
    );
    let bridge = sh_bridge(&script, ActionDelivery::Argument);

    let request = BridgeRequest::without_params("execute_query").unwrap();
    let options = InvokeOptions::new().with_timeout(Some(Duration::from_millis(300)));
    let started = std::time::Instant::now();
    let failure = bridge.invoke_with(&request, &options).await.into_result().unwrap_err();

    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(5));

    let pid = fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(!alive.success(), "worker {} still running after timeout", pid.trim());
}

#[tokio::test]
async fn test_banner_line_is_skipped() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "banner.sh", r#"echo 'Loading jieba model'; echo '{"score": 3}'"#);
    let bridge = sh_bridge(&script, ActionDelivery::Argument);

    let request = BridgeRequest::without_params("analyze").unwrap();
    let plain = bridge.invoke(&request).await;
    assert_eq!(plain.failure_kind(), Some(FailureKind::DecodeFailure));

    let options = InvokeOptions::new().with_decode_mode(DecodeMode::SkipBanner);
    let value = bridge.invoke_with(&request, &options).await.into_result().unwrap();
    assert_eq!(value, json!({"score": 3}));
}

#[tokio::test]
async fn test_gbk_stderr_is_decoded() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "gbk.sh", r"printf '\326\320\316\304' >&2; exit 2");
    let bridge = sh_bridge(&script, ActionDelivery::Argument);

    let request = BridgeRequest::without_params("analyze").unwrap();
    let options = InvokeOptions::new().with_stderr_encoding(ChannelEncoding::gbk());
    let failure = bridge.invoke_with(&request, &options).await.into_result().unwrap_err();
    assert_eq!(failure.kind, FailureKind::NonZeroExit);
    assert_eq!(failure.diagnostic, "中文");
}

#[tokio::test]
async fn test_large_payload_does_not_deadlock() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "echo.sh", "cat");
    let bridge = sh_bridge(&script, ActionDelivery::StdinOnly);

    let blob = "x".repeat(1 << 20);
    let request = BridgeRequest::new("list_search", json!({"blob": blob})).unwrap();
    let options = InvokeOptions::new().with_timeout(Some(Duration::from_secs(30)));
    let value = bridge.invoke_with(&request, &options).await.into_result().unwrap();
    assert_eq!(value["blob"].as_str().map(str::len), Some(1 << 20));
}

#[tokio::test]
async fn test_worker_ignoring_stdin_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let script = write_worker(&dir, "ignore.sh", "echo '[]'");
    let bridge = sh_bridge(&script, ActionDelivery::StdinOnly);

    let blob = "y".repeat(1 << 20);
    let request = BridgeRequest::new("list_search", json!({"blob": blob})).unwrap();
    let value = bridge.invoke(&request).await.into_result().unwrap();
    assert_eq!(value, json!([]));
}

#[tokio::test]
async fn test_working_dir_and_env_are_applied() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("fixture.json"), r#"{"from": "fixture"}"#).unwrap();
    let script = write_worker(
        &dir,
        "env.sh",
        r#"cat > /dev/null; printf '{"flag":"%s","file":%s}' "$CRAWLGATE_TEST_FLAG" "$(cat fixture.json)""#,
    );
    let bridge = sh_bridge(&script, ActionDelivery::Argument);

    let request = BridgeRequest::without_params("probe").unwrap();
    let options = InvokeOptions::new()
        .with_working_dir(dir.path())
        .with_env("CRAWLGATE_TEST_FLAG", "on");
    let value = bridge.invoke_with(&request, &options).await.into_result().unwrap();
    assert_eq!(value, json!({"flag": "on", "file": {"from": "fixture"}}));
}
