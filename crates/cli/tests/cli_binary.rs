//! Runs the `crawlgate` binary against `sh` workers

#![cfg(unix)]

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &TempDir, script_body: &str, args: &[&str], extra_env: &[(&str, &str)]) -> Output {
    let script = dir.path().join("worker.sh");
    fs::write(&script, format!("#!/bin/sh\n{script_body}\n")).unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_crawlgate"));
    command
        .args(args)
        .current_dir(dir.path())
        .env("CRAWLGATE_WORKER", "sh")
        .env("CRAWLGATE_QUERY_SCRIPT", &script)
        .env("CRAWLGATE_SEARCH_SCRIPT", &script)
        .env("CRAWLGATE_LOG_DIR", dir.path().join("logs"))
        .env("CRAWLGATE_LOG", "off")
        .env_remove("NODE_ENV")
        .env_remove("CRAWLGATE_PRODUCTION");
    for (key, value) in extra_env {
        command.env(key, value);
    }
    command.output().unwrap()
}

fn stdout_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn record_count(logs: &Path) -> usize {
    fs::read_dir(logs).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn test_query_prints_every_page() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        r#"cat > /dev/null; printf '[{"a":1},{"a":2},{"a":3}]'"#,
        &["query", "execute_query", "--page-size", "2", "--all"],
        &[],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let pages = stdout_lines(&output);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["page"]["records"], json!([{"a": 1}, {"a": 2}]));
    assert_eq!(pages[0]["page"]["total"], 3);
    assert_eq!(pages[1]["page"]["records"], json!([{"a": 3}]));
    assert_eq!(pages[0]["token"], pages[1]["token"]);
}

#[test]
fn test_failed_invoke_exits_nonzero_without_a_record() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        "cat > /dev/null; echo boom >&2; exit 1",
        &["invoke", "search", "list_search", "--params", r#"{"search_for":"rust"}"#],
        &[],
    );
    assert!(!output.status.success());

    let failure: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(failure["kind"], "non_zero_exit");
    assert_eq!(failure["diagnostic"], "boom");
    assert_eq!(record_count(&dir.path().join("logs")), 0);
}

#[test]
fn test_failed_query_writes_a_record() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        "cat > /dev/null; echo boom >&2; exit 1",
        &["query", "--profile", "search", "list_search"],
        &[],
    );
    assert!(!output.status.success());
    assert_eq!(record_count(&dir.path().join("logs")), 1);
}

#[test]
fn test_credentials_prints_saved_cookies() {
    let dir = TempDir::new().unwrap();
    let saved = dir.path().join("config.toml");
    let saved_env = saved.display().to_string();

    let output = run(&dir, "cat", &["credentials"], &[("CRAWLGATE_CREDENTIALS_FILE", &saved_env)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(serde_json::from_slice::<Value>(&output.stdout).unwrap(), Value::Null);

    fs::write(&saved, "[cookies]\nSUB = \"abc\"\n\n[cookies_info]\nupdate_time = \"2024-05-01 12:30:00\"\n").unwrap();
    let output = run(&dir, "cat", &["credentials"], &[("CRAWLGATE_CREDENTIALS_FILE", &saved_env)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed, json!({"cookies": {"SUB": "abc"}, "update_time": "2024-05-01 12:30:00"}));
}

#[test]
fn test_invalid_configuration_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        "cat",
        &["invoke", "query", "ping"],
        &[("CRAWLGATE_TIMEOUT_SECS", "soon")],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("CRAWLGATE_TIMEOUT_SECS"));
}
