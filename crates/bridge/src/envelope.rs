//! Stdout envelope decoding

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a worker's stdout is turned into a JSON value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// The whole of stdout is one JSON document
    #[default]
    Plain,
    /// Stdout starts with exactly one non-JSON banner line which is discarded.
    /// Output without any newline is treated entirely as data.
    SkipBanner,
}

/// Decode accumulated stdout according to `mode`.
pub fn decode_stdout(stdout: &str, mode: DecodeMode) -> Result<Value, serde_json::Error> {
    let body = match mode {
        DecodeMode::Plain => stdout,
        DecodeMode::SkipBanner => strip_banner(stdout),
    };
    serde_json::from_str(body)
}

fn strip_banner(stdout: &str) -> &str {
    match stdout.split_once('\n') {
        Some((_banner, rest)) => rest,
        None => stdout,
    }
}
