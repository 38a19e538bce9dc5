//! Resolved gateway configuration
//!
//! `GatewayConfig` is the single source of truth for how workers are
//! launched, how long result sets live, and where diagnostic records go.
//! It is immutable after loading and cheap to clone.

use crawlgate_bridge::{ActionDelivery, ChannelEncoding, DecodeMode, InvokeOptions, WorkerProfile};
use crawlgate_cache::CacheConfig;
use crawlgate_core::{
    EnvironmentVariables, Error, WorkerArguments, WORKER_IO_ENCODING_VAR,
    WORKER_PATH_PASSTHROUGH_VAR, WORKER_UTF8_MODE_VAR,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// The kinds of work delegated to workers, one profile each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workload {
    /// Collection listing, queries and sentiment analysis
    Query,
    /// List search against the external site
    Search,
    /// QR-code login
    Login,
}

impl Workload {
    pub const ALL: [Workload; 3] = [Workload::Query, Workload::Search, Workload::Login];

    pub fn as_str(self) -> &'static str {
        match self {
            Workload::Query => "query",
            Workload::Search => "search",
            Workload::Login => "login",
        }
    }

    /// How the action reaches this workload's worker
    pub fn delivery(self) -> ActionDelivery {
        match self {
            Workload::Query => ActionDelivery::Argument,
            Workload::Search => ActionDelivery::StdinOnly,
            Workload::Login => ActionDelivery::Envelope,
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" | "analysis" => Ok(Workload::Query),
            "search" | "list-search" => Ok(Workload::Search),
            "login" | "cookie" => Ok(Workload::Login),
            other => Err(Error::invalid_input(
                "workload",
                format!("unknown workload '{other}' (expected query, search or login)"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Worker executable, e.g. a Python interpreter
    pub worker_program: String,
    /// Working directory for every worker; inherited when `None`
    pub worker_dir: Option<PathBuf>,
    pub query_script: PathBuf,
    pub search_script: PathBuf,
    pub login_script: PathBuf,
    /// TOML file where the login worker persists the latest cookies
    pub credentials_file: PathBuf,
    /// Passed to workers as `PYTHONPATH`, unmodified
    pub worker_path: Option<String>,
    /// Per-call deadline; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub stdout_encoding: ChannelEncoding,
    pub stderr_encoding: ChannelEncoding,
    pub cache: CacheConfig,
    pub log_dir: PathBuf,
    pub log_retention: Duration,
    /// Replace failure details with generic public messages
    pub production: bool,
}

impl GatewayConfig {
    pub fn script(&self, workload: Workload) -> &PathBuf {
        match workload {
            Workload::Query => &self.query_script,
            Workload::Search => &self.search_script,
            Workload::Login => &self.login_script,
        }
    }

    /// Environment every worker receives on top of the inherited one
    pub fn worker_env(&self) -> EnvironmentVariables {
        let mut env = EnvironmentVariables::new()
            .with(WORKER_IO_ENCODING_VAR, "utf-8")
            .with(WORKER_UTF8_MODE_VAR, "1");
        if let Some(path) = &self.worker_path {
            env.insert(WORKER_PATH_PASSTHROUGH_VAR, path.clone());
        }
        env
    }

    /// Launch recipe for one workload
    pub fn profile(&self, workload: Workload) -> WorkerProfile {
        let options = InvokeOptions {
            working_dir: self.worker_dir.clone(),
            env: self.worker_env(),
            timeout: self.timeout,
            decode_mode: DecodeMode::Plain,
            stdout_encoding: self.stdout_encoding,
            stderr_encoding: self.stderr_encoding,
        };
        WorkerProfile::new(workload.as_str(), self.worker_program.clone())
            .with_args(WorkerArguments::from_vec(vec![self
                .script(workload)
                .display()
                .to_string()]))
            .with_delivery(workload.delivery())
            .with_options(options)
    }
}
