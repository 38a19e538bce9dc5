//! Configuration loader
//!
//! Reads `CRAWLGATE_*` variables (plus the `PYTHON_EXECUTABLE` and
//! `NODE_ENV` conventions) from the process environment or from an explicit
//! map, applying defaults for anything unset.

use crate::config::GatewayConfig;
use crawlgate_bridge::ChannelEncoding;
use crawlgate_cache::CacheConfig;
use crawlgate_core::{constants::*, Error, Result, Validate};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

enum Source {
    Process,
    Map(HashMap<String, String>),
}

pub struct ConfigLoader {
    source: Source,
}

impl ConfigLoader {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self {
            source: Source::Process,
        }
    }

    /// Read from an explicit set of variables; the process environment is ignored
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self {
            source: Source::Map(vars),
        }
    }

    /// Non-empty, trimmed value of `name`
    fn var(&self, name: &str) -> Option<String> {
        let raw = match &self.source {
            Source::Process => std::env::var(name).ok(),
            Source::Map(vars) => vars.get(name).cloned(),
        };
        raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn seconds(&self, name: &str) -> Result<Option<u64>> {
        self.var(name)
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    Error::environment(name, format!("expected a whole number of seconds, got '{raw}'"))
                })
            })
            .transpose()
    }

    fn encoding(&self, name: &str) -> Result<ChannelEncoding> {
        match self.var(name) {
            Some(label) => ChannelEncoding::from_label(&label)
                .map_err(|e| Error::environment(name, e.to_string())),
            None => Ok(ChannelEncoding::utf8()),
        }
    }

    fn production(&self) -> bool {
        let flag = self
            .var(PRODUCTION_VAR)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        flag || self.var(NODE_ENV_VAR).as_deref() == Some("production")
    }

    pub fn load(self) -> Result<GatewayConfig> {
        let worker_program = self
            .var(WORKER_EXECUTABLE_VAR)
            .or_else(|| self.var(PYTHON_EXECUTABLE_VAR))
            .unwrap_or_else(|| DEFAULT_WORKER_EXECUTABLE.to_string());
        Validate::not_empty(&worker_program, "worker executable")?;

        let timeout = match self.seconds(TIMEOUT_SECS_VAR)? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_INVOKE_TIMEOUT),
        };

        let ttl = match self.seconds(CACHE_TTL_SECS_VAR)? {
            Some(secs) => Duration::from_secs(
                Validate::in_range(secs, 1, u64::MAX, CACHE_TTL_SECS_VAR)?,
            ),
            None => DEFAULT_CACHE_TTL,
        };
        let sweep_interval = self
            .seconds(SWEEP_INTERVAL_SECS_VAR)?
            .map_or(DEFAULT_SWEEP_INTERVAL, Duration::from_secs);

        let retention_days = match self.var(LOG_RETENTION_DAYS_VAR) {
            Some(raw) => {
                let days = raw.parse::<u64>().map_err(|_| {
                    Error::environment(
                        LOG_RETENTION_DAYS_VAR,
                        format!("expected a whole number of days, got '{raw}'"),
                    )
                })?;
                Validate::in_range(days, 1, 3650, LOG_RETENTION_DAYS_VAR)?
            }
            None => DEFAULT_LOG_RETENTION_DAYS,
        };

        let config = GatewayConfig {
            worker_program,
            worker_dir: self.var(WORKER_DIR_VAR).map(PathBuf::from),
            query_script: self
                .var(QUERY_SCRIPT_VAR)
                .unwrap_or_else(|| DEFAULT_QUERY_SCRIPT.to_string())
                .into(),
            search_script: self
                .var(SEARCH_SCRIPT_VAR)
                .unwrap_or_else(|| DEFAULT_SEARCH_SCRIPT.to_string())
                .into(),
            login_script: self
                .var(LOGIN_SCRIPT_VAR)
                .unwrap_or_else(|| DEFAULT_LOGIN_SCRIPT.to_string())
                .into(),
            credentials_file: self
                .var(CREDENTIALS_FILE_VAR)
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string())
                .into(),
            worker_path: self.var(WORKER_PATH_VAR),
            timeout,
            stdout_encoding: self.encoding(STDOUT_ENCODING_VAR)?,
            stderr_encoding: self.encoding(STDERR_ENCODING_VAR)?,
            cache: CacheConfig::new(ttl, sweep_interval),
            log_dir: self
                .var(LOG_DIR_VAR)
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())
                .into(),
            log_retention: Duration::from_secs(retention_days * SECONDS_PER_DAY),
            production: self.production(),
        };

        tracing::debug!(
            worker = %config.worker_program,
            timeout = ?config.timeout,
            production = config.production,
            "loaded gateway configuration"
        );
        Ok(config)
    }
}

impl GatewayConfig {
    /// Load `.env` when present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenv::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env file"),
        }
        ConfigLoader::from_env().load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn load(pairs: &[(&str, &str)]) -> Result<GatewayConfig> {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ConfigLoader::from_map(vars).load()
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.worker_program, "python");
        assert_eq!(config.worker_dir, None);
        assert_eq!(config.timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.cache.ttl, Duration::from_secs(900));
        assert_eq!(config.cache.sweep_interval, Duration::from_secs(300));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.credentials_file, PathBuf::from("python/WeiBoCrawler/config.toml"));
        assert_eq!(config.log_retention, Duration::from_secs(7 * SECONDS_PER_DAY));
        assert_eq!(config.stderr_encoding, ChannelEncoding::utf8());
        assert!(!config.production);
    }

    #[test]
    fn test_crawlgate_worker_wins_over_python_executable() {
        let config = load(&[
            ("PYTHON_EXECUTABLE", "/usr/bin/python3"),
            ("CRAWLGATE_WORKER", "/opt/venv/bin/python"),
        ])
        .unwrap();
        assert_eq!(config.worker_program, "/opt/venv/bin/python");

        let config = load(&[("PYTHON_EXECUTABLE", "/usr/bin/python3")]).unwrap();
        assert_eq!(config.worker_program, "/usr/bin/python3");
    }

    #[test]
    fn test_credentials_file_override() {
        let config = load(&[("CRAWLGATE_CREDENTIALS_FILE", " /srv/state/cookies.toml ")]).unwrap();
        assert_eq!(config.credentials_file, PathBuf::from("/srv/state/cookies.toml"));
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = load(&[("CRAWLGATE_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = load(&[("CRAWLGATE_CACHE_TTL_SECS", "fifteen")]).unwrap_err();
        assert!(err.to_string().contains("CRAWLGATE_CACHE_TTL_SECS"));

        let err = load(&[("CRAWLGATE_LOG_RETENTION_DAYS", "0")]).unwrap_err();
        assert!(err.to_string().contains("CRAWLGATE_LOG_RETENTION_DAYS"));
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let err = load(&[("CRAWLGATE_STDERR_ENCODING", "klingon")]).unwrap_err();
        assert!(err.to_string().contains("CRAWLGATE_STDERR_ENCODING"));

        let config = load(&[("CRAWLGATE_STDERR_ENCODING", "cp936")]).unwrap();
        assert_eq!(config.stderr_encoding, ChannelEncoding::gbk());
    }

    #[test]
    fn test_production_mode_sources() {
        assert!(load(&[("NODE_ENV", "production")]).unwrap().production);
        assert!(load(&[("CRAWLGATE_PRODUCTION", "true")]).unwrap().production);
        assert!(!load(&[("NODE_ENV", "development")]).unwrap().production);
    }

    #[test]
    #[serial]
    fn test_reads_process_environment() {
        std::env::set_var("CRAWLGATE_QUERY_SCRIPT", "/srv/workers/analysis.py");
        std::env::set_var("CRAWLGATE_WORKER_DIR", "/srv/workers");
        let config = ConfigLoader::from_env().load();
        std::env::remove_var("CRAWLGATE_QUERY_SCRIPT");
        std::env::remove_var("CRAWLGATE_WORKER_DIR");

        let config = config.unwrap();
        assert_eq!(config.query_script, PathBuf::from("/srv/workers/analysis.py"));
        assert_eq!(config.worker_dir, Some(PathBuf::from("/srv/workers")));
    }
}
