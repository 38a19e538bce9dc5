/// Constants used throughout the crawlgate codebase
use std::time::Duration;

// Worker executable and layout
pub const WORKER_EXECUTABLE_VAR: &str = "CRAWLGATE_WORKER";
pub const PYTHON_EXECUTABLE_VAR: &str = "PYTHON_EXECUTABLE";
pub const DEFAULT_WORKER_EXECUTABLE: &str = "python";
pub const WORKER_DIR_VAR: &str = "CRAWLGATE_WORKER_DIR";
pub const WORKER_PATH_VAR: &str = "CRAWLGATE_WORKER_PATH";
pub const QUERY_SCRIPT_VAR: &str = "CRAWLGATE_QUERY_SCRIPT";
pub const SEARCH_SCRIPT_VAR: &str = "CRAWLGATE_SEARCH_SCRIPT";
pub const LOGIN_SCRIPT_VAR: &str = "CRAWLGATE_LOGIN_SCRIPT";
pub const DEFAULT_QUERY_SCRIPT: &str = "python/analysisBridge.py";
pub const DEFAULT_SEARCH_SCRIPT: &str = "python/bridge/listSearchBridge.py";
pub const DEFAULT_LOGIN_SCRIPT: &str = "python/cookieBridge.py";

// Credentials persisted by the login worker
pub const CREDENTIALS_FILE_VAR: &str = "CRAWLGATE_CREDENTIALS_FILE";
pub const DEFAULT_CREDENTIALS_FILE: &str = "python/WeiBoCrawler/config.toml";

// Environment handed to every worker
pub const WORKER_PATH_PASSTHROUGH_VAR: &str = "PYTHONPATH";
pub const WORKER_IO_ENCODING_VAR: &str = "PYTHONIOENCODING";
pub const WORKER_UTF8_MODE_VAR: &str = "PYTHONUTF8";

// Invocation tuning
pub const TIMEOUT_SECS_VAR: &str = "CRAWLGATE_TIMEOUT_SECS";
pub const STDOUT_ENCODING_VAR: &str = "CRAWLGATE_STDOUT_ENCODING";
pub const STDERR_ENCODING_VAR: &str = "CRAWLGATE_STDERR_ENCODING";
pub const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(120);

// Result cache
pub const CACHE_TTL_SECS_VAR: &str = "CRAWLGATE_CACHE_TTL_SECS";
pub const SWEEP_INTERVAL_SECS_VAR: &str = "CRAWLGATE_SWEEP_INTERVAL_SECS";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

// Diagnostic records
pub const LOG_DIR_VAR: &str = "CRAWLGATE_LOG_DIR";
pub const LOG_RETENTION_DAYS_VAR: &str = "CRAWLGATE_LOG_RETENTION_DAYS";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_RETENTION_DAYS: u64 = 7;
pub const DEFAULT_LOG_PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const ERROR_LOG_PREFIX: &str = "error_";

// Logging filter
pub const CRAWLGATE_LOG_VAR: &str = "CRAWLGATE_LOG";

// Deployment mode
pub const PRODUCTION_VAR: &str = "CRAWLGATE_PRODUCTION";
pub const NODE_ENV_VAR: &str = "NODE_ENV";

// Login worker actions
pub const BEGIN_LOGIN_ACTION: &str = "generate_qr";
pub const CHECK_LOGIN_ACTION: &str = "check_login";
