//! Append-only diagnostic records
//!
//! Every record is written to its own file under the log directory and the
//! caller gets the file's path back as a locator it can show to a user.
//! Writing is best-effort: a failure is logged and reported as `None`, never
//! propagated into the operation that produced the diagnostic.

use chrono::{DateTime, Local};
use crawlgate_core::{DEFAULT_LOG_PRUNE_INTERVAL, ERROR_LOG_PREFIX};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use uuid::Uuid;

const ERROR_LOG_EXTENSION: &str = "log";

/// The content of one diagnostic record. Every field is optional except the
/// context line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    /// What was being attempted, e.g. `query/execute_query`
    pub context: String,
    pub failure_kind: Option<String>,
    pub exit_code: Option<i32>,
    pub message: Option<String>,
    pub stderr: Option<String>,
    pub stdout: Option<String>,
}

impl DiagnosticRecord {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_failure_kind(mut self, kind: impl Into<String>) -> Self {
        self.failure_kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_streams(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        let stdout = stdout.into();
        let stderr = stderr.into();
        self.stdout = (!stdout.is_empty()).then_some(stdout);
        self.stderr = (!stderr.is_empty()).then_some(stderr);
        self
    }

    fn render(&self, at: DateTime<Local>) -> String {
        let mut out = format!("[{}] ERROR\n", at.format("%Y-%m-%d %H:%M:%S%.3f"));
        let _ = writeln!(out, "Context: {}", self.context);
        if let Some(kind) = &self.failure_kind {
            let _ = writeln!(out, "Failure kind: {kind}");
        }
        if let Some(code) = self.exit_code {
            let _ = writeln!(out, "Exit code: {code}");
        }
        if let Some(message) = &self.message {
            let _ = writeln!(out, "Message: {message}");
        }
        if let Some(stderr) = &self.stderr {
            let _ = writeln!(out, "Stderr:\n{}", stderr.trim_end());
        }
        if let Some(stdout) = &self.stdout {
            let _ = writeln!(out, "Stdout:\n{}", stdout.trim_end());
        }
        out.push('\n');
        out
    }
}

/// Writer of diagnostic records into one directory.
///
/// Clones share the directory and the background pruner; the pruner stops
/// when the last clone is dropped.
#[derive(Clone)]
pub struct ErrorLog {
    inner: Arc<ErrorLogInner>,
}

struct ErrorLogInner {
    dir: PathBuf,
    retention: Duration,
    pruner: RwLock<Option<JoinHandle<()>>>,
}

impl Drop for ErrorLogInner {
    fn drop(&mut self) {
        if let Some(handle) = self.pruner.write().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLog")
            .field("dir", &self.inner.dir)
            .field("retention", &self.inner.retention)
            .finish()
    }
}

impl ErrorLog {
    /// Create the sink; the directory is created now if possible, and again
    /// on each write otherwise.
    pub fn new(dir: impl Into<PathBuf>, retention: Duration) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot create error log directory");
        }
        Self {
            inner: Arc::new(ErrorLogInner {
                dir,
                retention,
                pruner: RwLock::new(None),
            }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn retention(&self) -> Duration {
        self.inner.retention
    }

    /// Write one record to a fresh file and return its locator.
    ///
    /// The locator is relative to the current directory when the log
    /// directory lies beneath it.
    pub async fn record(&self, record: &DiagnosticRecord) -> Option<PathBuf> {
        let now = Local::now();
        let name = format!(
            "{ERROR_LOG_PREFIX}{}_{}.{ERROR_LOG_EXTENSION}",
            now.format("%Y%m%d_%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.inner.dir.join(name);

        let written = async {
            tokio::fs::create_dir_all(&self.inner.dir).await?;
            tokio::fs::write(&path, record.render(now)).await
        }
        .await;

        match written {
            Ok(()) => {
                tracing::debug!(path = %path.display(), context = %record.context, "wrote diagnostic record");
                Some(locator(&path))
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to write diagnostic record");
                None
            }
        }
    }

    /// Delete records older than `max_age`; returns how many were removed
    pub async fn prune(&self, max_age: Duration) -> usize {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut entries = match tokio::fs::read_dir(&self.inner.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.inner.dir.display(), error = %e, "cannot list error log directory");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "error while listing error log directory");
                    break;
                }
            };
            if !is_record_name(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };
            if modified < cutoff {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!(path = %entry.path().display(), error = %e, "failed to delete old record"),
                }
            }
        }

        if removed > 0 {
            tracing::info!(removed, "pruned old diagnostic records");
        }
        removed
    }

    /// Run [`prune`](Self::prune) with the configured retention every
    /// `interval`; a zero interval disables it. Must be called within a
    /// tokio runtime.
    pub fn start_pruning(&self, interval: Duration) {
        if interval == Duration::ZERO {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let log = ErrorLog { inner };
                log.prune(log.retention()).await;
            }
        });

        if let Some(previous) = self.inner.pruner.write().replace(handle) {
            previous.abort();
        }
    }

    /// [`start_pruning`](Self::start_pruning) at the default hourly interval
    pub fn start_default_pruning(&self) {
        self.start_pruning(DEFAULT_LOG_PRUNE_INTERVAL);
    }

    pub fn stop_pruning(&self) {
        if let Some(handle) = self.inner.pruner.write().take() {
            handle.abort();
        }
    }
}

fn is_record_name(name: &str) -> bool {
    name.starts_with(ERROR_LOG_PREFIX)
}

fn locator(path: &Path) -> PathBuf {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
}
