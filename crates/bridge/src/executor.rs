//! Worker process execution
//!
//! [`WorkerExecutor`] is the seam between the bridge and the operating system.
//! [`SystemWorkerExecutor`] spawns real processes with tokio; tests substitute
//! a scripted executor.

use async_trait::async_trait;
use crawlgate_core::{EnvironmentVariables, WorkerArguments};
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Everything needed to start one worker process.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: WorkerArguments,
    pub working_dir: Option<PathBuf>,
    pub env: EnvironmentVariables,
    pub timeout: Option<Duration>,
}

/// Raw bytes captured from a worker that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RawOutput {
    pub fn new(exit_code: Option<i32>, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// A worker call that never produced a complete [`RawOutput`].
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to launch worker: {0}")]
    Launch(#[source] io::Error),

    #[error("worker did not finish within {elapsed:?}")]
    Timeout {
        elapsed: Duration,
        /// Whatever the worker wrote before it was killed
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    #[error("worker pipe failed: {0}")]
    Channel(#[source] io::Error),
}

#[async_trait]
pub trait WorkerExecutor: Send + Sync {
    /// Start the worker, feed it `stdin`, and collect its exit status and output
    async fn run(&self, spec: &LaunchSpec, stdin: Vec<u8>) -> Result<RawOutput, ExecError>;
}

/// Executor that spawns real operating-system processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWorkerExecutor;

impl SystemWorkerExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WorkerExecutor for SystemWorkerExecutor {
    async fn run(&self, spec: &LaunchSpec, stdin: Vec<u8>) -> Result<RawOutput, ExecError> {
        let mut command = Command::new(&spec.program);
        command
            .args(spec.args.iter())
            .envs(spec.env.iter())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let started = Instant::now();
        let mut child = command.spawn().map_err(ExecError::Launch)?;
        tracing::debug!(program = %spec.program, pid = ?child.id(), "worker started");

        let mut child_stdin = child.stdin.take();
        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();

        // Buffers outlive the timed future so a timeout still reports partial output.
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let exchange = async {
            let write = async {
                if let Some(mut pipe) = child_stdin.take() {
                    match pipe.write_all(&stdin).await {
                        Ok(()) => {}
                        // The worker may exit without reading its input.
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
                        Err(e) => return Err(e),
                    }
                    match pipe.shutdown().await {
                        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                        _ => {}
                    }
                }
                Ok(())
            };
            let (written, read_out, read_err) = tokio::join!(
                write,
                drain(child_stdout, &mut stdout),
                drain(child_stderr, &mut stderr)
            );
            written?;
            read_out?;
            read_err?;
            child.wait().await
        };

        // `None` means the deadline elapsed first.
        let waited = match spec.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange).await.ok(),
            None => Some(exchange.await),
        };

        let Some(waited) = waited else {
            if let Err(e) = child.start_kill() {
                tracing::warn!(error = %e, "failed to kill timed out worker");
            }
            let _ = child.wait().await;
            return Err(ExecError::Timeout {
                elapsed: started.elapsed(),
                stdout,
                stderr,
            });
        };

        let status = waited.map_err(ExecError::Channel)?;
        tracing::debug!(
            program = %spec.program,
            exit_code = ?status.code(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worker finished"
        );

        Ok(RawOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        })
    }
}

async fn drain<R>(pipe: Option<R>, buf: &mut Vec<u8>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(buf).await?;
    }
    Ok(())
}
