//! Command Runner
//!
//! Executes a CLI command under a hard deadline and captures its output.
//! The child is raced against a timer; if the timer fires first the child is
//! killed (SIGKILL, no chance to clean up) and reaped. Both pipes are drained
//! by background tasks so a full pipe can never stall the child or lose its
//! exit status.
//!
//! On Unix the child leads its own process group, and the whole group is
//! killed once the child is done, so helpers it forked (ProxyCommand and the
//! like) cannot keep the pipes open past the deadline.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// How long the pipes may stay open after the child is gone
const DRAIN_GRACE: Duration = Duration::from_millis(500);

const READ_CHUNK: usize = 8192;

/// Command runner configuration
#[derive(Debug, Clone)]
pub struct CommandOptions {
    /// Arguments passed to the binary, in order
    pub args: Vec<String>,
    /// Hard deadline before the child is killed
    pub timeout: Duration,
}

impl CommandOptions {
    pub fn new(args: Vec<String>, timeout: Duration) -> Self {
        Self { args, timeout }
    }
}

/// Result of running a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// Captured standard error, `None` when the child wrote nothing there
    pub stderr: Option<String>,
    /// Captured standard output
    pub stdout: String,
    /// Exit code if the child exited on its own
    pub exit_code: Option<i32>,
    /// Whether the deadline fired and the child was killed
    pub timed_out: bool,
}

impl ProcessResult {
    /// Diagnostic text, or an empty string if there was none
    pub fn diagnostic_text(&self) -> &str {
        self.stderr.as_deref().unwrap_or("")
    }
}

/// Command runner errors
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Binary '{0}' not found. Install it or add to PATH.")]
    BinaryNotFound(String),

    #[error("Failed to launch process: {0}")]
    LaunchFailed(String),

    #[error("Timeout must be at least one second")]
    InvalidTimeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command runner for executing CLI tools
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Find a binary, either as a path or in PATH
    pub fn resolve(binary: &str) -> Result<PathBuf, CommandError> {
        let path = std::path::Path::new(binary);
        if path.components().count() > 1 && path.exists() {
            return Ok(path.to_path_buf());
        }
        which::which(binary).map_err(|_| CommandError::BinaryNotFound(binary.to_string()))
    }

    /// Run a command and capture its output, killing it at the deadline
    pub async fn run(
        &self,
        binary: &str,
        options: &CommandOptions,
    ) -> Result<ProcessResult, CommandError> {
        if options.timeout < Duration::from_secs(1) {
            return Err(CommandError::InvalidTimeout);
        }

        let binary_path = Self::resolve(binary)?;
        tracing::info!(
            "Running {} with a timeout of {} seconds",
            binary,
            options.timeout.as_secs()
        );
        tracing::debug!("Resolved {} to {}", binary, binary_path.display());

        let mut command = Command::new(&binary_path);
        command
            .args(&options.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|e| CommandError::LaunchFailed(format!("{}: {}", binary, e)))?;
        let pid = child.id();

        let stdout_drain = PipeDrain::spawn(child.stdout.take());
        let stderr_drain = PipeDrain::spawn(child.stderr.take());

        let (status, timed_out) = match tokio::time::timeout(options.timeout, child.wait()).await {
            Ok(status) => {
                let status = status?;
                if kill_process_group(pid) {
                    tracing::debug!("Killed processes {} left behind", binary);
                }
                (status, false)
            }
            Err(_) => {
                tracing::warn!(
                    "{} still running after {} seconds, killing it",
                    binary,
                    options.timeout.as_secs()
                );
                if !kill_process_group(pid) {
                    child.start_kill()?;
                }
                (child.wait().await?, true)
            }
        };

        let stdout = stdout_drain.finish(DRAIN_GRACE).await?;
        let stderr = stderr_drain.finish(DRAIN_GRACE).await?;

        tracing::info!("[{:?} exited with {}]", binary, status);
        tracing::debug!(
            "Captured {} bytes of stdout and {} bytes of stderr",
            stdout.len(),
            stderr.len()
        );

        Ok(ProcessResult {
            stderr: if stderr.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&stderr).into_owned())
            },
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            exit_code: status.code(),
            timed_out,
        })
    }
}

/// SIGKILL the process group led by `pid`
///
/// Returns false when nothing was signalled, e.g. the group is already empty.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) -> bool {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return false;
    };
    // SAFETY: kill(2) touches no memory; a negative pid addresses the group.
    unsafe { libc::kill(-pgid, libc::SIGKILL) == 0 }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) -> bool {
    false
}

/// A pipe being read to the end on a background task
///
/// Bytes land in a shared buffer as they arrive, so whatever was read is
/// kept even if the task has to be abandoned.
struct PipeDrain {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl PipeDrain {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let task = tokio::spawn(async move {
            let Some(mut pipe) = pipe else {
                return Ok(());
            };
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                let n = pipe.read(&mut chunk).await?;
                if n == 0 {
                    return Ok(());
                }
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&chunk[..n]);
            }
        });
        Self { buf, task }
    }

    /// Wait up to `grace` for end of file, then take what was read
    async fn finish(self, grace: Duration) -> Result<Vec<u8>, CommandError> {
        let mut task = self.task;
        match tokio::time::timeout(grace, &mut task).await {
            Ok(joined) => joined.map_err(|e| CommandError::Io(std::io::Error::other(e)))??,
            Err(_) => {
                tracing::warn!("Output pipe still open after the process ended, giving up on it");
                task.abort();
            }
        }
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(std::mem::take(&mut *buf))
    }
}
