//! One command, one process, one result.
//!
//! Every call to [`ProcessRunner::execute`] spawns a shell-wrapped process,
//! registers it in the runner's process table, and resolves into exactly one
//! [`CommandResult`]: normal exit, spawn error, timeout, or termination by
//! [`ProcessRunner::cleanup`]. Failures never surface as `Err`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, timeout_at, Instant};

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(30_000);

pub const TIMEOUT_MESSAGE: &str = "Command timeout";
pub const TERMINATED_MESSAGE: &str = "Process terminated";

/// How long output pipes may stay open after the shell exits. A backgrounded
/// child that inherited them is not waited for past this.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
            exit_code: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
            exit_code: None,
        }
    }
}

/// Table entry for an in-flight process.
///
/// The executing task owns the `Child`; the table holds the kill switch for it.
struct RunningProcess {
    pid: Option<u32>,
    kill: oneshot::Sender<()>,
}

type ProcessTable = Mutex<HashMap<String, RunningProcess>>;

/// Removes its table entry on drop, so a cancelled `execute` leaves nothing
/// behind.
struct TableEntry<'a> {
    processes: &'a ProcessTable,
    id: &'a str,
}

impl Drop for TableEntry<'_> {
    fn drop(&mut self) {
        self.processes.lock().remove(self.id);
    }
}

pub struct ProcessRunner {
    processes: ProcessTable,
    timeout: Duration,
    sequence: AtomicU64,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_COMMAND_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            processes: Mutex::new(HashMap::new()),
            timeout,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn running_count(&self) -> usize {
        self.processes.lock().len()
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.processes.lock().contains_key(id)
    }

    pub fn running_ids(&self) -> Vec<String> {
        self.processes.lock().keys().cloned().collect()
    }

    pub async fn execute(&self, command: &str, args: Option<&[String]>) -> CommandResult {
        let id = self.next_id();
        let command_line = build_command_line(command, args);

        tracing::info!(process_id = %id, "Executing command: {}", command_line);

        self.supervise(&id, shell_command(&command_line)).await
    }

    async fn supervise(&self, id: &str, mut cmd: Command) -> CommandResult {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(process_id = %id, "Spawn failed: {}", e);
                return CommandResult::failure(e.to_string());
            }
        };

        let (kill_tx, mut kill_rx) = oneshot::channel();
        self.processes.lock().insert(
            id.to_string(),
            RunningProcess {
                pid: child.id(),
                kill: kill_tx,
            },
        );
        let _entry = TableEntry {
            processes: &self.processes,
            id,
        };

        // Nothing is ever written; closing it keeps readers of stdin from blocking.
        drop(child.stdin.take());

        let stdout = Arc::new(Mutex::new(Vec::new()));
        let stderr = Arc::new(Mutex::new(Vec::new()));
        let readers = [
            child
                .stdout
                .take()
                .map(|pipe| spawn_collector(pipe, stdout.clone())),
            child
                .stderr
                .take()
                .map(|pipe| spawn_collector(pipe, stderr.clone())),
        ];

        let deadline = Instant::now() + self.timeout;

        let result = tokio::select! {
            status = child.wait() => {
                drain_readers(readers, deadline.min(Instant::now() + OUTPUT_GRACE)).await;
                match status {
                    Ok(status) => {
                        let stderr = collected(&stderr);
                        CommandResult {
                            success: status.success(),
                            output: collected(&stdout),
                            error: (!stderr.is_empty()).then_some(stderr),
                            exit_code: status.code(),
                        }
                    }
                    Err(e) => CommandResult::failure(e.to_string()),
                }
            }
            _ = sleep_until(deadline) => {
                tracing::warn!(process_id = %id, "Command timed out after {:?}", self.timeout);
                terminate(&mut child, id).await;
                abort_readers(readers);
                CommandResult {
                    success: false,
                    output: collected(&stdout),
                    error: Some(TIMEOUT_MESSAGE.to_string()),
                    exit_code: None,
                }
            }
            _ = &mut kill_rx => {
                terminate(&mut child, id).await;
                abort_readers(readers);
                CommandResult {
                    success: false,
                    output: collected(&stdout),
                    error: Some(TERMINATED_MESSAGE.to_string()),
                    exit_code: None,
                }
            }
        };

        tracing::debug!(
            process_id = %id,
            success = result.success,
            exit_code = ?result.exit_code,
            "Command finished"
        );
        result
    }

    /// Terminate every in-flight process and clear the table.
    pub fn cleanup(&self) {
        let drained: Vec<(String, RunningProcess)> = self.processes.lock().drain().collect();

        for (id, process) in drained {
            if process.kill.send(()).is_err() {
                tracing::warn!(
                    "Failed to kill process {} (pid {:?}): already exited",
                    id,
                    process.pid
                );
            } else {
                tracing::info!("Killed process {} (pid {:?})", id, process.pid);
            }
        }
    }

    fn next_id(&self) -> String {
        format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            self.sequence.fetch_add(1, Ordering::Relaxed)
        )
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn build_command_line(command: &str, args: Option<&[String]>) -> String {
    match args {
        Some(args) if !args.is_empty() => format!("{} {}", command, args.join(" ")),
        _ => command.to_string(),
    }
}

fn shell_command(command_line: &str) -> Command {
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command_line);
        cmd
    };

    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    };

    cmd
}

fn spawn_collector<R>(mut pipe: R, sink: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => sink.lock().extend_from_slice(&chunk[..n]),
                Err(e) => {
                    tracing::debug!("Output pipe closed with error: {}", e);
                    break;
                }
            }
        }
    })
}

/// Wait for the pipes to hit EOF, but never past `deadline`.
async fn drain_readers(readers: [Option<JoinHandle<()>>; 2], deadline: Instant) {
    for reader in readers.into_iter().flatten() {
        let abort = reader.abort_handle();
        if timeout_at(deadline, reader).await.is_err() {
            tracing::debug!("Output pipe still open after exit, abandoning it");
            abort.abort();
        }
    }
}

fn abort_readers(readers: [Option<JoinHandle<()>>; 2]) {
    for reader in readers.into_iter().flatten() {
        reader.abort();
    }
}

async fn terminate(child: &mut Child, id: &str) {
    if let Err(e) = child.kill().await {
        tracing::warn!(process_id = %id, "Failed to kill process: {}", e);
    }
}

fn collected(buffer: &Mutex<Vec<u8>>) -> String {
    String::from_utf8_lossy(&buffer.lock()).trim().to_string()
}
