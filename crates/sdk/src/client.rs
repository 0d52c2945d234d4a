//! Eclips Backend Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{BackendCommand, WireRequest, WireResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Time a backend gets to exit after SIGTERM before it is killed
const TERMINATE_TIMEOUT: Duration = Duration::from_secs(2);

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Default)]
struct PendingCalls {
    calls: HashMap<u64, oneshot::Sender<WireResponse>>,
    closed: bool,
}

type SharedPending = Arc<Mutex<PendingCalls>>;

fn lock(pending: &SharedPending) -> MutexGuard<'_, PendingCalls> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes a call's pending entry when the call finishes or is dropped
struct PendingEntry<'a> {
    pending: &'a SharedPending,
    id: u64,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        lock(self.pending).calls.remove(&self.id);
    }
}

/// Client for one backend process
///
/// Calls may be issued concurrently; responses are matched to callers by id,
/// so they may arrive in any order.
///
/// # Example
///
/// ```no_run
/// use eclips_sdk::{BackendClient, BackendCommand};
/// use serde_json::json;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BackendClient::spawn(BackendCommand::new("./dist/app"))?;
/// let pong = client.call("ping", json!({})).await?;
/// assert_eq!(pong, json!("pong"));
/// client.shutdown(Duration::from_secs(3)).await?;
/// # Ok(())
/// # }
/// ```
pub struct BackendClient {
    next_id: AtomicU64,
    pending: SharedPending,
    writer: tokio::sync::Mutex<BoxedWriter>,
    child: Option<Child>,
    reader_task: JoinHandle<()>,
    stderr_task: Option<JoinHandle<()>>,
}

impl BackendClient {
    /// Start the backend with piped stdio
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(command: BackendCommand) -> Result<Self> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| SdkError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        info!(program = %command.program, pid = ?child.id(), "Backend started");

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let mut client = Self::from_io(stdout, stdin);
        client.child = Some(child);
        client.stderr_task = Some(tokio::spawn(forward_stderr(stderr)));
        Ok(client)
    }

    /// Attach to an already-connected backend stream
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_io<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending = SharedPending::default();
        let reader_task = tokio::spawn(read_responses(BufReader::new(reader), pending.clone()));

        Self {
            next_id: AtomicU64::new(1),
            pending,
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            child: None,
            reader_task,
            stderr_task: None,
        }
    }

    /// Call `method` and wait for its response
    ///
    /// # Errors
    /// - SdkError::Backend if the backend answered with an error
    /// - SdkError::Disconnected if the backend closed its output first
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut line = serde_json::to_vec(&WireRequest {
            id,
            method,
            params: &params,
        })?;
        line.push(b'\n');

        let (tx, rx) = oneshot::channel();
        let _entry = {
            let mut pending = lock(&self.pending);
            if pending.closed {
                return Err(SdkError::Disconnected);
            }
            pending.calls.insert(id, tx);
            PendingEntry {
                pending: &self.pending,
                id,
            }
        };

        debug!(id, method, "Sending request");
        self.write_line(&line).await?;

        let response = rx.await.map_err(|_| SdkError::Disconnected)?;

        match response.error_message() {
            Some(message) => Err(SdkError::Backend {
                method: method.to_string(),
                message,
                trace: response.trace.unwrap_or_default(),
            }),
            None => Ok(response.result.unwrap_or(Value::Null)),
        }
    }

    /// `call` with typed params and result
    pub async fn call_typed<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let result = self.call(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Number of calls still waiting for a response
    pub fn pending_calls(&self) -> usize {
        lock(&self.pending).calls.len()
    }

    /// Close the backend's stdin and wait for it to exit
    ///
    /// After `grace` the process is sent SIGTERM (killed on Windows), and
    /// killed if it is still running shortly after. Returns `None` for
    /// clients created with `from_io`.
    pub async fn shutdown(self, grace: Duration) -> Result<Option<ExitStatus>> {
        let Self {
            writer,
            child,
            reader_task,
            stderr_task,
            ..
        } = self;

        // Dropping the writer closes the pipe, which ends the backend's loop
        {
            let mut writer = writer.lock().await;
            writer.flush().await.ok();
            *writer = Box::new(tokio::io::sink());
        }

        let status = match child {
            Some(child) => Some(wait_or_terminate(child, grace).await?),
            None => None,
        };

        if status.is_some() {
            reader_task.await.ok();
            if let Some(task) = stderr_task {
                task.await.ok();
            }
        } else {
            reader_task.abort();
        }

        info!(status = ?status, "Backend stopped");
        Ok(status)
    }

    async fn write_line(&self, line: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let written = async {
            writer.write_all(line).await?;
            writer.flush().await
        }
        .await;

        written.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => SdkError::Disconnected,
            _ => SdkError::Io(e),
        })
    }
}

async fn wait_or_terminate(mut child: Child, grace: Duration) -> Result<ExitStatus> {
    if let Ok(status) = tokio::time::timeout(grace, child.wait()).await {
        return Ok(status?);
    }

    warn!(pid = ?child.id(), "Backend did not exit after stdin closed, terminating");
    terminate(&mut child);

    if let Ok(status) = tokio::time::timeout(TERMINATE_TIMEOUT, child.wait()).await {
        return Ok(status?);
    }

    warn!(pid = ?child.id(), "Backend ignored SIGTERM, killing");
    child.kill().await?;
    Ok(child.wait().await?)
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!(pid, error = %e, "SIGTERM failed");
        }
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!(error = %e, "Failed to kill backend");
    }
}

/// Dispatch response lines to pending calls until the backend closes stdout
async fn read_responses<R>(mut reader: BufReader<R>, pending: SharedPending)
where
    R: AsyncRead + Unpin,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read backend output");
                break;
            }
        }

        if line.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }

        let response: WireResponse = match serde_json::from_slice(&line) {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    line = %String::from_utf8_lossy(&line).trim_end(),
                    error = %e,
                    "Ignoring non-JSON line from backend"
                );
                continue;
            }
        };

        let Some(id) = response.id.as_u64() else {
            warn!(id = %response.id, error = ?response.error_message(), "Response without a request id");
            continue;
        };

        let sender = lock(&pending).calls.remove(&id);
        match sender {
            Some(tx) => {
                // The caller may have given up waiting
                let _ = tx.send(response);
            }
            None => warn!(id, "Response for unknown request id"),
        }
    }

    let mut pending = lock(&pending);
    pending.closed = true;
    let dropped = pending.calls.len();
    pending.calls.clear();
    debug!(dropped, "Backend output closed");
}

/// Forward the backend's stderr (its console log) into our log
async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => info!(target: "eclips_sdk::backend", "{}", line),
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read backend stderr");
                break;
            }
        }
    }
}

fn missing_pipe(name: &str) -> SdkError {
    SdkError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("backend {} was not captured", name),
    ))
}
