//! Agent process runner.
//!
//! Spawns the coding-agent CLI for one conversation turn and streams its
//! decoded output. Stderr is drained on a dedicated task started before
//! the first stdout read, so a chatty agent can never deadlock against a
//! full pipe; the captured text feeds the failure diagnostic when the
//! process exits non-zero.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::codec::StreamCodec;
use crate::agent::command::build_agent_args;
use crate::agent::event::AgentEvent;
use crate::config::GlobalConfig;
use crate::{AppError, Result};

/// Per-turn event channel capacity.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Parameters for one agent invocation.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Prompt text for this turn: the combined initial prompt, or the
    /// joined answers from the previous turn's questions.
    pub input: String,
    /// Session to resume; `None` starts a fresh conversation.
    pub session_id: Option<String>,
    /// Working directory the agent process starts in.
    pub workdir: PathBuf,
    /// Workflow label used in the raw-stream log file name.
    pub label: String,
}

/// Live handle to one in-flight agent invocation.
///
/// Events arrive in exactly the order the process emitted them. Once
/// [`TurnHandle::next_event`] returns `None` the stream is exhausted and
/// [`TurnHandle::finish`] resolves the process exit status.
#[derive(Debug)]
pub struct TurnHandle {
    events: mpsc::Receiver<AgentEvent>,
    reader: JoinHandle<Result<()>>,
}

impl TurnHandle {
    /// Receive the next decoded event, or `None` when the stream closed.
    pub async fn next_event(&mut self) -> Option<AgentEvent> {
        self.events.recv().await
    }

    /// Wait for the turn to settle: the stderr drain is joined and the
    /// process reaped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Process`] with the exit code and the captured
    /// stderr text when the agent exited non-zero, or [`AppError::Io`]
    /// if the output stream failed mid-turn.
    pub async fn finish(self) -> Result<()> {
        drop(self.events);
        match self.reader.await {
            Ok(result) => result,
            Err(err) => Err(AppError::Agent(format!("turn reader task failed: {err}"))),
        }
    }
}

/// Spawn the agent process for one turn and stream its decoded events.
///
/// The subordinate command line is built by [`build_agent_args`]; stdout
/// and stderr are piped independently and stdin is closed. When raw
/// capture is enabled, every line read from stdout is appended and
/// flushed to the log before the decoded event is forwarded.
///
/// Cancelling `cancel` stops the reader and kills the process; the
/// handle then reports a clean finish.
///
/// # Errors
///
/// Returns [`AppError::Io`] if the process cannot be spawned.
pub fn run_agent(
    config: &GlobalConfig,
    request: TurnRequest,
    cancel: CancellationToken,
) -> Result<TurnHandle> {
    let args = build_agent_args(&request.input, &config.agent, request.session_id.as_deref());

    let mut child = Command::new(&config.agent.command)
        .args(&args)
        .current_dir(&request.workdir)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| {
            AppError::Io(format!(
                "failed to spawn agent '{}': {err}",
                config.agent.command
            ))
        })?;

    info!(
        command = config.agent.command,
        pid = child.id().unwrap_or(0),
        resume = request.session_id.as_deref().unwrap_or(""),
        label = request.label,
        "agent process spawned"
    );

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AppError::Io("failed to capture agent stdout".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AppError::Io("failed to capture agent stderr".into()))?;

    // The drain must be running before the first stdout read; otherwise a
    // full stderr pipe can block the agent while we block on stdout.
    let stderr_drain: JoinHandle<String> = tokio::spawn(async move {
        let mut stderr = stderr;
        let mut buffer = String::new();
        if let Err(err) = stderr.read_to_string(&mut buffer).await {
            warn!(%err, "stderr drain ended early");
        }
        buffer
    });

    let debug_log = if config.debug.enabled {
        // The command may be a path; only its file name goes into the
        // log file name.
        let tool = Path::new(&config.agent.command)
            .file_name()
            .map_or_else(|| config.agent.command.clone(), |name| name.to_string_lossy().into_owned());
        RawStreamLog::create(
            &request.workdir.join(&config.debug.log_dir),
            &tool,
            &request.label,
        )
    } else {
        None
    };

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let reader = tokio::spawn(read_stream(
        child,
        stdout,
        stderr_drain,
        debug_log,
        event_tx,
        cancel,
    ));

    Ok(TurnHandle {
        events: event_rx,
        reader,
    })
}

/// Reader loop: frame stdout into lines, decode records, forward events,
/// then settle the process.
async fn read_stream(
    mut child: Child,
    stdout: tokio::process::ChildStdout,
    stderr_drain: JoinHandle<String>,
    mut debug_log: Option<RawStreamLog>,
    event_tx: mpsc::Sender<AgentEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut framed = FramedRead::new(stdout, StreamCodec::new());

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("turn cancelled, killing agent process");
                child.kill().await.ok();
                return Ok(());
            }

            item = framed.next() => {
                match item {
                    None => break,

                    Some(Err(AppError::Protocol(msg))) => {
                        // Oversize line: skip it, never abort the turn.
                        warn!(error = msg.as_str(), "skipping oversize stream line");
                    }

                    Some(Err(err)) => {
                        warn!(error = %err, "agent stdout stream failed");
                        child.kill().await.ok();
                        return Err(err);
                    }

                    Some(Ok(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if let Some(log) = debug_log.as_mut() {
                            log.append_line(line);
                        }
                        let Some(event) = AgentEvent::from_json_line(line) else {
                            debug!("skipping undecodable stream line");
                            continue;
                        };
                        if event_tx.send(event).await.is_err() {
                            // Consumer went away; stop the agent too.
                            debug!("event receiver dropped, killing agent process");
                            child.kill().await.ok();
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    let stderr_text = stderr_drain.await.unwrap_or_default();
    let status = child
        .wait()
        .await
        .map_err(|err| AppError::Io(format!("failed to wait for agent process: {err}")))?;

    if status.success() {
        debug!("agent process exited cleanly");
        Ok(())
    } else {
        Err(AppError::Process {
            code: status.code(),
            stderr: stderr_text,
        })
    }
}

/// Raw-stream capture: one file per invocation, one line per record,
/// flushed before the corresponding event is forwarded.
struct RawStreamLog {
    file: fs::File,
    path: PathBuf,
}

impl RawStreamLog {
    /// Open the per-invocation log file, or disable capture with a
    /// warning when the directory or file cannot be created.
    fn create(log_dir: &Path, tool: &str, label: &str) -> Option<Self> {
        if let Err(err) = fs::create_dir_all(log_dir) {
            warn!(%err, dir = %log_dir.display(), "raw-stream capture disabled");
            return None;
        }
        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H%M%S");
        let path = log_dir.join(format!("{timestamp}_{tool}_{label}.log"));
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(Self { file, path }),
            Err(err) => {
                warn!(%err, path = %path.display(), "raw-stream capture disabled");
                None
            }
        }
    }

    fn append_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.file, "{line}").and_then(|()| self.file.flush()) {
            warn!(%err, path = %self.path.display(), "raw-stream log write failed");
        }
    }
}
