use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use draughts::Move;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::locate::EngineLocator;
use crate::protocol::{format_request, parse_reply_line};
use crate::{EngineError, EngineSettings};

/// Lifecycle of the engine subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    NotLocated,
    Located,
    Starting,
    Running,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotLocated => "not-located",
            Self::Located => "located",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    lines: mpsc::Receiver<String>,
}

/// Owns at most one live engine process.
pub struct EngineConnection {
    locator: EngineLocator,
    settings: EngineSettings,
    path: Option<PathBuf>,
    state: ConnectionState,
    process: Option<EngineProcess>,
}

impl EngineConnection {
    pub fn new(locator: EngineLocator, settings: EngineSettings) -> Self {
        Self {
            locator,
            settings,
            path: None,
            state: ConnectionState::NotLocated,
            process: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Search the candidate paths. A live process is left untouched.
    pub fn locate(&mut self) -> Option<&Path> {
        self.path = self.locator.locate();
        if self.process.is_none() {
            self.state = if self.path.is_some() {
                ConnectionState::Located
            } else {
                ConnectionState::NotLocated
            };
        }
        self.path.as_deref()
    }

    /// Locate on first use, then return the executable path.
    pub fn ensure_located(&mut self) -> Option<PathBuf> {
        if self.path.is_none() {
            self.locate();
        }
        self.path.clone()
    }

    /// Spawn the engine with piped stdin/stdout.
    ///
    /// The engine has no handshake; it is considered running once the
    /// settle delay has passed and the process is still alive.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn start(&mut self) -> Result<(), EngineError> {
        if self.is_alive() {
            return Ok(());
        }

        let Some(path) = self.ensure_located() else {
            tracing::error!("Cannot start engine - path not found");
            self.state = ConnectionState::Failed;
            return Err(EngineError::NotLocated);
        };

        self.state = ConnectionState::Starting;
        match spawn_process(&path, self.settings.settle_delay).await {
            Ok(process) => {
                self.process = Some(process);
                self.state = ConnectionState::Running;
                tracing::info!("Engine process started: {}", path.display());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to start engine: {}", e);
                self.state = ConnectionState::Failed;
                Err(e)
            }
        }
    }

    /// Non-blocking liveness check. A dead process downgrades the
    /// connection to `Failed`.
    pub fn is_alive(&mut self) -> bool {
        let Some(process) = self.process.as_mut() else {
            return false;
        };
        match process.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                tracing::warn!("Engine process exited: {}", status);
                self.mark_failed();
                false
            }
            Err(e) => {
                tracing::error!("Failed to poll engine process: {}", e);
                self.mark_failed();
                false
            }
        }
    }

    /// Send one request to the live process and wait for a move token on
    /// its stdout, bounded by the direct timeout.
    pub async fn request_move(
        &mut self,
        position: &str,
        opponent: Option<&Move>,
    ) -> Result<Move, EngineError> {
        if !self.is_alive() {
            return Err(EngineError::NotRunning);
        }
        let timeout = self.settings.direct_timeout;
        let Some(process) = self.process.as_mut() else {
            return Err(EngineError::NotRunning);
        };

        let deadline = Instant::now() + timeout;
        let command = format_request(position, opponent);
        match tokio::time::timeout_at(deadline, send_command(process, &command)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.mark_failed();
                return Err(e);
            }
            Err(_) => {
                // A half-written request leaves the pipe unusable.
                tracing::warn!("Engine did not accept input within {:?}", timeout);
                self.mark_failed();
                return Err(EngineError::Timeout(timeout));
            }
        }

        let result = await_reply(process, deadline, timeout).await;
        if matches!(result, Err(EngineError::Exited(_))) {
            self.mark_failed();
        }
        result
    }

    /// Ask the process to quit, kill it if it lingers, and release the
    /// handle. No-op without a process.
    pub async fn terminate(&mut self) {
        let Some(mut process) = self.process.take() else {
            return;
        };
        tracing::info!("Terminating engine process");
        let grace = Duration::from_secs(1);
        if tokio::time::timeout(grace, send_command(&mut process, "quit\n"))
            .await
            .is_err()
        {
            tracing::debug!("Engine did not accept quit");
        }

        let exited = tokio::time::timeout(grace, process.child.wait()).await;
        if exited.is_err() {
            if let Err(e) = process.child.start_kill() {
                tracing::debug!("Engine kill failed (already exited?): {}", e);
            }
            let _ = tokio::time::timeout(grace, process.child.wait()).await;
        }
        self.state = if self.path.is_some() {
            ConnectionState::Located
        } else {
            ConnectionState::NotLocated
        };
    }

    fn mark_failed(&mut self) {
        // kill_on_drop reaps whatever is left of the child.
        self.process = None;
        self.state = ConnectionState::Failed;
    }
}

async fn spawn_process(path: &Path, settle_delay: Duration) -> Result<EngineProcess, EngineError> {
    tracing::debug!("Spawning engine process");
    let mut child = tokio::process::Command::new(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(EngineError::Spawn)?;

    let stdin = child.stdin.take().ok_or(EngineError::NoStdin)?;
    let stdout = child.stdout.take().ok_or(EngineError::NoStdout)?;

    let (line_tx, lines) = mpsc::channel::<String>(256);
    tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    tracing::debug!("Engine stdout EOF");
                    break;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    tracing::trace!("Engine << {}", trimmed);
                    if line_tx.send(trimmed.to_string()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Error reading engine stdout: {}", e);
                    break;
                }
            }
        }
        tracing::debug!("Engine output reader exiting");
    });

    // Warm-up; the engine does not acknowledge readiness.
    tokio::time::sleep(settle_delay).await;
    if let Some(status) = child.try_wait()? {
        return Err(EngineError::Exited(status.to_string()));
    }

    Ok(EngineProcess {
        child,
        stdin,
        lines,
    })
}

async fn send_command(process: &mut EngineProcess, command: &str) -> Result<(), EngineError> {
    while let Ok(stale) = process.lines.try_recv() {
        tracing::trace!("Discarding stale engine output: {}", stale);
    }

    tracing::debug!("Engine >> {}", command.trim_end().replace('\n', " | "));
    process.stdin.write_all(command.as_bytes()).await?;
    process.stdin.flush().await?;
    Ok(())
}

async fn await_reply(
    process: &mut EngineProcess,
    deadline: Instant,
    timeout: Duration,
) -> Result<Move, EngineError> {
    loop {
        match tokio::time::timeout_at(deadline, process.lines.recv()).await {
            Ok(Some(line)) => {
                if let Some(mv) = parse_reply_line(&line) {
                    tracing::info!("Engine replied: {}", mv);
                    return Ok(mv);
                }
            }
            Ok(None) => return Err(EngineError::Exited("stdout closed".to_string())),
            Err(_) => {
                tracing::debug!("No move from engine within {:?}", timeout);
                return Err(EngineError::Timeout(timeout));
            }
        }
    }
}
