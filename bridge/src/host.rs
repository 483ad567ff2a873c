//! The browser-facing channel loop.
//!
//! One request is fully handled before the next frame is read.

use draughts::Move;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::protocol::{decode_command, read_frame, write_frame, Command, FrameError, Response};
use crate::resolver::{MoveResolver, ResolveRequest};
use crate::session::Session;

pub struct Host {
    session: Session,
    resolver: MoveResolver,
}

impl Host {
    pub fn new(session: Session, resolver: MoveResolver) -> Self {
        Self { session, resolver }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn resolver_mut(&mut self) -> &mut MoveResolver {
        &mut self.resolver
    }

    /// Serve frames until the peer closes the channel.
    ///
    /// Malformed messages are logged and dropped. Only a failure to write a
    /// reply is returned as an error.
    pub async fn run<R, W>(&mut self, reader: &mut R, writer: &mut W) -> Result<(), FrameError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("Channel open");
        loop {
            let payload = match read_frame(reader).await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    tracing::info!("Channel closed by peer");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Dropped frame: {}", e);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Channel ended: {}", e);
                    return Ok(());
                }
            };

            let Some(response) = self.handle_payload(&payload).await else {
                continue;
            };
            let bytes = match response.to_json() {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!("Failed to encode response: {}", e);
                    continue;
                }
            };
            tracing::trace!("Sending {}", String::from_utf8_lossy(&bytes));
            write_frame(writer, &bytes).await?;
        }
    }

    /// Decode and handle one payload. `None` means drop without replying.
    pub async fn handle_payload(&mut self, payload: &[u8]) -> Option<Response> {
        tracing::trace!("Received {}", String::from_utf8_lossy(payload));
        match decode_command(payload) {
            Ok(command) => Some(self.handle(command).await),
            Err(e) => {
                tracing::warn!("Rejected message: {}", e);
                e.to_response()
            }
        }
    }

    pub async fn handle(&mut self, command: Command) -> Response {
        match command {
            Command::Initialize => {
                let available = self.resolver.engine_mut().ensure_located().is_some();
                tracing::info!("Initialized (engine available: {})", available);
                Response::initialized(available)
            }
            Command::GetBestMove {
                opponent_move,
                game_history,
            } => self.best_move(opponent_move, &game_history).await,
            Command::NewGame => {
                self.session.reset();
                Response::game_reset()
            }
            Command::AnalyzePosition { position } => {
                let position = position.unwrap_or_else(|| self.session.position().to_string());
                let request = ResolveRequest {
                    position: &position,
                    opponent: None,
                    history: self.session.history(),
                };
                let resolution = self.resolver.resolve(request).await;
                Response::Analysis {
                    best_move: resolution.mv.to_string(),
                    position,
                    evaluation: "Analysis complete".to_string(),
                }
            }
        }
    }

    async fn best_move(&mut self, opponent_move: Option<String>, history: &[String]) -> Response {
        self.session.sync_history(history);

        let opponent = opponent_move
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .and_then(|token| match token.parse::<Move>() {
                Ok(mv) => Some(mv),
                Err(e) => {
                    tracing::warn!("Ignoring opponent move {:?}: {}", token, e);
                    None
                }
            });
        if let Some(mv) = &opponent {
            self.session.record_opponent_move(mv);
        }

        let request = ResolveRequest {
            position: self.session.position(),
            opponent: opponent.as_ref(),
            history: self.session.history(),
        };
        let resolution = self.resolver.resolve(request).await;
        self.session.append_move(resolution.mv.clone());

        let after = opponent
            .map(|mv| mv.to_string())
            .unwrap_or_else(|| "start".to_string());
        Response::best_move(
            resolution.mv.to_string(),
            format!(
                "Best move calculated for position after {} ({})",
                after, resolution.source
            ),
        )
    }

    /// Stop the engine and remove exchange files.
    pub async fn shutdown(&mut self) {
        self.resolver.shutdown().await;
        self.session.remove_transient_files();
        tracing::info!("Cleanup completed");
    }
}
