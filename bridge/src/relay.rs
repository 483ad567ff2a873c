//! HTTP intake for moves played in the browser.
//!
//! `POST /` queues a move for the desktop worker and answers at once. The
//! worker plays queued moves one at a time, so click sequences never
//! overlap. `GET /last-move` reports the most recent outcome.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use desktop::{DesktopRelay, RelayError};
use draughts::Move;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Moves waiting for the worker beyond the one in progress.
pub const QUEUE_CAPACITY: usize = 1;

/// Outcome of the last processed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastMove {
    pub played: String,
    pub reply: Option<String>,
    pub source: Option<String>,
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct RelayState {
    queue: mpsc::Sender<Move>,
    last: Arc<Mutex<Option<LastMove>>>,
}

impl RelayState {
    pub fn new(queue: mpsc::Sender<Move>) -> Self {
        Self {
            queue,
            last: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn last_move(&self) -> Option<LastMove> {
        self.last.lock().await.clone()
    }
}

/// Build the state and spawn the worker that drains its queue.
pub fn start(relay: DesktopRelay) -> (RelayState, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    let state = RelayState::new(tx);
    let worker = tokio::spawn(run_worker(relay, rx, state.last.clone()));
    (state, worker)
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", post(submit_move).options(preflight))
        .route("/last-move", get(last_move).options(preflight))
        .fallback(fallback)
        .layer(axum::middleware::map_response(add_cors_headers))
        .with_state(state)
}

async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn fallback(method: Method) -> StatusCode {
    if method == Method::OPTIONS {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    let message = message.into();
    tracing::warn!("Rejecting request ({}): {}", status, message);
    (status, Json(json!({ "error": message })))
}

async fn submit_move(State(state): State<RelayState>, body: Bytes) -> (StatusCode, Json<Value>) {
    if body.is_empty() {
        return reject(StatusCode::BAD_REQUEST, "Empty request");
    }
    let data: Value = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(_) => return reject(StatusCode::BAD_REQUEST, "Invalid JSON"),
    };
    tracing::debug!("Parsed request: {}", data);

    let Some(token) = data
        .get("move")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
    else {
        return reject(StatusCode::BAD_REQUEST, "No move in request");
    };
    let mv = match token.parse::<Move>() {
        Ok(mv) => mv,
        Err(e) => return reject(StatusCode::BAD_REQUEST, format!("Invalid move: {}", e)),
    };

    match state.queue.try_send(mv) {
        Ok(()) => {
            tracing::info!("Queued move {}", token);
            (StatusCode::OK, Json(json!({ "status": "ok" })))
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            reject(StatusCode::SERVICE_UNAVAILABLE, "Relay busy")
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Relay worker stopped")
        }
    }
}

async fn last_move(State(state): State<RelayState>) -> Response {
    match state.last_move().await {
        Some(last) => Json(last).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn run_worker(
    relay: DesktopRelay,
    mut queue: mpsc::Receiver<Move>,
    last: Arc<Mutex<Option<LastMove>>>,
) {
    tracing::info!("Relay worker started");
    while let Some(mv) = queue.recv().await {
        tracing::info!("Playing {}", mv);
        let outcome = match relay.play_and_detect(&mv).await {
            Ok(detection) => LastMove {
                played: mv.to_string(),
                reply: Some(detection.mv.to_string()),
                source: Some(detection.source.to_string()),
                detected: true,
                error: None,
            },
            Err(RelayError::Detection(e)) => {
                tracing::warn!("No reply detected after {}: {}", mv, e);
                LastMove {
                    played: mv.to_string(),
                    reply: Some(Move::default().to_string()),
                    source: None,
                    detected: false,
                    error: Some(e.to_string()),
                }
            }
            Err(e) => {
                tracing::error!("Could not play {}: {}", mv, e);
                LastMove {
                    played: mv.to_string(),
                    reply: None,
                    source: None,
                    detected: false,
                    error: Some(e.to_string()),
                }
            }
        };
        *last.lock().await = Some(outcome);
    }
    tracing::info!("Relay worker stopped");
}
