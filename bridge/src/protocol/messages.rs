use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names accepted in the `command` field.
const COMMANDS: [&str; 4] = ["initialize", "get_best_move", "new_game", "analyze_position"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Initialize,
    GetBestMove {
        #[serde(default)]
        opponent_move: Option<String>,
        #[serde(default)]
        game_history: Vec<String>,
    },
    NewGame,
    AnalyzePosition {
        #[serde(default)]
        position: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Not JSON at all; the message is dropped.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Invalid {command} request: {source}")]
    InvalidFields {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// The reply to send, if any.
    pub fn to_response(&self) -> Option<Response> {
        match self {
            DecodeError::InvalidJson(_) => None,
            other => Some(Response::error(other.to_string())),
        }
    }
}

pub fn decode_command(payload: &[u8]) -> Result<Command, DecodeError> {
    let value: Value = serde_json::from_slice(payload).map_err(DecodeError::InvalidJson)?;

    let name = match value.get("command") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    };
    if !COMMANDS.contains(&name.as_str()) {
        return Err(DecodeError::UnknownCommand(name));
    }

    serde_json::from_value(value).map_err(|source| DecodeError::InvalidFields {
        command: name,
        source,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Status {
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        kingsrow_available: Option<bool>,
    },
    BestMove {
        #[serde(rename = "move")]
        mv: String,
        confidence: f64,
        depth: u32,
        analysis: String,
    },
    Analysis {
        best_move: String,
        position: String,
        evaluation: String,
    },
    Error {
        message: String,
    },
}

pub const PROTOCOL_VERSION: &str = "2.0";

impl Response {
    pub fn initialized(kingsrow_available: bool) -> Self {
        Response::Status {
            status: "initialized".to_string(),
            version: Some(PROTOCOL_VERSION.to_string()),
            kingsrow_available: Some(kingsrow_available),
        }
    }

    pub fn game_reset() -> Self {
        Response::Status {
            status: "game_reset".to_string(),
            version: None,
            kingsrow_available: None,
        }
    }

    pub fn best_move(mv: String, analysis: String) -> Self {
        Response::BestMove {
            mv,
            confidence: 0.8,
            depth: 12,
            analysis,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
