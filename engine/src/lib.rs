pub mod connection;
pub mod exchange;
pub mod locate;
pub mod protocol;

pub use connection::{ConnectionState, EngineConnection};
pub use exchange::{ExchangeRequest, FileExchange};
pub use locate::{EngineLocator, ENGINE_PATH_ENV};
pub use protocol::{format_request, parse_reply_line};

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Engine executable not found")]
    NotLocated,
    #[error("Failed to spawn engine: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Engine has no stdin")]
    NoStdin,
    #[error("Engine has no stdout")]
    NoStdout,
    #[error("Engine is not running")]
    NotRunning,
    #[error("Engine exited: {0}")]
    Exited(String),
    #[error("No move from engine within {0:?}")]
    Timeout(Duration),
    #[error("Engine produced no move")]
    NoMove,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode exchange file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Timing and file locations for talking to the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Warm-up wait after spawning before the engine is considered running.
    pub settle_delay: Duration,
    /// Wall-clock bound on reading a reply from the live process.
    pub direct_timeout: Duration,
    /// Wall-clock bound on a file-exchange run of the executable.
    pub file_timeout: Duration,
    /// Directory holding the exchange input and output files.
    pub exchange_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            direct_timeout: Duration::from_secs(10),
            file_timeout: Duration::from_secs(15),
            exchange_dir: std::env::temp_dir(),
        }
    }
}
