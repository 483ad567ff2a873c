//! File-based exchange with the engine executable.
//!
//! The request is written as JSON to an input file, the executable is run
//! once with `--input <file> --output <file>`, and the first move token in
//! the output file is the reply.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use draughts::{first_move_token, Move};
use serde::Serialize;

use crate::EngineError;

pub const INPUT_FILE: &str = "kingsrow_position.txt";
pub const OUTPUT_FILE: &str = "kingsrow_output.txt";

#[derive(Debug, Clone, Serialize)]
pub struct ExchangeRequest {
    pub position: String,
    pub opponent_move: Option<String>,
    pub move_history: Vec<String>,
    /// Seconds since the Unix epoch.
    pub request_time: f64,
}

impl ExchangeRequest {
    pub fn new(position: &str, opponent: Option<&Move>, history: &[Move]) -> Self {
        let request_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self {
            position: position.to_string(),
            opponent_move: opponent.map(|mv| mv.to_string()),
            move_history: history.iter().map(|mv| mv.to_string()).collect(),
            request_time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileExchange {
    input: PathBuf,
    output: PathBuf,
}

impl FileExchange {
    pub fn new(dir: &Path) -> Self {
        Self {
            input: dir.join(INPUT_FILE),
            output: dir.join(OUTPUT_FILE),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Files this exchange may leave behind.
    pub fn transient_files(&self) -> Vec<PathBuf> {
        vec![self.input.clone(), self.output.clone()]
    }

    pub async fn run(
        &self,
        exe: &Path,
        request: &ExchangeRequest,
        timeout: Duration,
    ) -> Result<Move, EngineError> {
        let body = serde_json::to_string_pretty(request)?;
        tokio::fs::write(&self.input, body).await?;

        // A reply left over from an earlier run must never be read back.
        match tokio::fs::remove_file(&self.output).await {
            Ok(()) => tracing::debug!("Removed stale exchange output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(
            "Running {} --input {} --output {}",
            exe.display(),
            self.input.display(),
            self.output.display()
        );
        let run = tokio::process::Command::new(exe)
            .arg("--input")
            .arg(&self.input)
            .arg("--output")
            .arg(&self.output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, run).await {
            Ok(Ok(output)) => {
                tracing::debug!("Engine exchange run finished: {}", output.status);
            }
            Ok(Err(e)) => return Err(EngineError::Spawn(e)),
            Err(_) => {
                tracing::warn!("Engine execution timed out after {:?}", timeout);
                return Err(EngineError::Timeout(timeout));
            }
        }

        let reply = match tokio::fs::read_to_string(&self.output).await {
            Ok(reply) => reply,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::NoMove);
            }
            Err(e) => return Err(e.into()),
        };
        first_move_token(&reply).ok_or(EngineError::NoMove)
    }

    /// Remove both exchange files, ignoring ones that do not exist.
    pub fn cleanup(&self) {
        for path in [&self.input, &self.output] {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draughts::parse_move;
    use tempfile::TempDir;

    #[test]
    fn test_request_shape() {
        let history = vec![parse_move("11-15").unwrap(), parse_move("23-19").unwrap()];
        let opponent = parse_move("23-19").unwrap();
        let request = ExchangeRequest::new("start", Some(&opponent), &history);
        let json: serde_json::Value = serde_json::to_value(&request).unwrap();

        assert_eq!(json["position"], "start");
        assert_eq!(json["opponent_move"], "23-19");
        assert_eq!(json["move_history"], serde_json::json!(["11-15", "23-19"]));
        assert!(json["request_time"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_cleanup_removes_files() {
        let temp_dir = TempDir::new().unwrap();
        let exchange = FileExchange::new(temp_dir.path());
        std::fs::write(exchange.input_path(), "{}").unwrap();
        std::fs::write(exchange.output_path(), "11-15").unwrap();

        exchange.cleanup();
        assert!(!exchange.input_path().exists());
        assert!(!exchange.output_path().exists());

        // Second call with nothing to remove is fine.
        exchange.cleanup();
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let temp_dir = TempDir::new().unwrap();
        let exchange = FileExchange::new(temp_dir.path());
        let request = ExchangeRequest::new("start", None, &[]);

        let result = exchange
            .run(
                &temp_dir.path().join("no-such-engine"),
                &request,
                Duration::from_secs(1),
            )
            .await;
        assert!(matches!(result, Err(EngineError::Spawn(_))));
        assert!(exchange.input_path().exists());
    }
}
