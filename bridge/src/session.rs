//! Per-process game state: move history and the position token.

use std::path::PathBuf;

use draughts::Move;

/// Position token sent to the engine at the start of a game.
pub const INITIAL_POSITION: &str = "8/8/8/8/8/8/8/8 b - - 0 1";

/// History is append-only within a game; only [`Session::reset`] clears it.
#[derive(Debug)]
pub struct Session {
    history: Vec<Move>,
    position: String,
    transient_files: Vec<PathBuf>,
}

impl Session {
    /// `transient_files` are removed on reset and shutdown.
    pub fn new(transient_files: Vec<PathBuf>) -> Self {
        Self {
            history: Vec::new(),
            position: INITIAL_POSITION.to_string(),
            transient_files,
        }
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn append_move(&mut self, mv: Move) {
        tracing::debug!("History += {} (len {})", mv, self.history.len() + 1);
        self.history.push(mv);
    }

    /// Append `mv` unless the history already ends with it.
    pub fn record_opponent_move(&mut self, mv: &Move) {
        if self.history.last() != Some(mv) {
            self.append_move(mv.clone());
        }
    }

    /// Extend the history with entries the client knows about and we don't.
    ///
    /// Malformed entries are skipped. If the client's history disagrees
    /// with ours on a shared prefix, ours is kept.
    pub fn sync_history(&mut self, reported: &[String]) {
        let parsed: Vec<Move> = reported
            .iter()
            .filter_map(|token| match token.trim().parse::<Move>() {
                Ok(mv) => Some(mv),
                Err(e) => {
                    tracing::warn!("Skipping history entry {:?}: {}", token, e);
                    None
                }
            })
            .collect();

        let shared = parsed.len().min(self.history.len());
        if parsed[..shared] != self.history[..shared] {
            tracing::warn!(
                "Client history diverges ({} vs {} moves); keeping session history",
                parsed.len(),
                self.history.len()
            );
            return;
        }
        for mv in parsed.into_iter().skip(shared) {
            self.append_move(mv);
        }
    }

    /// Start a new game and remove leftover exchange files.
    pub fn reset(&mut self) {
        self.history.clear();
        self.position = INITIAL_POSITION.to_string();
        self.remove_transient_files();
        tracing::info!("Game state reset");
    }

    pub fn remove_transient_files(&self) {
        for path in &self.transient_files {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }
}
