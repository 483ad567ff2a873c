//! Obtaining a reply move through an ordered chain of strategies.
//!
//! Each strategy either proposes a move or reports why it could not. The
//! resolver stops at the first proposal; the heuristic strategy at the end
//! of the default chain never fails, and a constant move backs even that.

mod automation;
mod direct;
mod file;
mod heuristic;

use std::time::Duration;

use async_trait::async_trait;
use draughts::Move;
use engine::{EngineConnection, EngineError};

pub use automation::DesktopStrategy;
pub use direct::DirectStrategy;
pub use file::FileStrategy;
pub use heuristic::{heuristic_move, HeuristicStrategy, LAST_RESORT_MOVE, OPENING_MOVES};

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub position: &'a str,
    pub opponent: Option<&'a Move>,
    pub history: &'a [Move],
}

#[derive(Debug, thiserror::Error)]
pub enum StrategyFailed {
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("no move within {0:?}")]
    Timeout(Duration),
    #[error("engine error: {0}")]
    Engine(EngineError),
    #[error("desktop relay failed: {0}")]
    Desktop(#[from] desktop::RelayError),
    #[error("not applicable: {0}")]
    NotApplicable(&'static str),
}

impl From<EngineError> for StrategyFailed {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Timeout(limit) => StrategyFailed::Timeout(limit),
            EngineError::NotLocated | EngineError::NotRunning | EngineError::Spawn(_) => {
                StrategyFailed::EngineUnavailable(e.to_string())
            }
            other => StrategyFailed::Engine(other),
        }
    }
}

#[async_trait]
pub trait MoveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn propose(
        &self,
        engine: &mut EngineConnection,
        request: &ResolveRequest<'_>,
    ) -> Result<Move, StrategyFailed>;
}

/// The chosen move and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub mv: Move,
    pub source: &'static str,
}

/// Owns the engine connection and the strategy chain.
pub struct MoveResolver {
    engine: EngineConnection,
    strategies: Vec<Box<dyn MoveStrategy>>,
}

impl MoveResolver {
    pub fn new(engine: EngineConnection, strategies: Vec<Box<dyn MoveStrategy>>) -> Self {
        Self { engine, strategies }
    }

    /// Direct IPC, file IPC, the desktop relay when one is given, then the
    /// heuristic.
    pub fn standard(engine: EngineConnection, relay: Option<desktop::DesktopRelay>) -> Self {
        let mut strategies: Vec<Box<dyn MoveStrategy>> =
            vec![Box::new(DirectStrategy), Box::new(FileStrategy)];
        if let Some(relay) = relay {
            strategies.push(Box::new(DesktopStrategy::new(relay)));
        }
        strategies.push(Box::new(HeuristicStrategy));
        Self::new(engine, strategies)
    }

    pub fn engine(&self) -> &EngineConnection {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineConnection {
        &mut self.engine
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Always returns a valid move.
    pub async fn resolve(&mut self, request: ResolveRequest<'_>) -> Resolution {
        tracing::info!(
            "Resolving reply to {} ({} moves played)",
            request
                .opponent
                .map(|mv| mv.to_string())
                .unwrap_or_else(|| "opening".to_string()),
            request.history.len()
        );
        self.ensure_engine().await;

        for strategy in &self.strategies {
            match strategy.propose(&mut self.engine, &request).await {
                Ok(mv) => {
                    tracing::info!("{} strategy chose {}", strategy.name(), mv);
                    return Resolution {
                        mv,
                        source: strategy.name(),
                    };
                }
                Err(e) => tracing::warn!("{} strategy failed: {}", strategy.name(), e),
            }
        }

        tracing::warn!("Every strategy failed, playing {}", LAST_RESORT_MOVE);
        Resolution {
            mv: heuristic::last_resort(),
            source: "last-resort",
        }
    }

    /// Start the engine if it is installed and not already running.
    async fn ensure_engine(&mut self) {
        if self.engine.is_alive() || self.engine.ensure_located().is_none() {
            return;
        }
        if let Err(e) = self.engine.start().await {
            tracing::warn!("Engine start failed: {}", e);
        }
    }

    pub async fn shutdown(&mut self) {
        self.engine.terminate().await;
    }
}
