use async_trait::async_trait;
use draughts::Move;
use engine::EngineConnection;

use super::{MoveStrategy, ResolveRequest, StrategyFailed};

/// Ask the running engine process over its stdin/stdout.
pub struct DirectStrategy;

#[async_trait]
impl MoveStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn propose(
        &self,
        engine: &mut EngineConnection,
        request: &ResolveRequest<'_>,
    ) -> Result<Move, StrategyFailed> {
        Ok(engine
            .request_move(request.position, request.opponent)
            .await?)
    }
}
