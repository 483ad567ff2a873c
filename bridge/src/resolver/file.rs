use async_trait::async_trait;
use draughts::Move;
use engine::{EngineConnection, ExchangeRequest, FileExchange};

use super::{MoveStrategy, ResolveRequest, StrategyFailed};

/// Run the engine executable once against an input/output file pair.
pub struct FileStrategy;

#[async_trait]
impl MoveStrategy for FileStrategy {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn propose(
        &self,
        engine: &mut EngineConnection,
        request: &ResolveRequest<'_>,
    ) -> Result<Move, StrategyFailed> {
        let Some(exe) = engine.ensure_located() else {
            return Err(StrategyFailed::EngineUnavailable(
                "executable not found".to_string(),
            ));
        };
        let settings = engine.settings();
        let exchange = FileExchange::new(&settings.exchange_dir);
        let exchange_request =
            ExchangeRequest::new(request.position, request.opponent, request.history);
        Ok(exchange
            .run(&exe, &exchange_request, settings.file_timeout)
            .await?)
    }
}
