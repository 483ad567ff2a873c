use async_trait::async_trait;
use desktop::DesktopRelay;
use draughts::Move;
use engine::EngineConnection;

use super::{MoveStrategy, ResolveRequest, StrategyFailed};

/// Play the opponent's move in the desktop application and read its reply
/// back off the screen.
pub struct DesktopStrategy {
    relay: DesktopRelay,
}

impl DesktopStrategy {
    pub fn new(relay: DesktopRelay) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl MoveStrategy for DesktopStrategy {
    fn name(&self) -> &'static str {
        "desktop"
    }

    async fn propose(
        &self,
        _engine: &mut EngineConnection,
        request: &ResolveRequest<'_>,
    ) -> Result<Move, StrategyFailed> {
        let Some(opponent) = request.opponent else {
            return Err(StrategyFailed::NotApplicable("no opponent move to play"));
        };
        let detection = self.relay.play_and_detect(opponent).await?;
        tracing::debug!("Desktop reply {} from {}", detection.mv, detection.source);
        Ok(detection.mv)
    }
}
