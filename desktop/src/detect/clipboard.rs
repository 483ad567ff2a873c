use std::time::Duration;

use draughts::{first_move_token, Move};

use crate::backend::ClipboardReader;

use super::DetectionError;

/// A move copied to the clipboard while we wait.
pub(super) async fn watch(
    clipboard: &dyn ClipboardReader,
    wait: Duration,
) -> Result<(Move, String), DetectionError> {
    let before = clipboard.read_text().await?;
    tokio::time::sleep(wait).await;
    let after = clipboard.read_text().await?;

    if after == before {
        return Err(DetectionError::NoMatch);
    }
    first_move_token(after.trim())
        .map(|mv| (mv, "clipboard".to_string()))
        .ok_or(DetectionError::NoMatch)
}
