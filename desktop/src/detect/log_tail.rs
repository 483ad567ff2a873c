use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use draughts::{last_move_token, Move};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::DetectionError;

/// Only the end of a log is of interest.
const TAIL_BYTES: u64 = 16 * 1024;

/// Newest move in the last `lines` lines of the first log that has one.
pub(super) async fn scan(
    paths: &[PathBuf],
    lines: usize,
) -> Result<(Move, String), DetectionError> {
    for path in paths {
        let tail = match read_tail(path, lines).await {
            Ok(tail) => tail,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::debug!("Cannot read log {}: {}", path.display(), e);
                continue;
            }
        };

        for line in tail.iter().rev() {
            if let Some(mv) = last_move_token(line) {
                return Ok((mv, path.display().to_string()));
            }
        }
    }
    Err(DetectionError::NoMatch)
}

async fn read_tail(path: &Path, lines: usize) -> std::io::Result<Vec<String>> {
    let mut file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let start = len.saturating_sub(TAIL_BYTES);
    file.seek(SeekFrom::Start(start)).await?;

    let mut buf = Vec::with_capacity((len - start) as usize);
    file.read_to_end(&mut buf).await?;
    let text = String::from_utf8_lossy(&buf);

    // Blank lines count towards the tail.
    let mut tail: Vec<String> = text.lines().map(|line| line.trim().to_string()).collect();
    // The first line may be cut by the seek.
    if start > 0 && tail.len() > lines {
        tail.remove(0);
    }
    let skip = tail.len().saturating_sub(lines);
    Ok(tail.split_off(skip))
}
