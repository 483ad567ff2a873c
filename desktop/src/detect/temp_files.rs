use std::path::PathBuf;

use draughts::{first_move_token, Move};

use super::DetectionError;

/// First move found in the candidate files. The file is consumed.
pub(super) async fn poll(paths: &[PathBuf]) -> Result<(Move, String), DetectionError> {
    for path in paths {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::debug!("Cannot read {}: {}", path.display(), e);
                continue;
            }
        };

        if let Some(mv) = first_move_token(&text) {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!("Could not remove {}: {}", path.display(), e);
            }
            return Ok((mv, path.display().to_string()));
        }
    }
    Err(DetectionError::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_consumed_file_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("a.txt");
        let full = dir.path().join("b.txt");
        std::fs::write(&empty, "waiting\n").unwrap();
        std::fs::write(&full, "21-17\n").unwrap();

        let (mv, _) = poll(&[empty.clone(), full.clone()]).await.unwrap();
        assert_eq!(mv.to_string(), "21-17");
        assert!(empty.exists());
        assert!(!full.exists());
    }

    #[tokio::test]
    async fn test_no_files_no_match() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            poll(&[dir.path().join("none.txt")]).await,
            Err(DetectionError::NoMatch)
        ));
    }
}
