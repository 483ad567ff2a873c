//! Recovering the desktop engine's reply from indirect sources.
//!
//! Sources are tried in a fixed order and the first move found wins:
//! log files, OCR of regions around the board, the clipboard, and finally
//! temp files written by helper scripts. A failing source is logged and
//! skipped; running out of sources is [`DetectionError::Exhausted`].

mod clipboard;
mod log_tail;
mod screen;
mod temp_files;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use draughts::Move;

use crate::backend::{
    BackendError, ClipboardReader, ScreenCapture, ScreenRegion, TextRecognizer, WindowInfo,
};
use crate::capture::SystemCapture;
use crate::clipboard::CommandClipboard;
use crate::ocr::TesseractOcr;

pub use screen::RegionFraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionSource {
    LogFile,
    Ocr,
    Clipboard,
    TempFile,
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectionSource::LogFile => "log",
            DetectionSource::Ocr => "ocr",
            DetectionSource::Clipboard => "clipboard",
            DetectionSource::TempFile => "tempfile",
        };
        f.write_str(name)
    }
}

/// A recovered move and where it came from. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    pub mv: Move,
    pub source: DetectionSource,
    pub detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("No move found")]
    NoMatch,
    #[error("No target window to capture")]
    NoWindow,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No move detected by any method")]
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub log_files: Vec<PathBuf>,
    pub log_tail_lines: usize,
    pub regions: Vec<RegionFraction>,
    pub clipboard_wait: Duration,
    pub temp_files: Vec<PathBuf>,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            log_files: default_log_files(),
            log_tail_lines: 5,
            regions: RegionFraction::defaults(),
            clipboard_wait: Duration::from_secs(1),
            temp_files: default_temp_files(),
        }
    }
}

fn default_log_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(docs) = dirs::document_dir() {
        paths.push(docs.join("CheckerBoard").join("checkerboard.log"));
        paths.push(docs.join("KingsRow").join("kingsrow.log"));
    }
    if let Some(data) = dirs::data_dir() {
        paths.push(data.join("CheckerBoard").join("checkerboard.log"));
    }
    let tmp = std::env::temp_dir();
    paths.push(tmp.join("checkerboard.log"));
    paths.push(tmp.join("kingsrow.log"));
    paths
}

fn default_temp_files() -> Vec<PathBuf> {
    let tmp = std::env::temp_dir();
    ["kingsrow_move.txt", "checkerboard_move.txt", "cb_move.txt"]
        .iter()
        .map(|name| tmp.join(name))
        .collect()
}

pub struct MoveDetector {
    capture: Arc<dyn ScreenCapture>,
    ocr: Arc<dyn TextRecognizer>,
    clipboard: Arc<dyn ClipboardReader>,
    settings: DetectionSettings,
}

impl MoveDetector {
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        ocr: Arc<dyn TextRecognizer>,
        clipboard: Arc<dyn ClipboardReader>,
        settings: DetectionSettings,
    ) -> Self {
        Self {
            capture,
            ocr,
            clipboard,
            settings,
        }
    }

    /// Detector using the system capture, `tesseract` and paste utilities.
    pub fn system(settings: DetectionSettings) -> Self {
        Self::new(
            Arc::new(SystemCapture),
            Arc::new(TesseractOcr::default()),
            Arc::new(CommandClipboard),
            settings,
        )
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Try every source in priority order. `window` anchors the OCR regions.
    pub async fn detect(
        &self,
        window: Option<&WindowInfo>,
    ) -> Result<DetectionResult, DetectionError> {
        let sources = [
            DetectionSource::LogFile,
            DetectionSource::Ocr,
            DetectionSource::Clipboard,
            DetectionSource::TempFile,
        ];

        for source in sources {
            let attempt = match source {
                DetectionSource::LogFile => {
                    log_tail::scan(&self.settings.log_files, self.settings.log_tail_lines).await
                }
                DetectionSource::Ocr => self.scan_screen(window).await,
                DetectionSource::Clipboard => {
                    clipboard::watch(self.clipboard.as_ref(), self.settings.clipboard_wait).await
                }
                DetectionSource::TempFile => temp_files::poll(&self.settings.temp_files).await,
            };

            match attempt {
                Ok((mv, detail)) => {
                    tracing::info!("Detected {} via {} ({})", mv, source, detail);
                    return Ok(DetectionResult { mv, source, detail });
                }
                Err(DetectionError::NoMatch) => {
                    tracing::debug!("No move from {}", source);
                }
                Err(e) => {
                    tracing::warn!("Detection via {} failed: {}", source, e);
                }
            }
        }

        tracing::warn!("All detection methods exhausted");
        Err(DetectionError::Exhausted)
    }

    async fn scan_screen(
        &self,
        window: Option<&WindowInfo>,
    ) -> Result<(Move, String), DetectionError> {
        let window = window.ok_or(DetectionError::NoWindow)?;
        let regions: Vec<ScreenRegion> = self
            .settings
            .regions
            .iter()
            .map(|fraction| fraction.resolve(window))
            .collect();
        screen::scan(self.capture.as_ref(), self.ocr.as_ref(), &regions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FakeCapture, ScriptedClipboard, ScriptedOcr};

    fn window() -> WindowInfo {
        WindowInfo {
            id: "1".into(),
            title: "CheckerBoard".into(),
            x: 0,
            y: 0,
            width: 1000,
            height: 800,
        }
    }

    fn settings(dir: &std::path::Path) -> DetectionSettings {
        DetectionSettings {
            log_files: vec![dir.join("board.log")],
            log_tail_lines: 5,
            regions: RegionFraction::defaults(),
            clipboard_wait: Duration::ZERO,
            temp_files: vec![dir.join("move.txt")],
        }
    }

    fn detector(
        dir: &std::path::Path,
        ocr: ScriptedOcr,
        clipboard: ScriptedClipboard,
    ) -> MoveDetector {
        MoveDetector::new(
            Arc::new(FakeCapture::default()),
            Arc::new(ocr),
            Arc::new(clipboard),
            settings(dir),
        )
    }

    #[tokio::test]
    async fn test_log_file_wins_over_ocr() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("board.log"),
            "engine started\nKingsRow plays 9-14\n",
        )
        .unwrap();
        let ocr = ScriptedOcr::new(["Last move: 22-18"]);
        let detector = detector(dir.path(), ocr, ScriptedClipboard::new(["", ""]));

        let result = detector.detect(Some(&window())).await.unwrap();
        assert_eq!(result.mv.to_string(), "9-14");
        assert_eq!(result.source, DetectionSource::LogFile);
    }

    #[tokio::test]
    async fn test_ocr_used_when_logs_missing() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = ScriptedOcr::new(["", "Move 23 - 19", ""]);
        let detector = detector(dir.path(), ocr, ScriptedClipboard::new([""]));

        let result = detector.detect(Some(&window())).await.unwrap();
        assert_eq!(result.mv.to_string(), "23-19");
        assert_eq!(result.source, DetectionSource::Ocr);
    }

    #[tokio::test]
    async fn test_clipboard_change_detected() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = ScriptedClipboard::new(["old text", "24-20"]);
        let detector = detector(dir.path(), ScriptedOcr::default(), clipboard);

        let result = detector.detect(None).await.unwrap();
        assert_eq!(result.mv.to_string(), "24-20");
        assert_eq!(result.source, DetectionSource::Clipboard);
    }

    #[tokio::test]
    async fn test_unchanged_clipboard_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("move.txt"), "10-15\n").unwrap();
        let clipboard = ScriptedClipboard::new(["11-15", "11-15"]);
        let detector = detector(dir.path(), ScriptedOcr::default(), clipboard);

        let result = detector.detect(None).await.unwrap();
        assert_eq!(result.mv.to_string(), "10-15");
        assert_eq!(result.source, DetectionSource::TempFile);
        assert!(!dir.path().join("move.txt").exists());
    }

    #[tokio::test]
    async fn test_failing_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("move.txt"), "6x15").unwrap();
        let detector = MoveDetector::new(
            Arc::new(FakeCapture::failing()),
            Arc::new(ScriptedOcr::default()),
            Arc::new(ScriptedClipboard::unavailable()),
            settings(dir.path()),
        );

        let result = detector.detect(Some(&window())).await.unwrap();
        assert_eq!(result.mv.to_string(), "6x15");
        assert_eq!(result.source, DetectionSource::TempFile);
    }

    #[tokio::test]
    async fn test_exhausted_when_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let detector = detector(dir.path(), ScriptedOcr::default(), ScriptedClipboard::new([""]));
        assert!(matches!(
            detector.detect(Some(&window())).await,
            Err(DetectionError::Exhausted)
        ));
    }
}
