//! Playing a move on the desktop board and reading back the reply.

use std::time::Duration;

use draughts::Move;

use crate::calibration::CalibrationMap;
use crate::detect::{DetectionError, DetectionResult, MoveDetector};
use crate::executor::{AutomationError, AutomationExecutor};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Automation(#[from] AutomationError),
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

pub struct DesktopRelay {
    executor: AutomationExecutor,
    detector: MoveDetector,
    calibration: CalibrationMap,
    play_delay: Duration,
    detection_attempts: u32,
    detection_interval: Duration,
}

impl DesktopRelay {
    pub fn new(
        executor: AutomationExecutor,
        detector: MoveDetector,
        calibration: CalibrationMap,
        play_delay: Duration,
    ) -> Self {
        Self {
            executor,
            detector,
            calibration,
            play_delay,
            detection_attempts: 1,
            detection_interval: Duration::ZERO,
        }
    }

    /// Repeat detection up to `attempts` times, `interval` apart, while the
    /// application is still thinking.
    pub fn with_detection_retries(mut self, attempts: u32, interval: Duration) -> Self {
        self.detection_attempts = attempts.max(1);
        self.detection_interval = interval;
        self
    }

    pub fn calibration(&self) -> &CalibrationMap {
        &self.calibration
    }

    /// Click `mv` onto the board.
    pub async fn play(&self, mv: &Move) -> bool {
        self.executor.execute(mv, &self.calibration).await
    }

    /// Click `mv`, give the application time to answer, then detect its move.
    pub async fn play_and_detect(&self, mv: &Move) -> Result<DetectionResult, RelayError> {
        let execution = self.executor.try_execute(mv, &self.calibration).await?;
        tokio::time::sleep(self.play_delay).await;

        let mut attempt = 1;
        loop {
            match self.detector.detect(execution.window.as_ref()).await {
                Err(DetectionError::Exhausted) if attempt < self.detection_attempts => {
                    tracing::debug!("Detection attempt {} found nothing, retrying", attempt);
                    attempt += 1;
                    tokio::time::sleep(self.detection_interval).await;
                }
                result => return Ok(result?),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use draughts::Square;

    use super::*;
    use crate::backend::WindowInfo;
    use crate::detect::{DetectionSettings, DetectionSource, RegionFraction};
    use crate::executor::AutomationSettings;
    use crate::mock::{FakeCapture, MockWindows, RecordingPointer, ScriptedClipboard, ScriptedOcr};

    fn relay(dir: &std::path::Path, ocr: ScriptedOcr) -> (DesktopRelay, Arc<RecordingPointer>) {
        let window = WindowInfo {
            id: "3".into(),
            title: "CheckerBoard".into(),
            x: 10,
            y: 20,
            width: 640,
            height: 480,
        };
        let pointer = Arc::new(RecordingPointer::default());
        let executor = AutomationExecutor::new(
            Arc::new(MockWindows::with_window(window)),
            pointer.clone(),
            AutomationSettings {
                retry_delay: Duration::ZERO,
                activate_delay: Duration::ZERO,
                click_delay: Duration::ZERO,
                ..AutomationSettings::default()
            },
        );
        let detector = MoveDetector::new(
            Arc::new(FakeCapture::default()),
            Arc::new(ocr),
            Arc::new(ScriptedClipboard::new([""])),
            DetectionSettings {
                log_files: vec![dir.join("none.log")],
                log_tail_lines: 5,
                regions: RegionFraction::defaults(),
                clipboard_wait: Duration::ZERO,
                temp_files: vec![dir.join("none.txt")],
            },
        );
        let positions: BTreeMap<_, _> = (1..=32u8)
            .map(|n| (Square::new(n).unwrap(), (n as i32, n as i32)))
            .collect();
        let calibration = CalibrationMap::new("CheckerBoard", positions);
        (
            DesktopRelay::new(executor, detector, calibration, Duration::ZERO),
            pointer,
        )
    }

    #[tokio::test]
    async fn test_play_and_detect_reads_reply_from_screen() {
        let dir = tempfile::tempdir().unwrap();
        let (relay, pointer) = relay(dir.path(), ScriptedOcr::new(["KingsRow: 22-18"]));

        let mv: Move = "11-15".parse().unwrap();
        let result = relay.play_and_detect(&mv).await.unwrap();
        assert_eq!(result.mv.to_string(), "22-18");
        assert_eq!(result.source, DetectionSource::Ocr);
        assert_eq!(pointer.clicks(), vec![(21, 31), (25, 35)]);
    }

    #[tokio::test]
    async fn test_detection_retried_until_reply_appears() {
        let dir = tempfile::tempdir().unwrap();
        // Four empty regions on the first pass, the reply on the second.
        let ocr = ScriptedOcr::new(["", "", "", "", "", "9-13"]);
        let (relay, _) = relay(dir.path(), ocr);
        let relay = relay.with_detection_retries(3, Duration::ZERO);

        let mv: Move = "22-18".parse().unwrap();
        let result = relay.play_and_detect(&mv).await.unwrap();
        assert_eq!(result.mv.to_string(), "9-13");
    }

    #[tokio::test]
    async fn test_play_and_detect_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let (relay, _) = relay(dir.path(), ScriptedOcr::default());

        let mv: Move = "11-15".parse().unwrap();
        assert!(matches!(
            relay.play_and_detect(&mv).await,
            Err(RelayError::Detection(DetectionError::Exhausted))
        ));
    }
}
