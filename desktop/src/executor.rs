//! Replays a move on the desktop board as a chain of clicks.

use std::sync::Arc;
use std::time::Duration;

use draughts::{Move, Square};

use crate::backend::{BackendError, PointerInput, WindowControl, WindowInfo};
use crate::calibration::CalibrationMap;
use crate::xdotool::XdoTool;

/// Window titles tried after the one recorded in the calibration file.
pub const DEFAULT_WINDOW_TITLES: &[&str] = &[
    "CheckerBoard",
    "Checkerboard",
    "checkerboard",
    "KingsRow",
    "Draughts",
    "Checkers",
];

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("No calibrated position for squares {0:?}")]
    MissingSquares(Vec<Square>),
    #[error("Target window not found")]
    WindowNotFound,
    #[error("Input failed: {0}")]
    Input(#[from] BackendError),
}

#[derive(Debug, Clone)]
pub struct AutomationSettings {
    pub titles: Vec<String>,
    pub window_attempts: u32,
    pub retry_delay: Duration,
    pub activate_delay: Duration,
    pub click_delay: Duration,
    /// Refuse to click when no window was found instead of using screen origin.
    pub require_window: bool,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            titles: DEFAULT_WINDOW_TITLES.iter().map(|t| t.to_string()).collect(),
            window_attempts: 3,
            retry_delay: Duration::from_secs(1),
            activate_delay: Duration::from_millis(500),
            click_delay: Duration::from_millis(500),
            require_window: false,
        }
    }
}

/// Outcome of a played move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub window: Option<WindowInfo>,
    pub clicks: Vec<(i32, i32)>,
}

pub struct AutomationExecutor {
    windows: Arc<dyn WindowControl>,
    pointer: Arc<dyn PointerInput>,
    settings: AutomationSettings,
}

impl AutomationExecutor {
    pub fn new(
        windows: Arc<dyn WindowControl>,
        pointer: Arc<dyn PointerInput>,
        settings: AutomationSettings,
    ) -> Self {
        Self {
            windows,
            pointer,
            settings,
        }
    }

    /// Executor backed by `xdotool`.
    pub fn system(settings: AutomationSettings) -> Self {
        let xdo = Arc::new(XdoTool);
        Self::new(xdo.clone(), xdo, settings)
    }

    pub fn settings(&self) -> &AutomationSettings {
        &self.settings
    }

    fn titles<'a>(&'a self, calibration: &'a CalibrationMap) -> Vec<&'a str> {
        let mut titles: Vec<&str> = Vec::with_capacity(self.settings.titles.len() + 1);
        let preferred = calibration.window_title().trim();
        if !preferred.is_empty() {
            titles.push(preferred);
        }
        for title in &self.settings.titles {
            if !titles.contains(&title.as_str()) {
                titles.push(title);
            }
        }
        titles
    }

    /// Find the target window, retrying the whole title list a few times.
    pub async fn locate_window(&self, calibration: &CalibrationMap) -> Option<WindowInfo> {
        let titles = self.titles(calibration);
        let attempts = self.settings.window_attempts.max(1);

        for attempt in 1..=attempts {
            for title in &titles {
                match self.windows.find_window(title).await {
                    Ok(Some(window)) => {
                        tracing::debug!("Found window '{}' for title '{}'", window.title, title);
                        return Some(window);
                    }
                    Ok(None) => {}
                    Err(e) => tracing::debug!("Window lookup for '{}' failed: {}", title, e),
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.settings.retry_delay).await;
            }
        }

        tracing::warn!("No target window found after {} attempts", attempts);
        None
    }

    /// Click `from` and then every landing square of `mv`.
    ///
    /// Nothing is clicked unless every square on the path is calibrated.
    pub async fn try_execute(
        &self,
        mv: &Move,
        calibration: &CalibrationMap,
    ) -> Result<Execution, AutomationError> {
        let mut path = vec![mv.from()];
        path.extend(mv.landing_squares());

        let missing = calibration.missing(&path);
        if !missing.is_empty() {
            return Err(AutomationError::MissingSquares(missing));
        }

        let window = self.locate_window(calibration).await;
        let (origin_x, origin_y) = match &window {
            Some(window) => {
                if let Err(e) = self.windows.activate(window).await {
                    tracing::warn!("Could not activate '{}': {}", window.title, e);
                }
                tokio::time::sleep(self.settings.activate_delay).await;
                window.origin()
            }
            None if self.settings.require_window => return Err(AutomationError::WindowNotFound),
            None => (0, 0),
        };

        let mut clicks = Vec::with_capacity(path.len());
        for square in &path {
            let Some((dx, dy)) = calibration.position(*square) else {
                return Err(AutomationError::MissingSquares(vec![*square]));
            };
            let (x, y) = (origin_x + dx, origin_y + dy);
            tracing::debug!("Clicking square {} at ({}, {})", square, x, y);
            self.pointer.click(x, y).await?;
            clicks.push((x, y));
            tokio::time::sleep(self.settings.click_delay).await;
        }

        tracing::info!("Played {} with {} clicks", mv, clicks.len());
        Ok(Execution { window, clicks })
    }

    /// Play `mv`, reporting failure as `false`.
    pub async fn execute(&self, mv: &Move, calibration: &CalibrationMap) -> bool {
        match self.try_execute(mv, calibration).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Could not play {}: {}", mv, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::mock::{MockWindows, RecordingPointer};

    fn sq(n: u8) -> Square {
        Square::new(n).unwrap()
    }

    fn fast_settings() -> AutomationSettings {
        AutomationSettings {
            retry_delay: Duration::ZERO,
            activate_delay: Duration::ZERO,
            click_delay: Duration::ZERO,
            ..AutomationSettings::default()
        }
    }

    fn full_map() -> CalibrationMap {
        let positions: BTreeMap<_, _> = (1..=32)
            .map(|n| (sq(n), (n as i32 * 10, n as i32)))
            .collect();
        CalibrationMap::new("CheckerBoard", positions)
    }

    fn window_at(x: i32, y: i32) -> WindowInfo {
        WindowInfo {
            id: "1".into(),
            title: "CheckerBoard - KingsRow".into(),
            x,
            y,
            width: 800,
            height: 600,
        }
    }

    #[tokio::test]
    async fn test_simple_move_clicks_from_then_to() {
        let windows = Arc::new(MockWindows::with_window(window_at(100, 200)));
        let pointer = Arc::new(RecordingPointer::default());
        let executor = AutomationExecutor::new(windows.clone(), pointer.clone(), fast_settings());

        let mv: Move = "11-15".parse().unwrap();
        assert!(executor.execute(&mv, &full_map()).await);
        assert_eq!(pointer.clicks(), vec![(210, 211), (250, 215)]);
        assert_eq!(windows.activations(), 1);
    }

    #[tokio::test]
    async fn test_multi_jump_clicks_each_landing_square() {
        let windows = Arc::new(MockWindows::with_window(window_at(0, 0)));
        let pointer = Arc::new(RecordingPointer::default());
        let executor = AutomationExecutor::new(windows, pointer.clone(), fast_settings());

        let mv: Move = "9x18x27".parse().unwrap();
        assert!(executor.execute(&mv, &full_map()).await);
        assert_eq!(pointer.clicks(), vec![(90, 9), (180, 18), (270, 27)]);
    }

    #[tokio::test]
    async fn test_missing_square_clicks_nothing() {
        let mut positions = BTreeMap::new();
        positions.insert(sq(11), (10, 10));
        let map = CalibrationMap::new("CheckerBoard", positions);

        let windows = Arc::new(MockWindows::with_window(window_at(0, 0)));
        let pointer = Arc::new(RecordingPointer::default());
        let executor = AutomationExecutor::new(windows.clone(), pointer.clone(), fast_settings());

        let mv: Move = "11-15".parse().unwrap();
        let err = executor.try_execute(&mv, &map).await.unwrap_err();
        assert!(matches!(err, AutomationError::MissingSquares(ref s) if s == &vec![sq(15)]));
        assert!(pointer.clicks().is_empty());
        assert!(windows.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_window_not_found_uses_screen_origin() {
        let windows = Arc::new(MockWindows::empty());
        let pointer = Arc::new(RecordingPointer::default());
        let executor = AutomationExecutor::new(windows.clone(), pointer.clone(), fast_settings());

        let mv: Move = "22-18".parse().unwrap();
        assert!(executor.execute(&mv, &full_map()).await);
        assert_eq!(pointer.clicks(), vec![(220, 22), (180, 18)]);
        // Three passes over the title list.
        assert_eq!(windows.lookups().len(), 3 * DEFAULT_WINDOW_TITLES.len());
    }

    #[tokio::test]
    async fn test_required_window_missing_fails() {
        let windows = Arc::new(MockWindows::empty());
        let pointer = Arc::new(RecordingPointer::default());
        let settings = AutomationSettings {
            require_window: true,
            window_attempts: 1,
            ..fast_settings()
        };
        let executor = AutomationExecutor::new(windows, pointer.clone(), settings);

        let mv: Move = "22-18".parse().unwrap();
        assert!(!executor.execute(&mv, &full_map()).await);
        assert!(pointer.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_calibration_title_tried_first() {
        let windows = Arc::new(MockWindows::empty());
        let pointer = Arc::new(RecordingPointer::default());
        let settings = AutomationSettings {
            window_attempts: 1,
            ..fast_settings()
        };
        let executor = AutomationExecutor::new(windows.clone(), pointer, settings);

        let map = CalibrationMap::new("My Board", BTreeMap::new());
        executor.locate_window(&map).await;
        let lookups = windows.lookups();
        assert_eq!(lookups[0], "My Board");
        assert_eq!(lookups[1], "CheckerBoard");
    }
}
