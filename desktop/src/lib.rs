//! Driving the windowed draughts application.
//!
//! [`AutomationExecutor`] replays a move as a chain of clicks on the board,
//! using a [`CalibrationMap`] to turn square numbers into screen positions.
//! [`MoveDetector`] recovers the application's reply when it cannot be read
//! directly, trying log files, OCR, the clipboard and temp files in turn.
//! Platform access goes through the traits in [`backend`].

pub mod backend;
pub mod calibration;
pub mod capture;
pub mod clipboard;
pub mod detect;
pub mod executor;
pub mod ocr;
pub mod relay;
pub mod xdotool;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::{
    BackendError, ClipboardReader, PointerInput, ScreenCapture, ScreenRegion, TextRecognizer,
    WindowControl, WindowInfo,
};
pub use calibration::{CalibrationError, CalibrationMap};
pub use detect::{
    DetectionError, DetectionResult, DetectionSettings, DetectionSource, MoveDetector,
    RegionFraction,
};
pub use executor::{AutomationError, AutomationExecutor, AutomationSettings, Execution};
pub use relay::{DesktopRelay, RelayError};
