//! Square-to-screen mapping loaded from the calibration file.
//!
//! ```json
//! {
//!   "window_title": "CheckerBoard",
//!   "square_positions": { "1": [412, 118], "2": [512, 118] },
//!   "calibration_date": "2024-03-01 18:22:10"
//! }
//! ```
//!
//! Offsets are relative to the target window's top-left corner.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use draughts::{Square, SQUARE_COUNT};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("Failed to read calibration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid calibration file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CalibrationFile {
    #[serde(default)]
    window_title: String,
    #[serde(default)]
    square_positions: HashMap<String, (f64, f64)>,
    #[serde(default)]
    calibration_date: Option<String>,
}

/// Read-only after loading.
#[derive(Debug, Clone, Default)]
pub struct CalibrationMap {
    window_title: String,
    positions: BTreeMap<Square, (i32, i32)>,
    calibration_date: Option<String>,
}

impl CalibrationMap {
    pub fn new(window_title: impl Into<String>, positions: BTreeMap<Square, (i32, i32)>) -> Self {
        Self {
            window_title: window_title.into(),
            positions,
            calibration_date: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let text = std::fs::read_to_string(path)?;
        let map = Self::from_json(&text)?;
        tracing::info!(
            "Loaded calibration from {} ({} squares, window '{}')",
            path.display(),
            map.positions.len(),
            map.window_title
        );
        Ok(map)
    }

    /// Entries with keys that are not square numbers are skipped.
    pub fn from_json(text: &str) -> Result<Self, CalibrationError> {
        let file: CalibrationFile = serde_json::from_str(text)?;
        let mut positions = BTreeMap::new();
        for (key, (x, y)) in file.square_positions {
            let square = key.trim().parse::<u8>().ok().and_then(|n| Square::new(n).ok());
            match square {
                Some(square) => {
                    positions.insert(square, (x.round() as i32, y.round() as i32));
                }
                None => tracing::warn!("Ignoring calibration entry for '{}'", key),
            }
        }

        let map = Self {
            window_title: file.window_title,
            positions,
            calibration_date: file.calibration_date,
        };
        if !map.is_complete() {
            tracing::warn!(
                "Calibration covers {}/{} squares; moves touching the rest cannot be played",
                map.positions.len(),
                SQUARE_COUNT
            );
        }
        Ok(map)
    }

    pub fn window_title(&self) -> &str {
        &self.window_title
    }

    pub fn calibration_date(&self) -> Option<&str> {
        self.calibration_date.as_deref()
    }

    pub fn position(&self, square: Square) -> Option<(i32, i32)> {
        self.positions.get(&square).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.positions.len() == SQUARE_COUNT as usize
    }

    /// Squares from `squares` that have no position, in the given order.
    pub fn missing<'a>(&self, squares: impl IntoIterator<Item = &'a Square>) -> Vec<Square> {
        squares
            .into_iter()
            .filter(|square| !self.positions.contains_key(square))
            .copied()
            .collect()
    }
}
