use draughts::{find_algebraic_moves, find_move_tokens, find_spaced_moves, Move};

use crate::backend::{ScreenCapture, ScreenRegion, TextRecognizer, WindowInfo};

use super::DetectionError;

/// A rectangle expressed as fractions of the target window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionFraction {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RegionFraction {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top strip, bottom strip, right panel, left panel.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(0.0, 0.0, 1.0, 0.15),
            Self::new(0.0, 0.85, 1.0, 0.15),
            Self::new(0.7, 0.0, 0.3, 1.0),
            Self::new(0.0, 0.0, 0.3, 1.0),
        ]
    }

    pub fn resolve(&self, window: &WindowInfo) -> ScreenRegion {
        let w = window.width as f32;
        let h = window.height as f32;
        ScreenRegion {
            x: window.x + (self.x * w).round() as i32,
            y: window.y + (self.y * h).round() as i32,
            width: (self.width * w).round().max(0.0) as u32,
            height: (self.height * h).round().max(0.0) as u32,
        }
    }
}

/// Every move in `text`: numeric tokens, then algebraic, then spaced.
fn moves_in(text: &str) -> Vec<Move> {
    let mut moves = find_move_tokens(text);
    moves.extend(find_algebraic_moves(text));
    moves.extend(find_spaced_moves(text));
    moves
}

/// OCR each region and keep the last move seen.
pub(super) async fn scan(
    capture: &dyn ScreenCapture,
    ocr: &dyn TextRecognizer,
    regions: &[ScreenRegion],
) -> Result<(Move, String), DetectionError> {
    let mut found = None;
    let mut read_any = false;
    let mut last_error = None;

    for (index, region) in regions.iter().enumerate() {
        let text = match capture.capture(*region).await {
            Ok(png) => ocr.recognize(&png).await,
            Err(e) => Err(e),
        };
        match text {
            Ok(text) => {
                read_any = true;
                if let Some(mv) = moves_in(&text).pop() {
                    tracing::debug!("OCR region {} read {}", index, mv);
                    found = Some((mv, format!("region {}", index)));
                }
            }
            Err(e) => {
                tracing::debug!("OCR region {} failed: {}", index, e);
                last_error = Some(e);
            }
        }
    }

    match (found, last_error) {
        (Some(found), _) => Ok(found),
        (None, Some(e)) if !read_any => Err(e.into()),
        _ => Err(DetectionError::NoMatch),
    }
}
