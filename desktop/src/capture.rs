//! Screen capture of board-adjacent regions.

use async_trait::async_trait;

use crate::backend::{BackendError, ScreenCapture, ScreenRegion};

/// Captures the screen through the platform's display server.
///
/// Requires the `screen-capture` feature; without it every capture
/// reports [`BackendError::Unsupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCapture;

#[async_trait]
impl ScreenCapture for SystemCapture {
    async fn capture(&self, region: ScreenRegion) -> Result<Vec<u8>, BackendError> {
        if region.width == 0 || region.height == 0 {
            return Err(BackendError::Capture(format!("empty region {:?}", region)));
        }
        tokio::task::spawn_blocking(move || capture_region(region))
            .await
            .map_err(|e| BackendError::Capture(e.to_string()))?
    }
}

#[cfg(feature = "screen-capture")]
fn capture_region(region: ScreenRegion) -> Result<Vec<u8>, BackendError> {
    use std::io::Cursor;

    let capture_err = |e: xcap::XCapError| BackendError::Capture(e.to_string());

    let monitor = xcap::Monitor::from_point(region.x, region.y).map_err(capture_err)?;
    let monitor_x = monitor.x().map_err(capture_err)?;
    let monitor_y = monitor.y().map_err(capture_err)?;
    let frame = monitor.capture_image().map_err(capture_err)?;

    // Clamp to the monitor the region starts on.
    let left = (region.x - monitor_x).max(0) as u32;
    let top = (region.y - monitor_y).max(0) as u32;
    let width = region.width.min(frame.width().saturating_sub(left));
    let height = region.height.min(frame.height().saturating_sub(top));
    if width == 0 || height == 0 {
        return Err(BackendError::Capture(format!(
            "region {:?} lies outside the monitor",
            region
        )));
    }

    let cropped = image::imageops::crop_imm(&frame, left, top, width, height).to_image();
    let mut png = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| BackendError::Capture(e.to_string()))?;
    tracing::trace!("Captured {}x{} at ({}, {})", width, height, region.x, region.y);
    Ok(png)
}

#[cfg(not(feature = "screen-capture"))]
fn capture_region(_region: ScreenRegion) -> Result<Vec<u8>, BackendError> {
    Err(BackendError::Unsupported("screen capture"))
}
