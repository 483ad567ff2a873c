//! Text recognition through the `tesseract` command-line tool.

use std::io::Write;

use async_trait::async_trait;

use crate::backend::{run_command, BackendError, TextRecognizer};

/// Runs `tesseract <image> stdout` on a temporary PNG.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: String,
    page_mode: u8,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            // Uniform block of text.
            page_mode: 6,
        }
    }
}

impl TesseractOcr {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractOcr {
    async fn recognize(&self, png: &[u8]) -> Result<String, BackendError> {
        let mut file = tempfile::Builder::new()
            .prefix("kingsrow-ocr-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(png)?;
        file.flush()?;

        let path = file.path().to_string_lossy().into_owned();
        let psm = self.page_mode.to_string();
        let text = run_command(&self.program, &[&path, "stdout", "--psm", &psm]).await?;
        tracing::trace!("OCR text: {:?}", text);
        Ok(text)
    }
}
