//! Clipboard access through the platform's paste utilities.

use async_trait::async_trait;

use crate::backend::{run_command, BackendError, ClipboardReader};

const PASTE_COMMANDS: &[(&str, &[&str])] = &[
    ("xclip", &["-selection", "clipboard", "-o"]),
    ("wl-paste", &["--no-newline"]),
    ("pbpaste", &[]),
];

/// Reads the clipboard with the first paste utility that works.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandClipboard;

#[async_trait]
impl ClipboardReader for CommandClipboard {
    async fn read_text(&self) -> Result<String, BackendError> {
        let mut last_error = BackendError::Unsupported("clipboard access");
        for (program, args) in PASTE_COMMANDS {
            match run_command(program, args).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::trace!("{} unavailable: {}", program, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}
