//! Seams between the automation logic and the operating system.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error("Failed to launch {program}: {message}")]
    Launch { program: String, message: String },
    #[error("{program} failed: {message}")]
    CommandFailed { program: String, message: String },
    #[error("Unexpected output from {program}: {output}")]
    BadOutput { program: String, output: String },
    #[error("Screen capture failed: {0}")]
    Capture(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A top-level window and its screen geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: String,
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowInfo {
    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Absolute screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait WindowControl: Send + Sync {
    /// First visible window whose title contains `title`.
    async fn find_window(&self, title: &str) -> Result<Option<WindowInfo>, BackendError>;

    /// Bring the window to the foreground.
    async fn activate(&self, window: &WindowInfo) -> Result<(), BackendError>;
}

#[async_trait]
pub trait PointerInput: Send + Sync {
    /// Left click at absolute screen coordinates.
    async fn click(&self, x: i32, y: i32) -> Result<(), BackendError>;
}

#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Capture a region as PNG bytes.
    async fn capture(&self, region: ScreenRegion) -> Result<Vec<u8>, BackendError>;
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, png: &[u8]) -> Result<String, BackendError>;
}

#[async_trait]
pub trait ClipboardReader: Send + Sync {
    async fn read_text(&self) -> Result<String, BackendError>;
}

/// Run an external helper program and return its stdout.
pub(crate) async fn run_command(program: &str, args: &[&str]) -> Result<String, BackendError> {
    tracing::trace!("Running {} {:?}", program, args);
    let output = tokio::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| BackendError::Launch {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(BackendError::CommandFailed {
            program: program.to_string(),
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
