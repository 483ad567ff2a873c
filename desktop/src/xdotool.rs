//! Window control and pointer input through `xdotool`.

use async_trait::async_trait;

use crate::backend::{run_command, BackendError, PointerInput, WindowControl, WindowInfo};

const XDOTOOL: &str = "xdotool";

#[derive(Debug, Default, Clone, Copy)]
pub struct XdoTool;

impl XdoTool {
    async fn geometry(&self, id: &str) -> Result<(i32, i32, u32, u32), BackendError> {
        let output = run_command(XDOTOOL, &["getwindowgeometry", "--shell", id]).await?;
        parse_geometry(&output).ok_or_else(|| BackendError::BadOutput {
            program: XDOTOOL.to_string(),
            output,
        })
    }
}

#[async_trait]
impl WindowControl for XdoTool {
    async fn find_window(&self, title: &str) -> Result<Option<WindowInfo>, BackendError> {
        // xdotool exits non-zero when nothing matches.
        let args = ["search", "--onlyvisible", "--name", title];
        let output = match run_command(XDOTOOL, &args).await {
            Ok(output) => output,
            Err(BackendError::CommandFailed { message, .. }) => {
                tracing::trace!("No window matching '{}': {}", title, message);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(id) = output.lines().map(str::trim).find(|line| !line.is_empty()) else {
            return Ok(None);
        };
        let (x, y, width, height) = self.geometry(id).await?;
        let name = run_command(XDOTOOL, &["getwindowname", id])
            .await
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|_| title.to_string());

        Ok(Some(WindowInfo {
            id: id.to_string(),
            title: name,
            x,
            y,
            width,
            height,
        }))
    }

    async fn activate(&self, window: &WindowInfo) -> Result<(), BackendError> {
        run_command(XDOTOOL, &["windowactivate", "--sync", &window.id]).await?;
        Ok(())
    }
}

#[async_trait]
impl PointerInput for XdoTool {
    async fn click(&self, x: i32, y: i32) -> Result<(), BackendError> {
        let (x, y) = (x.to_string(), y.to_string());
        run_command(XDOTOOL, &["mousemove", "--sync", &x, &y, "click", "1"]).await?;
        Ok(())
    }
}

/// Parse `getwindowgeometry --shell` output (`X=10\nY=20\nWIDTH=...`).
fn parse_geometry(output: &str) -> Option<(i32, i32, u32, u32)> {
    let mut x = None;
    let mut y = None;
    let mut width = None;
    let mut height = None;
    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "X" => x = value.parse().ok(),
            "Y" => y = value.parse().ok(),
            "WIDTH" => width = value.parse().ok(),
            "HEIGHT" => height = value.parse().ok(),
            _ => {}
        }
    }
    Some((x?, y?, width?, height?))
}
