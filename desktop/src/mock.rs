//! In-memory backends for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{
    BackendError, ClipboardReader, PointerInput, ScreenCapture, ScreenRegion, TextRecognizer,
    WindowControl, WindowInfo,
};

#[derive(Debug, Default)]
pub struct MockWindows {
    window: Option<WindowInfo>,
    lookups: Mutex<Vec<String>>,
    activations: Mutex<usize>,
}

impl MockWindows {
    pub fn with_window(window: WindowInfo) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn activations(&self) -> usize {
        *self.activations.lock().unwrap()
    }
}

#[async_trait]
impl WindowControl for MockWindows {
    async fn find_window(&self, title: &str) -> Result<Option<WindowInfo>, BackendError> {
        self.lookups.lock().unwrap().push(title.to_string());
        Ok(self
            .window
            .clone()
            .filter(|window| window.title.contains(title)))
    }

    async fn activate(&self, _window: &WindowInfo) -> Result<(), BackendError> {
        *self.activations.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingPointer {
    clicks: Mutex<Vec<(i32, i32)>>,
}

impl RecordingPointer {
    pub fn clicks(&self) -> Vec<(i32, i32)> {
        self.clicks.lock().unwrap().clone()
    }
}

#[async_trait]
impl PointerInput for RecordingPointer {
    async fn click(&self, x: i32, y: i32) -> Result<(), BackendError> {
        self.clicks.lock().unwrap().push((x, y));
        Ok(())
    }
}

/// Returns the region geometry encoded as bytes so OCR fakes can tell
/// regions apart.
#[derive(Debug, Default)]
pub struct FakeCapture {
    fail: bool,
    regions: Mutex<Vec<ScreenRegion>>,
}

impl FakeCapture {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn regions(&self) -> Vec<ScreenRegion> {
        self.regions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScreenCapture for FakeCapture {
    async fn capture(&self, region: ScreenRegion) -> Result<Vec<u8>, BackendError> {
        self.regions.lock().unwrap().push(region);
        if self.fail {
            return Err(BackendError::Capture("no display".into()));
        }
        Ok(format!("{},{},{},{}", region.x, region.y, region.width, region.height).into_bytes())
    }
}

/// Hands out queued texts, one per call, then empty strings.
#[derive(Debug, Default)]
pub struct ScriptedOcr {
    texts: Mutex<VecDeque<String>>,
    calls: Mutex<usize>,
}

impl ScriptedOcr {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: Mutex::new(texts.into_iter().map(Into::into).collect()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextRecognizer for ScriptedOcr {
    async fn recognize(&self, _png: &[u8]) -> Result<String, BackendError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.texts.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Returns queued clipboard contents in order, repeating the last one.
#[derive(Debug, Default)]
pub struct ScriptedClipboard {
    contents: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<String>,
}

impl ScriptedClipboard {
    pub fn new<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            contents: Mutex::new(contents.into_iter().map(|s| Ok(s.into())).collect()),
            last: Mutex::new(String::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            contents: Mutex::new(VecDeque::from([Err("no clipboard".to_string())])),
            last: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl ClipboardReader for ScriptedClipboard {
    async fn read_text(&self) -> Result<String, BackendError> {
        let next = self.contents.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => {
                *self.last.lock().unwrap() = text.clone();
                Ok(text)
            }
            Some(Err(message)) => Err(BackendError::CommandFailed {
                program: "clipboard".into(),
                message,
            }),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}
