//! Scripted capturer for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{CaptureError, CaptureResult, ClipboardCapturer};

/// What the fake clipboard does when captured
#[derive(Debug, Clone, Copy)]
pub enum FakeClipboard {
    /// Holds an image with these bytes
    Image(&'static [u8]),
    Empty,
    NoXclip,
    Hang,
}

pub struct FakeCapturer {
    clipboard: FakeClipboard,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeCapturer {
    pub fn new(clipboard: FakeClipboard) -> Arc<Self> {
        Arc::new(Self {
            clipboard,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ClipboardCapturer for FakeCapturer {
    async fn capture(&self, destination: &Path) -> Result<CaptureResult, CaptureError> {
        self.calls.lock().push(destination.to_path_buf());
        match self.clipboard {
            FakeClipboard::Image(bytes) => {
                tokio::fs::write(destination, bytes)
                    .await
                    .map_err(|e| CaptureError::Failed(e.to_string()))?;
                Ok(CaptureResult::ImageCaptured(destination.to_path_buf()))
            }
            FakeClipboard::Empty => Ok(CaptureResult::NoImage),
            FakeClipboard::NoXclip => Err(CaptureError::MissingXclip),
            FakeClipboard::Hang => Err(CaptureError::TimedOut(Duration::from_secs(10))),
        }
    }
}
