//! Clipboard capture
//!
//! Clipboard images are dumped to disk by a small per-OS helper script run as
//! a child process. The helper writes the image to the path it is given and
//! prints that path, or `no image` when the clipboard holds no image.

#[cfg(test)]
mod fake;
mod script;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
pub use fake::{FakeCapturer, FakeClipboard};
pub use script::ScriptCapturer;

/// Outcome of a capture that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureResult {
    /// The clipboard image was written to this path
    ImageCaptured(PathBuf),
    /// The clipboard holds no image
    NoImage,
}

/// Capture failures
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("You need to install xclip command first.")]
    MissingXclip,

    #[error("Failed to start clipboard helper: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Clipboard helper timed out after {}s", .0.as_secs_f32())]
    TimedOut(Duration),

    #[error("Clipboard helper exited without reporting a path")]
    NoOutput,

    #[error("Clipboard helper failed: {0}")]
    Failed(String),
}

/// Dumps the current clipboard image to a file
#[async_trait]
pub trait ClipboardCapturer: Send + Sync {
    async fn capture(&self, destination: &Path) -> Result<CaptureResult, CaptureError>;
}
