//! Helper-script clipboard capturer

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use super::{CaptureError, CaptureResult, ClipboardCapturer};
use crate::domain::{unquote_path, Platform};

const NO_IMAGE: &str = "no image";
const NO_XCLIP: &str = "no xclip";

/// Runs an external helper that writes the clipboard image to a path
#[derive(Debug, Clone)]
pub struct ScriptCapturer {
    program: OsString,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ScriptCapturer {
    /// Run `program args.. <destination>` for each capture
    pub fn new(program: impl Into<OsString>, args: Vec<OsString>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Pick the helper for `platform` from `scripts_dir`
    ///
    /// - Windows: `pc.ps1` under PowerShell in STA mode
    /// - macOS: `mac.applescript` under osascript
    /// - anything else: `linux.sh` under sh (needs xclip)
    pub fn for_platform(platform: Platform, scripts_dir: &Path, timeout: Duration) -> Self {
        match platform {
            Platform::Windows => {
                let mut args: Vec<OsString> = [
                    "-noprofile",
                    "-noninteractive",
                    "-nologo",
                    "-sta",
                    "-executionpolicy",
                    "unrestricted",
                    "-windowstyle",
                    "hidden",
                    "-file",
                ]
                .iter()
                .map(OsString::from)
                .collect();
                args.push(scripts_dir.join("pc.ps1").into_os_string());
                Self::new("powershell", args, timeout)
            }
            Platform::MacOs => Self::new(
                "osascript",
                vec![scripts_dir.join("mac.applescript").into_os_string()],
                timeout,
            ),
            Platform::Linux => Self::new(
                "sh",
                vec![scripts_dir.join("linux.sh").into_os_string()],
                timeout,
            ),
        }
    }
}

#[async_trait]
impl ClipboardCapturer for ScriptCapturer {
    #[instrument(skip(self))]
    async fn capture(&self, destination: &Path) -> Result<CaptureResult, CaptureError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(destination)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(CaptureError::Spawn)?;

        // Dropping the pending future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                warn!(timeout_secs = self.timeout.as_secs_f32(), "Clipboard helper timed out");
                CaptureError::TimedOut(self.timeout)
            })?
            .map_err(|e| CaptureError::Failed(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last();

        debug!(helper = ?self.program, status = %output.status, reported = ?reported, "Clipboard helper finished");

        match reported {
            Some(NO_IMAGE) => {
                info!("Clipboard holds no image");
                Ok(CaptureResult::NoImage)
            }
            Some(NO_XCLIP) => Err(CaptureError::MissingXclip),
            Some(path) => Ok(CaptureResult::ImageCaptured(PathBuf::from(unquote_path(path)))),
            None if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                Err(CaptureError::Failed(if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                }))
            }
            None => Err(CaptureError::NoOutput),
        }
    }
}
