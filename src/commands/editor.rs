//! Editor session seen by the commands
//!
//! A session is one command invocation against one document: it knows the
//! active document, can insert text at the cursor, and collects the
//! notifications and progress reports meant for the user.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use utoipa::ToSchema;

/// User-visible notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProgressReport {
    pub increment: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Everything a session reported, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionLog {
    pub notifications: Vec<Notification>,
    pub progress: Vec<ProgressReport>,
}

/// The editor surface the commands drive
#[async_trait]
pub trait EditorSession: Send + Sync {
    /// Path of the active document, `None` when no editor is open
    fn document(&self) -> Option<&Path>;

    /// Insert `text` at the cursor of the active document
    async fn insert_at_cursor(&self, text: &str) -> std::io::Result<()>;

    fn report_progress(&self, increment: u8, message: Option<&str>);

    fn show_info(&self, message: &str);

    fn show_error(&self, message: &str);
}

/// Session backed by a document file on disk
///
/// The cursor is a character offset; offsets past the end append.
pub struct FileEditor {
    document: Option<PathBuf>,
    cursor: usize,
    log: Mutex<SessionLog>,
}

impl FileEditor {
    pub fn new(document: Option<PathBuf>, cursor: usize) -> Self {
        Self {
            document,
            cursor,
            log: Mutex::new(SessionLog::default()),
        }
    }

    /// Take the collected notifications and progress reports
    pub fn into_log(self) -> SessionLog {
        self.log.into_inner()
    }
}

#[async_trait]
impl EditorSession for FileEditor {
    fn document(&self) -> Option<&Path> {
        self.document.as_deref()
    }

    async fn insert_at_cursor(&self, text: &str) -> std::io::Result<()> {
        let Some(document) = &self.document else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no active document",
            ));
        };

        let mut content = match tokio::fs::read_to_string(document).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let at = content
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(content.len());
        content.insert_str(at, text);

        tokio::fs::write(document, content).await?;
        debug!(document = %document.display(), offset = at, "Inserted text at cursor");
        Ok(())
    }

    fn report_progress(&self, increment: u8, message: Option<&str>) {
        self.log.lock().progress.push(ProgressReport {
            increment,
            message: message.map(String::from),
        });
    }

    fn show_info(&self, message: &str) {
        info!(notification = message, "Info notification");
        self.log.lock().notifications.push(Notification {
            level: NotificationLevel::Info,
            message: message.to_string(),
        });
    }

    fn show_error(&self, message: &str) {
        error!(notification = message, "Error notification");
        self.log.lock().notifications.push(Notification {
            level: NotificationLevel::Error,
            message: message.to_string(),
        });
    }
}
