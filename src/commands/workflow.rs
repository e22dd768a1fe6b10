//! Paste-upload and select-upload workflows

use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use super::editor::EditorSession;
use crate::capture::{CaptureError, CaptureResult, ClipboardCapturer};
use crate::config::{ConfigErrors, CosSettings};
use crate::domain::{
    ensure_parent_dir, markdown_image, paste_file_name, resolve_image_path, PathError, Platform,
};
use crate::pipeline::{UploadError, UploadSource, Uploader};
use crate::storage::ObjectStore;

const NO_EDITOR: &str = "No editable window is open.";
const NO_IMAGE: &str = "There is not a image in clipboard.";
const MAKE_FOLDER_FAILED: &str = "Failed make folder.";
const COMPLETE: &str = "Complete upload!";

/// Command failures; each has already been reported to the session
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No editable window is open")]
    NoActiveEditor,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(ConfigErrors),

    #[error(transparent)]
    Directory(#[from] PathError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Failed to insert image link: {0}")]
    Insert(#[source] std::io::Error),
}

impl CommandError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::NoActiveEditor => "NO_ACTIVE_EDITOR",
            CommandError::InvalidConfig(_) => "INVALID_CONFIG",
            CommandError::Directory(_) => "DIRECTORY_CREATION_FAILED",
            CommandError::Capture(_) => "CAPTURE_FAILED",
            CommandError::Upload(_) => "UPLOAD_FAILED",
            CommandError::Insert(_) => "INSERT_FAILED",
        }
    }

    /// Whether the request itself was unusable, as opposed to a runtime failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, CommandError::NoActiveEditor | CommandError::InvalidConfig(_))
    }
}

/// How a command finished when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Markdown was inserted at the cursor
    Inserted { markdown: String, url: String },
    /// The clipboard held no image; nothing was uploaded
    NoImage,
    /// No file was picked
    Cancelled,
}

/// The two user commands, wired to one storage client and clipboard helper
pub struct Commands {
    settings: CosSettings,
    uploader: Uploader,
    capturer: Arc<dyn ClipboardCapturer>,
    platform: Platform,
}

impl Commands {
    pub fn new(
        settings: CosSettings,
        store: Arc<dyn ObjectStore>,
        capturer: Arc<dyn ClipboardCapturer>,
        platform: Platform,
    ) -> Self {
        let uploader = Uploader::new(&settings, store);
        Self {
            settings,
            uploader,
            capturer,
            platform,
        }
    }

    /// Capture the clipboard image, upload it and insert a link at the cursor
    #[instrument(skip(self, editor))]
    pub async fn paste_upload(
        &self,
        editor: &dyn EditorSession,
    ) -> Result<CommandOutcome, CommandError> {
        let document = self.active_document(editor)?;
        editor.report_progress(0, None);
        self.validate(editor)?;

        let file_name = paste_file_name(Local::now().naive_local());
        let image_path =
            resolve_image_path(&document, &self.settings.local_path, &file_name, self.platform);

        if let Err(e) = ensure_parent_dir(&image_path).await {
            editor.report_progress(100, Some(MAKE_FOLDER_FAILED));
            editor.show_error(MAKE_FOLDER_FAILED);
            return Err(e.into());
        }

        let captured = match self.capturer.capture(&image_path).await {
            Ok(CaptureResult::ImageCaptured(path)) => path,
            Ok(CaptureResult::NoImage) => {
                editor.show_info(NO_IMAGE);
                editor.report_progress(100, Some(NO_IMAGE));
                return Ok(CommandOutcome::NoImage);
            }
            Err(e @ CaptureError::MissingXclip) => {
                let message = e.to_string();
                editor.show_info(&message);
                editor.report_progress(100, Some(&message));
                return Err(e.into());
            }
            Err(e) => {
                let message = format!("Failed to capture clipboard image. Error:{}", e);
                editor.report_progress(100, Some(&message));
                editor.show_error(&message);
                return Err(e.into());
            }
        };

        self.upload_and_insert(editor, UploadSource::Clipboard(captured)).await
    }

    /// Upload a picked file and insert a link at the cursor
    ///
    /// `selected` is the file picker result; `None` means the picker was dismissed.
    #[instrument(skip(self, editor))]
    pub async fn select_upload(
        &self,
        editor: &dyn EditorSession,
        selected: Option<&Path>,
    ) -> Result<CommandOutcome, CommandError> {
        let Some(selected) = selected else {
            return Ok(CommandOutcome::Cancelled);
        };

        self.active_document(editor)?;
        editor.report_progress(0, None);
        self.validate(editor)?;

        self.upload_and_insert(editor, UploadSource::Selected(selected.to_path_buf()))
            .await
    }

    fn active_document(&self, editor: &dyn EditorSession) -> Result<PathBuf, CommandError> {
        match editor.document() {
            Some(document) => Ok(document.to_path_buf()),
            None => {
                editor.show_error(NO_EDITOR);
                Err(CommandError::NoActiveEditor)
            }
        }
    }

    fn validate(&self, editor: &dyn EditorSession) -> Result<(), CommandError> {
        self.settings.validate().map_err(|errors| {
            for violation in errors.violations() {
                editor.show_error(&violation.to_string());
            }
            CommandError::InvalidConfig(errors)
        })
    }

    async fn upload_and_insert(
        &self,
        editor: &dyn EditorSession,
        source: UploadSource,
    ) -> Result<CommandOutcome, CommandError> {
        let outcome = match self.uploader.upload(&source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                editor.report_progress(100, Some(&format!("Upload error.{}", e)));
                editor.show_error(&format!("Failed to upload image. Error:{}", e));
                return Err(e.into());
            }
        };

        let markdown = markdown_image(&outcome.name, &outcome.url);
        if let Err(e) = editor.insert_at_cursor(&markdown).await {
            let message = format!("Failed to insert image link. Error:{}", e);
            editor.report_progress(100, Some(&message));
            editor.show_error(&message);
            return Err(CommandError::Insert(e));
        }

        info!(key = %outcome.key, "Inserted image link");
        editor.report_progress(100, Some(COMPLETE));
        editor.show_info(COMPLETE);

        Ok(CommandOutcome::Inserted {
            markdown,
            url: outcome.url,
        })
    }
}
