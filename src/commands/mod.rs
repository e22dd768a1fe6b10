//! User commands
//!
//! - Paste-upload: capture the clipboard image, upload it, insert a link
//! - Select-upload: upload a picked file, insert a link

mod editor;
mod workflow;

pub use editor::{EditorSession, FileEditor, Notification, NotificationLevel, ProgressReport, SessionLog};
pub use workflow::{CommandError, CommandOutcome, Commands};
