//! Domain types and helpers for the upload pipeline

mod markdown;
mod paths;
mod template;

pub use markdown::{markdown_image, paste_file_name};
pub use paths::{ensure_parent_dir, resolve_image_path, unquote_path, PathError, Platform};
pub use template::{expand_remote_key, TemplateVars};
