//! Local save-path resolution for captured and selected images

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Path-related errors
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Failed make folder {path}: {source}")]
    DirectoryCreationFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Operating system family, used to pick helper scripts and path policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// Compute where an image named `file_name` should be written on disk.
///
/// A relative `local_path` is resolved against the folder containing
/// `document`. An absolute `local_path` is used as-is, except on Windows where
/// the system temp directory is used instead.
pub fn resolve_image_path(
    document: &Path,
    local_path: &str,
    file_name: &str,
    platform: Platform,
) -> PathBuf {
    // Only the base name of a selected file is kept.
    let image_name = Path::new(file_name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| file_name.into());

    let configured = Path::new(local_path);
    let image_path = if configured.is_absolute() {
        match platform {
            Platform::Windows => std::env::temp_dir().join(&image_name),
            Platform::MacOs | Platform::Linux => configured.join(&image_name),
        }
    } else {
        let folder = document.parent().unwrap_or_else(|| Path::new(""));
        folder.join(configured).join(&image_name)
    };

    debug!(path = %image_path.display(), "Resolved local image path");
    image_path
}

/// Make sure the directory that will hold `image_path` exists
pub async fn ensure_parent_dir(image_path: &Path) -> Result<(), PathError> {
    let Some(dir) = image_path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };

    if tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(());
    }

    tokio::fs::create_dir_all(dir).await.map_err(|source| {
        error!(path = %dir.display(), error = %source, "Failed to create image directory");
        PathError::DirectoryCreationFailure {
            path: dir.to_path_buf(),
            source,
        }
    })
}

/// Strip one pair of surrounding double quotes from a path string
pub fn unquote_path(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}
