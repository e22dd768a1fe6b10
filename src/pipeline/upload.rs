//! Upload client over an injected object store

use chrono::{Local, NaiveDateTime};
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::CosSettings;
use crate::domain::{expand_remote_key, unquote_path, TemplateVars};
use crate::storage::{rewrite_domain, ObjectStore, StorageError};

/// Upload errors
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Where the uploaded file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Temporary file written by a clipboard capture; removed after upload
    Clipboard(PathBuf),
    /// File the user picked; never touched
    Selected(PathBuf),
}

impl UploadSource {
    fn raw_path(&self) -> &Path {
        match self {
            UploadSource::Clipboard(path) | UploadSource::Selected(path) => path,
        }
    }

    /// Local path with surrounding quotes removed
    pub fn local_path(&self) -> PathBuf {
        let raw = self.raw_path();
        match raw.to_str() {
            Some(s) => PathBuf::from(unquote_path(s)),
            None => raw.to_path_buf(),
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Link text for the markdown image; intentionally left empty
    pub name: String,
    pub url: String,
    /// Remote object key
    pub key: String,
}

/// Hex MD5 of `data`
pub fn content_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Uploads local files to the configured bucket
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    remote_path: String,
    remote_name: String,
    sign: bool,
    expires: Duration,
    domain: Option<String>,
}

impl Uploader {
    pub fn new(settings: &CosSettings, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            remote_path: settings.remote_path.clone(),
            remote_name: settings.remote_name.clone(),
            sign: !settings.is_public,
            expires: Duration::from_secs(settings.duration),
            domain: settings.custom_domain(),
        }
    }

    /// Upload `source` using the current local time for template variables
    pub async fn upload(&self, source: &UploadSource) -> Result<UploadOutcome, UploadError> {
        self.upload_at(source, Local::now().naive_local()).await
    }

    /// Upload `source`, expanding templates against `now`
    #[instrument(skip(self), fields(sign = self.sign))]
    pub async fn upload_at(
        &self,
        source: &UploadSource,
        now: NaiveDateTime,
    ) -> Result<UploadOutcome, UploadError> {
        let local = source.local_path();

        let body = tokio::fs::read(&local).await.map_err(|e| UploadError::Read {
            path: local.clone(),
            source: e,
        })?;
        let md5 = content_md5(&body);

        let extension = local
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let filename = local
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let vars = TemplateVars::snapshot(now, &filename, &md5);
        let key = expand_remote_key(&self.remote_path, &self.remote_name, &vars, &extension);

        debug!(key = %key, md5 = %md5, "Expanded remote key");

        let stored = self.store.put_object(&key, body).await?;
        debug!(size = stored.size, etag = ?stored.etag, "Stored object {}", stored.key);

        let mut url = self.store.object_url(&key, self.sign, self.expires).await?;
        if let Some(domain) = &self.domain {
            url = rewrite_domain(&url, domain);
        }

        // Only a fully successful upload consumes the capture.
        if let UploadSource::Clipboard(_) = source {
            if let Err(e) = tokio::fs::remove_file(&local).await {
                warn!(path = %local.display(), error = %e, "Failed to delete the temp image");
            }
        }

        info!(key = %key, "Succeed to upload image to cos");

        Ok(UploadOutcome {
            name: String::new(),
            url,
            key,
        })
    }
}
