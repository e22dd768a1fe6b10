//! Object storage contract used by the upload pipeline
//!
//! The pipeline only needs two calls from a storage backend: store a body
//! under a key, and produce a URL for a stored key. `CosClient` implements
//! this against Tencent Cloud COS; tests use an in-memory store.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    UploadFailed(String),

    #[error("Failed to sign URL: {0}")]
    SignFailed(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What the backend reported for a stored object
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// The object key
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// ETag from the backend
    pub etag: Option<String>,
}

/// Minimal object storage operations
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, overwriting any existing object
    async fn put_object(&self, key: &str, body: Vec<u8>) -> StorageResult<StoredObject>;

    /// URL for `key`: presigned for `expires` when `sign` is set, otherwise the bare public URL
    async fn object_url(&self, key: &str, sign: bool, expires: Duration) -> StorageResult<String>;
}
