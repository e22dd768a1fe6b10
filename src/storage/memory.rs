//! In-memory object store for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use super::traits::{ObjectStore, StorageError, StorageResult, StoredObject};
use crate::config::MAX_SIGNED_DURATION_SECS;

pub const MEMORY_HOST: &str = "notes-1250000000.cos.ap-guangzhou.myqcloud.com";

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    puts: Mutex<u32>,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose uploads always fail with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn put_count(&self) -> u32 {
        *self.puts.lock()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> StorageResult<StoredObject> {
        *self.puts.lock() += 1;

        if let Some(message) = &self.failure {
            return Err(StorageError::UploadFailed(message.clone()));
        }

        let size = body.len() as u64;
        self.objects.lock().insert(key.to_string(), body);

        Ok(StoredObject {
            key: key.to_string(),
            size,
            etag: None,
        })
    }

    async fn object_url(&self, key: &str, sign: bool, expires: Duration) -> StorageResult<String> {
        let url = format!("https://{}/{}", MEMORY_HOST, key);
        if sign && expires.as_secs() > MAX_SIGNED_DURATION_SECS {
            return Err(StorageError::SignFailed(format!(
                "expires_in {}s exceeds one week",
                expires.as_secs()
            )));
        }
        if sign {
            Ok(format!(
                "{}?X-Amz-Expires={}&X-Amz-Signature=test",
                url,
                expires.as_secs()
            ))
        } else {
            Ok(url)
        }
    }
}
