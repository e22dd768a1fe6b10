//! Storage module for uploaded images
//!
//! Provides the Tencent Cloud COS client. COS is S3-compatible, so we use the AWS SDK.

mod cos;
#[cfg(test)]
mod memory;
mod traits;

pub use cos::{rewrite_domain, CosClient};
#[cfg(test)]
pub use memory::MemoryStore;
pub use traits::{ObjectStore, StorageError, StorageResult, StoredObject};
