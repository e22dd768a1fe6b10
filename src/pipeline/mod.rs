//! Upload pipeline
//!
//! Reads a local image, hashes it, expands the remote key templates, stores
//! the object and derives the URL that ends up in the markdown link.

mod upload;

pub use upload::{content_md5, UploadError, UploadOutcome, UploadSource, Uploader};
