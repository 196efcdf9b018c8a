//! Object publisher abstraction
//!
//! This module defines the `ObjectStorage` trait that all backends implement,
//! together with the typed failures of its two operations.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Failure to commit a local file to the object store.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Failed to read local file {path}: {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

/// Failure to produce a signed URL for a bucket/key pair.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Invalid bucket: {0}")]
    InvalidBucket(String),

    #[error("Signed URL has expired")]
    Expired,

    #[error("Signature mismatch")]
    BadSignature,

    #[error("Signing backend error: {0}")]
    Backend(String),
}

/// Storage configuration failure raised while constructing a backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object publisher
///
/// `publish` streams a local file into the configured bucket; the object either
/// exists in full under `key` afterwards or not at all. `sign` produces a
/// time-limited read URL for any bucket/key pair the backend can address and
/// never touches store state. It does not check that the object exists.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Bucket that new publishes land in.
    fn bucket(&self) -> &str;

    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), PublishError>;

    async fn sign(&self, bucket: &str, key: &str, ttl: Duration) -> Result<String, SigningError>;

    fn backend_type(&self) -> StorageBackend;
}
