//! Tubely Storage Library
//!
//! This crate provides the object publisher for Tubely: the `ObjectStorage`
//! trait with S3-compatible and local filesystem backends, object key
//! generation, and the access URL resolver that turns persisted compound
//! references into signed URLs.
//!
//! # Object key format
//!
//! Keys are `{classification}/{token}.mp4` where classification is one of
//! `landscape`, `portrait` or `other`. Keys must not contain `..`, a leading
//! `/` or a `,` (the compound reference separator).

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod resolver;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageHandle};
pub use keys::generate_object_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use resolver::{AccessUrlResolver, DEFAULT_SIGNED_URL_TTL};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectStorage, PublishError, SigningError, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
