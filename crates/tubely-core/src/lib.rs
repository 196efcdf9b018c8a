//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration that are
//! shared by every Tubely component: the video record and its compound storage
//! reference, aspect classification, the object key layout, and `AppError`.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectClass, Video, VideoReference, VideoResponse};
pub use storage_types::StorageBackend;
