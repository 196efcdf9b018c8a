//! Video upload pipeline
//!
//! authorize → parse → validate → stage → classify → remux → publish → persist → release → respond

mod error;
mod service;

pub use error::UploadError;
pub use service::{Prober, Remuxer, VideoUploadService};
