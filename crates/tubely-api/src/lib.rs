//! Tubely API Library
//!
//! This crate provides the HTTP API handlers, the upload orchestrator and
//! application setup.

mod api_doc;
mod handlers;
mod services;
mod telemetry;
mod utils;

pub mod auth;
pub mod constants;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{Prober, Remuxer, UploadError, VideoUploadService};
pub use telemetry::init_telemetry;
