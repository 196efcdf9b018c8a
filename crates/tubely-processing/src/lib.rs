//! Tubely Media Processing Library
//!
//! This crate provides the local side of the upload pipeline: staging uploads
//! to disk, probing them with ffprobe, and remuxing them for fast start.

pub mod probe;
pub mod remux;
pub mod staging;
pub mod tool;

// Re-export commonly used types
pub use probe::{parse_probe_output, FfprobeTool, ProbeError, ProbedVideo};
pub use remux::{remux_output_path, FaststartRemuxer, RemuxError};
pub use staging::{StagedFile, StagingArea, StagingError, StagingScope};
pub use tool::MediaTool;
