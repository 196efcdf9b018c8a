//! Fast-start remuxer - moves the container index ahead of the media data

use crate::tool::{stderr_tail, validate_tool_path, MediaTool};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempPath;
use thiserror::Error;
use tokio::process::Command;

/// Suffix appended to the input stem to name the remuxed output.
pub const REMUX_OUTPUT_SUFFIX: &str = ".processing.mp4";

#[derive(Debug, Error)]
pub enum RemuxError {
    #[error("Invalid ffmpeg path: {0}")]
    InvalidToolPath(String),

    #[error("Input path has no file name: {0}")]
    InvalidInput(PathBuf),

    #[error("Failed to execute ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    #[error("ffmpeg produced no output at {0}")]
    MissingOutput(PathBuf),
}

/// Output location for a remux of `input`: same directory, `<stem>.processing.mp4`.
pub fn remux_output_path(input: &Path) -> Result<PathBuf, RemuxError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| RemuxError::InvalidInput(input.to_path_buf()))?;
    let mut name = stem.to_os_string();
    name.push(REMUX_OUTPUT_SUFFIX);
    Ok(input.with_file_name(name))
}

/// Runs `ffmpeg -c copy -movflags faststart` into a sibling file.
///
/// The output is removed again if ffmpeg fails or the future is dropped; on
/// success ownership of the returned path passes to the caller.
#[derive(Debug, Clone)]
pub struct FaststartRemuxer {
    ffmpeg_path: String,
}

impl FaststartRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Result<Self, RemuxError> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_tool_path(&ffmpeg_path).map_err(RemuxError::InvalidToolPath)?;
        Ok(Self { ffmpeg_path })
    }
}

#[async_trait]
impl MediaTool for FaststartRemuxer {
    type Output = PathBuf;
    type Error = RemuxError;

    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn run(&self, input: &Path) -> Result<PathBuf, RemuxError> {
        let start = std::time::Instant::now();
        let output_path = remux_output_path(input)?;
        let guard = TempPath::from_path(&output_path);

        let output = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(RemuxError::Spawn)?;

        if !output.status.success() {
            return Err(RemuxError::ExitStatus {
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let size = match tokio::fs::metadata(&output_path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
            _ => return Err(RemuxError::MissingOutput(output_path)),
        };

        let output_path = guard
            .keep()
            .map_err(|e| RemuxError::MissingOutput(e.path.to_path_buf()))?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            size_bytes = size,
            output = %output_path.display(),
            "Fast-start remux completed"
        );

        Ok(output_path)
    }
}
