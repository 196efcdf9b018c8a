//! Media prober - stream geometry extraction and aspect classification

use crate::tool::{stderr_tail, validate_tool_path, MediaTool};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tubely_core::AspectClass;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid ffprobe path: {0}")]
    InvalidToolPath(String),

    #[error("Failed to execute ffprobe: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffprobe exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    #[error("Failed to parse ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No video stream found")]
    NoVideoStream,
}

/// Geometry of the first video stream of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedVideo {
    pub width: u32,
    pub height: u32,
    pub codec: Option<String>,
    pub aspect: AspectClass,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Extract the first usable video stream from ffprobe's JSON output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<ProbedVideo, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;

    output
        .streams
        .into_iter()
        .filter(|s| s.codec_type.as_deref().unwrap_or("video") == "video")
        .find_map(|s| match (s.width, s.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => Some(ProbedVideo {
                width,
                height,
                codec: s.codec_name,
                aspect: AspectClass::from_dimensions(width, height),
            }),
            _ => None,
        })
        .ok_or(ProbeError::NoVideoStream)
}

/// Runs `ffprobe` in read-only JSON mode against a local file.
#[derive(Debug, Clone)]
pub struct FfprobeTool {
    ffprobe_path: String,
}

impl FfprobeTool {
    pub fn new(ffprobe_path: impl Into<String>) -> Result<Self, ProbeError> {
        let ffprobe_path = ffprobe_path.into();
        validate_tool_path(&ffprobe_path).map_err(ProbeError::InvalidToolPath)?;
        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaTool for FfprobeTool {
    type Output = ProbedVideo;
    type Error = ProbeError;

    fn name(&self) -> &'static str {
        "ffprobe"
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn run(&self, input: &Path) -> Result<ProbedVideo, ProbeError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let probed = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = probed.width,
            height = probed.height,
            codec = probed.codec.as_deref().unwrap_or("unknown"),
            aspect = %probed.aspect,
            "Video probe completed"
        );

        Ok(probed)
    }
}
