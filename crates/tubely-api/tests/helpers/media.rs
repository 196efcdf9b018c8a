//! Scripted stand-ins for ffprobe and ffmpeg.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tubely_core::AspectClass;
use tubely_processing::{remux_output_path, MediaTool, ProbeError, ProbedVideo, RemuxError};

/// Prefix the fake remuxer writes ahead of the input bytes.
pub const FASTSTART_MARKER: &[u8] = b"faststart:";

/// Reports fixed dimensions for every file and counts invocations.
pub struct CountingProber {
    width: u32,
    height: u32,
    calls: AtomicUsize,
    fails: AtomicBool,
}

impl CountingProber {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: AtomicUsize::new(0),
            fails: AtomicBool::new(false),
        }
    }

    /// Make every later probe report a file without a video stream.
    pub fn fail_probes(&self) {
        self.fails.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaTool for CountingProber {
    type Output = ProbedVideo;
    type Error = ProbeError;

    fn name(&self) -> &'static str {
        "fake-ffprobe"
    }

    async fn run(&self, input: &Path) -> Result<ProbedVideo, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(input.exists(), "probe input must be staged");
        if self.fails.load(Ordering::SeqCst) {
            return Err(ProbeError::NoVideoStream);
        }
        Ok(ProbedVideo {
            width: self.width,
            height: self.height,
            codec: Some("h264".to_string()),
            aspect: AspectClass::from_dimensions(self.width, self.height),
        })
    }
}

/// Writes `faststart:` + input into the sibling output path.
pub struct FaststartCopy;

#[async_trait]
impl MediaTool for FaststartCopy {
    type Output = PathBuf;
    type Error = RemuxError;

    fn name(&self) -> &'static str {
        "fake-ffmpeg"
    }

    async fn run(&self, input: &Path) -> Result<PathBuf, RemuxError> {
        let output = remux_output_path(input)?;
        let mut data = FASTSTART_MARKER.to_vec();
        data.extend(std::fs::read(input).map_err(RemuxError::Spawn)?);
        std::fs::write(&output, data).map_err(RemuxError::Spawn)?;
        Ok(output)
    }
}

/// Exits non-zero without producing output.
pub struct FailingRemuxer;

#[async_trait]
impl MediaTool for FailingRemuxer {
    type Output = PathBuf;
    type Error = RemuxError;

    fn name(&self) -> &'static str {
        "fake-ffmpeg"
    }

    async fn run(&self, _input: &Path) -> Result<PathBuf, RemuxError> {
        Err(RemuxError::ExitStatus {
            status: "exit status: 1".to_string(),
            stderr: "moov atom not found".to_string(),
        })
    }
}
