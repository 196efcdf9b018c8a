//! External media tool abstraction
//!
//! Both the probe and the remux step run an external program against a local
//! file. `MediaTool` hides the invocation syntax so the upload pipeline only
//! sees a path going in and a typed result coming out.

use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait MediaTool: Send + Sync {
    type Output: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn run(&self, input: &Path) -> Result<Self::Output, Self::Error>;
}

/// Validate that a tool path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_tool_path(path: &str) -> Result<(), String> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.trim().is_empty() {
        return Err("tool path is empty".to_string());
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(format!("Path contains dangerous characters: {}", path));
    }
    if path.contains("..") {
        return Err(format!("Path contains directory traversal: {}", path));
    }
    Ok(())
}

/// Last few lines of a tool's stderr, for error reports.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    const MAX_LINES: usize = 10;
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_absolute_paths() {
        validate_tool_path("ffprobe").unwrap();
        validate_tool_path("/usr/local/bin/ffmpeg").unwrap();
    }

    #[test]
    fn rejects_shell_metacharacters() {
        for path in ["", "ffmpeg; rm -rf /", "$(which ffmpeg)", "ffmpeg | tee", "../bin/ffmpeg"] {
            assert!(validate_tool_path(path).is_err(), "{path:?}");
        }
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr: String = (0..20).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 19"));
    }
}
