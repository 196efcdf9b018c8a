//! Staging area for request-scoped temporary files.
//!
//! Every staged file is backed by a [`TempPath`], so it is deleted when its
//! handle is released or dropped. Dropping covers early returns and requests
//! cancelled mid-stream. [`StagingScope`] collects the handles of one request
//! and releases them in reverse order of creation.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

const COPY_BUFFER_SIZE: usize = 64 * 1024;
const STAGED_FILE_PREFIX: &str = "tubely-upload-";

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to prepare staging directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create staged file: {0}")]
    Create(#[source] io::Error),

    #[error("Failed to read upload stream: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write staged file: {0}")]
    Write(#[source] io::Error),

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Failed to release staged file {path}: {source}")]
    Release {
        path: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
    max_bytes: u64,
}

impl StagingArea {
    pub async fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Result<Self, StagingError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StagingError::Directory {
                path: dir.display().to_string(),
                source,
            })?;
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Copy `reader` to a fresh, uniquely named file in the staging directory.
    ///
    /// Streams larger than the configured maximum are rejected as soon as the
    /// limit is crossed; the partial file is removed.
    pub async fn stage<R>(&self, reader: R) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead,
    {
        tokio::pin!(reader);

        let named = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(".mp4")
            .tempfile_in(&self.dir)
            .map_err(StagingError::Create)?;
        let (file, temp_path) = named.into_parts();
        // Held from here on; dropping it on any early return deletes the file.
        let staged = StagedFile::from_temp_path(temp_path);
        let mut file = tokio::fs::File::from_std(file);

        let start = std::time::Instant::now();
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut written: u64 = 0;

        loop {
            let bytes_read = reader.read(&mut buffer).await.map_err(StagingError::Read)?;
            if bytes_read == 0 {
                break;
            }
            written += bytes_read as u64;
            if written > self.max_bytes {
                tracing::debug!(
                    limit = self.max_bytes,
                    "Upload exceeded staging limit; discarding"
                );
                return Err(StagingError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            file.write_all(&buffer[..bytes_read])
                .await
                .map_err(StagingError::Write)?;
        }

        file.flush().await.map_err(StagingError::Write)?;

        tracing::debug!(
            path = %staged.path().display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload staged"
        );

        Ok(staged)
    }

    /// Take ownership of a file produced by another step (e.g. the remuxer).
    pub fn adopt(&self, path: PathBuf) -> StagedFile {
        StagedFile::from_temp_path(TempPath::from_path(path))
    }
}

/// Handle to one staged file. Deleted on [`release`](Self::release) or drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl StagedFile {
    fn from_temp_path(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.temp.is_none()
    }

    /// Delete the file. Calling this again, or on a file that is already gone, is a no-op.
    pub fn release(&mut self) -> Result<(), StagingError> {
        let Some(temp) = self.temp.take() else {
            return Ok(());
        };
        match temp.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StagingError::Release {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }
}

/// Cleanup stack for the staged files of one request.
#[derive(Debug, Default)]
pub struct StagingScope {
    files: Vec<StagedFile>,
    staged: usize,
    released: usize,
}

impl StagingScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a staged file and return its path.
    pub fn track(&mut self, file: StagedFile) -> PathBuf {
        let path = file.path().to_path_buf();
        self.files.push(file);
        self.staged += 1;
        path
    }

    /// Release every tracked file, most recent first.
    ///
    /// All files are attempted even if one fails; the first failure is returned.
    pub fn release_all(&mut self) -> Result<(), StagingError> {
        let mut first_error = None;
        while let Some(mut file) = self.files.pop() {
            self.released += 1;
            if let Err(e) = file.release() {
                tracing::warn!(error = %e, "Failed to release staged file");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn staged_count(&self) -> usize {
        self.staged
    }

    pub fn released_count(&self) -> usize {
        self.released
    }
}

impl Drop for StagingScope {
    fn drop(&mut self) {
        let _ = self.release_all();
    }
}
