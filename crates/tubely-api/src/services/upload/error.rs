use thiserror::Error;
use tubely_core::AppError;
use tubely_processing::{ProbeError, RemuxError, StagingError};
use tubely_storage::{PublishError, SigningError};

/// Terminal failure states of one upload request.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Video not found")]
    VideoNotFound,

    #[error("Video is owned by another user")]
    NotOwner,

    #[error("Failed to look up video: {0}")]
    Lookup(#[source] AppError),

    #[error(transparent)]
    Staging(StagingError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Remux(#[from] RemuxError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Failed to persist video reference: {0}")]
    Persist(#[source] AppError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

impl From<StagingError> for UploadError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::TooLarge { limit } => UploadError::TooLarge { limit },
            other => UploadError::Staging(other),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Validation(msg) => AppError::InvalidInput(msg),
            UploadError::TooLarge { limit } => AppError::PayloadTooLarge(format!(
                "Video exceeds the maximum upload size of {} bytes",
                limit
            )),
            // Not-found and not-owned look the same from outside.
            UploadError::VideoNotFound | UploadError::NotOwner => {
                AppError::NotFound("Video not found".to_string())
            }
            UploadError::Lookup(e) | UploadError::Persist(e) => e,
            UploadError::Staging(StagingError::Read(e)) => {
                AppError::InvalidInput(format!("Failed to read upload: {}", e))
            }
            UploadError::Staging(e) => AppError::InternalWithSource {
                message: "Failed to stage upload".to_string(),
                source: e.into(),
            },
            UploadError::Probe(e) => AppError::MediaProcessing(e.to_string()),
            UploadError::Remux(e) => AppError::MediaProcessing(e.to_string()),
            UploadError::Publish(e) => AppError::Storage(e.to_string()),
            UploadError::Signing(e) => AppError::Storage(e.to_string()),
        }
    }
}
