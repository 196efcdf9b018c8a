//! Upload orchestrator
//!
//! Runs one upload request strictly in order. Every staged file is registered
//! with a [`StagingScope`] as soon as it exists, and the scope is walked before
//! the response is produced, whichever step failed.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tubely_core::constants::{VIDEO_CONTENT_TYPE, VIDEO_FORM_FIELD};
use tubely_core::{Video, VideoReference, VideoResponse};
use tubely_db::VideoRepository;
use tubely_processing::{
    MediaTool, ProbeError, ProbedVideo, RemuxError, StagingArea, StagingError, StagingScope,
};
use tubely_storage::{generate_object_key, AccessUrlResolver, ObjectStorage, PublishError};
use uuid::Uuid;

use super::error::UploadError;
use crate::utils::upload::validate_content_type;

/// Media analysis step of the pipeline
pub type Prober = Arc<dyn MediaTool<Output = ProbedVideo, Error = ProbeError>>;

/// Fast-start rewrite step of the pipeline
pub type Remuxer = Arc<dyn MediaTool<Output = PathBuf, Error = RemuxError>>;

pub struct VideoUploadService {
    videos: Arc<dyn VideoRepository>,
    staging: StagingArea,
    prober: Prober,
    remuxer: Remuxer,
    storage: Arc<dyn ObjectStorage>,
    resolver: AccessUrlResolver,
}

impl VideoUploadService {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        staging: StagingArea,
        prober: Prober,
        remuxer: Remuxer,
        storage: Arc<dyn ObjectStorage>,
        resolver: AccessUrlResolver,
    ) -> Self {
        Self {
            videos,
            staging,
            prober,
            remuxer,
            storage,
            resolver,
        }
    }

    /// Replace the video payload of `video_id` with the one carried by `multipart`.
    ///
    /// Returns the updated record with a freshly signed URL.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, video_id = %video_id))]
    pub async fn upload(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        multipart: Multipart,
    ) -> Result<VideoResponse, UploadError> {
        let start = Instant::now();
        let video = self.authorize(user_id, video_id).await?;

        let mut scope = StagingScope::new();
        let outcome = self.process(&mut scope, video, multipart).await;

        if let Err(e) = scope.release_all() {
            tracing::warn!(error = %e, "Staged files were not all released");
        }
        tracing::debug!(
            staged = scope.staged_count(),
            released = scope.released_count(),
            "Staging scope closed"
        );

        let video = outcome?;
        let response = self.resolver.resolve(&video).await?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_reference = video.video_reference.as_deref().unwrap_or_default(),
            "Video upload completed"
        );

        Ok(response)
    }

    async fn authorize(&self, user_id: Uuid, video_id: Uuid) -> Result<Video, UploadError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(UploadError::Lookup)?
            .ok_or(UploadError::VideoNotFound)?;

        if !video.is_owned_by(user_id) {
            tracing::debug!(owner_id = %video.owner_id, "Upload rejected: caller does not own the video");
            return Err(UploadError::NotOwner);
        }

        Ok(video)
    }

    async fn process(
        &self,
        scope: &mut StagingScope,
        mut video: Video,
        mut multipart: Multipart,
    ) -> Result<Video, UploadError> {
        let raw = self.stage_video_field(scope, &mut multipart).await?;

        let probed = self.prober.run(&raw).await?;
        tracing::debug!(
            tool = self.prober.name(),
            width = probed.width,
            height = probed.height,
            aspect = %probed.aspect,
            "Video classified"
        );

        let derivative = self.remuxer.run(&raw).await?;
        let derivative = scope.track(self.staging.adopt(derivative));
        tracing::debug!(tool = self.remuxer.name(), "Fast-start derivative written");

        let key = generate_object_key(probed.aspect);
        self.storage
            .publish(&derivative, &key, VIDEO_CONTENT_TYPE)
            .await?;

        let reference = VideoReference::new(self.storage.bucket(), key.as_str())
            .map_err(|e| PublishError::InvalidKey(e.to_string()))?;
        video.set_storage_reference(&reference);

        self.videos.update_video(&video).await.map_err(|e| {
            tracing::error!(
                bucket = %reference.bucket(),
                key = %reference.key(),
                error = %e,
                "Published object is not referenced by any video record"
            );
            UploadError::Persist(e)
        })
    }

    /// Find the video part, check its type, and copy it to the staging area.
    async fn stage_video_field(
        &self,
        scope: &mut StagingScope,
        multipart: &mut Multipart,
    ) -> Result<PathBuf, UploadError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| self.multipart_failure(e))?
        {
            if field.name() != Some(VIDEO_FORM_FIELD) {
                continue;
            }

            validate_content_type(field.content_type(), &[VIDEO_CONTENT_TYPE])
                .map_err(UploadError::Validation)?;

            let reader = StreamReader::new(field.map_err(io::Error::other));
            let staged = self
                .staging
                .stage(reader)
                .await
                .map_err(|e| self.staging_failure(e))?;
            return Ok(scope.track(staged));
        }

        Err(UploadError::Validation(format!(
            "No video provided; expected a multipart field named '{}'",
            VIDEO_FORM_FIELD
        )))
    }

    /// Multipart errors are client faults, except when the route body limit cut the stream.
    fn multipart_failure(&self, err: MultipartError) -> UploadError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return UploadError::TooLarge {
                limit: self.staging.max_bytes(),
            };
        }
        UploadError::Validation(format!("Failed to read multipart: {}", err))
    }

    /// Field stream errors reach the staging copy wrapped in an `io::Error`.
    fn staging_failure(&self, err: StagingError) -> UploadError {
        let body_limit_hit = match &err {
            StagingError::Read(io_err) => io_err
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>())
                .is_some_and(|e| e.status() == StatusCode::PAYLOAD_TOO_LARGE),
            _ => false,
        };
        if body_limit_hit {
            return UploadError::TooLarge {
                limit: self.staging.max_bytes(),
            };
        }
        err.into()
    }
}
