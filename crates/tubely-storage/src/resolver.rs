//! Access URL resolution for persisted video records.

use crate::traits::{ObjectStorage, SigningError};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::{Video, VideoResponse};

/// Default validity window of a resolved URL.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// Turns a stored compound reference into a freshly signed URL on every read.
#[derive(Clone)]
pub struct AccessUrlResolver {
    storage: Arc<dyn ObjectStorage>,
    ttl: Duration,
}

impl AccessUrlResolver {
    pub fn new(storage: Arc<dyn ObjectStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Client-facing rendition of `video`.
    ///
    /// An absent or malformed reference yields a response without a URL; only a
    /// failure to sign a well-formed reference is an error.
    pub async fn resolve(&self, video: &Video) -> Result<VideoResponse, SigningError> {
        let Some(reference) = video.storage_reference() else {
            if video.video_reference.is_some() {
                tracing::debug!(video_id = %video.id, "Ignoring malformed video reference");
            }
            return Ok(VideoResponse::from_video(video, None));
        };

        let url = self
            .storage
            .sign(reference.bucket(), reference.key(), self.ttl)
            .await?;
        Ok(VideoResponse::from_video(video, Some(url)))
    }

    /// Like [`resolve`](Self::resolve), but a signing failure degrades to a
    /// response without a URL. Used on read paths.
    pub async fn resolve_lenient(&self, video: &Video) -> VideoResponse {
        match self.resolve(video).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    video_id = %video.id,
                    "Failed to sign video URL; returning record without it"
                );
                VideoResponse::from_video(video, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalStorage;
    use tempfile::TempDir;
    use uuid::Uuid;

    async fn resolver(dir: &TempDir) -> AccessUrlResolver {
        let storage = LocalStorage::new(
            dir.path(),
            "http://localhost:8091/assets".to_string(),
            "tubely-local".to_string(),
            "secret",
        )
        .await
        .unwrap();
        AccessUrlResolver::new(Arc::new(storage), DEFAULT_SIGNED_URL_TTL)
    }

    fn video(reference: Option<&str>) -> Video {
        let mut video = Video::new(Uuid::new_v4(), "title".into(), "description".into());
        video.video_reference = reference.map(String::from);
        video
    }

    #[tokio::test]
    async fn absent_reference_resolves_without_url() {
        let dir = TempDir::new().unwrap();
        let response = resolver(&dir).await.resolve(&video(None)).await.unwrap();
        assert!(response.video_url.is_none());
    }

    #[tokio::test]
    async fn malformed_reference_resolves_without_url() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir).await;
        for reference in ["no-comma", ",landscape/a.mp4", "bucket,"] {
            let response = resolver.resolve(&video(Some(reference))).await.unwrap();
            assert!(response.video_url.is_none(), "{reference}");
        }
    }

    #[tokio::test]
    async fn reference_resolves_to_signed_url_for_its_own_bucket() {
        let dir = TempDir::new().unwrap();
        let response = resolver(&dir)
            .await
            .resolve(&video(Some("older-bucket,landscape/abc.mp4")))
            .await
            .unwrap();
        let url = response.video_url.unwrap();
        assert!(url.contains("/older-bucket/landscape/abc.mp4?"));
        assert!(url.contains("signature="));
    }

    #[tokio::test]
    async fn unsignable_reference_is_an_error_but_lenient_read_succeeds() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir).await;
        let record = video(Some("tubely-local,../escape.mp4"));
        assert!(resolver.resolve(&record).await.is_err());
        assert!(resolver.resolve_lenient(&record).await.video_url.is_none());
    }
}
