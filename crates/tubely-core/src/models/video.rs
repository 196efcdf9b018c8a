use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::reference::VideoReference;

/// Persisted video record.
///
/// `video_reference` holds the compound `"<bucket>,<key>"` string once an upload
/// has been published; it is never a client-facing URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub video_reference: Option<String>,
    pub thumbnail_reference: Option<String>,
}

impl Video {
    pub fn new(owner_id: Uuid, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title,
            description,
            owner_id,
            video_reference: None,
            thumbnail_reference: None,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Parsed storage reference, `None` when absent or malformed.
    pub fn storage_reference(&self) -> Option<VideoReference> {
        self.video_reference.as_deref()?.parse().ok()
    }

    pub fn set_storage_reference(&mut self, reference: &VideoReference) {
        self.video_reference = Some(reference.to_string());
        self.updated_at = Utc::now();
    }
}

/// Client-facing rendition of a [`Video`] with a freshly signed, time-limited URL
/// in place of the stored reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    /// Signed URL for playback; absent when no video has been published yet
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl VideoResponse {
    pub fn from_video(video: &Video, video_url: Option<String>) -> Self {
        Self {
            id: video.id,
            created_at: video.created_at,
            updated_at: video.updated_at,
            title: video.title.clone(),
            description: video.description.clone(),
            owner_id: video.owner_id,
            video_url,
            thumbnail_url: video.thumbnail_reference.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_video_has_no_reference() {
        let owner = Uuid::new_v4();
        let video = Video::new(owner, "Boots".into(), "".into());
        assert!(video.is_owned_by(owner));
        assert!(!video.is_owned_by(Uuid::new_v4()));
        assert!(video.storage_reference().is_none());
    }

    #[test]
    fn malformed_reference_is_treated_as_absent() {
        let mut video = Video::new(Uuid::new_v4(), "t".into(), "d".into());
        video.video_reference = Some("https://cdn.example.com/v.mp4".into());
        assert!(video.storage_reference().is_none());
    }

    #[test]
    fn set_storage_reference_persists_compound_string() {
        let mut video = Video::new(Uuid::new_v4(), "t".into(), "d".into());
        let reference = VideoReference::new("tubely", "portrait/abc.mp4").unwrap();
        video.set_storage_reference(&reference);
        assert_eq!(video.video_reference.as_deref(), Some("tubely,portrait/abc.mp4"));
        assert_eq!(video.storage_reference(), Some(reference));
    }

    #[test]
    fn response_never_exposes_the_reference() {
        let mut video = Video::new(Uuid::new_v4(), "t".into(), "d".into());
        video.video_reference = Some("tubely,landscape/k.mp4".into());
        let response = VideoResponse::from_video(&video, Some("https://signed".into()));
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("tubely,landscape"));
        assert!(json.contains("https://signed"));
    }
}
