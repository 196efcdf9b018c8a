use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tubely_core::{AppError, Video};
use tubely_db::VideoRepository;
use uuid::Uuid;

/// HashMap-backed repository with an optional injected update failure.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
    fail_updates: AtomicBool,
}

impl InMemoryVideoRepository {
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub fn insert(&self, owner_id: Uuid, title: &str) -> Video {
        let video = Video::new(owner_id, title.to_string(), String::new());
        self.videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());
        video
    }

    /// Overwrite a record directly, bypassing `update_video`.
    pub fn replace(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn stored(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(
        &self,
        owner_id: Uuid,
        title: String,
        description: String,
    ) -> Result<Video, AppError> {
        let video = Video::new(owner_id, title, description);
        self.videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());
        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.stored(id))
    }

    async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|video| video.owner_id == owner_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("injected update failure".to_string()));
        }
        let mut videos = self.videos.lock().unwrap();
        if !videos.contains_key(&video.id) {
            return Err(AppError::NotFound("Video not found".to_string()));
        }
        let mut updated = video.clone();
        updated.updated_at = chrono::Utc::now();
        videos.insert(updated.id, updated.clone());
        Ok(updated)
    }
}
