use crate::auth::AuthState;
use crate::services::upload::VideoUploadService;
use std::sync::Arc;
use tubely_db::VideoRepository;
use tubely_storage::{AccessUrlResolver, LocalStorage};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoRepository>,
    pub media: MediaState,
    pub auth: AuthState,
}

#[derive(Clone)]
pub struct MediaState {
    pub uploads: Arc<VideoUploadService>,
    pub resolver: AccessUrlResolver,
    /// Present when objects live on local disk and the API serves them itself
    pub local_assets: Option<Arc<LocalStorage>>,
    pub max_upload_size_bytes: u64,
}
