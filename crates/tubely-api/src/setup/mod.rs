//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::auth::{AuthState, JwtService};
use crate::services::upload::{Prober, Remuxer, VideoUploadService};
use crate::state::{AppState, MediaState};
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{PgVideoRepository, VideoRepository};
use tubely_processing::{FaststartRemuxer, FfprobeTool, StagingArea};
use tubely_storage::{create_storage, AccessUrlResolver, LocalStorage, ObjectStorage};

/// Collaborators the handlers run against
pub struct AppComponents {
    pub videos: Arc<dyn VideoRepository>,
    pub publisher: Arc<dyn ObjectStorage>,
    pub local_assets: Option<Arc<LocalStorage>>,
    pub staging: StagingArea,
    pub prober: Prober,
    pub remuxer: Remuxer,
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = tubely_db::connect(config.database_url(), config.db_max_connections())
        .await
        .context("Failed to set up database")?;

    let storage = create_storage(&config)
        .await
        .context("Failed to set up object storage")?;

    let staging = StagingArea::new(config.staging_dir().clone(), config.max_upload_size_bytes())
        .await
        .context("Failed to set up staging area")?;

    let prober: Prober = Arc::new(FfprobeTool::new(config.ffprobe_path())?);
    let remuxer: Remuxer = Arc::new(FaststartRemuxer::new(config.ffmpeg_path())?);

    let components = AppComponents {
        videos: Arc::new(PgVideoRepository::new(pool)),
        publisher: storage.publisher,
        local_assets: storage.local,
        staging,
        prober,
        remuxer,
    };

    let state = build_state(&config, components);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Wire handler state from its collaborators
pub fn build_state(config: &Config, components: AppComponents) -> Arc<AppState> {
    let resolver = AccessUrlResolver::new(components.publisher.clone(), config.signed_url_ttl());

    let uploads = Arc::new(VideoUploadService::new(
        components.videos.clone(),
        components.staging,
        components.prober,
        components.remuxer,
        components.publisher,
        resolver.clone(),
    ));

    Arc::new(AppState {
        videos: components.videos,
        media: MediaState {
            uploads,
            resolver,
            local_assets: components.local_assets,
            max_upload_size_bytes: config.max_upload_size_bytes(),
        },
        auth: AuthState {
            jwt: Arc::new(JwtService::new(config.jwt_secret())),
        },
    })
}
