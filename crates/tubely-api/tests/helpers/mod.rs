//! Test helpers: build AppState and router for integration tests.
//!
//! The router runs against an in-memory video repository, the local object
//! store inside a temp directory, and scripted media tools, so no database,
//! cloud store or ffmpeg installation is needed.
//!
//! Run from workspace root: `cargo test -p tubely-api`.

pub mod media;
pub mod repository;
pub mod storage;

use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtService;
use tubely_api::setup::{build_state, routes, AppComponents};
use tubely_api::{Prober, Remuxer};
use tubely_core::Config;
use tubely_processing::StagingArea;
use tubely_storage::LocalStorage;
use uuid::Uuid;

pub use media::{CountingProber, FailingRemuxer, FaststartCopy};
pub use repository::InMemoryVideoRepository;
pub use storage::CountingStorage;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_ASSETS_ORIGIN: &str = "http://localhost";
pub const TEST_BUCKET: &str = "tubely-local";

/// Knobs for one test application
pub struct TestOptions {
    pub width: u32,
    pub height: u32,
    pub probe_fails: bool,
    pub remux_fails: bool,
    pub publish_fails: bool,
    pub staging_limit: Option<u64>,
    /// Overrides `MAX_UPLOAD_SIZE_MB`, which also sizes the route body limit.
    pub max_upload_mb: Option<u64>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            probe_fails: false,
            remux_fails: false,
            publish_fails: false,
            staging_limit: None,
            max_upload_mb: None,
        }
    }
}

/// Test application: server plus handles on every collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoRepository>,
    pub storage: Arc<CountingStorage>,
    pub prober: Arc<CountingProber>,
    pub jwt: JwtService,
    pub staging_dir: PathBuf,
    pub storage_root: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.jwt
            .issue(user_id, chrono::Duration::hours(1))
            .expect("Failed to issue test token")
    }

    pub fn bearer(&self, user_id: Uuid) -> String {
        format!("Bearer {}", self.token_for(user_id))
    }

    /// Number of files currently in the staging directory
    pub fn staged_files(&self) -> usize {
        count_entries(&self.staging_dir)
    }

    pub fn object_path(&self, reference: &str) -> PathBuf {
        let (bucket, key) = reference
            .split_once(',')
            .expect("reference has a bucket and key");
        self.storage_root.join(bucket).join(key)
    }
}

pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

pub fn test_config(temp_dir: &TempDir, max_upload_mb: Option<u64>) -> Config {
    let storage_root = temp_dir.path().join("objects").to_string_lossy().into_owned();
    let staging_dir = temp_dir.path().join("staging").to_string_lossy().into_owned();
    let base_url = format!("{}/assets", TEST_ASSETS_ORIGIN);

    Config::from_lookup(|name| match name {
        "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
        "DATABASE_URL" => Some("postgres://localhost/tubely_test".to_string()),
        "STORAGE_BACKEND" => Some("local".to_string()),
        "LOCAL_STORAGE_PATH" => Some(storage_root.clone()),
        "LOCAL_STORAGE_BASE_URL" => Some(base_url.clone()),
        "LOCAL_STORAGE_BUCKET" => Some(TEST_BUCKET.to_string()),
        "STAGING_DIR" => Some(staging_dir.clone()),
        "MAX_UPLOAD_SIZE_MB" => max_upload_mb.map(|mb| mb.to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir, options.max_upload_mb);

    let storage_root = temp_dir.path().join("objects");
    let local = Arc::new(
        LocalStorage::new(
            storage_root.clone(),
            config
                .local_storage_base_url()
                .expect("base url configured")
                .to_string(),
            config.local_storage_bucket().to_string(),
            config.local_signing_key(),
        )
        .await
        .expect("Failed to create local storage"),
    );
    let storage = Arc::new(CountingStorage::new(local.clone()));
    if options.publish_fails {
        storage.fail_publishes();
    }

    let staging = StagingArea::new(
        config.staging_dir().clone(),
        options
            .staging_limit
            .unwrap_or_else(|| config.max_upload_size_bytes()),
    )
    .await
    .expect("Failed to create staging area");
    let staging_dir = staging.dir().to_path_buf();

    let videos = Arc::new(InMemoryVideoRepository::default());
    let prober = Arc::new(CountingProber::new(options.width, options.height));
    if options.probe_fails {
        prober.fail_probes();
    }
    let remuxer: Remuxer = if options.remux_fails {
        Arc::new(FailingRemuxer)
    } else {
        Arc::new(FaststartCopy)
    };

    let state = build_state(
        &config,
        AppComponents {
            videos: videos.clone(),
            publisher: storage.clone(),
            local_assets: Some(local),
            staging,
            prober: prober.clone() as Prober,
            remuxer,
        },
    );
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        videos,
        storage,
        prober,
        jwt: JwtService::new(TEST_JWT_SECRET),
        staging_dir,
        storage_root,
        _temp_dir: temp_dir,
    }
}
