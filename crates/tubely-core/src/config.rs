//! Configuration module
//!
//! This module provides the configuration for the Tubely API: server and auth
//! settings, the metadata database, the object storage backend, and the media
//! tool / staging settings used by the upload pipeline.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const DB_MAX_CONNECTIONS: u32 = 10;
const JWT_EXPIRY_HOURS: i64 = 24;
const MAX_UPLOAD_SIZE_MB: u64 = 1024;
const SIGNED_URL_TTL_SECS: u64 = 300;
const LOCAL_STORAGE_BUCKET: &str = "tubely-local";
const MIN_JWT_SECRET_LEN: usize = 32;

/// Characters that must not appear in a configured tool path.
const DANGEROUS_PATH_CHARS: [char; 9] = [';', '&', '|', '`', '$', '(', ')', '<', '>'];

/// Server and authentication settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub database_url: String,
    pub db_max_connections: u32,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_bucket: String,
    pub local_signing_key: Option<String>,
    pub signed_url_ttl_secs: u64,
}

/// Upload pipeline settings
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub staging_dir: PathBuf,
    pub max_upload_size_bytes: u64,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: parse_or(var("PORT"), SERVER_PORT),
            cors_origins,
            environment,
            jwt_secret: var("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_expiry_hours: parse_or(var("JWT_EXPIRY_HOURS"), JWT_EXPIRY_HOURS),
            database_url: var("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: parse_or(var("DB_MAX_CONNECTIONS"), DB_MAX_CONNECTIONS),
        };

        let backend = match var("STORAGE_BACKEND") {
            Some(value) => value
                .parse::<StorageBackend>()
                .map_err(|e| anyhow::anyhow!("Invalid STORAGE_BACKEND: {}", e))?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            local_storage_bucket: var("LOCAL_STORAGE_BUCKET")
                .unwrap_or_else(|| LOCAL_STORAGE_BUCKET.to_string()),
            local_signing_key: var("LOCAL_SIGNING_KEY"),
            signed_url_ttl_secs: parse_or(var("SIGNED_URL_TTL_SECS"), SIGNED_URL_TTL_SECS),
        };

        let max_upload_size_mb: u64 = parse_or(var("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB);
        let media = MediaConfig {
            staging_dir: var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join("tubely-staging")),
            max_upload_size_bytes: max_upload_size_mb.saturating_mul(1024 * 1024),
            ffprobe_path: var("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
        };

        Ok(Config {
            base,
            storage,
            media,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if !self.base.database_url.starts_with("postgresql://")
            && !self.base.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        validate_tool_path("FFPROBE_PATH", &self.media.ffprobe_path)?;
        validate_tool_path("FFMPEG_PATH", &self.media.ffmpeg_path)?;

        if self.media.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.storage.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("SIGNED_URL_TTL_SECS must be greater than 0"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.base.jwt_expiry_hours
    }

    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.storage.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.storage.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.storage.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.storage.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.storage.local_storage_base_url.as_deref()
    }

    pub fn local_storage_bucket(&self) -> &str {
        &self.storage.local_storage_bucket
    }

    /// HMAC key for locally signed URLs; falls back to the JWT secret.
    pub fn local_signing_key(&self) -> &str {
        self.storage
            .local_signing_key
            .as_deref()
            .unwrap_or(&self.base.jwt_secret)
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.storage.signed_url_ttl_secs)
    }

    pub fn staging_dir(&self) -> &PathBuf {
        &self.media.staging_dir
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.media.max_upload_size_bytes
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.media.ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.media.ffmpeg_path
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn validate_tool_path(name: &str, path: &str) -> Result<(), anyhow::Error> {
    if path.trim().is_empty() {
        return Err(anyhow::anyhow!("{} must not be empty", name));
    }
    if path.chars().any(|c| DANGEROUS_PATH_CHARS.contains(&c)) {
        return Err(anyhow::anyhow!(
            "{} contains potentially dangerous characters",
            name
        ));
    }
    Ok(())
}
