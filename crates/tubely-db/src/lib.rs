//! Tubely Database Layer
//!
//! This crate provides the video metadata repository and the database
//! bootstrap (connection pool and embedded migrations).

pub mod video;

pub use video::{PgVideoRepository, VideoRepository};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Connect to PostgreSQL and apply pending migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
        .connect(database_url)
        .await?;

    tracing::info!(max_connections, "Database connection pool created");

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
