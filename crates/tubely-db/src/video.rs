use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::{AppError, Video};
use uuid::Uuid;

const VIDEO_COLUMNS: &str =
    "id, created_at, updated_at, title, description, owner_id, video_reference, thumbnail_reference";

/// Read/write contract of the video metadata store.
///
/// Lets the API and its tests run against any backing store.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Create a draft video record owned by `owner_id`
    async fn create_video(
        &self,
        owner_id: Uuid,
        title: String,
        description: String,
    ) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// All records owned by `owner_id`, newest first
    async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<Video>, AppError>;

    /// Overwrite the mutable fields of an existing record
    async fn update_video(&self, video: &Video) -> Result<Video, AppError>;
}

/// PostgreSQL-backed video repository
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "insert"))]
    async fn create_video(
        &self,
        owner_id: Uuid,
        title: String,
        description: String,
    ) -> Result<Video, AppError> {
        let draft = Video::new(owner_id, title, description);

        let video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            INSERT INTO videos (id, created_at, updated_at, title, description, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(draft.id)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE owner_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let updated = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos
            SET title = $2, description = $3, video_reference = $4,
                thumbnail_reference = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_reference)
        .bind(&video.thumbnail_reference)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }
}
