//! Signed object delivery for the local storage backend.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tubely_core::constants::VIDEO_CONTENT_TYPE;
use tubely_core::AppError;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: u64,
    pub nonce: String,
    pub signature: String,
}

#[utoipa::path(
    get,
    path = "/assets/{bucket}/{key}",
    tag = "assets",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("key" = String, Path, description = "Object key"),
        ("expires" = u64, Query, description = "Expiry as unix seconds"),
        ("nonce" = String, Query, description = "Per-URL nonce"),
        ("signature" = String, Query, description = "HMAC-SHA256 signature")
    ),
    responses(
        (status = 200, description = "Object contents"),
        (status = 401, description = "Invalid or expired signature", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(bucket = %bucket, key = %key))]
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    query: Result<Query<SignedQuery>, QueryRejection>,
) -> Result<Response, HttpAppError> {
    let local = state
        .media
        .local_assets
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Object not found".to_string()))?;

    let Query(query) = query
        .map_err(|_| AppError::Unauthorized("Missing signature parameters".to_string()))?;

    let path = local.verify(
        &bucket,
        &key,
        query.expires,
        &query.nonce,
        &query.signature,
    )?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Object not found".to_string()).into());
        }
        Err(e) => return Err(AppError::from(e).into()),
    };
    let size = file.metadata().await.map_err(AppError::from)?.len();

    tracing::debug!(size_bytes = size, "Serving signed object");

    Ok((
        [
            (header::CONTENT_TYPE, VIDEO_CONTENT_TYPE.to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
