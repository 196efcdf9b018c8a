use crate::auth::jwt::JwtService;
use crate::auth::models::AuthenticatedUser;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtService>,
}

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            tracing::debug!("Authentication failed: missing authorization header");
            return unauthorized("Missing authorization header");
        }
    };

    let Some(token) = auth_header.strip_prefix(BEARER_PREFIX) else {
        tracing::debug!("Authentication failed: not a bearer token");
        return unauthorized("Invalid authorization header format");
    };

    let user_id = match auth_state.jwt.verify(token.trim()) {
        Ok(user_id) => user_id,
        Err(e) => return HttpAppError(e).into_response(),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    next.run(request).await
}
