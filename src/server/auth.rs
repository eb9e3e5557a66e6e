//! API token check for user routes

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use super::handlers::AppState;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Rejects requests without the configured token; a no-op when none is set
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokenQuery>, QueryRejection>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.settings.api_token.as_deref() else {
        return Ok(next.run(request).await);
    };
    let Query(query) = query?;

    let presented = bearer_token(&headers).or(query.token.as_deref());
    if presented != Some(expected) {
        debug!(path = %request.uri().path(), "Rejected request without valid token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
