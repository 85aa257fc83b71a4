//! Redirects between API prefixes and the fallback for unknown paths.

use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Build the router for the root and bare version prefixes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { found("/v1/") }))
        .route("/v1", get(|| async { found("/v1/") }))
        .route("/v2", get(|| async { found("/v2/") }))
}

/// A `302 Found` pointing at `location`.
pub(crate) fn found(location: &'static str) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

/// Fallback for paths no router matched.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
