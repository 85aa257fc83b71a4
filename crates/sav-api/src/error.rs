//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps probe and validation failures to HTTP status codes and returns JSON
//! error bodies with a machine-readable code and a message.
//!
//! An unreachable endpoint is not an error: it is reported through a normal
//! `200` response with `reachable: false`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sav_probe::ProbeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "BAD_REQUEST", "RATE_LIMITED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// No route matches the request (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent something unusable: missing or malformed body, a
    /// document that is not a JSON object, an invalid URL (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The admission limiter has no token left (429).
    #[error("rate limit exceeded")]
    RateLimited,

    /// A reachable endpoint served a body that is not a JSON object (500).
    #[error("endpoint returned an invalid document: {0}")]
    UpstreamDocument(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            Self::UpstreamDocument(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_DOCUMENT_INVALID")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed on the server side");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Invalid targets and request construction failures are the caller's
/// problem; a client that cannot be built is ours.
impl From<ProbeError> for AppError {
    fn from(err: ProbeError) -> Self {
        match &err {
            ProbeError::InvalidUrl { .. } | ProbeError::Request { .. } => {
                Self::BadRequest(err.to_string())
            }
            ProbeError::Client(_) | ProbeError::Config(_) => Self::Internal(err.to_string()),
        }
    }
}
