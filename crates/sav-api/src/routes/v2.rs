//! # v2 Validation API
//!
//! - `POST /v2/validateJSON`: validate a document supplied in the body.
//! - `POST /v2/validateURL`: fetch a live endpoint, inspect its headers and
//!   validate what it serves. Admission is rate-limited before the body is
//!   read.

use axum::body::Bytes;
use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sav_probe::Probe;

use crate::aggregate::{
    document_response, url_response, JsonValidationResponse, SpaceApiDocument,
    UrlValidationResponse,
};
use crate::error::AppError;
use crate::extractors::{parse_validated_body, Validate};
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::routes::ServerInfo;
use crate::state::AppState;

/// URL validation request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UrlValidationRequest {
    /// Absolute `http` or `https` URL of a SpaceAPI endpoint.
    pub url: String,
}

impl Validate for UrlValidationRequest {
    fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("url must not be empty".to_string());
        }
        Ok(())
    }
}

/// Build the v2 router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v2/", get(info))
        .route("/v2/validateJSON", post(validate_json))
        .route(
            "/v2/validateURL",
            post(validate_url).route_layer(from_fn(rate_limit_middleware)),
        )
}

/// GET /v2/: Server information.
#[utoipa::path(
    get,
    path = "/v2/",
    responses(
        (status = 200, description = "Server information", body = ServerInfo),
    ),
    tag = "v2"
)]
async fn info() -> Json<ServerInfo> {
    Json(ServerInfo::new(
        "Send a POST request in JSON format to /v2/validateJSON. See https://github.com/SpaceApi/validator for more information.",
        "1.0.0",
    ))
}

/// POST /v2/validateJSON: Validate a SpaceAPI document.
#[utoipa::path(
    post,
    path = "/v2/validateJSON",
    request_body = SpaceApiDocument,
    responses(
        (status = 200, description = "Validation result", body = JsonValidationResponse),
        (status = 400, description = "Body missing, malformed, or not a JSON object", body = crate::error::ErrorBody),
    ),
    tag = "v2"
)]
async fn validate_json(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<JsonValidationResponse>, AppError> {
    let response = document_response(state.validator.as_ref(), &body)?;
    tracing::debug!(valid = response.valid, issues = response.schema_errors.len(), "validated document");
    Ok(Json(response))
}

/// POST /v2/validateURL: Fetch, inspect and validate a SpaceAPI endpoint.
#[utoipa::path(
    post,
    path = "/v2/validateURL",
    request_body = UrlValidationRequest,
    responses(
        (status = 200, description = "Endpoint report; unreachable endpoints report reachable=false", body = UrlValidationResponse),
        (status = 400, description = "Body malformed or URL invalid", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
        (status = 500, description = "Endpoint served something that is not a JSON object", body = crate::error::ErrorBody),
    ),
    tag = "v2"
)]
async fn validate_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UrlValidationResponse>, AppError> {
    let req: UrlValidationRequest = parse_validated_body(&body)?;
    let target = Probe::parse_target(&req.url)?;

    let outcome = state.probe.fetch(&target).await?;
    let response = url_response(state.validator.as_ref(), &outcome, state.probe.origin())?;

    tracing::info!(
        url = %target,
        reachable = response.reachable,
        valid = response.valid,
        cert_valid = response.cert_valid,
        "validated endpoint"
    );
    Ok(Json(response))
}
