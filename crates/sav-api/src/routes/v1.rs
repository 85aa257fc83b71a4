//! # Legacy v1 API
//!
//! The original validator surface: a SpaceAPI document wrapped in
//! `{ "data": ... }`, answered with validity and a flattened error message.
//! Kept for clients that predate v2.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::aggregate::{assess_value, LegacyValidationResponse};
use crate::error::AppError;
use crate::extractors::{parse_validated_body, Validate};
use crate::routes::meta::found;
use crate::routes::ServerInfo;
use crate::state::AppState;

/// Legacy validation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LegacyValidationRequest {
    /// The SpaceAPI document to validate.
    #[schema(value_type = Object)]
    pub data: Value,
}

impl Validate for LegacyValidationRequest {
    fn validate(&self) -> Result<(), String> {
        if !self.data.is_object() {
            return Err("data must be a JSON object".to_string());
        }
        Ok(())
    }
}

/// Build the v1 router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/", get(info))
        .route("/v1/validate", post(validate).get(method_not_allowed))
        .route(
            "/v1/validate/",
            get(|| async { found("/v1/validate") }).post(|| async { found("/v1/validate") }),
        )
}

/// GET /v1/: Server information.
#[utoipa::path(
    get,
    path = "/v1/",
    responses(
        (status = 200, description = "Server information", body = ServerInfo),
    ),
    tag = "v1"
)]
async fn info() -> Json<ServerInfo> {
    Json(ServerInfo::new(
        "Send a POST request in JSON format to /v1/validate. See https://github.com/SpaceApi/validator for more information.",
        "2.0.0",
    ))
}

/// POST /v1/validate: Validate a wrapped SpaceAPI document.
#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = LegacyValidationRequest,
    responses(
        (status = 200, description = "Validation result", body = LegacyValidationResponse),
        (status = 400, description = "Body missing, malformed, or data not an object", body = crate::error::ErrorBody),
    ),
    tag = "v1"
)]
async fn validate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LegacyValidationResponse>, AppError> {
    let req: LegacyValidationRequest = parse_validated_body(&body)?;
    let assessment = assess_value(state.validator.as_ref(), req.data)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    Ok(Json(LegacyValidationResponse {
        valid: assessment.verdict.valid,
        message: assessment.message(),
    }))
}

async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
