//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the validator API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SpaceAPI Validator",
        version = "0.1.0",
        description = "Validates SpaceAPI documents and inspects live SpaceAPI endpoints for reachability, TLS, CORS and content type.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::v1::info,
        crate::routes::v1::validate,
        crate::routes::v2::info,
        crate::routes::v2::validate_json,
        crate::routes::v2::validate_url,
    ),
    components(schemas(
        crate::routes::ServerInfo,
        crate::routes::v1::LegacyValidationRequest,
        crate::routes::v2::UrlValidationRequest,
        crate::aggregate::SpaceApiDocument,
        crate::aggregate::SchemaErrorEntry,
        crate::aggregate::JsonValidationResponse,
        crate::aggregate::UrlValidationResponse,
        crate::aggregate::LegacyValidationResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "v1", description = "Legacy document validation"),
        (name = "v2", description = "Document and endpoint validation"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let json = ApiDoc::openapi().to_json().unwrap();
        for path in ["/v1/", "/v1/validate", "/v2/", "/v2/validateJSON", "/v2/validateURL"] {
            assert!(json.contains(&format!("\"{path}\"")), "missing {path}");
        }
    }
}
