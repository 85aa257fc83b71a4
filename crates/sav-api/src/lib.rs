//! # sav-api: Axum API Service for the SpaceAPI Validator
//!
//! Validates SpaceAPI documents handed in directly and inspects live
//! SpaceAPI endpoints: reachability, TLS certificate validity, upgrade to
//! HTTPS through redirects, CORS exposure and content type.
//!
//! ## API Surface
//!
//! | Path                   | Module            | Purpose                        |
//! |------------------------|-------------------|--------------------------------|
//! | `/`, `/v1`, `/v2`      | [`routes::meta`]  | Redirects to the version roots |
//! | `/v1/*`                | [`routes::v1`]    | Legacy document validation     |
//! | `/v2/validateJSON`     | [`routes::v2`]    | Document validation            |
//! | `/v2/validateURL`      | [`routes::v2`]    | Endpoint validation            |
//! | `/health/*`            | this module       | Liveness and readiness probes  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → RateLimitMiddleware (validateURL only) → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated with utoipa derive macros and served at `/openapi.json`.

pub mod aggregate;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::http::{header, Method};
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let limiter = state.limiter.clone();

    // The service itself may be called from any origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(routes::meta::router())
        .merge(routes::v1::router())
        .merge(routes::v2::router())
        .merge(openapi::router())
        .fallback(routes::meta::not_found)
        .layer(Extension(limiter))
        .layer(cors)
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// Liveness probe. Always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. Schemas, clients and limiter are built before the
/// router exists, so a served request means the service is ready.
async fn readiness() -> &'static str {
    "ready"
}
