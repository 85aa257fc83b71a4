//! # HTTP Middleware
//!
//! - [`rate_limit`]: process-wide token bucket in front of the URL validation route.
//! - [`tracing_layer`]: request spans via `tower_http::trace`.

pub mod rate_limit;
pub mod tracing_layer;
