//! # API Route Modules
//!
//! - `meta`: root and version redirects, plus the fallback for unknown paths.
//! - `v1`: legacy document validation wrapped in `{ "data": ... }`.
//! - `v2`: document validation and endpoint (URL) validation.

pub mod meta;
pub mod v1;
pub mod v2;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Self-description served at `/v1/` and `/v2/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServerInfo {
    pub description: String,
    pub usage: String,
    pub version: String,
}

impl ServerInfo {
    fn new(usage: &str, version: &str) -> Self {
        Self {
            description: "Space API Validator API".to_string(),
            usage: usage.to_string(),
            version: version.to_string(),
        }
    }
}
