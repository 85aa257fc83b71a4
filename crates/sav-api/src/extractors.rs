//! # Request Body Extraction
//!
//! Handlers take the raw body as [`Bytes`] and parse it here, so a missing
//! `Content-Type` header never turns a usable request into a rejection and
//! every parse failure ends up as the same structured 400.

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Parse a JSON request body, mapping every failure to [`AppError::BadRequest`].
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("body can't be empty".to_string()));
    }
    serde_json::from_slice(body).map_err(|err| AppError::BadRequest(err.to_string()))
}

/// Parse a JSON request body and validate it using the [`Validate`] trait.
pub fn parse_validated_body<T: DeserializeOwned + Validate>(body: &Bytes) -> Result<T, AppError> {
    let value: T = parse_body(body)?;
    value.validate().map_err(AppError::BadRequest)?;
    Ok(value)
}
