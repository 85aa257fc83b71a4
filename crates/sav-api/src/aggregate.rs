//! # Outcome Aggregation
//!
//! Combines fetch outcome, header signals and schema verdict into the
//! response records the API returns. Both validation paths end here:
//!
//! - **Document path**: the caller's body must be a JSON object, otherwise
//!   the caller gets a 400.
//! - **URL path**: an unreachable endpoint or an empty body skips schema
//!   validation entirely; a body that is not a JSON object is the
//!   endpoint's fault and surfaces as a 500.
//!
//! Schema issues are kept in validator order and additionally flattened
//! into a single `message`, one `"<field>: <description>\n"` line each.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use sav_probe::{inspect, ComplianceSignals, FetchOutcome};
use sav_schema::{DocumentError, DocumentValidator, SchemaIssue, SchemaVerdict};

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Response records
// ---------------------------------------------------------------------------

/// One schema violation as reported to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SchemaErrorEntry {
    /// Dotted path of the violating field, e.g. `(root).location.lat`.
    pub field: String,
    pub message: String,
}

impl From<&SchemaIssue> for SchemaErrorEntry {
    fn from(issue: &SchemaIssue) -> Self {
        Self {
            field: issue.field.clone(),
            message: issue.description.clone(),
        }
    }
}

/// A SpaceAPI document echoed back to the caller as it was parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct SpaceApiDocument(pub Value);

/// Result of `POST /v2/validateJSON`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JsonValidationResponse {
    pub valid: bool,
    /// All schema errors, one `"<field>: <description>"` line each.
    pub message: String,
    pub validated_json: SpaceApiDocument,
    pub schema_errors: Vec<SchemaErrorEntry>,
}

/// Result of `POST /v2/validateURL`.
///
/// `message`, `validatedJson` and `schemaErrors` are only present when the
/// endpoint served a document and schema validation ran.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UrlValidationResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub is_https: bool,
    pub https_forward: bool,
    pub reachable: bool,
    pub cors: bool,
    pub content_type: bool,
    pub cert_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_json: Option<SpaceApiDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_errors: Option<Vec<SchemaErrorEntry>>,
}

/// Result of the legacy `POST /v1/validate`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LegacyValidationResponse {
    pub valid: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// A parsed document together with its verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub document: Value,
    pub verdict: SchemaVerdict,
}

impl Assessment {
    pub fn message(&self) -> String {
        flatten_issues(&self.verdict.errors)
    }

    pub fn schema_errors(&self) -> Vec<SchemaErrorEntry> {
        self.verdict.errors.iter().map(SchemaErrorEntry::from).collect()
    }
}

/// Join issues into one `"<field>: <description>\n"` line per issue.
pub fn flatten_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}\n", issue.field, issue.description))
        .collect()
}

/// Parse raw document bytes and run them through the validator.
pub fn assess_document(
    validator: &dyn DocumentValidator,
    raw: &[u8],
) -> Result<Assessment, DocumentError> {
    let document: Value = serde_json::from_slice(raw)?;
    assess_value(validator, document)
}

/// Validate an already-parsed document.
pub fn assess_value(
    validator: &dyn DocumentValidator,
    document: Value,
) -> Result<Assessment, DocumentError> {
    let verdict = validator.validate_value(&document)?;
    Ok(Assessment { document, verdict })
}

/// Build the document-path response for a caller-supplied body.
pub fn document_response(
    validator: &dyn DocumentValidator,
    body: &[u8],
) -> Result<JsonValidationResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("body can't be empty".to_string()));
    }
    let assessment =
        assess_document(validator, body).map_err(|err| AppError::BadRequest(err.to_string()))?;

    Ok(JsonValidationResponse {
        valid: assessment.verdict.valid,
        message: assessment.message(),
        schema_errors: assessment.schema_errors(),
        validated_json: SpaceApiDocument(assessment.document),
    })
}

/// Build the URL-path response from a completed fetch.
pub fn url_response(
    validator: &dyn DocumentValidator,
    outcome: &FetchOutcome,
    origin: &str,
) -> Result<UrlValidationResponse, AppError> {
    let signals = outcome
        .headers
        .as_ref()
        .map(|headers| inspect(headers, origin))
        .unwrap_or_default();

    let mut response = network_fields(outcome, signals);

    let Some(body) = outcome.document() else {
        return Ok(response);
    };

    let assessment =
        assess_document(validator, body).map_err(|err| AppError::UpstreamDocument(err.to_string()))?;

    response.valid = assessment.verdict.valid;
    response.message = Some(assessment.message());
    response.schema_errors = Some(assessment.schema_errors());
    response.validated_json = Some(SpaceApiDocument(assessment.document));
    Ok(response)
}

fn network_fields(outcome: &FetchOutcome, signals: ComplianceSignals) -> UrlValidationResponse {
    UrlValidationResponse {
        is_https: outcome.is_https,
        https_forward: outcome.https_forward,
        reachable: outcome.reachable,
        cert_valid: outcome.cert_valid,
        cors: signals.cors,
        content_type: signals.content_type_ok,
        ..UrlValidationResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
    use axum::http::{HeaderMap, HeaderValue};
    use sav_probe::DEFAULT_ORIGIN;
    use sav_schema::SpaceApiValidator;
    use serde_json::json;

    /// Judges documents by a single `ok` flag.
    struct FlagValidator;

    impl DocumentValidator for FlagValidator {
        fn validate_value(&self, document: &Value) -> Result<SchemaVerdict, DocumentError> {
            let object = document
                .as_object()
                .ok_or(DocumentError::NotAnObject("something else"))?;
            if object.get("ok") == Some(&Value::Bool(true)) {
                return Ok(SchemaVerdict::valid());
            }
            Ok(SchemaVerdict::from_issues(vec![
                SchemaIssue::new("(root)", "ok is required"),
                SchemaIssue::new("(root).ok", "must be true"),
            ]))
        }
    }

    fn reachable(body: &str, headers: HeaderMap) -> FetchOutcome {
        FetchOutcome {
            reachable: true,
            is_https: true,
            https_forward: false,
            cert_valid: true,
            headers: Some(headers),
            body: Some(body.as_bytes().to_vec()),
        }
    }

    fn unreachable() -> FetchOutcome {
        FetchOutcome {
            reachable: false,
            is_https: true,
            https_forward: false,
            cert_valid: false,
            headers: None,
            body: None,
        }
    }

    #[test]
    fn flatten_keeps_order_and_duplicates() {
        let issues = vec![
            SchemaIssue::new("(root).b", "second"),
            SchemaIssue::new("(root).a", "first"),
            SchemaIssue::new("(root).a", "first"),
        ];
        assert_eq!(
            flatten_issues(&issues),
            "(root).b: second\n(root).a: first\n(root).a: first\n"
        );
        assert_eq!(flatten_issues(&[]), "");
    }

    #[test]
    fn document_response_reports_issues() {
        let resp = document_response(&FlagValidator, br#"{"ok": false}"#).unwrap();
        assert!(!resp.valid);
        assert_eq!(resp.message, "(root): ok is required\n(root).ok: must be true\n");
        assert_eq!(resp.schema_errors.len(), 2);
        assert_eq!(resp.schema_errors[1].field, "(root).ok");
        assert_eq!(resp.validated_json.0, json!({"ok": false}));
    }

    #[test]
    fn document_response_rejects_bad_input() {
        let bodies: [&[u8]; 4] = [b"", b"foo", b"[1, 2]", b"\"asd\""];
        for body in bodies {
            let err = document_response(&FlagValidator, body).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "{body:?}");
        }
    }

    #[test]
    fn valid_document_serializes_empty_schema_errors() {
        let resp = document_response(&FlagValidator, br#"{"ok": true}"#).unwrap();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["message"], "");
        assert_eq!(json["schemaErrors"], json!([]));
        assert_eq!(json["validatedJson"], json!({"ok": true}));
    }

    #[test]
    fn unreachable_outcome_skips_validation() {
        let resp = url_response(&FlagValidator, &unreachable(), DEFAULT_ORIGIN).unwrap();
        assert!(!resp.reachable && !resp.valid && !resp.cors && !resp.content_type);
        assert!(resp.is_https);

        let json = serde_json::to_value(&resp).unwrap();
        for absent in ["message", "validatedJson", "schemaErrors"] {
            assert!(json.get(absent).is_none(), "{absent} should be omitted");
        }
    }

    #[test]
    fn empty_body_skips_validation_but_keeps_signals() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        let resp = url_response(&FlagValidator, &reachable("", headers), DEFAULT_ORIGIN).unwrap();
        assert!(resp.reachable);
        assert!(resp.cors);
        assert!(!resp.valid);
        assert!(resp.message.is_none());
        assert!(resp.schema_errors.is_none());
    }

    #[test]
    fn reachable_document_is_validated() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        let outcome = reachable(r#"{"ok": true}"#, headers);
        let resp = url_response(&FlagValidator, &outcome, DEFAULT_ORIGIN).unwrap();
        assert!(resp.valid);
        assert!(resp.content_type);
        assert!(!resp.cors);
        assert!(resp.cert_valid);
        assert_eq!(resp.message.as_deref(), Some(""));
        assert_eq!(resp.schema_errors, Some(Vec::new()));
        assert_eq!(resp.validated_json, Some(SpaceApiDocument(json!({"ok": true}))));
    }

    #[test]
    fn non_object_remote_body_is_upstream_error() {
        for body in ["<html></html>", "[]"] {
            let outcome = reachable(body, HeaderMap::new());
            let err = url_response(&FlagValidator, &outcome, DEFAULT_ORIGIN).unwrap_err();
            assert!(matches!(err, AppError::UpstreamDocument(_)), "{body}");
        }
    }

    #[test]
    fn real_validator_flags_empty_document() {
        let validator = SpaceApiValidator::new().unwrap();
        let assessment = assess_document(&validator, b"{}").unwrap();
        assert!(!assessment.verdict.valid);
        assert!(assessment.message().starts_with("(root): "));
    }
}
