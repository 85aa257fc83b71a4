//! # Runtime Schema Validation
//!
//! Validates SpaceAPI documents against the embedded JSON Schemas. The
//! [`SpaceApiValidator`] compiles one validator per supported version at
//! construction time and reuses them for every document.
//!
//! ## Error paths
//!
//! The engine reports violations with a JSON Pointer (`/location/lat`). The
//! verdict exposes them in dotted form rooted at `(root)`
//! (`(root).location.lat`), which is what clients of the validator service
//! have always received.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::verdict::{SchemaIssue, SchemaVerdict};
use crate::version::{declared_versions, SpaceApiVersion};

/// Field name used for issues that concern the document as a whole.
const ROOT_FIELD: &str = "(root)";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// The input could not be treated as a document at all.
///
/// Schema mismatches are never reported through this type; they end up in
/// [`SchemaVerdict::errors`].
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The text is not valid JSON.
    #[error("document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The JSON value is not an object.
    #[error("document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// An embedded schema failed to compile.
#[derive(Error, Debug)]
#[error("failed to compile SpaceAPI {version} schema: {reason}")]
pub struct SchemaLoadError {
    pub version: SpaceApiVersion,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Validator seam
// ---------------------------------------------------------------------------

/// Anything that can judge a document.
///
/// The service only ever talks to this trait, so the schema engine can be
/// swapped or stubbed without touching the request pipeline.
pub trait DocumentValidator: Send + Sync {
    /// Validate an already-parsed document.
    fn validate_value(&self, document: &Value) -> Result<SchemaVerdict, DocumentError>;

    /// Parse and validate document text.
    fn validate(&self, document: &str) -> Result<SchemaVerdict, DocumentError> {
        let value: Value = serde_json::from_str(document)?;
        self.validate_value(&value)
    }
}

// ---------------------------------------------------------------------------
// SpaceApiValidator
// ---------------------------------------------------------------------------

/// JSON Schema validator for every supported SpaceAPI version.
pub struct SpaceApiValidator {
    validators: Vec<(SpaceApiVersion, jsonschema::Validator)>,
}

impl std::fmt::Debug for SpaceApiValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let versions: Vec<&str> = self.validators.iter().map(|(v, _)| v.label()).collect();
        f.debug_struct("SpaceApiValidator")
            .field("versions", &versions)
            .finish()
    }
}

impl SpaceApiValidator {
    /// Compile the embedded schemas.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError`] if an embedded schema is not valid JSON or
    /// is rejected by the engine.
    pub fn new() -> Result<Self, SchemaLoadError> {
        let mut validators = Vec::with_capacity(SpaceApiVersion::ALL.len());
        for version in SpaceApiVersion::ALL {
            let schema: Value =
                serde_json::from_str(version.schema_source()).map_err(|e| SchemaLoadError {
                    version,
                    reason: e.to_string(),
                })?;
            let validator = jsonschema::options()
                .with_draft(version.draft())
                .build(&schema)
                .map_err(|e| SchemaLoadError {
                    version,
                    reason: e.to_string(),
                })?;
            validators.push((version, validator));
        }
        Ok(Self { validators })
    }

    /// Versions this validator can check, oldest first.
    pub fn versions(&self) -> Vec<SpaceApiVersion> {
        self.validators.iter().map(|(v, _)| *v).collect()
    }

    fn check_object(&self, document: &Value, object: &Map<String, Value>) -> SchemaVerdict {
        let declared = declared_versions(object);

        if declared.supported.is_empty() {
            let description = if declared.unsupported.is_empty() {
                "no SpaceAPI version declared: expected \"api\": \"0.13\" or an \
                 \"api_compatibility\" list containing \"14\" or \"15\""
                    .to_string()
            } else {
                format!(
                    "unsupported SpaceAPI version(s): {}",
                    declared.unsupported.join(", ")
                )
            };
            return SchemaVerdict::from_issues(vec![SchemaIssue::new(ROOT_FIELD, description)]);
        }

        let mut issues = Vec::new();
        for (version, validator) in &self.validators {
            if !declared.supported.contains(version) {
                continue;
            }
            issues.extend(validator.iter_errors(document).map(|err| {
                SchemaIssue::new(
                    dotted_path(&err.instance_path.to_string()),
                    err.to_string(),
                )
            }));
        }
        SchemaVerdict::from_issues(issues)
    }
}

impl DocumentValidator for SpaceApiValidator {
    fn validate_value(&self, document: &Value) -> Result<SchemaVerdict, DocumentError> {
        let object = document
            .as_object()
            .ok_or_else(|| DocumentError::NotAnObject(json_kind(document)))?;
        Ok(self.check_object(document, object))
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Convert a JSON Pointer into the `(root).a.b` notation.
fn dotted_path(pointer: &str) -> String {
    let mut field = String::from(ROOT_FIELD);
    for segment in pointer.split('/').skip(1) {
        field.push('.');
        field.push_str(&segment.replace("~1", "/").replace("~0", "~"));
    }
    field
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> SpaceApiValidator {
        SpaceApiValidator::new().unwrap()
    }

    fn valid_v13() -> Value {
        json!({
            "api": "0.13",
            "space": "my cool space",
            "logo": "https://example.com/logo.png",
            "url": "https://example.com",
            "location": {
                "address": "Ulmer Strasse 255, 70327 Stuttgart, Germany",
                "lon": 9.236,
                "lat": 48.777
            },
            "state": { "open": false },
            "contact": {},
            "issue_report_channels": ["email"]
        })
    }

    #[test]
    fn compiles_all_versions() {
        assert_eq!(validator().versions(), SpaceApiVersion::ALL.to_vec());
    }

    #[test]
    fn valid_v13_document() {
        let verdict = validator().validate_value(&valid_v13()).unwrap();
        assert!(verdict.valid, "unexpected issues: {:?}", verdict.errors);
        assert!(verdict.errors.is_empty());
    }

    #[test]
    fn empty_object_is_invalid_with_root_issue() {
        let verdict = validator().validate("{}").unwrap();
        assert!(!verdict.valid);
        assert_eq!(verdict.errors.len(), 1);
        assert_eq!(verdict.errors[0].field, "(root)");
        assert!(verdict.errors[0].description.contains("no SpaceAPI version"));
    }

    #[test]
    fn unsupported_version_is_named() {
        let verdict = validator().validate(r#"{"api": "0.12"}"#).unwrap();
        assert!(!verdict.valid);
        assert!(verdict.errors[0].description.contains("0.12"));
    }

    #[test]
    fn missing_nested_field_reports_parent_path() {
        let mut doc = valid_v13();
        doc["location"].as_object_mut().unwrap().remove("lat");
        let verdict = validator().validate_value(&doc).unwrap();
        assert!(!verdict.valid);
        assert!(verdict
            .errors
            .iter()
            .any(|e| e.field == "(root).location" && e.description.contains("lat")));
    }

    #[test]
    fn wrong_type_reports_field_path() {
        let mut doc = valid_v13();
        doc["space"] = json!(42);
        let verdict = validator().validate_value(&doc).unwrap();
        assert!(!verdict.valid);
        assert_eq!(verdict.errors[0].field, "(root).space");
    }

    #[test]
    fn validation_is_repeatable() {
        let v = validator();
        let doc = r#"{"api": "0.13", "space": 1, "state": {}}"#;
        let first = v.validate(doc).unwrap();
        let second = v.validate(doc).unwrap();
        assert_eq!(first, second);
        assert!(first.errors.len() > 1);
    }

    #[test]
    fn every_declared_version_is_checked() {
        let doc = json!({
            "api_compatibility": ["14", "15"],
            "space": "Example",
            "logo": "https://example.com/logo.png",
            "url": "https://example.com",
            "contact": {}
        });
        // v14 requires a location, v15 does not.
        let verdict = validator().validate_value(&doc).unwrap();
        assert!(!verdict.valid);
        assert!(verdict
            .errors
            .iter()
            .all(|e| e.field == "(root)" && e.description.contains("location")));
    }

    #[test]
    fn malformed_text_is_an_error() {
        let err = validator().validate("foo").unwrap_err();
        assert!(matches!(err, DocumentError::Malformed(_)));
    }

    #[test]
    fn non_object_is_an_error() {
        let err = validator().validate(r#""asd""#).unwrap_err();
        assert!(matches!(err, DocumentError::NotAnObject("a string")));
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn dotted_path_conversion() {
        assert_eq!(dotted_path(""), "(root)");
        assert_eq!(dotted_path("/location/lat"), "(root).location.lat");
        assert_eq!(dotted_path("/a~1b/c~0d"), "(root).a/b.c~d");
        assert_eq!(dotted_path("/cam/0"), "(root).cam.0");
    }
}
