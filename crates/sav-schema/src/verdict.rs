//! Validation verdicts.
//!
//! Plain data: callers that put verdicts on the wire map them into their
//! own response types.

/// One schema violation: where it happened and what is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Dotted path of the violating field, rooted at `(root)`.
    pub field: String,
    /// Human-readable description of the violation.
    pub description: String,
}

impl SchemaIssue {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

/// The outcome of validating one document.
///
/// `errors` keeps the order in which the engine reported the violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaVerdict {
    pub valid: bool,
    pub errors: Vec<SchemaIssue>,
}

impl SchemaVerdict {
    /// A verdict with no issues.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Build a verdict from collected issues; valid iff there are none.
    pub fn from_issues(errors: Vec<SchemaIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}
