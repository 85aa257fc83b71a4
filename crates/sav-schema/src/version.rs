//! SpaceAPI version declarations.
//!
//! Version 0.13 documents carry `"api": "0.13"`. From version 14 onwards a
//! document lists every version it implements in `api_compatibility`.

use serde_json::{Map, Value};

/// A SpaceAPI version with an embedded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpaceApiVersion {
    V13,
    V14,
    V15,
}

impl SpaceApiVersion {
    /// All supported versions, oldest first.
    pub const ALL: [SpaceApiVersion; 3] = [Self::V13, Self::V14, Self::V15];

    /// Version label as it appears in documents.
    pub fn label(self) -> &'static str {
        match self {
            Self::V13 => "0.13",
            Self::V14 => "14",
            Self::V15 => "15",
        }
    }

    pub(crate) fn schema_source(self) -> &'static str {
        match self {
            Self::V13 => include_str!("../schemas/13.json"),
            Self::V14 => include_str!("../schemas/14.json"),
            Self::V15 => include_str!("../schemas/15.json"),
        }
    }

    pub(crate) fn draft(self) -> jsonschema::Draft {
        match self {
            Self::V13 => jsonschema::Draft::Draft4,
            Self::V14 | Self::V15 => jsonschema::Draft::Draft7,
        }
    }

    fn from_api_field(value: &str) -> Option<Self> {
        match value {
            "0.13" => Some(Self::V13),
            _ => None,
        }
    }

    fn from_compatibility_entry(value: &str) -> Option<Self> {
        match value {
            "14" => Some(Self::V14),
            "15" => Some(Self::V15),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpaceApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Versions a document claims to implement.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DeclaredVersions {
    /// Supported versions, deduplicated, oldest first.
    pub supported: Vec<SpaceApiVersion>,
    /// Declared version strings with no embedded schema, in document order.
    pub unsupported: Vec<String>,
}

pub(crate) fn declared_versions(document: &Map<String, Value>) -> DeclaredVersions {
    let mut declared = DeclaredVersions::default();

    if let Some(api) = document.get("api").and_then(Value::as_str) {
        match SpaceApiVersion::from_api_field(api) {
            Some(version) => declared.supported.push(version),
            None => declared.unsupported.push(api.to_string()),
        }
    }

    if let Some(entries) = document.get("api_compatibility").and_then(Value::as_array) {
        for entry in entries.iter().filter_map(Value::as_str) {
            match SpaceApiVersion::from_compatibility_entry(entry) {
                Some(version) => declared.supported.push(version),
                None => declared.unsupported.push(entry.to_string()),
            }
        }
    }

    declared.supported.sort();
    declared.supported.dedup();
    declared
}
