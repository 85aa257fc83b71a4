//! # sav-schema: SpaceAPI Document Validation
//!
//! Turns a SpaceAPI document into a [`SchemaVerdict`]: a validity flag plus
//! the ordered list of field/description issues reported by the JSON Schema
//! engine.
//!
//! ## Responsibilities
//!
//! - **Version detection:** a document declares the SpaceAPI versions it
//!   implements through `"api": "0.13"` or `"api_compatibility": ["14", ...]`.
//!   Every declared, supported version is checked.
//! - **Schema checks:** the schemas for 0.13, 14 and 15 are embedded in the
//!   binary and compiled once by [`SpaceApiValidator::new`].
//!
//! Callers depend on the [`DocumentValidator`] trait, never on the engine.
//! Schema mismatches are reported through the verdict; only input that is not
//! a JSON object is an error.

pub mod validate;
pub mod verdict;
pub mod version;

pub use validate::{DocumentError, DocumentValidator, SchemaLoadError, SpaceApiValidator};
pub use verdict::{SchemaIssue, SchemaVerdict};
pub use version::SpaceApiVersion;
