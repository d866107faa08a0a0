//! Pluggable schema backends for state documents.
//!
//! The state store depends only on the [`SchemaValidator`] capability. Two
//! backends ship with the crate:
//!
//! - [`JsonSchemaValidator`]: JSON Schema via the `jsonschema` crate.
//! - [`FieldSchemaValidator`]: typed record/map fields with nullability.

pub mod field;
pub mod json_schema;

pub use field::FieldSchemaValidator;
pub use json_schema::JsonSchemaValidator;

use serde_json::Value;
use thiserror::Error;

/// Capability every schema backend provides to the state store.
pub trait SchemaValidator: Send + Sync {
    /// Validate `document`, returning every violation found (not just the first).
    fn validate(&self, document: &Value) -> Result<(), Vec<String>>;

    /// True if the schema's top level is an object/record container.
    fn declares_top_level_container(&self) -> bool;
}

impl<T: SchemaValidator + ?Sized> SchemaValidator for Box<T> {
    fn validate(&self, document: &Value) -> Result<(), Vec<String>> {
        (**self).validate(document)
    }

    fn declares_top_level_container(&self) -> bool {
        (**self).declares_top_level_container()
    }
}

/// The schema itself is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema is invalid: {0}")]
    Invalid(String),
    #[error("schema is invalid: top-level type must be an object or record container")]
    UnsupportedContainer,
}

/// A candidate document failed its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("document failed schema validation:\n- {}", .violations.join("\n- "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}
