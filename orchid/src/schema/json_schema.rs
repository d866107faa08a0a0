//! JSON Schema backend.

use jsonschema::{Draft, Validator};
use serde_json::Value;
use tracing::debug;

use super::{SchemaError, SchemaValidator};

pub struct JsonSchemaValidator {
    compiled: Validator,
    top_level_object: bool,
}

impl JsonSchemaValidator {
    /// Compile `schema`, detecting the draft from its `$schema` keyword.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let compiled =
            jsonschema::validator_for(schema).map_err(|err| SchemaError::Invalid(err.to_string()))?;
        Ok(Self::from_compiled(schema, compiled))
    }

    /// Compile `schema` against a pinned draft.
    pub fn with_draft(schema: &Value, draft: Draft) -> Result<Self, SchemaError> {
        let compiled = jsonschema::options()
            .with_draft(draft)
            .build(schema)
            .map_err(|err| SchemaError::Invalid(err.to_string()))?;
        Ok(Self::from_compiled(schema, compiled))
    }

    fn from_compiled(schema: &Value, compiled: Validator) -> Self {
        let top_level_object = schema.get("type").and_then(Value::as_str) == Some("object");
        debug!(top_level_object, "compiled json schema");
        Self {
            compiled,
            top_level_object,
        }
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, document: &Value) -> Result<(), Vec<String>> {
        let violations: Vec<String> = self
            .compiled
            .iter_errors(document)
            .map(|err| err.to_string())
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn declares_top_level_container(&self) -> bool {
        self.top_level_object
    }
}
