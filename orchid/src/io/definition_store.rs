//! Load workflow definitions, schemas and state documents from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::core::graph::validate;
use crate::core::state::State;
use crate::dag::{Dag, WorkflowDefinition};
use crate::io::config::{SchemaBackend, SchemaConfig};
use crate::schema::{FieldSchemaValidator, JsonSchemaValidator, SchemaValidator};

/// Read and parse a workflow definition without structural validation.
pub fn load_workflow(path: &Path) -> Result<WorkflowDefinition> {
    let contents = read(path, "workflow")?;
    serde_json::from_str(&contents).with_context(|| format!("parse workflow {}", path.display()))
}

/// Load a workflow and validate it into a [`Dag`].
pub fn load_dag(path: &Path) -> Result<Dag> {
    let definition = load_workflow(path)?;
    validate(definition).with_context(|| format!("validate workflow {}", path.display()))
}

/// Compile the schema at `path` with the configured backend.
pub fn load_schema(path: &Path, config: &SchemaConfig) -> Result<Box<dyn SchemaValidator>> {
    let schema = load_json(path, "schema")?;
    let validator: Box<dyn SchemaValidator> = match config.backend {
        SchemaBackend::JsonSchema => {
            let compiled = match config.draft.as_jsonschema() {
                Some(draft) => JsonSchemaValidator::with_draft(&schema, draft),
                None => JsonSchemaValidator::new(&schema),
            };
            Box::new(compiled.with_context(|| format!("compile schema {}", path.display()))?)
        }
        SchemaBackend::Field => Box::new(
            FieldSchemaValidator::new(&schema)
                .with_context(|| format!("compile schema {}", path.display()))?,
        ),
    };
    Ok(validator)
}

pub fn load_document(path: &Path) -> Result<Value> {
    load_json(path, "document")
}

/// Build a [`State`] from a schema file and an initial document file.
pub fn load_state(schema_path: &Path, document_path: &Path, config: &SchemaConfig) -> Result<State> {
    let validator = load_schema(schema_path, config)?;
    let document = load_document(document_path)?;
    State::with_document(validator, document)
        .with_context(|| format!("load state document {}", document_path.display()))
}

fn load_json(path: &Path, what: &str) -> Result<Value> {
    let contents = read(path, what)?;
    serde_json::from_str(&contents).with_context(|| format!("parse {what} {}", path.display()))
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {what} {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::StructuralError;
    use crate::io::config::SchemaDraft;
    use crate::test_support::Workspace;
    use serde_json::json;

    #[test]
    fn load_dag_validates_structure() {
        let ws = Workspace::new().expect("workspace");
        let good = ws
            .write_json(
                "good.json",
                &json!({"start": {"rules": [{"next": "done"}]}, "done": {"rules": [{"end": true}]}}),
            )
            .expect("write");
        assert_eq!(load_dag(&good).expect("dag").len(), 2);

        let cyclic = ws
            .write_json(
                "cyclic.json",
                &json!({"start": {"rules": [{"next": "A"}]}, "A": {"rules": [{"next": "start"}]}}),
            )
            .expect("write");
        let err = load_dag(&cyclic).expect_err("cycle");
        assert!(matches!(
            err.downcast_ref::<StructuralError>(),
            Some(StructuralError::Cycle { .. })
        ));
    }

    #[test]
    fn unknown_rule_keys_fail_to_parse() {
        let ws = Workspace::new().expect("workspace");
        let path = ws
            .write_json("bad.json", &json!({"start": {"rules": [{"goto": "x"}]}}))
            .expect("write");
        let err = load_workflow(&path).expect_err("unknown key");
        assert!(format!("{err:#}").contains("parse workflow"));
    }

    #[test]
    fn load_state_uses_configured_backend() {
        let ws = Workspace::new().expect("workspace");
        let schema = ws
            .write_json(
                "schema.json",
                &json!({"type": "record", "fields": {"total": {"type": "number"}}}),
            )
            .expect("write");
        let doc = ws.write_json("doc.json", &json!({"total": 3})).expect("write");

        let field = SchemaConfig {
            backend: SchemaBackend::Field,
            draft: SchemaDraft::Auto,
        };
        let state = load_state(&schema, &doc, &field).expect("state");
        assert_eq!(state.value_at_path(".total").expect("value"), json!(3));
    }

    #[test]
    fn load_state_rejects_nonconforming_document() {
        let ws = Workspace::new().expect("workspace");
        let schema = ws
            .write_json(
                "schema.json",
                &json!({"type": "object", "properties": {"total": {"type": "number"}}}),
            )
            .expect("write");
        let doc = ws
            .write_json("doc.json", &json!({"total": "lots"}))
            .expect("write");
        let err = load_state(&schema, &doc, &SchemaConfig::default()).expect_err("invalid doc");
        assert!(format!("{err:#}").contains("schema validation"));
    }

    #[test]
    fn missing_files_name_the_path() {
        let ws = Workspace::new().expect("workspace");
        let err = load_document(&ws.path().join("absent.json")).expect_err("missing");
        assert!(err.to_string().contains("absent.json"));
    }
}
