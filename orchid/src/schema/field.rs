//! Typed-field schema backend.
//!
//! A lightweight alternative to JSON Schema for flat process state:
//!
//! ```json
//! {"type": "record", "fields": {"total": {"type": "number"}, "note": {"type": "string", "nullable": true}}}
//! {"type": "map", "values": {"type": "bool"}}
//! ```
//!
//! Field kinds are `number`, `string`, `bool`, `list` and `map`. Records reject
//! missing and undeclared fields. `null` is accepted only for nullable fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::{SchemaError, SchemaValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    String,
    Bool,
    List,
    Map,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Number => "number",
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::List => "list",
            FieldKind::Map => "map",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Deserialize)]
struct RecordSchema {
    #[serde(default)]
    fields: BTreeMap<String, FieldSpec>,
}

#[derive(Deserialize)]
struct MapSchema {
    values: FieldSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TopLevel {
    Record(BTreeMap<String, FieldSpec>),
    Map(FieldSpec),
    /// A bare field kind; valid schema, but not a container.
    Field(FieldSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchemaValidator {
    top: TopLevel,
}

impl FieldSchemaValidator {
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let kind = schema
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Invalid("could not determine top-level type".to_string()))?;
        let top = match kind {
            "record" => {
                let record: RecordSchema = parse(schema)?;
                TopLevel::Record(record.fields)
            }
            "map" => {
                let map: MapSchema = parse(schema)?;
                TopLevel::Map(map.values)
            }
            _ => TopLevel::Field(parse(schema)?),
        };
        Ok(Self { top })
    }
}

fn parse<T: for<'de> Deserialize<'de>>(schema: &Value) -> Result<T, SchemaError> {
    T::deserialize(schema).map_err(|err| SchemaError::Invalid(err.to_string()))
}

impl SchemaValidator for FieldSchemaValidator {
    fn validate(&self, document: &Value) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();
        match &self.top {
            TopLevel::Record(fields) => match document.as_object() {
                Some(map) => {
                    for (name, spec) in fields {
                        match map.get(name) {
                            Some(value) => check_field(name, spec, value, &mut violations),
                            None => violations.push(format!("missing field '{name}'")),
                        }
                    }
                    for name in map.keys().filter(|name| !fields.contains_key(*name)) {
                        violations.push(format!("undeclared field '{name}'"));
                    }
                }
                None => violations.push(format!("expected record, got {}", kind_label(document))),
            },
            TopLevel::Map(spec) => match document.as_object() {
                Some(map) => {
                    for (name, value) in map {
                        check_field(name, spec, value, &mut violations);
                    }
                }
                None => violations.push(format!("expected map, got {}", kind_label(document))),
            },
            TopLevel::Field(spec) => check_field(".", spec, document, &mut violations),
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn declares_top_level_container(&self) -> bool {
        matches!(self.top, TopLevel::Record(_) | TopLevel::Map(_))
    }
}

fn check_field(name: &str, spec: &FieldSpec, value: &Value, violations: &mut Vec<String>) {
    if value.is_null() {
        if !spec.nullable {
            violations.push(format!("field '{name}' is non-nullable, got null"));
        }
        return;
    }
    let matches = matches!(
        (spec.kind, value),
        (FieldKind::Number, Value::Number(_))
            | (FieldKind::String, Value::String(_))
            | (FieldKind::Bool, Value::Bool(_))
            | (FieldKind::List, Value::Array(_))
            | (FieldKind::Map, Value::Object(_))
    );
    if !matches {
        violations.push(format!(
            "field '{name}': expected {}, got {}",
            spec.kind,
            kind_label(value)
        ));
    }
}

fn kind_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
