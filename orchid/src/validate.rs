//! Validation helpers for `orchid validate`.

use std::path::Path;

use anyhow::Result;

use crate::core::graph::{StructuralError, validate_all};
use crate::io::config::{EngineConfig, ReportMode};
use crate::io::definition_store::load_workflow;

/// High-level validation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateOutcome {
    /// The workflow is a well-formed DAG with `nodes` nodes.
    Valid { nodes: usize },
    /// Violations in precedence order, truncated to one under `report = "first"`.
    Invalid { violations: Vec<StructuralError> },
}

/// Load the workflow at `path` and check it structurally.
///
/// I/O and parse failures are errors; structural violations are an outcome.
pub fn validate_workflow(path: &Path, config: &EngineConfig) -> Result<ValidateOutcome> {
    let definition = load_workflow(path)?;
    Ok(match validate_all(definition) {
        Ok(dag) => ValidateOutcome::Valid { nodes: dag.len() },
        Err(mut violations) => {
            if config.validation.report == ReportMode::First {
                violations.truncate(1);
            }
            ValidateOutcome::Invalid { violations }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::ValidationConfig;
    use crate::test_support::Workspace;
    use serde_json::json;

    fn invalid_workflow(ws: &Workspace) -> std::path::PathBuf {
        ws.write_json(
            "workflow.json",
            &json!({
                "start": {"rules": [{"next": "ghost"}, {"next": "done", "end": true}]},
                "done": {"rules": [{"end": true}]},
                "orphan": {"rules": [{"end": true}]}
            }),
        )
        .expect("write")
    }

    #[test]
    fn valid_workflow_reports_node_count() {
        let ws = Workspace::new().expect("workspace");
        let path = ws
            .write_json(
                "workflow.json",
                &json!({"start": {"rules": [{"wait": true}, {"next": "done"}]}, "done": {"rules": [{"end": true}]}}),
            )
            .expect("write");
        let outcome = validate_workflow(&path, &EngineConfig::default()).expect("validate");
        assert_eq!(outcome, ValidateOutcome::Valid { nodes: 2 });
    }

    #[test]
    fn reports_all_violations_by_default() {
        let ws = Workspace::new().expect("workspace");
        let path = invalid_workflow(&ws);
        let ValidateOutcome::Invalid { violations } =
            validate_workflow(&path, &EngineConfig::default()).expect("validate")
        else {
            panic!("expected invalid outcome");
        };
        assert!(violations.len() >= 3, "{violations:?}");
        assert!(violations.contains(&StructuralError::InvalidTarget {
            node: "start".to_string(),
            rule: 0,
            target: "ghost".to_string(),
        }));
        assert!(violations.iter().any(|v| matches!(v, StructuralError::IsolatedNode { .. })));
    }

    #[test]
    fn report_first_keeps_highest_precedence() {
        let ws = Workspace::new().expect("workspace");
        let path = invalid_workflow(&ws);
        let config = EngineConfig {
            validation: ValidationConfig {
                report: ReportMode::First,
            },
            ..EngineConfig::default()
        };
        let ValidateOutcome::Invalid { violations } =
            validate_workflow(&path, &config).expect("validate")
        else {
            panic!("expected invalid outcome");
        };
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn unparseable_workflow_is_an_error() {
        let ws = Workspace::new().expect("workspace");
        let path = ws.write("workflow.json", "{not json").expect("write");
        assert!(validate_workflow(&path, &EngineConfig::default()).is_err());
    }
}
