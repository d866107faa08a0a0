//! Deterministic rule selection within a workflow node.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::core::predicate::{EvalError, eval_document};
use crate::core::state::State;
use crate::dag::{Dag, Outcome};

/// The outcome of the rule that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Move to the named node.
    Advance(String),
    /// Suspend until an external event arrives.
    Wait,
    /// Terminate the instance successfully.
    End,
}

impl From<Outcome<'_>> for Transition {
    fn from(outcome: Outcome<'_>) -> Self {
        match outcome {
            Outcome::Advance(target) => Transition::Advance(target.to_string()),
            Outcome::Wait => Transition::Wait,
            Outcome::End => Transition::End,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Advance(target) => write!(f, "advance {target}"),
            Transition::Wait => f.write_str("wait"),
            Transition::End => f.write_str("end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("node '{0}' is not part of the workflow")]
    UnknownNode(String),
    #[error("node '{node}' rule {rule}: {source}")]
    Eval {
        node: String,
        rule: usize,
        #[source]
        source: EvalError,
    },
}

/// Fire the first rule of `node` (in declared order) whose guard holds.
///
/// Rules without a guard are always eligible. Returns `None` when no rule
/// fires; the caller decides how to surface that.
pub fn select_transition(
    dag: &Dag,
    node: &str,
    state: &State,
) -> Result<Option<Transition>, SelectError> {
    let snapshot = state.snapshot();
    first_match(dag, node, snapshot.as_deref())
}

/// Like [`select_transition`], against a bare document.
pub fn select_transition_value(
    dag: &Dag,
    node: &str,
    document: &Value,
) -> Result<Option<Transition>, SelectError> {
    first_match(dag, node, Some(document))
}

fn first_match(
    dag: &Dag,
    node: &str,
    document: Option<&Value>,
) -> Result<Option<Transition>, SelectError> {
    let rules = &dag
        .node(node)
        .ok_or_else(|| SelectError::UnknownNode(node.to_string()))?
        .rules;

    for (index, rule) in rules.iter().enumerate() {
        let Some(outcome) = rule.outcome() else {
            continue;
        };
        let fires = match &rule.guard {
            None => true,
            Some(guard) => eval_document(guard, document).map_err(|source| SelectError::Eval {
                node: node.to_string(),
                rule: index,
                source,
            })?,
        };
        if fires {
            debug!(node, rule = index, "rule fired");
            return Ok(Some(outcome.into()));
        }
    }

    debug!(node, "no rule fired");
    Ok(None)
}

impl Dag {
    /// See [`select_transition`].
    pub fn select_transition(
        &self,
        node: &str,
        state: &State,
    ) -> Result<Option<Transition>, SelectError> {
        select_transition(self, node, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::validate;
    use crate::core::path::PathError;
    use crate::core::predicate::PredicateFormError;
    use crate::test_support::{
        advance, definition, end, guarded, malformed, node, num_gt, str_eq, wait,
    };
    use serde_json::json;

    fn order_dag() -> Dag {
        validate(definition(vec![
            (
                "start",
                node(vec![
                    guarded(advance("review"), num_gt(".total", 100.0)),
                    guarded(wait(), str_eq(".status", "pending")),
                    advance("approve"),
                ]),
            ),
            ("review", node(vec![guarded(end(), str_eq(".status", "approved"))])),
            ("approve", node(vec![end()])),
        ]))
        .expect("valid dag")
    }

    #[test]
    fn first_matching_rule_fires() {
        let dag = order_dag();
        let doc = json!({"total": 150, "status": "pending"});
        assert_eq!(
            select_transition_value(&dag, "start", &doc),
            Ok(Some(Transition::Advance("review".to_string())))
        );
    }

    #[test]
    fn later_rules_fire_when_earlier_guards_fail() {
        let dag = order_dag();
        assert_eq!(
            select_transition_value(&dag, "start", &json!({"total": 5, "status": "pending"})),
            Ok(Some(Transition::Wait))
        );
        assert_eq!(
            select_transition_value(&dag, "start", &json!({"total": 5, "status": "new"})),
            Ok(Some(Transition::Advance("approve".to_string())))
        );
    }

    #[test]
    fn no_rule_firing_is_none() {
        let dag = order_dag();
        assert_eq!(
            select_transition_value(&dag, "review", &json!({"status": "rejected"})),
            Ok(None)
        );
    }

    #[test]
    fn unknown_node_is_an_error() {
        let dag = order_dag();
        assert_eq!(
            select_transition_value(&dag, "nowhere", &json!({})),
            Err(SelectError::UnknownNode("nowhere".to_string()))
        );
    }

    #[test]
    fn guard_errors_carry_rule_position() {
        let dag = validate(definition(vec![(
            "start",
            node(vec![
                guarded(advance("next"), num_gt(".missing", 1.0)),
                guarded(end(), malformed()),
            ]),
        ), ("next", node(vec![end()]))]))
        .expect("valid dag");

        let err = select_transition_value(&dag, "start", &json!({})).expect_err("path error");
        assert!(matches!(
            err,
            SelectError::Eval {
                rule: 0,
                source: EvalError::Path(PathError::Unresolved { .. }),
                ..
            }
        ));

        let err = select_transition_value(&dag, "start", &json!({"missing": 0}))
            .expect_err("form error");
        assert_eq!(
            err,
            SelectError::Eval {
                node: "start".to_string(),
                rule: 1,
                source: EvalError::Form(PredicateFormError::NoOperator),
            }
        );
    }

    #[test]
    fn transition_display_is_stable() {
        assert_eq!(Transition::Advance("a".to_string()).to_string(), "advance a");
        assert_eq!(Transition::Wait.to_string(), "wait");
        assert_eq!(Transition::End.to_string(), "end");
    }
}
