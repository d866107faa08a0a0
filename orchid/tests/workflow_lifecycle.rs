//! Drives a workflow instance through the library API: validate the
//! definition, bind state to a schema, then repeatedly update state and
//! select transitions until the instance ends.

use orchid::core::graph::{StructuralError, validate, validate_all};
use orchid::core::predicate::{Predicate, eval};
use orchid::core::selector::Transition;
use orchid::core::state::State;
use orchid::dag::{Dag, WorkflowDefinition};
use orchid::schema::{FieldSchemaValidator, JsonSchemaValidator};
use serde_json::json;

const SHIPPING: &str = r#"{
    "start": {"rules": [
        {"next": "pick", "if": {"and": [
            {"variable": ".paid", "bool_eq": true},
            {"variable": ".items", "contains": "widget"}
        ]}},
        {"wait": true}
    ]},
    "pick": {"rules": [
        {"next": "ship", "if": {"variable": ".carrier", "is_element_of": ["ups", "dhl"]}},
        {"end": true, "if": {"not": {"variable": ".carrier", "str_contains": "x"}}}
    ]},
    "ship": {"rules": [{"end": true}]}
}"#;

fn order_state() -> State {
    let validator = JsonSchemaValidator::new(&json!({
        "type": "object",
        "properties": {
            "paid": {"type": "boolean"},
            "items": {"type": "array", "items": {"type": "string"}},
            "carrier": {"type": "string"}
        },
        "required": ["paid", "items", "carrier"]
    }))
    .expect("schema");
    State::with_document(
        validator,
        json!({"paid": false, "items": ["widget"], "carrier": "ups"}),
    )
    .expect("state")
}

#[test]
fn instance_runs_from_start_to_end() {
    let dag = Dag::from_json(SHIPPING).expect("dag");
    let state = order_state();

    assert_eq!(
        dag.select_transition("start", &state).expect("select"),
        Some(Transition::Wait)
    );

    state
        .update(json!({"paid": true, "items": ["widget", "gadget"], "carrier": "ups"}))
        .expect("update");
    assert_eq!(
        dag.select_transition("start", &state).expect("select"),
        Some(Transition::Advance("pick".to_string()))
    );
    assert_eq!(
        dag.select_transition("pick", &state).expect("select"),
        Some(Transition::Advance("ship".to_string()))
    );
    assert_eq!(
        dag.select_transition("ship", &state).expect("select"),
        Some(Transition::End)
    );
}

#[test]
fn rejected_update_does_not_change_decisions() {
    let dag = Dag::from_json(SHIPPING).expect("dag");
    let state = order_state();

    let err = state
        .update(json!({"paid": "yes", "items": [1], "carrier": "ups"}))
        .expect_err("invalid update");
    assert!(err.violations.len() >= 2, "{:?}", err.violations);
    assert_eq!(
        dag.select_transition("start", &state).expect("select"),
        Some(Transition::Wait)
    );
}

#[test]
fn predicates_evaluate_against_state() {
    let state = order_state();
    let guard: Predicate =
        serde_json::from_value(json!({"or": [
            {"variable": ".carrier", "is_substr_of": "ups-ground"},
            {"variable": ".missing", "num_gt": 1}
        ]}))
        .expect("predicate");
    // Short-circuits before the unresolved path.
    assert_eq!(eval(&guard, &state), Ok(true));

    let type_mismatch: Predicate =
        serde_json::from_value(json!({"variable": ".carrier", "num_gt": 1})).expect("predicate");
    assert_eq!(eval(&type_mismatch, &state), Ok(false));
}

#[test]
fn revalidating_a_dag_is_identity() {
    let dag = Dag::from_json(SHIPPING).expect("dag");
    let round_trip = validate(dag.clone().into_definition()).expect("revalidate");
    assert_eq!(round_trip, dag);

    let serialized = serde_json::to_string(&dag).expect("serialize");
    assert_eq!(Dag::from_json(&serialized).expect("reparse"), dag);
}

#[test]
fn every_violation_is_reported() {
    let definition: WorkflowDefinition = serde_json::from_value(json!({
        "begin": {"rules": [{"next": "begin"}]},
        "loose": {"rules": [{"wait": true, "end": true}]}
    }))
    .expect("definition");

    let violations = validate_all(definition).expect_err("invalid");
    assert_eq!(violations[0], StructuralError::MissingStart);
    assert!(violations.contains(&StructuralError::ConflictingTraversal {
        node: "loose".to_string(),
        rule: 0,
    }));
    assert!(violations.iter().any(|v| matches!(v, StructuralError::Cycle { .. })));
}

#[test]
fn field_schema_state_accumulates_violations() {
    let validator = FieldSchemaValidator::new(&json!({
        "type": "record",
        "fields": {
            "count": {"type": "number"},
            "note": {"type": "string", "nullable": true}
        }
    }))
    .expect("schema");
    let state = State::with_document(validator, json!({"count": 1, "note": null})).expect("state");

    let err = state
        .update(json!({"count": "one", "extra": true}))
        .expect_err("invalid");
    assert_eq!(err.violations.len(), 3, "{:?}", err.violations);
    assert_eq!(state.value_at_path(".count"), Ok(json!(1)));
}
