//! Selection helpers for `orchid step`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::selector::{Transition, select_transition};
use crate::core::state::State;
use crate::dag::Dag;
use crate::io::config::EngineConfig;
use crate::io::definition_store::{load_dag, load_state};

/// Structured step outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A rule fired.
    Fired(Transition),
    /// No rule of the node fired for the current document.
    Unhandled,
}

/// Select the next transition of `node` from an in-memory workflow and state.
pub fn select_step(dag: &Dag, node: &str, state: &State) -> Result<SelectOutcome> {
    let fired = select_transition(dag, node, state)
        .with_context(|| format!("select transition from '{node}'"))?;
    Ok(fired.map_or(SelectOutcome::Unhandled, SelectOutcome::Fired))
}

/// Files consumed by [`select_from_files`].
#[derive(Debug, Clone, Copy)]
pub struct StepInputs<'a> {
    pub workflow: &'a Path,
    pub schema: &'a Path,
    pub document: &'a Path,
}

/// Load workflow, schema and document from disk and select from `node`.
pub fn select_from_files(
    inputs: StepInputs<'_>,
    node: &str,
    config: &EngineConfig,
) -> Result<SelectOutcome> {
    let dag = load_dag(inputs.workflow)?;
    let state = load_state(inputs.schema, inputs.document, &config.schema)?;
    select_step(&dag, node, &state)
}
