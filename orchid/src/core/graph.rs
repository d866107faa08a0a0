//! Structural validation of workflow definitions.
//!
//! Checks, in precedence order:
//! 1. the definition has at least one node,
//! 2. a node named `start` exists,
//! 3. every node has rules, every rule has exactly one outcome, every `next`
//!    names a node (per-node, see [`crate::core::invariants`]),
//! 4. advance edges form no cycle,
//! 5. every node other than `start` is the target of some advance edge.
//!
//! All violations are collected; when only one is surfaced it is the first by
//! the order above.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::core::invariants::validate_rules;
use crate::dag::{Dag, START, WorkflowDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("workflow must contain at least one node")]
    EmptyDag,
    #[error("workflow must contain a node called \"start\"")]
    MissingStart,
    #[error("node '{node}' must contain at least one rule")]
    EmptyRuleSet { node: String },
    #[error("node '{node}' rule {rule}: exactly one of next, wait or end must be set")]
    ConflictingTraversal { node: String, rule: usize },
    #[error("node '{node}' rule {rule}: next target '{target}' is not a node")]
    InvalidTarget {
        node: String,
        rule: usize,
        target: String,
    },
    #[error("cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
    #[error("isolated nodes (not the target of any rule): {}", .names.join(", "))]
    IsolatedNode { names: Vec<String> },
}

impl StructuralError {
    fn precedence(&self) -> u8 {
        match self {
            StructuralError::EmptyDag => 0,
            StructuralError::MissingStart => 1,
            StructuralError::EmptyRuleSet { .. } => 2,
            StructuralError::ConflictingTraversal { .. } => 3,
            StructuralError::InvalidTarget { .. } => 4,
            StructuralError::Cycle { .. } => 5,
            StructuralError::IsolatedNode { .. } => 6,
        }
    }
}

/// Failure to turn raw JSON into a [`Dag`].
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("invalid workflow definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Structure(#[from] StructuralError),
}

/// Validate `definition`, reporting the highest-precedence violation.
pub fn validate(definition: WorkflowDefinition) -> Result<Dag, StructuralError> {
    match collect_violations(&definition).into_iter().next() {
        Some(first) => Err(first),
        None => Ok(Dag::from_validated(definition)),
    }
}

/// Validate `definition`, reporting every violation in precedence order.
pub fn validate_all(definition: WorkflowDefinition) -> Result<Dag, Vec<StructuralError>> {
    let violations = collect_violations(&definition);
    if violations.is_empty() {
        Ok(Dag::from_validated(definition))
    } else {
        Err(violations)
    }
}

fn collect_violations(definition: &WorkflowDefinition) -> Vec<StructuralError> {
    if definition.is_empty() {
        return vec![StructuralError::EmptyDag];
    }

    let mut errors = Vec::new();
    if !definition.contains_key(START) {
        errors.push(StructuralError::MissingStart);
    }
    errors.extend(validate_rules(definition));
    if let Some(path) = find_cycle(definition) {
        errors.push(StructuralError::Cycle { path });
    }
    let isolated = isolated_nodes(definition);
    if !isolated.is_empty() {
        errors.push(StructuralError::IsolatedNode { names: isolated });
    }

    errors.sort_by_key(StructuralError::precedence);
    debug!(
        nodes = definition.len(),
        violations = errors.len(),
        "validated workflow definition"
    );
    errors
}

/// Depth-first search over advance edges with a visited set and an explicit
/// recursion stack. Traversal starts at `start`, then covers remaining nodes in
/// name order. Returns the cycle as node names with the first repeated last.
fn find_cycle(definition: &WorkflowDefinition) -> Option<Vec<String>> {
    let mut visited: HashSet<&str> = HashSet::new();
    let roots = definition
        .get_key_value(START)
        .map(|(name, _)| name)
        .into_iter()
        .chain(definition.keys());

    for root in roots {
        if visited.contains(root.as_str()) {
            continue;
        }
        if let Some(cycle) = walk_from(definition, root, &mut visited) {
            return Some(cycle);
        }
    }
    None
}

fn walk_from<'a>(
    definition: &'a WorkflowDefinition,
    root: &'a str,
    visited: &mut HashSet<&'a str>,
) -> Option<Vec<String>> {
    // Each frame holds a node and the index of the next rule to follow.
    let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];
    let mut on_stack: HashSet<&'a str> = HashSet::from([root]);
    visited.insert(root);

    while let Some(&(name, rule_index)) = stack.last() {
        let Some(rule) = definition
            .get(name)
            .and_then(|node| node.rules.get(rule_index))
        else {
            on_stack.remove(name);
            stack.pop();
            continue;
        };
        if let Some(frame) = stack.last_mut() {
            frame.1 += 1;
        }

        // Dangling targets are reported by the per-node checks.
        let Some(next) = rule.next.as_deref() else {
            continue;
        };
        if !definition.contains_key(next) {
            continue;
        }

        if on_stack.contains(next) {
            let from = stack
                .iter()
                .position(|(frame, _)| *frame == next)
                .unwrap_or(0);
            let mut cycle: Vec<String> = stack[from..]
                .iter()
                .map(|(frame, _)| frame.to_string())
                .collect();
            cycle.push(next.to_string());
            return Some(cycle);
        }
        if visited.insert(next) {
            on_stack.insert(next);
            stack.push((next, 0));
        }
    }
    None
}

/// Nodes that are neither `start` nor the target of any advance edge.
fn isolated_nodes(definition: &WorkflowDefinition) -> Vec<String> {
    let targets: HashSet<&str> = definition
        .values()
        .flat_map(|node| &node.rules)
        .filter_map(|rule| rule.next.as_deref())
        .collect();
    definition
        .keys()
        .filter(|name| name.as_str() != START && !targets.contains(name.as_str()))
        .cloned()
        .collect()
}
