//! Workflow graph model: nodes, rules and the validated [`Dag`].
//!
//! A raw [`WorkflowDefinition`] is what arrives on the wire. It only becomes a
//! [`Dag`] by passing [`crate::core::graph::validate`], after which it is never
//! mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::graph::{DefinitionError, validate};
use crate::core::predicate::Predicate;

/// Name of the node every workflow instance begins in.
pub const START: &str = "start";

/// Raw workflow definition: node name -> node, in lexicographic name order.
pub type WorkflowDefinition = BTreeMap<String, Node>;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Node {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A single exit condition of a node.
///
/// Exactly one of `next`, `wait` and `end` must be set. `wait: false` and
/// `end: false` count as unset; any `next` string counts as set.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub wait: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub end: bool,
    /// Optional guard; a rule without one is unconditionally eligible.
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Predicate>,
}

/// Borrowed view of the single outcome a well-formed rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    Advance(&'a str),
    Wait,
    End,
}

impl Rule {
    /// The rule's outcome, or `None` when zero or several outcomes are set.
    pub fn outcome(&self) -> Option<Outcome<'_>> {
        match (self.next.as_deref(), self.wait, self.end) {
            (Some(target), false, false) => Some(Outcome::Advance(target)),
            (None, true, false) => Some(Outcome::Wait),
            (None, false, true) => Some(Outcome::End),
            _ => None,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A structurally valid, immutable workflow graph.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Dag {
    nodes: WorkflowDefinition,
}

impl Dag {
    pub(crate) fn from_validated(nodes: WorkflowDefinition) -> Self {
        Self { nodes }
    }

    /// Parse the JSON wire format and run the full validation pipeline.
    pub fn from_json(raw: &str) -> Result<Self, DefinitionError> {
        let definition: WorkflowDefinition = serde_json::from_str(raw)?;
        Ok(validate(definition)?)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Nodes in lexicographic name order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a validated graph; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_definition(self) -> WorkflowDefinition {
        self.nodes
    }
}
