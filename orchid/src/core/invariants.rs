//! Per-node rule invariants not expressible in the wire format:
//! - Every node has at least one rule
//! - Every rule sets exactly one of `next`, `wait`, `end`
//! - Every `next` names a node of the definition

use crate::core::graph::StructuralError;
use crate::dag::WorkflowDefinition;

/// Check every node's rules, in node-name then rule order.
pub fn validate_rules(definition: &WorkflowDefinition) -> Vec<StructuralError> {
    let mut errors = Vec::new();
    for (name, node) in definition {
        if node.rules.is_empty() {
            errors.push(StructuralError::EmptyRuleSet { node: name.clone() });
            continue;
        }

        for (index, rule) in node.rules.iter().enumerate() {
            if rule.outcome().is_none() {
                errors.push(StructuralError::ConflictingTraversal {
                    node: name.clone(),
                    rule: index,
                });
                continue;
            }
            if let Some(target) = rule.next.as_deref() {
                if !definition.contains_key(target) {
                    errors.push(StructuralError::InvalidTarget {
                        node: name.clone(),
                        rule: index,
                        target: target.to_string(),
                    });
                }
            }
        }
    }
    errors
}
