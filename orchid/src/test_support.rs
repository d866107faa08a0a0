//! Test-only helpers for building definitions, predicates and fixture files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::TempDir;

use crate::core::predicate::Predicate;
use crate::dag::{Node, Rule, WorkflowDefinition};

/// Rule advancing to `target`.
pub fn advance(target: &str) -> Rule {
    Rule {
        next: Some(target.to_string()),
        ..Rule::default()
    }
}

pub fn wait() -> Rule {
    Rule {
        wait: true,
        ..Rule::default()
    }
}

pub fn end() -> Rule {
    Rule {
        end: true,
        ..Rule::default()
    }
}

/// Attach `predicate` as the guard of `rule`.
pub fn guarded(rule: Rule, predicate: Predicate) -> Rule {
    Rule {
        guard: Some(predicate),
        ..rule
    }
}

pub fn node(rules: Vec<Rule>) -> Node {
    Node { rules }
}

/// Build a definition from `(name, node)` pairs.
pub fn definition(nodes: Vec<(&str, Node)>) -> WorkflowDefinition {
    nodes
        .into_iter()
        .map(|(name, node)| (name.to_string(), node))
        .collect()
}

pub fn num_gt(variable: &str, literal: f64) -> Predicate {
    Predicate {
        variable: Some(variable.to_string()),
        num_gt: Some(literal),
        ..Predicate::default()
    }
}

pub fn str_eq(variable: &str, literal: &str) -> Predicate {
    Predicate {
        variable: Some(variable.to_string()),
        str_eq: Some(literal.to_string()),
        ..Predicate::default()
    }
}

pub fn bool_eq(variable: &str, literal: bool) -> Predicate {
    Predicate {
        variable: Some(variable.to_string()),
        bool_eq: Some(literal),
        ..Predicate::default()
    }
}

pub fn and(children: Vec<Predicate>) -> Predicate {
    Predicate {
        and: Some(children),
        ..Predicate::default()
    }
}

pub fn or(children: Vec<Predicate>) -> Predicate {
    Predicate {
        or: Some(children),
        ..Predicate::default()
    }
}

pub fn not(child: Predicate) -> Predicate {
    Predicate {
        not: Some(vec![child]),
        ..Predicate::default()
    }
}

/// A predicate populating no operator; evaluating it is a form error.
pub fn malformed() -> Predicate {
    Predicate::default()
}

/// Temporary directory holding fixture files for I/O and CLI tests.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp workspace")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `value` as pretty JSON to `name` inside the workspace.
    pub fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let mut payload = serde_json::to_string_pretty(value).context("serialize fixture")?;
        payload.push('\n');
        self.write(name, &payload)
    }

    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
