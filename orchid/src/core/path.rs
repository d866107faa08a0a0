//! Dotted/bracketed path expressions into structured state documents.
//!
//! Grammar: an optional leading `.` is stripped, segments are separated by `.`
//! outside of `[...]`, and bracketed segments hold a non-negative integer
//! sequence index. `.a.b[3].c` parses to `a`, `b`, `3`, `c`. The empty path
//! (`""` or `"."`) addresses the whole document.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors produced while parsing or resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path '{path}': {reason}")]
    Syntax { path: String, reason: String },
    #[error("path '{path}' does not exist (unresolved at '{at}')")]
    Unresolved { path: String, at: String },
    #[error("path '{path}' cannot be resolved: state holds no document")]
    NoDocument { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// A parsed path. Paths are cheap to build and reparsed for every lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        let body = expr.strip_prefix('.').unwrap_or(expr);
        let mut segments = Vec::new();
        if !body.is_empty() {
            for part in split_outside_brackets(body) {
                parse_part(expr, part, &mut segments)?;
            }
        }
        Ok(Self {
            raw: expr.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Descend `root` segment by segment.
    ///
    /// Field segments need an object, index segments need an array and an
    /// in-range index; anything else is [`PathError::Unresolved`].
    pub fn resolve<'a>(&self, root: &'a Value) -> Result<&'a Value, PathError> {
        let mut current = root;
        for (depth, segment) in self.segments.iter().enumerate() {
            let next = match (segment, current) {
                (Segment::Field(name), Value::Object(map)) => map.get(name),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            };
            current = next.ok_or_else(|| PathError::Unresolved {
                path: self.raw.clone(),
                at: render(&self.segments[..=depth]),
            })?;
        }
        Ok(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.segments))
    }
}

/// Parse `expr` and resolve it against `root` in one step.
pub fn resolve_path<'a>(expr: &str, root: &'a Value) -> Result<&'a Value, PathError> {
    Path::parse(expr)?.resolve(root)
}

fn render(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return ".".to_string();
    }
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Field(name) => {
                out.push('.');
                out.push_str(name);
            }
            Segment::Index(index) => out.push_str(&format!("[{index}]")),
        }
    }
    out
}

fn split_outside_brackets(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Parse one dot-separated part: an optional field name followed by zero or
/// more `[index]` groups.
fn parse_part(expr: &str, part: &str, segments: &mut Vec<Segment>) -> Result<(), PathError> {
    let (name, mut rest) = match part.find('[') {
        Some(open) => part.split_at(open),
        None => (part, ""),
    };
    if name.contains(']') {
        return Err(syntax(expr, format!("unexpected ']' in segment '{part}'")));
    }
    if name.is_empty() && rest.is_empty() {
        return Err(syntax(expr, "empty segment".to_string()));
    }
    if !name.is_empty() {
        segments.push(Segment::Field(name.to_string()));
    }

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(syntax(
                expr,
                format!("unexpected '{rest}' after index in segment '{part}'"),
            ));
        };
        let Some(close) = inner.find(']') else {
            return Err(syntax(expr, format!("unclosed '[' in segment '{part}'")));
        };
        let digits = &inner[..close];
        let index = parse_index(digits).ok_or_else(|| {
            syntax(
                expr,
                format!("index '{digits}' is not a non-negative integer"),
            )
        })?;
        segments.push(Segment::Index(index));
        rest = &inner[close + 1..];
    }
    Ok(())
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn syntax(expr: &str, reason: String) -> PathError {
    PathError::Syntax {
        path: expr.to_string(),
        reason,
    }
}
