//! Boolean predicate trees and their evaluation against process state.
//!
//! A [`Predicate`] mirrors the wire format: every operator and connective is an
//! optional field, and exactly one must be populated. Shape is checked lazily,
//! when a node is evaluated, so short-circuited children are never inspected:
//! `and([false, <malformed>])` is `false`, not an error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::core::compare::{Comparison, compare};
use crate::core::path::{PathError, resolve_path};
use crate::core::state::State;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Predicate {
    /// State path a comparison reads, e.g. `.order.total`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_eq: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub str_eq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_eq: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_lte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub str_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_substr_of: Option<String>,
    /// `null` is a valid literal here, so presence is tracked separately from value.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub contains: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_element_of: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<Predicate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<Predicate>>,
    /// Accepts a single predicate or a list so arity errors stay representable.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        serialize_with = "serialize_not",
        skip_serializing_if = "Option::is_none"
    )]
    pub not: Option<Vec<Predicate>>,
}

/// Shape errors in a predicate node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateFormError {
    #[error("predicate populates no operator or connective")]
    NoOperator,
    #[error("predicate populates more than one operator or connective: {}", .0.join(", "))]
    MultipleOperators(Vec<&'static str>),
    #[error("comparison '{0}' is missing a variable path")]
    MissingVariable(&'static str),
    #[error("connective '{0}' must not bind a variable")]
    UnexpectedVariable(&'static str),
    #[error("connective '{0}' requires at least one child")]
    EmptyConnective(&'static str),
    #[error("'not' requires exactly one child, got {0}")]
    NotArity(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Form(#[from] PredicateFormError),
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Typed view of a well-formed predicate node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Form<'a> {
    Compare {
        variable: &'a str,
        op: Comparison<'a>,
    },
    And(&'a [Predicate]),
    Or(&'a [Predicate]),
    Not(&'a Predicate),
}

enum Populated<'a> {
    Compare(Comparison<'a>),
    And(&'a [Predicate]),
    Or(&'a [Predicate]),
    Not(&'a [Predicate]),
}

impl Predicate {
    /// Classify this node, checking it populates exactly one operator or
    /// connective with the right arity. Children are not inspected.
    pub fn form(&self) -> Result<Form<'_>, PredicateFormError> {
        let mut populated = self.populated();
        let (key, kind) = match populated.len() {
            0 => return Err(PredicateFormError::NoOperator),
            1 => populated.remove(0),
            _ => {
                return Err(PredicateFormError::MultipleOperators(
                    populated.iter().map(|(key, _)| *key).collect(),
                ));
            }
        };

        match kind {
            Populated::Compare(op) => {
                let variable = self
                    .variable
                    .as_deref()
                    .ok_or(PredicateFormError::MissingVariable(key))?;
                Ok(Form::Compare { variable, op })
            }
            _ if self.variable.is_some() => Err(PredicateFormError::UnexpectedVariable(key)),
            Populated::And([]) | Populated::Or([]) => Err(PredicateFormError::EmptyConnective(key)),
            Populated::And(children) => Ok(Form::And(children)),
            Populated::Or(children) => Ok(Form::Or(children)),
            Populated::Not([child]) => Ok(Form::Not(child)),
            Populated::Not(children) => Err(PredicateFormError::NotArity(children.len())),
        }
    }

    fn populated(&self) -> Vec<(&'static str, Populated<'_>)> {
        let mut out = Vec::new();
        if let Some(v) = self.bool_eq {
            out.push(("bool_eq", Populated::Compare(Comparison::BoolEq(v))));
        }
        if let Some(v) = self.str_eq.as_deref() {
            out.push(("str_eq", Populated::Compare(Comparison::StrEq(v))));
        }
        if let Some(v) = self.num_eq {
            out.push(("num_eq", Populated::Compare(Comparison::NumEq(v))));
        }
        if let Some(v) = self.num_lt {
            out.push(("num_lt", Populated::Compare(Comparison::NumLt(v))));
        }
        if let Some(v) = self.num_lte {
            out.push(("num_lte", Populated::Compare(Comparison::NumLte(v))));
        }
        if let Some(v) = self.num_gt {
            out.push(("num_gt", Populated::Compare(Comparison::NumGt(v))));
        }
        if let Some(v) = self.num_gte {
            out.push(("num_gte", Populated::Compare(Comparison::NumGte(v))));
        }
        if let Some(v) = self.str_contains.as_deref() {
            out.push(("str_contains", Populated::Compare(Comparison::StrContains(v))));
        }
        if let Some(v) = self.is_substr_of.as_deref() {
            out.push(("is_substr_of", Populated::Compare(Comparison::IsSubstrOf(v))));
        }
        if let Some(v) = self.contains.as_ref() {
            out.push(("contains", Populated::Compare(Comparison::Contains(v))));
        }
        if let Some(v) = self.is_element_of.as_deref() {
            out.push(("is_element_of", Populated::Compare(Comparison::IsElementOf(v))));
        }
        if let Some(children) = self.and.as_deref() {
            out.push(("and", Populated::And(children)));
        }
        if let Some(children) = self.or.as_deref() {
            out.push(("or", Populated::Or(children)));
        }
        if let Some(children) = self.not.as_deref() {
            out.push(("not", Populated::Not(children)));
        }
        out
    }
}

/// Evaluate `predicate` against the current document held by `state`.
///
/// The whole expression sees a single snapshot, even if `state` is updated
/// concurrently.
pub fn eval(predicate: &Predicate, state: &State) -> Result<bool, EvalError> {
    let snapshot = state.snapshot();
    eval_document(predicate, snapshot.as_deref())
}

/// Evaluate `predicate` against a bare document.
pub fn eval_value(predicate: &Predicate, document: &Value) -> Result<bool, EvalError> {
    eval_document(predicate, Some(document))
}

pub(crate) fn eval_document(
    predicate: &Predicate,
    document: Option<&Value>,
) -> Result<bool, EvalError> {
    match predicate.form()? {
        Form::Compare { variable, op } => {
            let Some(document) = document else {
                return Err(PathError::NoDocument {
                    path: variable.to_string(),
                }
                .into());
            };
            let value = resolve_path(variable, document)?;
            Ok(compare(op, value))
        }
        Form::And(children) => {
            for child in children {
                if !eval_document(child, document)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Form::Or(children) => {
            for child in children {
                if eval_document(child, document)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Form::Not(child) => Ok(!eval_document(child, document)?),
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Predicate>),
    One(Box<Predicate>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<Predicate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(children) => children,
        OneOrMany::One(child) => vec![*child],
    }))
}

fn serialize_not<S>(children: &Option<Vec<Predicate>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match children.as_deref() {
        Some([only]) => only.serialize(serializer),
        Some(many) => many.serialize(serializer),
        None => serializer.serialize_none(),
    }
}
