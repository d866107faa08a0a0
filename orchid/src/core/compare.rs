//! Total comparison functions, one per predicate operator.
//!
//! Every function returns `false` when the resolved value has the wrong kind
//! for the operator. Numbers are compared as `f64`; strings are never coerced.

use serde_json::Value;

/// A comparison operator bound to its literal operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison<'a> {
    BoolEq(bool),
    StrEq(&'a str),
    NumEq(f64),
    NumLt(f64),
    NumLte(f64),
    NumGt(f64),
    NumGte(f64),
    /// Value is a string containing the literal.
    StrContains(&'a str),
    /// Value is a string contained in the literal.
    IsSubstrOf(&'a str),
    /// Value is a sequence with an element equal to the literal.
    Contains(&'a Value),
    /// Value equals one of the literal's elements.
    IsElementOf(&'a [Value]),
}

pub fn compare(op: Comparison<'_>, value: &Value) -> bool {
    match op {
        Comparison::BoolEq(expected) => value.as_bool() == Some(expected),
        Comparison::StrEq(expected) => value.as_str() == Some(expected),
        Comparison::NumEq(rhs) => value.as_f64().is_some_and(|lhs| lhs == rhs),
        Comparison::NumLt(rhs) => value.as_f64().is_some_and(|lhs| lhs < rhs),
        Comparison::NumLte(rhs) => value.as_f64().is_some_and(|lhs| lhs <= rhs),
        Comparison::NumGt(rhs) => value.as_f64().is_some_and(|lhs| lhs > rhs),
        Comparison::NumGte(rhs) => value.as_f64().is_some_and(|lhs| lhs >= rhs),
        Comparison::StrContains(needle) => value.as_str().is_some_and(|s| s.contains(needle)),
        Comparison::IsSubstrOf(haystack) => value.as_str().is_some_and(|s| haystack.contains(s)),
        Comparison::Contains(element) => value
            .as_array()
            .is_some_and(|items| items.iter().any(|item| values_equal(item, element))),
        Comparison::IsElementOf(set) => set.iter().any(|item| values_equal(value, item)),
    }
}

/// Structural equality with numbers normalised, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(key, x)| ym.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
