//! Predicate evaluation against documents
//!
//! Evaluates a compiled predicate the way the document store does, so the
//! in-memory collection and the tests agree with a real driver on what a
//! selector matches.
//!
//! - Fields are dotted paths into nested objects
//! - Numbers compare numerically regardless of int/float encoding
//! - Strings compare lexicographically, never against numbers
//! - `$ne` matches a missing field
//! - Regex conditions only match strings

use std::cmp::Ordering;

use serde_json::Value;

use super::predicate::{Condition, Predicate};

/// Evaluates predicates against documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a document satisfies a predicate tree
    pub fn matches(document: &Value, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Field { field, condition } => {
                Self::matches_condition(lookup(document, field), condition)
            }
            Predicate::And(children) => children.iter().all(|p| Self::matches(document, p)),
            Predicate::Or(children) => children.iter().any(|p| Self::matches(document, p)),
        }
    }

    fn matches_condition(actual: Option<&Value>, condition: &Condition) -> bool {
        match condition {
            Condition::Eq(expected) => Self::eq_match(actual, expected),
            Condition::Ne(expected) => !Self::eq_match(actual, expected),
            Condition::Gt(bound) => Self::range_match(actual, bound, |o| o == Ordering::Greater),
            Condition::Gte(bound) => Self::range_match(actual, bound, |o| o != Ordering::Less),
            Condition::Lt(bound) => Self::range_match(actual, bound, |o| o == Ordering::Less),
            Condition::Lte(bound) => Self::range_match(actual, bound, |o| o != Ordering::Greater),
            Condition::Regex(pattern) => match actual {
                Some(Value::String(s)) => pattern.is_match(s),
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| matches!(item, Value::String(s) if pattern.is_match(s))),
                _ => false,
            },
        }
    }

    /// Equality; arrays match when any element is equal, null matches missing
    fn eq_match(actual: Option<&Value>, expected: &Value) -> bool {
        match actual {
            None => expected.is_null(),
            Some(Value::Array(items)) if !expected.is_array() => {
                items.iter().any(|item| values_equal(item, expected))
            }
            Some(value) => values_equal(value, expected),
        }
    }

    fn range_match(
        actual: Option<&Value>,
        bound: &Value,
        accept: impl Fn(Ordering) -> bool,
    ) -> bool {
        match actual {
            Some(value) => compare(value, bound).map_or(false, accept),
            None => false,
        }
    }
}

/// Resolves a dotted field path
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(xf), Some(yf)) => xf == yf,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Orders two values of the same kind; mixed kinds and null do not compare
fn compare(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
