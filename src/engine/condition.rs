//! Evaluation of structured conditions.
//!
//! Fail-open: anything that is not a recognizable predicate counts as true,
//! so a malformed definition shows too much rather than too little.

use serde_json::Value;
use std::cmp::Ordering;

use super::expression::compare;
use super::path::{lookup, values_equal};
use super::template::{interpolate, Scope};
use crate::models::{Condition, Operator, Predicate};

/// Evaluate `condition` against `root` (state, or an API response).
pub fn evaluate(condition: &Condition, root: &Value) -> bool {
    match condition {
        Condition::Bool(b) => *b,
        Condition::Predicate(predicate) => evaluate_predicate(predicate, root),
        Condition::Other(_) => true,
    }
}

/// Evaluate a raw JSON condition, as found inside component props.
pub fn evaluate_value(condition: &Value, root: &Value) -> bool {
    match serde_json::from_value::<Condition>(condition.clone()) {
        Ok(condition) => evaluate(&condition, root),
        Err(_) => true,
    }
}

pub fn evaluate_predicate(predicate: &Predicate, root: &Value) -> bool {
    let field = lookup(root, &predicate.field);
    let expected = &predicate.value;
    match predicate.operator {
        Operator::Equals => field.is_some_and(|v| values_equal(v, expected)),
        Operator::NotEquals => !field.is_some_and(|v| values_equal(v, expected)),
        Operator::GreaterThan => {
            field.and_then(|v| compare(v, expected)) == Some(Ordering::Greater)
        }
        Operator::LessThan => field.and_then(|v| compare(v, expected)) == Some(Ordering::Less),
        Operator::Exists => field.is_some(),
        Operator::NotExists => field.is_none(),
        Operator::Unknown => true,
    }
}

/// Whether the predicate's field is defined and sits at or past the
/// predicate's boundary, i.e. a false result is a real expiry and not
/// a value that has not loaded yet.
pub fn terminal_reached(predicate: &Predicate, root: &Value) -> bool {
    let Some(field) = lookup(root, &predicate.field) else {
        return false;
    };
    let expected = &predicate.value;
    match predicate.operator {
        Operator::GreaterThan => matches!(
            compare(field, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::LessThan => matches!(
            compare(field, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Equals => !values_equal(field, expected),
        Operator::NotEquals => values_equal(field, expected),
        Operator::Exists => false,
        Operator::NotExists | Operator::Unknown => true,
    }
}

/// Coerce a `disabled`/`loading` style prop to a flag.
///
/// Booleans are taken as-is, objects are conditions against the state,
/// strings are interpolated and compared with `"true"`.
pub fn evaluate_flag(value: &Value, scope: &Scope<'_>) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Object(_) => evaluate_value(value, scope.state),
        Value::String(s) => interpolate(s, scope) == "true",
        _ => false,
    }
}
