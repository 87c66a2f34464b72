//! Structured predicates attached to components, hooks and conditional
//! actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators understood by the condition evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Exists,
    NotExists,
    /// Anything else; evaluates to true.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A `{field, operator, value}` predicate. `field` is a dotted path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// A condition as it appears in a definition.
///
/// Anything that is neither a boolean nor a predicate object lands in
/// `Other` and is treated as true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Bool(bool),
    Predicate(Predicate),
    Other(Value),
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Bool(true)
    }
}

impl From<Predicate> for Condition {
    fn from(predicate: Predicate) -> Self {
        Condition::Predicate(predicate)
    }
}
