//! The state bag backing one screen session.

use serde_json::{Map, Value};

use crate::engine::path;

/// Key/value state read by templates and conditions.
///
/// Writers merge shallowly; only the session owning the bag calls
/// [`StateBag::replace`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateBag {
    values: Map<String, Value>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a bag from a JSON object; anything else yields an empty bag.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    /// Shallow merge: each key in `delta` replaces the stored value.
    pub fn merge(&mut self, delta: Map<String, Value>) {
        for (key, value) in delta {
            self.values.insert(key, value);
        }
    }

    /// Drop the given top-level keys. Returns how many were present.
    pub fn remove_fields<S: AsRef<str>>(&mut self, keys: &[S]) -> usize {
        keys.iter()
            .filter(|key| self.values.remove(key.as_ref()).is_some())
            .count()
    }

    /// Swap in a whole new bag.
    pub fn replace(&mut self, values: Map<String, Value>) {
        self.values = values;
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Dotted-path lookup; `null` counts as absent.
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        let (head, rest) = match dotted.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (dotted, None),
        };
        let value = self.values.get(head)?;
        match rest {
            Some(rest) => path::lookup(value, rest),
            None if value.is_null() => None,
            None => Some(value),
        }
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Snapshot as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}
