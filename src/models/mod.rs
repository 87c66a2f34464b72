//! Data model of server-driven screens.

mod action;
mod component;
mod condition;
mod definition;
mod hook;
mod navigation;
mod texts;
pub mod tree;

pub use action::{Action, ApiCall, Conditional, Navigate, Trigger, TriggerAction, UpdateState};
pub use component::{Component, ComponentKind};
pub use condition::{Condition, Operator, Predicate};
pub use definition::ScreenDefinition;
pub use hook::{DelayHook, Hook, NfcDetectionHook, TimerHook};
pub use navigation::NavigationRequest;
pub use texts::TextCatalog;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Sum types that have a catch-all variant for entries that fail to parse.
pub(crate) trait Fallback {
    fn fallback() -> Self;
}

impl Fallback for Action {
    fn fallback() -> Self {
        Action::Unknown
    }
}

impl Fallback for Hook {
    fn fallback() -> Self {
        Hook::Unknown
    }
}

/// Deserialize a list element by element, replacing malformed entries with
/// the type's fallback. `null` yields an empty list.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Fallback,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).unwrap_or_else(|err| {
                tracing::warn!("Ignoring malformed definition entry: {}", err);
                T::fallback()
            })
        })
        .collect())
}
