//! Screen definitions as served by the BFF.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::component::Component;
use super::hook::Hook;
use super::lenient_list;
use super::tree::validate_definition;
use crate::error::DefinitionError;

fn default_screen_type() -> String {
    "screen".to_string()
}

/// One screen: layout tree, action list and hooks.
///
/// Entries of `actions`/`hooks` that fail to parse become `Unknown` instead
/// of failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "default_screen_type")]
    pub screen_type: String,
    pub layout: Component,
    #[serde(default, deserialize_with = "lenient_list")]
    pub actions: Vec<Action>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub hooks: Vec<Hook>,
}

impl ScreenDefinition {
    pub fn new(id: impl Into<String>, layout: Component) -> Self {
        Self {
            id: id.into(),
            screen_type: default_screen_type(),
            layout,
            actions: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_hooks(mut self, hooks: Vec<Hook>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Parse a definition body fetched for `screen_id`.
    pub fn from_slice(screen_id: &str, body: &[u8]) -> Result<Self, DefinitionError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| DefinitionError::Parse {
                screen_id: screen_id.to_string(),
                message: e.to_string(),
            })?;
        Self::from_value(screen_id, value)
    }

    /// Parse a definition from an already-decoded JSON value.
    ///
    /// Structural problems (no layout, non-array `actions`) are reported
    /// together as [`DefinitionError::Invalid`].
    pub fn from_value(screen_id: &str, value: serde_json::Value) -> Result<Self, DefinitionError> {
        let problems = validate_definition(&value);
        if !problems.is_empty() {
            return Err(DefinitionError::Invalid {
                screen_id: screen_id.to_string(),
                problems,
            });
        }
        serde_json::from_value(value).map_err(|e| DefinitionError::Parse {
            screen_id: screen_id.to_string(),
            message: e.to_string(),
        })
    }

    /// First action whose id matches.
    pub fn find_action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id() == Some(id))
    }

    /// Key under which the session remembers that auto-run actions fired.
    pub fn execution_key(&self) -> String {
        let ids: Vec<&str> = self.actions.iter().map(|a| a.id().unwrap_or("")).collect();
        format!("{}-{}", self.id, ids.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn otp_screen() -> serde_json::Value {
        json!({
            "id": "OtpScreen",
            "type": "screen",
            "layout": {"type": "container", "children": [
                {"type": "text", "props": {"text": "{{otp}}"}}
            ]},
            "actions": [
                {"type": "api_call", "id": "fetchOtp", "endpoint": "/api/pos/otp"},
                {"type": "navigate"},
                {"type": "api_call", "id": "renew", "endpoint": "/api/pos/otp", "trigger": "press"}
            ],
            "hooks": [{"type": "timer", "interval": 1000}]
        })
    }

    #[test]
    fn test_malformed_action_becomes_unknown() {
        let def = ScreenDefinition::from_value("OtpScreen", otp_screen()).unwrap();
        assert_eq!(def.actions.len(), 3);
        assert_eq!(def.actions[1], Action::Unknown);
        assert_eq!(def.hooks.len(), 1);
    }

    #[test]
    fn test_execution_key() {
        let def = ScreenDefinition::from_value("OtpScreen", otp_screen()).unwrap();
        assert_eq!(def.execution_key(), "OtpScreen-fetchOtp--renew");
    }

    #[test]
    fn test_find_action() {
        let def = ScreenDefinition::from_value("OtpScreen", otp_screen()).unwrap();
        assert!(def.find_action("renew").is_some());
        assert!(def.find_action("missing").is_none());
    }

    #[test]
    fn test_missing_layout_is_invalid() {
        let err = ScreenDefinition::from_slice("Waiting", br#"{"id": "Waiting"}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::Invalid { ref screen_id, .. } if screen_id == "Waiting"));

        let err = ScreenDefinition::from_slice("Waiting", b"not json").unwrap_err();
        assert!(matches!(err, DefinitionError::Parse { .. }));
    }

    #[test]
    fn test_defaults() {
        let def = ScreenDefinition::from_slice(
            "Waiting",
            br#"{"id": "Waiting", "layout": {"type": "loader"}}"#,
        )
        .unwrap();
        assert_eq!(def.screen_type, "screen");
        assert!(def.actions.is_empty());
        assert!(def.hooks.is_empty());
    }
}
