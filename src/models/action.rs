//! Declarative actions a definition can attach to buttons, hooks and
//! `api_call` outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::condition::Condition;
use crate::traits::HttpMethod;

/// When an `api_call` in the definition's action list runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Fired once when the definition loads.
    #[default]
    Auto,
    /// Only runs when referenced by a press, hook or `trigger_action`.
    Press,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Box<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Box<Action>>,
}

impl ApiCall {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            id: None,
            endpoint: endpoint.into(),
            method: HttpMethod::Get,
            body: None,
            headers: HashMap::new(),
            trigger: Trigger::Auto,
            on_success: None,
            on_error: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn on_success(mut self, action: Action) -> Self {
        self.on_success = Some(Box::new(action));
        self
    }

    pub fn on_error(mut self, action: Action) -> Self {
        self.on_error = Some(Box::new(action));
        self
    }
}

/// `state` values are interpreted when the action runs: `"response.x"`,
/// `"field - N"`, `"{{path}}"` or a literal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub state: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub screen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub action_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Box<Action>>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Box<Action>>,
}

/// A declarative action, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    ApiCall(ApiCall),
    UpdateState(UpdateState),
    Navigate(Navigate),
    TriggerAction(TriggerAction),
    Conditional(Conditional),
    /// Unrecognized `type`; ignored with a warning.
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn navigate(screen: impl Into<String>) -> Self {
        Action::Navigate(Navigate {
            id: None,
            screen: screen.into(),
            params: None,
        })
    }

    pub fn update_state(state: Value) -> Self {
        let state = match state {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Action::UpdateState(UpdateState { id: None, state })
    }

    pub fn trigger(action_id: impl Into<String>) -> Self {
        Action::TriggerAction(TriggerAction {
            id: None,
            action_id: action_id.into(),
        })
    }

    /// The action's `id`, if it declares one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Action::ApiCall(a) => a.id.as_deref(),
            Action::UpdateState(a) => a.id.as_deref(),
            Action::Navigate(a) => a.id.as_deref(),
            Action::TriggerAction(a) => a.id.as_deref(),
            Action::Conditional(a) => a.id.as_deref(),
            Action::Unknown => None,
        }
    }

    /// Wire name of the action type, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::ApiCall(_) => "api_call",
            Action::UpdateState(_) => "update_state",
            Action::Navigate(_) => "navigate",
            Action::TriggerAction(_) => "trigger_action",
            Action::Conditional(_) => "conditional",
            Action::Unknown => "unknown",
        }
    }

    /// True for `api_call` entries the session runs on load.
    pub fn is_auto_run(&self) -> bool {
        matches!(self, Action::ApiCall(call) if call.id.is_some() && call.trigger == Trigger::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_call_parses_with_defaults() {
        let action: Action = serde_json::from_value(json!({
            "type": "api_call",
            "id": "fetchOtp",
            "endpoint": "/api/pos/otp",
            "onSuccess": {
                "type": "update_state",
                "state": {"otp": "response.otp", "timeLeft": "response.expiresIn"}
            },
            "onError": {"type": "navigate", "screen": "Error"}
        }))
        .unwrap();

        let Action::ApiCall(call) = &action else {
            panic!("expected api_call");
        };
        assert_eq!(call.method, HttpMethod::Get);
        assert_eq!(call.trigger, Trigger::Auto);
        assert!(matches!(call.on_success.as_deref(), Some(Action::UpdateState(_))));
        assert!(action.is_auto_run());
        assert_eq!(action.id(), Some("fetchOtp"));
    }

    #[test]
    fn test_press_trigger_is_not_auto_run() {
        let action: Action = serde_json::from_value(json!({
            "type": "api_call",
            "id": "link",
            "endpoint": "/api/pos/link",
            "method": "POST",
            "trigger": "press"
        }))
        .unwrap();
        assert!(!action.is_auto_run());
    }

    #[test]
    fn test_conditional_else_branch() {
        let action: Action = serde_json::from_value(json!({
            "type": "conditional",
            "condition": {"field": "isLinked", "operator": "equals", "value": true},
            "then": {"type": "navigate", "screen": "Waiting"},
            "else": {"type": "navigate", "screen": "LinkingStep1"}
        }))
        .unwrap();
        let Action::Conditional(conditional) = action else {
            panic!("expected conditional");
        };
        assert_eq!(
            conditional.otherwise.as_deref(),
            Some(&Action::navigate("LinkingStep1"))
        );
    }

    #[test]
    fn test_unknown_type() {
        let action: Action =
            serde_json::from_value(json!({"type": "show_toast", "text": "hi"})).unwrap();
        assert_eq!(action, Action::Unknown);
        assert_eq!(action.kind(), "unknown");
    }

    #[test]
    fn test_trigger_action_field_name() {
        let action: Action =
            serde_json::from_value(json!({"type": "trigger_action", "actionId": "fetchOtp"}))
                .unwrap();
        assert_eq!(action, Action::trigger("fetchOtp"));
    }
}
