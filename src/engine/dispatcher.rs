//! Interprets declarative actions.
//!
//! Planning is synchronous and side-effect free: an action plus the current
//! state view becomes a [`Step`]. The session applies steps, performs the
//! HTTP requests they ask for and feeds results back through
//! [`ActionDispatcher::complete`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::condition;
use super::path::{as_number, lookup, number_value};
use super::template::{interpolate, interpolate_value, whole_token_path, Scope};
use crate::bff::BffClient;
use crate::error::{NetworkError, SduiError, SduiResult};
use crate::models::{Action, ApiCall, NavigationRequest, UpdateState};
use crate::traits::HttpMethod;

/// Longest `trigger_action` chain followed before giving up.
pub const MAX_TRIGGER_DEPTH: usize = 8;

static DECREMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][\w$.]*)\s*-\s*(\d+)\s*$").expect("Invalid decrement regex")
});

/// An HTTP request an `api_call` wants performed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    /// Body after interpolation.
    pub body: Option<Value>,
    pub headers: HashMap<String, String>,
    /// The originating call, needed to route the outcome.
    pub call: ApiCall,
}

/// The effect of one planned action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Shallow-merge these keys into the state bag.
    Merge(Map<String, Value>),
    Navigate(NavigationRequest),
    Request(ApiRequest),
    Noop,
}

/// Plans actions for one definition.
#[derive(Debug, Clone, Copy)]
pub struct ActionDispatcher<'a> {
    actions: &'a [Action],
}

impl<'a> ActionDispatcher<'a> {
    /// `actions` is the definition's action list, searched by
    /// `trigger_action`.
    pub fn new(actions: &'a [Action]) -> Self {
        Self { actions }
    }

    /// Plan `action` against the state in `scope`. `response` is the body of
    /// the `api_call` whose outcome is being handled, if any.
    pub fn plan(
        &self,
        action: &Action,
        scope: &Scope<'_>,
        response: Option<&Value>,
    ) -> SduiResult<Step> {
        let mut chain: Vec<String> = action.id().map(str::to_string).into_iter().collect();
        self.plan_in_chain(action, scope, response, &mut chain)
    }

    fn plan_in_chain(
        &self,
        action: &Action,
        scope: &Scope<'_>,
        response: Option<&Value>,
        chain: &mut Vec<String>,
    ) -> SduiResult<Step> {
        match action {
            Action::UpdateState(update) => Ok(Step::Merge(resolve_update(update, scope, response))),
            Action::Navigate(navigate) => {
                let params = navigate.params.as_ref().map(|params| match response {
                    Some(response) => {
                        let root = with_response(scope.state, response);
                        interpolate_value(params, &Scope { state: &root, ..*scope })
                    }
                    None => interpolate_value(params, scope),
                });
                Ok(Step::Navigate(NavigationRequest {
                    screen: navigate.screen.clone(),
                    params,
                }))
            }
            Action::ApiCall(call) => Ok(Step::Request(ApiRequest {
                method: call.method,
                endpoint: call.endpoint.clone(),
                body: call.body.as_ref().map(|body| interpolate_value(body, scope)),
                headers: call
                    .headers
                    .iter()
                    .map(|(k, v)| (k.clone(), interpolate(v, scope)))
                    .collect(),
                call: call.clone(),
            })),
            Action::TriggerAction(trigger) => {
                let target_id = &trigger.action_id;
                if chain.iter().any(|id| id == target_id) || chain.len() >= MAX_TRIGGER_DEPTH {
                    let mut cycle = chain.clone();
                    cycle.push(target_id.clone());
                    return Err(SduiError::ActionCycle {
                        action_id: target_id.clone(),
                        chain: cycle,
                    });
                }
                let Some(target) = self.actions.iter().find(|a| a.id() == Some(target_id.as_str())) else {
                    warn!("trigger_action target '{}' not found", target_id);
                    return Ok(Step::Noop);
                };
                debug!("trigger_action -> {} ({})", target_id, target.kind());
                chain.push(target_id.clone());
                self.plan_in_chain(target, scope, response, chain)
            }
            Action::Conditional(conditional) => {
                let root = response.unwrap_or(scope.state);
                let branch = if condition::evaluate(&conditional.condition, root) {
                    conditional.then.as_deref()
                } else {
                    conditional.otherwise.as_deref()
                };
                match branch {
                    Some(next) => self.plan_in_chain(next, scope, response, chain),
                    None => Ok(Step::Noop),
                }
            }
            Action::Unknown => {
                warn!("Ignoring action of unknown type");
                Ok(Step::Noop)
            }
        }
    }

    /// Route the outcome of an `api_call` through `onSuccess` / `onError`.
    pub fn complete(
        &self,
        call: &ApiCall,
        result: Result<Value, NetworkError>,
        scope: &Scope<'_>,
    ) -> SduiResult<Step> {
        let mut chain: Vec<String> = call.id.iter().cloned().collect();
        match result {
            Ok(response) => match call.on_success.as_deref() {
                Some(next) => self.plan_in_chain(next, scope, Some(&response), &mut chain),
                None => Ok(Step::Noop),
            },
            Err(err) => {
                let message = err.user_message();
                match call.on_error.as_deref() {
                    Some(Action::Navigate(navigate)) if navigate.params.is_none() => {
                        Ok(Step::Navigate(NavigationRequest {
                            screen: navigate.screen.clone(),
                            params: Some(json!({ "message": message })),
                        }))
                    }
                    Some(next) => {
                        let context = json!({ "message": message });
                        self.plan_in_chain(next, scope, Some(&context), &mut chain)
                    }
                    None => {
                        warn!(
                            "api_call {} failed with no onError: {}",
                            call.endpoint, err
                        );
                        Ok(Step::Noop)
                    }
                }
            }
        }
    }

    /// Plan `action` and perform any HTTP requests it leads to, returning
    /// the terminal step. For hosts that drive actions without a session.
    pub async fn execute(
        &self,
        action: &Action,
        scope: &Scope<'_>,
        client: &BffClient,
    ) -> SduiResult<Step> {
        let mut step = self.plan(action, scope, None)?;
        while let Step::Request(request) = step {
            let result = client.call(&request).await;
            step = self.complete(&request.call, result, scope)?;
        }
        Ok(step)
    }
}

/// `state` with the response reachable as `response.*`.
fn with_response(state: &Value, response: &Value) -> Value {
    let mut root = match state {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    root.insert("response".to_string(), response.clone());
    Value::Object(root)
}

/// Compute every entry of an `update_state` against the same snapshot.
fn resolve_update(
    update: &UpdateState,
    scope: &Scope<'_>,
    response: Option<&Value>,
) -> Map<String, Value> {
    update
        .state
        .iter()
        .map(|(key, expr)| (key.clone(), resolve_value(key, expr, scope, response)))
        .collect()
}

fn resolve_value(key: &str, expr: &Value, scope: &Scope<'_>, response: Option<&Value>) -> Value {
    let Value::String(text) = expr else {
        return expr.clone();
    };

    if let (Some(path), Some(response)) = (text.strip_prefix("response."), response) {
        return lookup(response, path).cloned().unwrap_or(Value::Null);
    }

    if let Some(caps) = DECREMENT_REGEX.captures(text) {
        let field = &caps[1];
        let amount = caps[2].parse::<f64>().unwrap_or(0.0);
        // The written key's current value wins; the named field is only a
        // fallback when the key is absent.
        let current = lookup(scope.state, key)
            .and_then(as_number)
            .or_else(|| lookup(scope.state, field).and_then(as_number))
            .unwrap_or(0.0);
        return number_value(current - amount);
    }

    if let Some(path) = whole_token_path(text) {
        if let (Some(rest), Some(response)) = (path.strip_prefix("response."), response) {
            return lookup(response, rest).cloned().unwrap_or(Value::Null);
        }
        return scope.resolve(path).unwrap_or(Value::Null);
    }

    expr.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn actions(value: Value) -> Vec<Action> {
        serde_json::from_value(value).unwrap()
    }

    fn merge_of(step: Step) -> Map<String, Value> {
        match step {
            Step::Merge(delta) => delta,
            other => panic!("expected merge, got {:?}", other),
        }
    }

    #[test]
    fn test_decrement() {
        let action = Action::update_state(json!({"timeLeft": "timeLeft - 1"}));
        let dispatcher = ActionDispatcher::new(&[]);

        let state = json!({"timeLeft": 5});
        let delta = merge_of(dispatcher.plan(&action, &Scope::new(&state), None).unwrap());
        assert_eq!(delta.get("timeLeft"), Some(&json!(4)));

        let state = json!({});
        let delta = merge_of(dispatcher.plan(&action, &Scope::new(&state), None).unwrap());
        assert_eq!(delta.get("timeLeft"), Some(&json!(-1)));

        let state = json!({"timeLeft": "10"});
        let delta = merge_of(dispatcher.plan(&action, &Scope::new(&state), None).unwrap());
        assert_eq!(delta.get("timeLeft"), Some(&json!(9)));
    }

    #[test]
    fn test_decrement_reads_written_key_first() {
        let dispatcher = ActionDispatcher::new(&[]);

        let action = Action::update_state(json!({"a": "b - 1"}));
        let state = json!({"a": 10, "b": 20});
        let delta = merge_of(dispatcher.plan(&action, &Scope::new(&state), None).unwrap());
        assert_eq!(delta.get("a"), Some(&json!(9)));

        let action = Action::update_state(json!({"remaining": "countdown - 2"}));
        let state = json!({"remaining": 10});
        let delta = merge_of(dispatcher.plan(&action, &Scope::new(&state), None).unwrap());
        assert_eq!(delta.get("remaining"), Some(&json!(8)));
    }

    #[test]
    fn test_decrement_falls_back_to_field() {
        let action = Action::update_state(json!({"remaining": "countdown - 2"}));
        let state = json!({"countdown": 7});
        let delta = merge_of(
            ActionDispatcher::new(&[])
                .plan(&action, &Scope::new(&state), None)
                .unwrap(),
        );
        assert_eq!(delta.get("remaining"), Some(&json!(5)));
    }

    #[test]
    fn test_batch_uses_pre_mutation_snapshot() {
        let action = Action::update_state(json!({
            "a": "b - 1",
            "b": "a - 1",
            "copy": "{{cardData}}",
            "missing": "{{nope}}",
            "flag": true,
            "label": "plain text"
        }));
        let state = json!({"a": 10, "b": 20, "cardData": {"cardType": "debit"}});
        let delta = merge_of(
            ActionDispatcher::new(&[])
                .plan(&action, &Scope::new(&state), None)
                .unwrap(),
        );
        assert_eq!(delta.get("a"), Some(&json!(9)));
        assert_eq!(delta.get("b"), Some(&json!(19)));
        assert_eq!(delta.get("copy"), Some(&json!({"cardType": "debit"})));
        assert_eq!(delta.get("missing"), Some(&Value::Null));
        assert_eq!(delta.get("flag"), Some(&json!(true)));
        assert_eq!(delta.get("label"), Some(&json!("plain text")));
    }

    #[test]
    fn test_on_success_maps_response() {
        let call: ApiCall = serde_json::from_value(json!({
            "id": "fetchOtp",
            "endpoint": "/api/pos/otp",
            "onSuccess": {
                "type": "update_state",
                "state": {"otp": "response.otp", "timeLeft": "response.expiresIn"}
            }
        }))
        .unwrap();
        let state = json!({});
        let step = ActionDispatcher::new(&[])
            .complete(
                &call,
                Ok(json!({"otp": "123", "expiresIn": 20})),
                &Scope::new(&state),
            )
            .unwrap();
        let delta = merge_of(step);
        assert_eq!(Value::Object(delta), json!({"otp": "123", "timeLeft": 20}));
    }

    #[test]
    fn test_on_error_navigate_gets_message() {
        let call = ApiCall::new("/api/pos/link").on_error(Action::navigate("Error"));
        let state = json!({});
        let step = ActionDispatcher::new(&[])
            .complete(
                &call,
                Err(NetworkError::HttpStatus {
                    status: 400,
                    message: "OTP inválido".to_string(),
                }),
                &Scope::new(&state),
            )
            .unwrap();
        assert_eq!(
            step,
            Step::Navigate(NavigationRequest::with_params(
                "Error",
                json!({"message": "OTP inválido"})
            ))
        );
    }

    #[test]
    fn test_on_error_explicit_params_kept() {
        let call: ApiCall = serde_json::from_value(json!({
            "endpoint": "/api/pos/link",
            "onError": {"type": "navigate", "screen": "Error", "params": {"message": "Fijo"}}
        }))
        .unwrap();
        let state = json!({});
        let step = ActionDispatcher::new(&[])
            .complete(&call, Err(NetworkError::Cancelled), &Scope::new(&state))
            .unwrap();
        assert_eq!(
            step,
            Step::Navigate(NavigationRequest::with_params("Error", json!({"message": "Fijo"})))
        );
    }

    #[test]
    fn test_missing_on_error_is_noop() {
        let call = ApiCall::new("/api/pos/otp");
        let state = json!({});
        let step = ActionDispatcher::new(&[])
            .complete(&call, Err(NetworkError::Cancelled), &Scope::new(&state))
            .unwrap();
        assert_eq!(step, Step::Noop);
    }

    #[test]
    fn test_conditional_against_response() {
        let call: ApiCall = serde_json::from_value(json!({
            "endpoint": "/api/pos/initialize",
            "onSuccess": {
                "type": "conditional",
                "condition": {"field": "isLinked", "operator": "equals", "value": true},
                "then": {"type": "navigate", "screen": "Waiting"},
                "else": {"type": "navigate", "screen": "LinkingStep1"}
            }
        }))
        .unwrap();
        // State says linked; the response decides.
        let state = json!({"isLinked": true});
        let dispatcher = ActionDispatcher::new(&[]);
        let step = dispatcher
            .complete(&call, Ok(json!({"isLinked": false})), &Scope::new(&state))
            .unwrap();
        assert_eq!(step, Step::Navigate(NavigationRequest::new("LinkingStep1")));
    }

    #[test]
    fn test_conditional_against_state_without_response() {
        let action: Action = serde_json::from_value(json!({
            "type": "conditional",
            "condition": {"field": "otp", "operator": "exists"},
            "then": {"type": "navigate", "screen": "Linking", "params": {"otp": "{{otp}}"}}
        }))
        .unwrap();
        let dispatcher = ActionDispatcher::new(&[]);

        let state = json!({"otp": "77"});
        assert_eq!(
            dispatcher.plan(&action, &Scope::new(&state), None).unwrap(),
            Step::Navigate(NavigationRequest::with_params("Linking", json!({"otp": "77"})))
        );
        let empty = json!({});
        assert_eq!(
            dispatcher.plan(&action, &Scope::new(&empty), None).unwrap(),
            Step::Noop
        );
    }

    #[test]
    fn test_trigger_first_match_wins() {
        let list = actions(json!([
            {"type": "navigate", "id": "go", "screen": "First"},
            {"type": "navigate", "id": "go", "screen": "Second"}
        ]));
        let state = json!({});
        let step = ActionDispatcher::new(&list)
            .plan(&Action::trigger("go"), &Scope::new(&state), None)
            .unwrap();
        assert_eq!(step, Step::Navigate(NavigationRequest::new("First")));
    }

    #[test]
    fn test_trigger_cycle_detected() {
        let list = actions(json!([
            {"type": "trigger_action", "id": "a", "actionId": "b"},
            {"type": "trigger_action", "id": "b", "actionId": "a"}
        ]));
        let state = json!({});
        let err = ActionDispatcher::new(&list)
            .plan(&Action::trigger("a"), &Scope::new(&state), None)
            .unwrap_err();
        match err {
            SduiError::ActionCycle { action_id, chain } => {
                assert_eq!(action_id, "a");
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_trigger_cycle() {
        let list = actions(json!([{"type": "trigger_action", "id": "loop", "actionId": "loop"}]));
        let state = json!({});
        let err = ActionDispatcher::new(&list)
            .plan(&list[0], &Scope::new(&state), None)
            .unwrap_err();
        assert!(matches!(err, SduiError::ActionCycle { .. }));
    }

    #[test]
    fn test_trigger_depth_bound() {
        let list: Vec<Action> = (0..20)
            .map(|i| {
                serde_json::from_value(json!({
                    "type": "trigger_action", "id": format!("s{}", i), "actionId": format!("s{}", i + 1)
                }))
                .unwrap()
            })
            .collect();
        let state = json!({});
        let err = ActionDispatcher::new(&list)
            .plan(&Action::trigger("s0"), &Scope::new(&state), None)
            .unwrap_err();
        match err {
            SduiError::ActionCycle { chain, .. } => assert_eq!(chain.len(), MAX_TRIGGER_DEPTH + 1),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_trigger_unknown_target_is_noop() {
        let state = json!({});
        let step = ActionDispatcher::new(&[])
            .plan(&Action::trigger("ghost"), &Scope::new(&state), None)
            .unwrap();
        assert_eq!(step, Step::Noop);
    }

    #[test]
    fn test_api_call_body_interpolated() {
        let action: Action = serde_json::from_value(json!({
            "type": "api_call",
            "endpoint": "/api/pos/link",
            "method": "POST",
            "body": {"otp": "{{otp}}", "attempt": 1}
        }))
        .unwrap();
        let state = json!({"otp": "555"});
        let Step::Request(request) = ActionDispatcher::new(&[])
            .plan(&action, &Scope::new(&state), None)
            .unwrap()
        else {
            panic!("expected request");
        };
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body, Some(json!({"otp": "555", "attempt": 1})));
    }

    #[test]
    fn test_unknown_action_is_noop() {
        let state = json!({});
        assert_eq!(
            ActionDispatcher::new(&[])
                .plan(&Action::Unknown, &Scope::new(&state), None)
                .unwrap(),
            Step::Noop
        );
    }
}
