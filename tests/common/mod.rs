//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::sync::Arc;

use sdui::adapters::{MockHttpClient, MockResponse, RecordingNavigator};
use sdui::bff::BffClient;
use sdui::config::AppConfig;
use sdui::models::TextCatalog;
use sdui::session::ScreenSession;

pub const BFF: &str = "http://bff";

pub fn url(endpoint: &str) -> String {
    format!("{}{}", BFF, endpoint)
}

/// Session against `mock` with a recording navigator and empty texts.
pub fn session_with(mock: &MockHttpClient) -> (ScreenSession, RecordingNavigator) {
    session_with_texts(mock, TextCatalog::new())
}

pub fn session_with_texts(
    mock: &MockHttpClient,
    texts: TextCatalog,
) -> (ScreenSession, RecordingNavigator) {
    let navigator = RecordingNavigator::new();
    let client = BffClient::with_http_client(BFF, Arc::new(mock.clone()));
    let session = ScreenSession::new(client, navigator.clone(), texts, &AppConfig::default());
    (session, navigator)
}

/// Answer `GET /api/screens/{id}` (any context) with `definition`.
pub fn serve_screen(mock: &MockHttpClient, definition: Value) {
    let id = definition["id"].as_str().unwrap_or_default().to_string();
    mock.set_response(
        &url(&format!("/api/screens/{}", id)),
        MockResponse::json(definition),
    );
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

pub fn text_screen(id: &str, text: &str) -> Value {
    json!({"id": id, "layout": {"type": "text", "props": {"text": text}}})
}

/// OTP screen: fetches a code on load and counts `timeLeft` down to the
/// `Expired` screen.
pub fn otp_screen() -> Value {
    json!({
        "id": "OtpScreen",
        "layout": {
            "type": "container",
            "children": [
                {"type": "text", "id": "code", "props": {"text": "Código: {{otp}}"}},
                {
                    "type": "text",
                    "id": "timer",
                    "condition": {"field": "timeLeft", "operator": "greaterThan", "value": 0},
                    "props": {"text": "Expira en {{timeLeft}} segundos"}
                },
                {"type": "loader", "condition": {"field": "otp", "operator": "notExists"}}
            ]
        },
        "actions": [{
            "type": "api_call",
            "id": "fetchOtp",
            "endpoint": "/api/pos/otp",
            "onSuccess": {
                "type": "update_state",
                "state": {"otp": "response.otp", "timeLeft": "response.expiresIn"}
            }
        }],
        "hooks": [{
            "type": "timer",
            "condition": {"field": "timeLeft", "operator": "greaterThan", "value": 0},
            "interval": 1000,
            "onTick": {"type": "update_state", "state": {"timeLeft": "timeLeft - 1"}},
            "onExpire": {"type": "navigate", "screen": "Expired"}
        }]
    })
}

pub fn otp_response(otp: &str, expires_in: u64) -> MockResponse {
    MockResponse::json(json!({"otp": otp, "expiresIn": expires_in}))
}

/// First linking step: shows the card holder, links on press and moves on.
pub fn linking_step1() -> Value {
    json!({
        "id": "LinkingStep1",
        "layout": {
            "type": "container",
            "children": [
                {"type": "text", "props": {"text": "Titular: {{cardData.holderName}}"}},
                {
                    "type": "button",
                    "id": "continue",
                    "props": {
                        "title": "Continuar",
                        "onPress": {"type": "navigate", "screen": "LinkingStep2"}
                    }
                },
                {
                    "type": "button",
                    "id": "link",
                    "props": {
                        "title": "Vincular",
                        "onPress": {"type": "trigger_action", "actionId": "linkCard"}
                    }
                }
            ]
        },
        "actions": [{
            "type": "api_call",
            "id": "linkCard",
            "trigger": "press",
            "endpoint": "/api/pos/link",
            "method": "POST",
            "body": {"holder": "{{cardData.holderName}}"},
            "onSuccess": {"type": "navigate", "screen": "LinkingDone"},
            "onError": {"type": "navigate", "screen": "Error"}
        }]
    })
}
