//! Lifecycle hooks declared by a definition.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::condition::Condition;

fn default_period_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerHook {
    #[serde(default)]
    pub condition: Condition,
    /// Tick period in milliseconds.
    #[serde(default = "default_period_ms")]
    pub interval: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_tick: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_expire: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayHook {
    /// Milliseconds before `onComplete` fires.
    #[serde(default = "default_period_ms")]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_complete: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NfcDetectionHook {
    #[serde(default)]
    pub enabled: bool,
}

/// A hook, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Hook {
    Timer(TimerHook),
    Delay(DelayHook),
    /// Handled by the host's NFC collaborator, not the engine.
    NfcDetection(NfcDetectionHook),
    #[serde(other)]
    Unknown,
}

impl Hook {
    pub fn kind(&self) -> &'static str {
        match self {
            Hook::Timer(_) => "timer",
            Hook::Delay(_) => "delay",
            Hook::NfcDetection(_) => "nfc_detection",
            Hook::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timer_defaults() {
        let hook: Hook = serde_json::from_value(json!({
            "type": "timer",
            "condition": {"field": "timeLeft", "operator": "greaterThan", "value": 0},
            "onTick": {"type": "update_state", "state": {"timeLeft": "timeLeft - 1"}}
        }))
        .unwrap();
        let Hook::Timer(timer) = hook else {
            panic!("expected timer");
        };
        assert_eq!(timer.interval, 1000);
        assert!(timer.on_tick.is_some());
        assert!(timer.on_expire.is_none());
    }

    #[test]
    fn test_delay_and_nfc() {
        let hook: Hook =
            serde_json::from_value(json!({"type": "delay", "duration": 2500})).unwrap();
        assert_eq!(
            hook,
            Hook::Delay(DelayHook {
                duration: 2500,
                on_complete: None
            })
        );

        let hook: Hook =
            serde_json::from_value(json!({"type": "nfc_detection", "enabled": true})).unwrap();
        assert_eq!(hook.kind(), "nfc_detection");
    }

    #[test]
    fn test_unknown_hook() {
        let hook: Hook = serde_json::from_value(json!({"type": "geofence"})).unwrap();
        assert_eq!(hook, Hook::Unknown);
    }
}
