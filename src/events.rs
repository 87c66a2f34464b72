//! Messages delivered to a screen session.
//!
//! Background work (definition fetches, `api_call` requests, hook timers)
//! never touches session state. Each task reports back with a
//! [`SessionEvent`] on the session's channel and the session applies it on
//! its own task.

use serde_json::Value;

use crate::error::{NetworkError, SduiError};
use crate::models::{ApiCall, ScreenDefinition};

/// Everything a session reacts to besides direct calls.
#[derive(Debug)]
pub enum SessionEvent {
    /// A definition fetch finished.
    DefinitionLoaded {
        /// Identifies the activation that started the fetch
        request_id: u64,
        screen_id: String,
        definition: Box<ScreenDefinition>,
    },
    /// A definition fetch failed.
    DefinitionFailed {
        request_id: u64,
        screen_id: String,
        error: SduiError,
    },
    /// An `api_call` request finished.
    ActionCompleted {
        /// Session epoch when the request was sent; bumped on transitions
        epoch: u64,
        call: Box<ApiCall>,
        result: Result<Value, NetworkError>,
    },
    /// A hook task fired.
    Hook(HookEvent),
}

/// What a hook task observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEventKind {
    /// A timer period elapsed
    Tick,
    /// A delay ran out
    DelayComplete,
}

/// A firing of the hook at `index` in the definition's hook list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookEvent {
    /// Scheduler generation the task belongs to
    pub generation: u64,
    pub index: usize,
    /// Identifies the task run, so a restarted timer ignores its
    /// predecessor's queued ticks
    pub ticket: u64,
    pub kind: HookEventKind,
}

impl From<HookEvent> for SessionEvent {
    fn from(event: HookEvent) -> Self {
        SessionEvent::Hook(event)
    }
}
