//! Lifecycle hook scheduling.
//!
//! Timer and delay tasks run on tokio and only ever send a [`HookEvent`] to
//! the session channel. Conditions are checked when the session handles the
//! event, against the state as it is then, never inside the task.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::condition;
use crate::events::{HookEvent, HookEventKind, SessionEvent};
use crate::models::{Action, Condition, Hook, TimerHook};

struct Task {
    ticket: u64,
    handle: JoinHandle<()>,
}

/// Runs the hooks of the current definition.
pub struct HookScheduler {
    tx: UnboundedSender<SessionEvent>,
    generation: u64,
    next_ticket: u64,
    timers: HashMap<usize, Task>,
    delays: HashMap<usize, Task>,
}

impl HookScheduler {
    pub fn new(tx: UnboundedSender<SessionEvent>) -> Self {
        Self {
            tx,
            generation: 0,
            next_ticket: 0,
            timers: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of timers currently running.
    pub fn running_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_timer_running(&self, index: usize) -> bool {
        self.timers.contains_key(&index)
    }

    /// Replace everything with the hooks of a freshly loaded definition.
    ///
    /// Timers start only when their condition holds against `root`.
    pub fn install(&mut self, hooks: &[Hook], root: &Value) {
        self.teardown();
        for (index, hook) in hooks.iter().enumerate() {
            match hook {
                Hook::Timer(timer) => {
                    if condition::evaluate(&timer.condition, root) {
                        self.start_timer(index, timer);
                    } else {
                        debug!("Timer hook {} not started: condition false", index);
                    }
                }
                Hook::Delay(delay) => self.start_delay(index, delay.duration),
                Hook::NfcDetection(nfc) => {
                    debug!("nfc_detection hook (enabled: {}) left to the host", nfc.enabled);
                }
                Hook::Unknown => warn!("Ignoring hook {} of unknown type", index),
            }
        }
    }

    /// Resolve a hook firing into the action to run, if any.
    ///
    /// Events from an older generation or a cancelled run are dropped.
    pub fn on_event(&mut self, event: HookEvent, hooks: &[Hook], root: &Value) -> Option<Action> {
        if event.generation != self.generation {
            debug!(
                "Dropping hook event from generation {} (now {})",
                event.generation, self.generation
            );
            return None;
        }

        match event.kind {
            HookEventKind::Tick => {
                if self.timers.get(&event.index).map(|t| t.ticket) != Some(event.ticket) {
                    return None;
                }
                let Some(Hook::Timer(timer)) = hooks.get(event.index) else {
                    return None;
                };
                if condition::evaluate(&timer.condition, root) {
                    return timer.on_tick.clone();
                }
                if expired(&timer.condition, root) {
                    info!("Timer hook {} expired", event.index);
                    self.cancel_timer(event.index);
                    return timer.on_expire.clone();
                }
                None
            }
            HookEventKind::DelayComplete => {
                if self.delays.get(&event.index).map(|t| t.ticket) != Some(event.ticket) {
                    return None;
                }
                self.delays.remove(&event.index);
                match hooks.get(event.index) {
                    Some(Hook::Delay(delay)) => delay.on_complete.clone(),
                    _ => None,
                }
            }
        }
    }

    /// Restart stopped timers whose condition became true again.
    pub fn refresh(&mut self, hooks: &[Hook], root: &Value) {
        for (index, hook) in hooks.iter().enumerate() {
            if let Hook::Timer(timer) = hook {
                if !self.timers.contains_key(&index) && condition::evaluate(&timer.condition, root)
                {
                    debug!("Renewing timer hook {}", index);
                    self.start_timer(index, timer);
                }
            }
        }
    }

    /// Abort every task. Events already queued become stale.
    pub fn teardown(&mut self) {
        for (_, task) in self.timers.drain().chain(self.delays.drain()) {
            task.handle.abort();
        }
        self.generation += 1;
    }

    fn cancel_timer(&mut self, index: usize) {
        if let Some(task) = self.timers.remove(&index) {
            task.handle.abort();
        }
    }

    fn take_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn start_timer(&mut self, index: usize, timer: &TimerHook) {
        let period = Duration::from_millis(timer.interval.max(1));
        let event = HookEvent {
            generation: self.generation,
            index,
            ticket: self.take_ticket(),
            kind: HookEventKind::Tick,
        };
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(event.into()).is_err() {
                    break;
                }
            }
        });
        self.timers.insert(
            index,
            Task {
                ticket: event.ticket,
                handle,
            },
        );
    }

    fn start_delay(&mut self, index: usize, duration_ms: u64) {
        let event = HookEvent {
            generation: self.generation,
            index,
            ticket: self.take_ticket(),
            kind: HookEventKind::DelayComplete,
        };
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            time::sleep(Duration::from_millis(duration_ms)).await;
            let _ = tx.send(event.into());
        });
        self.delays.insert(
            index,
            Task {
                ticket: event.ticket,
                handle,
            },
        );
    }
}

impl Drop for HookScheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// A false timer condition only means expiry once it can never turn true
/// by itself; a field that has not loaded yet keeps the timer alive.
fn expired(condition: &Condition, root: &Value) -> bool {
    match condition {
        Condition::Predicate(predicate) => condition::terminal_reached(predicate, root),
        Condition::Bool(value) => !value,
        Condition::Other(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn countdown() -> Vec<Hook> {
        serde_json::from_value(json!([{
            "type": "timer",
            "condition": {"field": "timeLeft", "operator": "greaterThan", "value": 0},
            "interval": 1000,
            "onTick": {"type": "update_state", "state": {"timeLeft": "timeLeft - 1"}},
            "onExpire": {"type": "navigate", "screen": "Expired"}
        }]))
        .unwrap()
    }

    fn hook_event(event: SessionEvent) -> HookEvent {
        match event {
            SessionEvent::Hook(event) => event,
            other => panic!("expected hook event, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_ticks_after_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        let hooks = countdown();
        scheduler.install(&hooks, &json!({"timeLeft": 3}));
        assert_eq!(scheduler.running_timers(), 1);

        let started = Instant::now();
        let event = hook_event(rx.recv().await.unwrap());
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(event.kind, HookEventKind::Tick);

        let action = scheduler.on_event(event, &hooks, &json!({"timeLeft": 3}));
        assert!(matches!(action, Some(Action::UpdateState(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_not_started_when_false() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        scheduler.install(&countdown(), &json!({"timeLeft": 0}));
        assert_eq!(scheduler.running_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        let hooks = countdown();
        scheduler.install(&hooks, &json!({"timeLeft": 1}));

        let first = hook_event(rx.recv().await.unwrap());
        let second = hook_event(rx.recv().await.unwrap());

        let expired = json!({"timeLeft": 0});
        let action = scheduler.on_event(first, &hooks, &expired);
        assert_eq!(action, Some(Action::navigate("Expired")));
        assert!(!scheduler.is_timer_running(0));

        // A tick queued before the cancel is ignored.
        assert_eq!(scheduler.on_event(second, &hooks, &expired), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undefined_field_is_not_expiry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        let hooks = countdown();
        scheduler.install(&hooks, &json!({"timeLeft": 2}));

        let event = hook_event(rx.recv().await.unwrap());
        assert_eq!(scheduler.on_event(event, &hooks, &json!({})), None);
        assert!(scheduler.is_timer_running(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_renews_timer() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        let hooks = countdown();
        scheduler.install(&hooks, &json!({}));
        assert_eq!(scheduler.running_timers(), 0);

        scheduler.refresh(&hooks, &json!({"timeLeft": 20}));
        assert!(scheduler.is_timer_running(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_completes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        let hooks: Vec<Hook> = serde_json::from_value(json!([{
            "type": "delay",
            "duration": 3000,
            "onComplete": {"type": "navigate", "screen": "Done"}
        }]))
        .unwrap();
        scheduler.install(&hooks, &json!({}));

        let started = Instant::now();
        let event = hook_event(rx.recv().await.unwrap());
        assert!(started.elapsed() >= Duration::from_millis(3000));
        assert_eq!(
            scheduler.on_event(event, &hooks, &json!({})),
            Some(Action::navigate("Done"))
        );
        assert_eq!(scheduler.on_event(event, &hooks, &json!({})), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_drops_stale_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        let hooks = countdown();
        scheduler.install(&hooks, &json!({"timeLeft": 5}));
        let event = hook_event(rx.recv().await.unwrap());

        scheduler.teardown();
        assert_eq!(scheduler.running_timers(), 0);
        assert_eq!(scheduler.on_event(event, &hooks, &json!({"timeLeft": 5})), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_and_nfc_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = HookScheduler::new(tx);
        let hooks: Vec<Hook> =
            serde_json::from_value(json!([{"type": "nfc_detection", "enabled": true}, {"type": "gps"}]))
                .unwrap();
        scheduler.install(&hooks, &json!({}));
        assert_eq!(scheduler.running_timers(), 0);
    }
}
