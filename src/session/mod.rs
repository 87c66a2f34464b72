//! Screen session controller.
//!
//! A [`ScreenSession`] owns everything that belongs to the screen on
//! display: the definition, the state bag, the auto-run memo and the hook
//! scheduler. All mutation happens in its methods. Background tasks
//! (definition fetches, `api_call` requests, hook timers) only report back
//! through the session's [`SessionEvent`] channel, and the owner feeds those
//! events to [`ScreenSession::handle`].

mod view;

pub use view::SessionView;

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::bff::BffClient;
use crate::config::AppConfig;
use crate::engine::path::is_truthy;
use crate::engine::{
    render, ActionDispatcher, ApiRequest, EffectSink, HookScheduler, Scope, Step,
};
use crate::error::{ErrorContext, NetworkError, ResultExt, SduiError, SduiResult};
use crate::events::SessionEvent;
use crate::models::{Action, NavigationRequest, ScreenDefinition, TextCatalog};
use crate::state::StateBag;
use crate::traits::Navigator;

/// Route params copied over same-named state fields when truthy.
const PARAM_OVERRIDES: [&str; 3] = ["message", "cardData", "otp"];

/// Key of the route params object in the merged view.
pub const ROUTE_PARAMS_KEY: &str = "routeParams";

/// Drives one screen at a time against the BFF.
pub struct ScreenSession {
    client: BffClient,
    navigator: Box<dyn Navigator>,
    texts: TextCatalog,
    reset_fields: Vec<String>,

    tx: UnboundedSender<SessionEvent>,
    rx: UnboundedReceiver<SessionEvent>,

    screen_id: Option<String>,
    params: Option<Value>,
    definition: Option<Arc<ScreenDefinition>>,
    failure: Option<String>,
    state: StateBag,
    scheduler: HookScheduler,
    /// Execution keys of definitions whose auto-run actions already fired
    executed: HashSet<String>,

    next_request_id: u64,
    pending_fetch: Option<u64>,
    fetch_task: Option<JoinHandle<()>>,
    /// Bumped on every transition; completions of older epochs are dropped
    epoch: u64,
    calls_in_flight: usize,
}

impl ScreenSession {
    pub fn new(
        client: BffClient,
        navigator: impl Navigator + 'static,
        texts: TextCatalog,
        config: &AppConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            navigator: Box::new(navigator),
            texts,
            reset_fields: config.reset_fields.clone(),
            scheduler: HookScheduler::new(tx.clone()),
            tx,
            rx,
            screen_id: None,
            params: None,
            definition: None,
            failure: None,
            state: StateBag::new(),
            executed: HashSet::new(),
            next_request_id: 0,
            pending_fetch: None,
            fetch_task: None,
            epoch: 0,
            calls_in_flight: 0,
        }
    }

    pub fn screen_id(&self) -> Option<&str> {
        self.screen_id.as_deref()
    }

    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    pub fn state(&self) -> &StateBag {
        &self.state
    }

    pub fn definition(&self) -> Option<&ScreenDefinition> {
        self.definition.as_deref()
    }

    pub fn texts(&self) -> &TextCatalog {
        &self.texts
    }

    pub fn texts_mut(&mut self) -> &mut TextCatalog {
        &mut self.texts
    }

    /// Whether a definition fetch or an `api_call` is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending_fetch.is_some() || self.calls_in_flight > 0
    }

    /// Merge host-provided values into the state bag.
    pub fn merge_state(&mut self, delta: Map<String, Value>) {
        self.apply_merge(delta);
    }

    /// Show `screen_id`.
    ///
    /// Re-activating the screen on display only replaces its params. Moving
    /// to another screen drops the definition, stops its hooks, forgets the
    /// auto-run memo and clears the screen-scoped state fields.
    pub fn activate(&mut self, screen_id: impl Into<String>, params: Option<Value>) {
        let screen_id = screen_id.into();

        if self.screen_id.as_deref() == Some(screen_id.as_str()) {
            self.params = params;
            if self.failure.is_none() {
                debug!("Screen {} already active; params updated", screen_id);
                return;
            }
            info!("Reloading failed screen {}", screen_id);
            self.failure = None;
            self.start_fetch();
            return;
        }

        match self.screen_id.take() {
            Some(previous) => {
                info!("Screen transition {} -> {}", previous, screen_id);
                self.definition = None;
                self.scheduler.teardown();
                self.executed.clear();
                let removed = self.state.remove_fields(self.reset_fields.as_slice());
                debug!("Cleared {} screen-scoped state fields", removed);
                self.epoch += 1;
                self.calls_in_flight = 0;
            }
            None => info!("Activating screen {}", screen_id),
        }

        self.screen_id = Some(screen_id);
        self.params = params;
        self.failure = None;
        self.start_fetch();
    }

    fn start_fetch(&mut self) {
        let Some(screen_id) = self.screen_id.clone() else {
            return;
        };
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.pending_fetch = Some(request_id);

        let context = self.state.to_value();
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let result = client
                .fetch_screen(&screen_id, &context)
                .await
                .with_context(|| {
                    ErrorContext::new("load_definition").with_screen_id(screen_id.as_str())
                });
            let event = match result {
                Ok(definition) => SessionEvent::DefinitionLoaded {
                    request_id,
                    screen_id,
                    definition: Box::new(definition),
                },
                Err(error) => SessionEvent::DefinitionFailed {
                    request_id,
                    screen_id,
                    error,
                },
            };
            let _ = tx.send(event);
        }));
    }

    /// Apply one event.
    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::DefinitionLoaded {
                request_id,
                screen_id,
                definition,
            } => {
                if !self.is_current_fetch(request_id, &screen_id) {
                    debug!("Discarding stale definition for {}", screen_id);
                    return;
                }
                self.pending_fetch = None;
                self.fetch_task = None;
                self.install_definition(Arc::new(*definition));
            }
            SessionEvent::DefinitionFailed {
                request_id,
                screen_id,
                error,
            } => {
                if !self.is_current_fetch(request_id, &screen_id) {
                    debug!("Discarding stale load failure for {}", screen_id);
                    return;
                }
                self.pending_fetch = None;
                self.fetch_task = None;
                error!("Failed to load screen {}: {}", screen_id, error);
                self.failure = Some(self.failure_message(&error));
            }
            SessionEvent::ActionCompleted {
                epoch,
                call,
                result,
            } => {
                if epoch != self.epoch {
                    debug!("Discarding response of {} from a previous screen", call.endpoint);
                    return;
                }
                self.calls_in_flight = self.calls_in_flight.saturating_sub(1);
                let definition = self.definition.clone();
                let actions = definition.as_deref().map_or(&[][..], |d| d.actions.as_slice());
                let view = self.merged_view();
                let scope = self.scope(&view);
                let step = ActionDispatcher::new(actions).complete(&call, result, &scope);
                self.apply(step);
            }
            SessionEvent::Hook(event) => {
                let Some(definition) = self.definition.clone() else {
                    return;
                };
                let view = self.merged_view();
                if let Some(action) = self.scheduler.on_event(event, &definition.hooks, &view) {
                    self.dispatch(&action);
                }
            }
        }
    }

    fn is_current_fetch(&self, request_id: u64, screen_id: &str) -> bool {
        self.pending_fetch == Some(request_id) && self.screen_id.as_deref() == Some(screen_id)
    }

    fn install_definition(&mut self, definition: Arc<ScreenDefinition>) {
        info!(
            "Loaded definition {} ({} actions, {} hooks)",
            definition.id,
            definition.actions.len(),
            definition.hooks.len()
        );
        self.definition = Some(Arc::clone(&definition));
        let view = self.merged_view();
        self.scheduler.install(&definition.hooks, &view);

        let key = definition.execution_key();
        if !self.executed.insert(key.clone()) {
            debug!("Auto-run actions of {} already fired", key);
            return;
        }
        for action in definition.actions.iter().filter(|a| a.is_auto_run()) {
            debug!("Auto-running {}", action.id().unwrap_or_default());
            self.dispatch(action);
        }
    }

    /// Run an action against the current state.
    pub fn dispatch(&mut self, action: &Action) {
        let definition = self.definition.clone();
        let actions = definition.as_deref().map_or(&[][..], |d| d.actions.as_slice());
        let view = self.merged_view();
        let scope = self.scope(&view);
        let step = ActionDispatcher::new(actions).plan(action, &scope, None);
        self.apply(step);
    }

    fn apply(&mut self, step: SduiResult<Step>) {
        match step {
            Ok(Step::Merge(delta)) => self.apply_merge(delta),
            Ok(Step::Navigate(request)) => {
                info!("Navigating to {}", request.screen);
                self.navigator.navigate(request);
            }
            Ok(Step::Request(request)) => self.spawn_request(request),
            Ok(Step::Noop) => {}
            Err(err @ SduiError::ActionCycle { .. }) => {
                error!("{}", err);
                self.scheduler.teardown();
                self.failure = Some(err.to_string());
            }
            Err(err) => warn!("Action failed: {}", err),
        }
    }

    fn apply_merge(&mut self, delta: Map<String, Value>) {
        debug!("Merging {} state fields", delta.len());
        self.state.merge(delta);
        if let Some(definition) = self.definition.clone() {
            let view = self.merged_view();
            self.scheduler.refresh(&definition.hooks, &view);
        }
    }

    fn spawn_request(&mut self, request: ApiRequest) {
        self.calls_in_flight += 1;
        let epoch = self.epoch;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.call(&request).await;
            if let Err(err) = &result {
                warn!("{} {} failed: {}", request.method, request.endpoint, err);
            }
            let _ = tx.send(SessionEvent::ActionCompleted {
                epoch,
                call: Box::new(request.call),
                result,
            });
        });
    }

    fn failure_message(&self, error: &SduiError) -> String {
        match error.inner() {
            SduiError::Network(NetworkError::HttpStatus { message, .. }) if !message.is_empty() => {
                message.clone()
            }
            SduiError::Network(err) => self
                .texts
                .error_text("network")
                .map(str::to_string)
                .unwrap_or_else(|| err.user_message()),
            other => other.to_string(),
        }
    }

    fn params_map(&self) -> Map<String, Value> {
        match &self.params {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    /// The state bag as templates see it: route params under `routeParams`
    /// and `message`/`cardData`/`otp` taken from params when truthy.
    pub fn merged_view(&self) -> Value {
        let mut view = self.state.values().clone();
        let params = self.params_map();
        for key in PARAM_OVERRIDES {
            if let Some(value) = params.get(key).filter(|v| is_truthy(v)) {
                view.insert(key.to_string(), value.clone());
            }
        }
        if !params.is_empty() {
            view.insert(ROUTE_PARAMS_KEY.to_string(), Value::Object(params));
        }
        Value::Object(view)
    }

    /// Template scope over `view`, with texts resolved for the active screen.
    fn scope<'a>(&'a self, view: &'a Value) -> Scope<'a> {
        let scope = Scope::new(view).with_texts(&self.texts);
        match self.screen_id.as_deref() {
            Some(screen_id) => scope.with_screen(screen_id),
            None => scope,
        }
    }

    /// Render the current screen.
    pub fn view(&self) -> SessionView {
        let screen_id = self.screen_id.clone().unwrap_or_default();
        if let Some(message) = &self.failure {
            return SessionView::Failed {
                screen_id,
                message: message.clone(),
            };
        }
        let Some(definition) = &self.definition else {
            return SessionView::Loading { screen_id };
        };
        let view = self.merged_view();
        let scope = self.scope(&view);
        match render(&definition.layout, &scope) {
            Ok(root) => SessionView::Ready { screen_id, root },
            Err(err) => {
                warn!("Rendering {} failed: {}", screen_id, err);
                SessionView::Failed {
                    screen_id,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Press the first rendered button whose id or title is `key`.
    ///
    /// Returns false when there is no such button or it ignored the press.
    pub fn press(&mut self, key: &str) -> bool {
        let view = self.view();
        let Some(button) = view.root().and_then(|root| root.find_button(key)).cloned() else {
            debug!("No button '{}' on screen", key);
            return false;
        };
        button.press(self)
    }

    /// Apply events that are already queued, without waiting.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Process events until no fetch or request is outstanding.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            match self.rx.recv().await {
                Some(event) => self.handle(event),
                None => break,
            }
        }
        self.drain();
    }

    /// Process events for `duration` of tokio time.
    pub async fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            tokio::select! {
                biased;
                event = self.rx.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                _ = time::sleep_until(deadline) => break,
            }
        }
    }

    /// Wait for the next event; the caller passes it to [`handle`](Self::handle).
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }
}

impl EffectSink for ScreenSession {
    fn on_action(&mut self, action: Action) {
        self.dispatch(&action);
    }

    fn on_navigate(&mut self, screen: &str, params: Option<Value>) {
        info!("Navigating to {}", screen);
        self.navigator.navigate(NavigationRequest {
            screen: screen.to_string(),
            params,
        });
    }
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }
}
