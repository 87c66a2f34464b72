//! Recording navigator for tests.

use std::sync::{Arc, Mutex};

use crate::models::NavigationRequest;
use crate::traits::Navigator;

/// Navigator that keeps every request it receives.
///
/// Clones share the same log, so a test can hand one clone to the session
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    requests: Arc<Mutex<Vec<NavigationRequest>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Screens requested so far, in order.
    pub fn screens(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.screen).collect()
    }

    /// The most recent request, if any.
    pub fn last(&self) -> Option<NavigationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, request: NavigationRequest) {
        self.requests.lock().unwrap().push(request);
    }
}
