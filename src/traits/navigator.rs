//! Navigation collaborator abstraction.
//!
//! The engine never owns a navigation stack. When an action asks for a
//! screen transition, the session hands a [`NavigationRequest`] to whatever
//! navigator the host wired in.

use crate::models::NavigationRequest;

/// Receives screen transition requests produced by actions and buttons.
pub trait Navigator: Send {
    /// Request a transition. Params are already interpolated.
    fn navigate(&mut self, request: NavigationRequest);
}
