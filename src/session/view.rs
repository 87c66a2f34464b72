//! What a session shows right now.

use crate::engine::{RenderNode, RenderedButton};

/// The renderable state of a session. Every variant can be drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    /// The definition for `screen_id` is being fetched.
    Loading { screen_id: String },
    /// The definition could not be loaded or executed.
    Failed { screen_id: String, message: String },
    /// The rendered layout. `root` is `None` when the layout's root is
    /// hidden by its condition.
    Ready {
        screen_id: String,
        root: Option<RenderNode>,
    },
}

impl SessionView {
    pub fn screen_id(&self) -> &str {
        match self {
            SessionView::Loading { screen_id }
            | SessionView::Failed { screen_id, .. }
            | SessionView::Ready { screen_id, .. } => screen_id,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionView::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionView::Ready { .. })
    }

    /// Error message of a failed view.
    pub fn error(&self) -> Option<&str> {
        match self {
            SessionView::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn root(&self) -> Option<&RenderNode> {
        match self {
            SessionView::Ready { root, .. } => root.as_ref(),
            _ => None,
        }
    }

    /// Rendered text in document order; empty unless ready.
    pub fn texts(&self) -> Vec<&str> {
        self.root().map(RenderNode::texts).unwrap_or_default()
    }

    pub fn buttons(&self) -> Vec<&RenderedButton> {
        self.root().map(RenderNode::buttons).unwrap_or_default()
    }
}
