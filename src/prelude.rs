//! Prelude module for convenient imports.
//!
//! ```ignore
//! use sdui::prelude::*;
//! ```

// Session and its view
pub use crate::session::{ScreenSession, SessionView};

// Definition model
pub use crate::models::{
    Action, ApiCall, Component, ComponentKind, Condition, Hook, NavigationRequest, Operator,
    Predicate, ScreenDefinition, TextCatalog,
};

// Engine
pub use crate::engine::{render, ActionDispatcher, RenderNode, RenderedButton, Scope, Step};

// Clients and collaborators
pub use crate::bff::BffClient;
pub use crate::config::AppConfig;
pub use crate::state::StateBag;
pub use crate::traits::{HttpClient, HttpMethod, Navigator};

// Errors
pub use crate::error::{ErrorCategory, SduiError, SduiResult};
