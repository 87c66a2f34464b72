//! Unified error type for the SDUI engine.

use thiserror::Error;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;

/// Problems with a screen definition as delivered by the server.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    /// The body was not a valid definition document.
    #[error("Invalid definition for '{screen_id}': {message}")]
    Parse { screen_id: String, message: String },

    /// The document parsed but is structurally unusable.
    #[error("Definition '{screen_id}' failed validation: {}", .problems.join("; "))]
    Invalid {
        screen_id: String,
        problems: Vec<String>,
    },
}

/// Unified error type for the SDUI engine.
#[derive(Debug, Error)]
pub enum SduiError {
    /// Network-related errors (connections, HTTP status, timeouts).
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Malformed screen definition.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// `trigger_action` chain revisits an action or exceeds the depth bound.
    #[error("Action cycle detected at '{action_id}' (chain: {})", .chain.join(" -> "))]
    ActionCycle {
        action_id: String,
        chain: Vec<String>,
    },

    /// The component tree could not be rendered.
    #[error("Render error: {message}")]
    Render { message: String },

    /// Configuration problems (bad URL, unreadable catalog).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Filesystem or terminal I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization outside of definition parsing.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapped error with additional context.
    #[error("{error} ({context})")]
    WithContext {
        error: Box<SduiError>,
        context: ErrorContext,
    },
}

impl SduiError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SduiError::Network(err) if err.is_server_error() => ErrorCategory::Server,
            SduiError::Network(_) => ErrorCategory::Network,
            SduiError::Definition(_) | SduiError::ActionCycle { .. } | SduiError::Render { .. } => {
                ErrorCategory::Definition
            }
            SduiError::Config { .. } => ErrorCategory::Configuration,
            SduiError::Io(_) => ErrorCategory::System,
            SduiError::Json(_) => ErrorCategory::Client,
            SduiError::WithContext { error, .. } => error.category(),
        }
    }

    /// Get a user-facing message for error screens.
    pub fn user_message(&self) -> String {
        match self {
            SduiError::Network(err) => err.user_message(),
            SduiError::WithContext { error, .. } => error.user_message(),
            other => other.to_string(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        SduiError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SduiError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &SduiError {
        match self {
            SduiError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}
