//! Error context for enriched error information.
//!
//! Context records which screen and which action were involved when
//! something failed, so log lines and error screens can point at the
//! offending part of a definition.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// Screen identifier active when the error occurred.
    pub screen_id: Option<String>,

    /// Action id involved, if the failure came from an action.
    pub action_id: Option<String>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            screen_id: None,
            action_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the screen identifier for this context.
    pub fn with_screen_id(mut self, screen_id: impl Into<String>) -> Self {
        self.screen_id = Some(screen_id.into());
        self
    }

    /// Set the action id for this context.
    pub fn with_action_id(mut self, action_id: impl Into<String>) -> Self {
        self.action_id = Some(action_id.into());
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref screen_id) = self.screen_id {
            parts.push(format!("screen_id={}", screen_id));
        }

        if let Some(ref action_id) = self.action_id {
            parts.push(format!("action_id={}", action_id));
        }

        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref screen_id) = self.screen_id {
            write!(f, " screen={}", screen_id)?;
        }

        if let Some(ref action_id) = self.action_id {
            write!(f, " action={}", action_id)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder_pattern() {
        let ctx = ErrorContext::new("load_definition")
            .with_screen_id("OtpScreen")
            .with_action_id("fetchOtp");

        assert_eq!(ctx.operation, "load_definition");
        assert_eq!(ctx.screen_id.as_deref(), Some("OtpScreen"));
        assert_eq!(ctx.action_id.as_deref(), Some("fetchOtp"));
    }

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("dispatch").with_screen_id("LinkingStep1");
        let display = format!("{}", ctx);
        assert!(display.contains("dispatch"));
        assert!(display.contains("screen=LinkingStep1"));
        assert!(!display.contains("action="));
    }

    #[test]
    fn test_context_to_log_string() {
        let ctx = ErrorContext::new("api_call").with_action_id("link");
        let log_str = ctx.to_log_string();
        assert!(log_str.contains("operation=api_call"));
        assert!(log_str.contains("action_id=link"));
        assert!(log_str.contains("timestamp="));
    }

    #[test]
    fn test_context_default() {
        let ctx = ErrorContext::default();
        assert_eq!(ctx.operation, "unknown");
        assert!(ctx.screen_id.is_none());
    }
}
