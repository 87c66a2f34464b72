//! Result type alias for SDUI operations.

use super::context::ErrorContext;
use super::sdui_error::SduiError;

/// Type alias for Results using SduiError.
pub type SduiResult<T> = Result<T, SduiError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use sdui::error::{ErrorContext, ResultExt};
    ///
    /// let definition = client
    ///     .fetch_screen("OtpScreen", &context)
    ///     .await
    ///     .context(ErrorContext::new("load_definition").with_screen_id("OtpScreen"))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> SduiResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> SduiResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<SduiError>,
{
    fn context(self, ctx: ErrorContext) -> SduiResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> SduiResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn test_context_on_network_error() {
        let result: Result<(), NetworkError> = Err(NetworkError::Cancelled);
        let err = result
            .context(ErrorContext::new("api_call").with_action_id("fetchOtp"))
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.action_id.as_deref()),
            Some("fetchOtp")
        );
    }

    #[test]
    fn test_with_context_lazy() {
        let ok: Result<u8, std::io::Error> = Ok(1);
        let value = ok
            .with_context(|| panic!("closure must not run on Ok"))
            .unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_json_error_conversion() {
        let result: Result<serde_json::Value, serde_json::Error> = serde_json::from_str("{");
        let err = result.context(ErrorContext::new("parse")).unwrap_err();
        assert!(matches!(err.inner(), SduiError::Json(_)));
    }
}
