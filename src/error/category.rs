//! Error category classification for unified error handling.
//!
//! Categories drive how the session surfaces a failure: whether it is worth
//! re-navigating, whether the server sent something malformed, or whether
//! the local setup is wrong.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (connection, timeout, transport).
    /// Generally transient; the user may re-navigate to try again.
    Network,

    /// Backend/server-side errors (HTTP 5xx, unexpected status).
    Server,

    /// The server sent a definition the engine cannot honor
    /// (parse failure, action cycle, unbounded nesting).
    Definition,

    /// Client-side bugs or invalid local state.
    Client,

    /// System/OS errors (filesystem, terminal).
    System,

    /// Configuration errors (bad URL, unreadable text catalog).
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    ///
    /// The engine itself never retries; this only informs what the error
    /// screen tells the user.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Definition => "definition",
            ErrorCategory::Client => "client",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check the connection to the BFF and open the screen again",
            ErrorCategory::Server => "The BFF may be having issues. Open the screen again later",
            ErrorCategory::Definition => "The screen definition is invalid. Fix it on the server",
            ErrorCategory::Client => "This may be a bug. Please report it if it persists",
            ErrorCategory::System => "Check file permissions and terminal state",
            ErrorCategory::Configuration => "Check the BFF URL and text catalog settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_transient() {
        assert!(ErrorCategory::Network.is_transient());
        assert!(ErrorCategory::Server.is_transient());
        assert!(!ErrorCategory::Definition.is_transient());
        assert!(!ErrorCategory::Client.is_transient());
        assert!(!ErrorCategory::System.is_transient());
        assert!(!ErrorCategory::Configuration.is_transient());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", ErrorCategory::Network), "network");
        assert_eq!(format!("{}", ErrorCategory::Definition), "definition");
    }

    #[test]
    fn test_category_recovery_hint() {
        assert!(ErrorCategory::Network.recovery_hint().contains("BFF"));
        assert!(ErrorCategory::Definition.recovery_hint().contains("definition"));
    }
}
