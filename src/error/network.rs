//! Network-related error types.
//!
//! Every failure the BFF client can see is folded into [`NetworkError`],
//! whether it came from the transport or from a non-2xx status.

use thiserror::Error;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed.
    #[error("Connection failed to '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    #[error("Request to '{url}' timed out: {message}")]
    Timeout { url: String, message: String },

    /// HTTP status error (non-2xx response). `message` is the server's
    /// message when the body carried one.
    #[error("HTTP {status} error: {message}")]
    HttpStatus { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// URL could not be built or parsed.
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// Generic network error.
    #[error("Network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    /// Get a user-friendly error message.
    ///
    /// Server-provided messages win for HTTP status errors, since the BFF
    /// writes them for end users.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            NetworkError::Timeout { .. } => {
                "The server took too long to answer. Please try again.".to_string()
            }
            NetworkError::HttpStatus { message, .. } if !message.is_empty() => message.clone(),
            NetworkError::HttpStatus { status, .. } => match *status {
                404 => "The requested screen was not found.".to_string(),
                500..=599 => "The server is experiencing issues. Please try again later.".to_string(),
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server.".to_string()
            }
            NetworkError::InvalidUrl { .. } => "The server address is invalid.".to_string(),
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::InvalidUrl { .. } => "E_NET_URL",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }

    /// True for 5xx statuses; transport failures are not server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, NetworkError::HttpStatus { status, .. } if *status >= 500)
    }

    /// Convert an adapter-level [`HttpError`] for the given URL.
    pub fn from_http(err: HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: url.to_string(),
                message,
            },
            HttpError::Timeout(message) => NetworkError::Timeout {
                url: url.to_string(),
                message,
            },
            HttpError::ServerError { status, message } => {
                NetworkError::HttpStatus { status, message }
            }
            HttpError::Cancelled => NetworkError::Cancelled,
            HttpError::InvalidUrl(url) => NetworkError::InvalidUrl { url },
            HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_prefers_server_message() {
        let err = NetworkError::HttpStatus {
            status: 400,
            message: "OTP inválido".to_string(),
        };
        assert_eq!(err.user_message(), "OTP inválido");
    }

    #[test]
    fn test_http_status_without_message() {
        let err = NetworkError::HttpStatus {
            status: 404,
            message: String::new(),
        };
        assert!(err.user_message().contains("not found"));

        let err = NetworkError::HttpStatus {
            status: 503,
            message: String::new(),
        };
        assert!(err.user_message().contains("server"));
        assert!(err.is_server_error());
    }

    #[test]
    fn test_from_http_error() {
        let err = NetworkError::from_http(
            HttpError::ConnectionFailed("refused".to_string()),
            "http://localhost:3000/api/pos/otp",
        );
        assert_eq!(err.error_code(), "E_NET_CONN");
        assert!(err.to_string().contains("localhost:3000"));

        let err = NetworkError::from_http(
            HttpError::ServerError {
                status: 500,
                message: "boom".to_string(),
            },
            "http://x",
        );
        assert_eq!(
            err,
            NetworkError::HttpStatus {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_display() {
        let err = NetworkError::HttpStatus {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502 error: Bad Gateway");
        assert_eq!(NetworkError::Cancelled.to_string(), "Request cancelled");
    }
}
