//! Application configuration.
//!
//! [`AppConfig`] is assembled from defaults, then the environment, then
//! command-line flags, each layer overriding the previous one.

use std::path::PathBuf;
use std::time::Duration;

use crate::bff::DEFAULT_BASE_URL;
use crate::error::{SduiError, SduiResult};

/// Screen opened when nothing else is requested.
pub const DEFAULT_INITIAL_SCREEN: &str = "Initializing";

/// State fields cleared when the session moves to a different screen.
pub const DEFAULT_RESET_FIELDS: [&str; 2] = ["otp", "timeLeft"];

pub const ENV_BFF_URL: &str = "SDUI_BFF_URL";
pub const ENV_INITIAL_SCREEN: &str = "SDUI_INITIAL_SCREEN";
pub const ENV_ADMIN_API_KEY: &str = "SDUI_ADMIN_API_KEY";
pub const ENV_TEXTS_PATH: &str = "SDUI_TEXTS_PATH";

/// Configuration for a session and its host.
///
/// # Example
///
/// ```ignore
/// use sdui::config::AppConfig;
///
/// let config = AppConfig::default()
///     .with_base_url("http://10.0.2.2:3000")
///     .with_initial_screen("OtpScreen");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// BFF base URL (default: http://localhost:3000)
    pub base_url: String,
    /// First screen to activate
    pub initial_screen: String,
    /// Admin API key for the remote text catalog
    pub api_key: Option<String>,
    /// Local text catalog file
    pub texts_path: Option<PathBuf>,
    /// Fields removed from state on screen transitions
    pub reset_fields: Vec<String>,
    /// Per-request timeout for the reqwest client
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            initial_screen: DEFAULT_INITIAL_SCREEN.to_string(),
            api_key: None,
            texts_path: None,
            reset_fields: DEFAULT_RESET_FIELDS.iter().map(|f| f.to_string()).collect(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_initial_screen(mut self, screen: impl Into<String>) -> Self {
        self.initial_screen = screen.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_texts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.texts_path = Some(path.into());
        self
    }

    /// Replace the list of screen-scoped state fields.
    pub fn with_reset_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reset_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Defaults overridden by `SDUI_*` environment variables. Empty values
    /// are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env_value(ENV_BFF_URL) {
            config.base_url = url;
        }
        if let Some(screen) = env_value(ENV_INITIAL_SCREEN) {
            config.initial_screen = screen;
        }
        if let Some(key) = env_value(ENV_ADMIN_API_KEY) {
            config.api_key = Some(key);
        }
        if let Some(path) = env_value(ENV_TEXTS_PATH) {
            config.texts_path = Some(PathBuf::from(path));
        }
        config
    }

    /// Reject configurations the host cannot start with.
    pub fn validate(&self) -> SduiResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SduiError::Config {
                message: format!("BFF URL must start with http:// or https://: {}", self.base_url),
            });
        }
        if self.initial_screen.trim().is_empty() {
            return Err(SduiError::Config {
                message: "initial screen must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
