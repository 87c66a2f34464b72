//! Localized UI copy, looked up by templates as `texts.<key>`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ErrorContext, ResultExt, SduiResult};

/// Key inside `errors` used when a requested error text is missing.
const FALLBACK_ERROR_KEY: &str = "network";

/// Screen-scoped texts plus shared error messages.
///
/// Constructed explicitly and passed to the session; there is no global
/// catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextCatalog {
    #[serde(default)]
    pub screens: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl TextCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> SduiResult<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| {
            ErrorContext::new(format!("read text catalog {}", path.display()))
        })?;
        let catalog: TextCatalog = serde_json::from_str(&raw).with_context(|| {
            ErrorContext::new(format!("parse text catalog {}", path.display()))
        })?;
        debug!(
            "Loaded {} screen text groups from {}",
            catalog.screens.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn with_screen_text(mut self, screen: &str, key: &str, text: &str) -> Self {
        self.screens
            .entry(screen.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
        self
    }

    pub fn with_error_text(mut self, key: &str, text: &str) -> Self {
        self.errors.insert(key.to_string(), text.to_string());
        self
    }

    /// Text for `key` on `screen`, if present.
    pub fn screen_text(&self, screen: &str, key: &str) -> Option<&str> {
        self.screens
            .get(screen)
            .and_then(|texts| texts.get(key))
            .map(String::as_str)
    }

    /// All texts of one screen.
    pub fn screen_texts(&self, screen: &str) -> Option<&BTreeMap<String, String>> {
        self.screens.get(screen)
    }

    /// Error message for `key`, falling back to the generic network message.
    pub fn error_text(&self, key: &str) -> Option<&str> {
        self.errors
            .get(key)
            .or_else(|| self.errors.get(FALLBACK_ERROR_KEY))
            .map(String::as_str)
    }

    /// Resolve a path below `texts.`.
    ///
    /// A bare key reads the active screen; `Screen.key` and `errors.key`
    /// address other groups explicitly.
    pub fn resolve(&self, active_screen: Option<&str>, path: &str) -> Option<&str> {
        if let Some(text) = active_screen.and_then(|screen| self.screen_text(screen, path)) {
            return Some(text);
        }
        let (group, key) = path.split_once('.')?;
        if group == "errors" {
            return self.errors.get(key).map(String::as_str);
        }
        self.screen_text(group, key)
    }

    /// Overlay a catalog served by `/api/admin/texts/all`.
    ///
    /// The payload maps screen names to key/text objects, with shared error
    /// messages under `errors`. Remote entries win key by key; local keys the
    /// remote lacks are kept. Non-string texts are skipped.
    pub fn merge_remote(&mut self, remote: &serde_json::Map<String, Value>) {
        let mut merged = 0usize;
        for (group, texts) in remote {
            let Some(texts) = texts.as_object() else {
                warn!("Skipping remote text group '{}': not an object", group);
                continue;
            };
            let target = if group == "errors" {
                &mut self.errors
            } else {
                self.screens.entry(group.clone()).or_default()
            };
            for (key, text) in texts {
                if let Some(text) = text.as_str() {
                    target.insert(key.clone(), text.to_string());
                    merged += 1;
                }
            }
        }
        debug!("Merged {} remote texts", merged);
    }
}
