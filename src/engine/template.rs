//! `{{ … }}` interpolation over a state snapshot and the text catalog.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::expression;
use super::path::{lookup, stringify};
use crate::models::TextCatalog;

static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("Invalid template token regex"));

static PLAIN_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(\.[\w$]+)*$").expect("Invalid template path regex")
});

static WHOLE_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{\{\s*([^{}]*?)\s*\}\}$").expect("Invalid whole token regex"));

/// What templates can read: the merged state view and, optionally, texts.
///
/// The active screen only scopes `texts.*` lookups; it is not part of the
/// state view.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub state: &'a Value,
    pub texts: Option<&'a TextCatalog>,
    pub screen: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn new(state: &'a Value) -> Self {
        Self {
            state,
            texts: None,
            screen: None,
        }
    }

    pub fn with_texts(mut self, texts: &'a TextCatalog) -> Self {
        self.texts = Some(texts);
        self
    }

    pub fn with_screen(mut self, screen: &'a str) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn screen_name(&self) -> Option<&'a str> {
        self.screen
    }

    /// Resolve a dotted path: `texts.*` against the catalog, `state.*` and
    /// bare paths against the state view.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let path = path.trim();
        if let Some(rest) = path.strip_prefix("texts.") {
            return self
                .texts
                .and_then(|texts| texts.resolve(self.screen_name(), rest))
                .map(|text| Value::String(text.to_string()));
        }
        if let Some(rest) = path.strip_prefix("state.") {
            if let Some(value) = lookup(self.state, rest) {
                return Some(value.clone());
            }
        }
        lookup(self.state, path).cloned()
    }
}

/// Replace every `{{ … }}` token in `template`.
///
/// A token whose path (or every path its expression reads) is missing, or
/// that evaluates to `null`, stays verbatim. Malformed expressions stay
/// verbatim too.
pub fn interpolate(template: &str, scope: &Scope<'_>) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }
    TOKEN_REGEX
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            resolve_token(&caps[1], scope).unwrap_or_else(|| token.to_string())
        })
        .into_owned()
}

fn resolve_token(inner: &str, scope: &Scope<'_>) -> Option<String> {
    let inner = inner.trim();
    if PLAIN_PATH_REGEX.is_match(inner) && !is_keyword(inner) {
        return scope.resolve(inner).map(|value| stringify(&value));
    }

    let resolve = |path: &str| scope.resolve(path);
    match expression::evaluate(inner, &resolve) {
        Ok(result) if result.nothing_resolved() || result.value.is_null() => None,
        Ok(result) => Some(stringify(&result.value)),
        Err(err) => {
            debug!("Leaving template token unresolved: {{{{{}}}}}: {}", inner, err);
            None
        }
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(word, "true" | "false" | "null" | "undefined")
}

/// Interpolate every string inside `value`, rebuilding arrays and objects.
/// Other values are returned unchanged.
pub fn interpolate_value(value: &Value, scope: &Scope<'_>) -> Value {
    match value {
        Value::String(s) => Value::String(interpolate(s, scope)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_value(item, scope))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, scope)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// The path inside a value that is exactly one `{{path}}` token.
pub fn whole_token_path(value: &str) -> Option<&str> {
    WHOLE_TOKEN_REGEX
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|inner| PLAIN_PATH_REGEX.is_match(inner))
}
