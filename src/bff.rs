//! Backend-for-Frontend API client.
//!
//! Every HTTP exchange the engine makes goes through [`BffClient`]: screen
//! definitions, declarative `api_call` actions, the health probe and the
//! remote text catalog. Transport is abstracted behind [`HttpClient`] so the
//! session can be driven against a mock in tests.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::ReqwestHttpClient;
use crate::engine::ApiRequest;
use crate::error::{DefinitionError, NetworkError, SduiError, SduiResult};
use crate::models::ScreenDefinition;
use crate::traits::{Headers, HttpClient, HttpMethod, Response};

/// Default BFF address for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Header carrying the admin API key for `/api/admin/*` routes.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client for the BFF API.
///
/// Cheap to clone; clones share the underlying HTTP client.
#[derive(Clone)]
pub struct BffClient {
    /// Base URL without a trailing slash
    base_url: String,
    /// Admin API key, sent only to admin routes
    api_key: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for BffClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BffClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl BffClient {
    /// Client for `base_url` using reqwest.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Arc::new(ReqwestHttpClient::new()))
    }

    /// Client for `base_url` over any [`HttpClient`].
    pub fn with_http_client(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            http,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for an endpoint path such as `/api/pos/otp`.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// URL of a screen definition, with the state snapshot as `context`.
    pub fn screen_url(&self, screen_id: &str, context: &Value) -> String {
        format!(
            "{}/api/screens/{}?context={}",
            self.base_url,
            urlencoding::encode(screen_id),
            urlencoding::encode(&context.to_string())
        )
    }

    /// Fetch and parse a screen definition.
    ///
    /// Sends `GET /api/screens/{id}?context=<url-encoded JSON>`.
    pub async fn fetch_screen(
        &self,
        screen_id: &str,
        context: &Value,
    ) -> SduiResult<ScreenDefinition> {
        let url = self.screen_url(screen_id, context);
        debug!("Fetching screen definition: {}", url);

        let response = self
            .http
            .get(&url, &json_headers())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        let response = ensure_success(response)?;

        let definition = ScreenDefinition::from_slice(screen_id, &response.body)?;
        if definition.id != screen_id {
            debug!(
                "Definition id '{}' differs from requested '{}'",
                definition.id, screen_id
            );
        }
        Ok(definition)
    }

    /// Perform a planned `api_call`.
    ///
    /// The body is JSON-encoded and omitted for GET. An empty response body
    /// reads as `{}`.
    pub async fn call(&self, request: &ApiRequest) -> Result<Value, NetworkError> {
        let url = self.url(&request.endpoint);
        let mut headers = json_headers();
        headers.extend(request.headers.clone());

        let body = match (&request.body, request.method.allows_body()) {
            (Some(body), true) => Some(body.to_string()),
            (Some(_), false) => {
                debug!("Dropping body of GET {}", url);
                None
            }
            (None, _) => None,
        };

        debug!("{} {}", request.method, url);
        let response = self
            .http
            .request(request.method, &url, body.as_deref(), &headers)
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        let response = ensure_success(response)?;
        decode_body(&response)
    }

    /// Check if the BFF is reachable.
    ///
    /// `Ok(false)` for a non-2xx answer, `Err` when nothing answered.
    pub async fn health_check(&self) -> Result<bool, NetworkError> {
        let url = self.url("/health");
        let response = self
            .http
            .get(&url, &Headers::new())
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Ok(response.is_success())
    }

    /// Fetch the admin text catalog.
    ///
    /// Returns the `texts` object of `{success, texts}`; screens map to
    /// key/text objects and shared messages sit under `errors`.
    pub async fn fetch_texts(&self) -> SduiResult<serde_json::Map<String, Value>> {
        let url = self.url("/api/admin/texts/all");
        let mut headers = json_headers();
        if let Some(key) = &self.api_key {
            headers.insert(API_KEY_HEADER.to_string(), key.clone());
        }

        let response = self
            .http
            .get(&url, &headers)
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        let response = ensure_success(response)?;
        let payload = decode_body(&response)?;

        if payload.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(NetworkError::InvalidResponse {
                message: error_message(&payload).unwrap_or_else(|| "texts request failed".into()),
            }
            .into());
        }
        match payload.get("texts") {
            Some(Value::Object(texts)) => Ok(texts.clone()),
            _ => Err(SduiError::Definition(DefinitionError::Parse {
                screen_id: "texts".to_string(),
                message: "response has no 'texts' object".to_string(),
            })),
        }
    }
}

fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers
}

/// Turn a non-2xx response into [`NetworkError::HttpStatus`], carrying the
/// server's message when the body has one.
fn ensure_success(response: Response) -> Result<Response, NetworkError> {
    if response.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<Value>()
        .ok()
        .as_ref()
        .and_then(error_message)
        .unwrap_or_default();
    warn!("BFF answered {}: {}", response.status, message);
    Err(NetworkError::HttpStatus {
        status: response.status,
        message,
    })
}

/// `message`, or `error.message`, or a string `error`.
fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/error/message").and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

fn decode_body(response: &Response) -> Result<Value, NetworkError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    response.json().map_err(|e| NetworkError::InvalidResponse {
        message: e.to_string(),
    })
}
