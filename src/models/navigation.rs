use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A screen transition handed to the host's navigator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub screen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl NavigationRequest {
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            params: None,
        }
    }

    pub fn with_params(screen: impl Into<String>, params: Value) -> Self {
        Self {
            screen: screen.into(),
            params: Some(params),
        }
    }

    /// Params as an object map; anything else yields an empty map.
    pub fn params_map(&self) -> serde_json::Map<String, Value> {
        match &self.params {
            Some(Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        }
    }
}
