//! Layout tree nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use super::condition::Condition;

/// Component kinds the renderer knows how to draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Container,
    Text,
    Button,
    Loader,
    /// Kinds added server-side after this client shipped.
    Unknown(String),
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Container => "container",
            ComponentKind::Text => "text",
            ComponentKind::Button => "button",
            ComponentKind::Loader => "loader",
            ComponentKind::Unknown(name) => name,
        }
    }
}

impl From<String> for ComponentKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "container" => ComponentKind::Container,
            "text" => ComponentKind::Text,
            "button" => ComponentKind::Button,
            "loader" => ComponentKind::Loader,
            _ => ComponentKind::Unknown(name),
        }
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape before `props.children` is hoisted.
#[derive(Deserialize)]
struct RawComponent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: ComponentKind,
    #[serde(default)]
    style: Map<String, Value>,
    #[serde(default)]
    props: Map<String, Value>,
    #[serde(default)]
    children: Vec<Component>,
    #[serde(default)]
    condition: Option<Condition>,
}

/// One node of a definition's layout tree. Read-only after parsing.
///
/// Children given under `props.children` are moved into `children` when the
/// node has no direct children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawComponent")]
pub struct Component {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl From<RawComponent> for Component {
    fn from(raw: RawComponent) -> Self {
        let RawComponent {
            id,
            kind,
            style,
            mut props,
            mut children,
            condition,
        } = raw;

        if children.is_empty() {
            if let Some(nested) = props.remove("children") {
                match serde_json::from_value::<Vec<Component>>(nested) {
                    Ok(nested) => children = nested,
                    Err(err) => warn!("Ignoring malformed props.children on {}: {}", kind, err),
                }
            }
        }

        Self {
            id,
            kind,
            style,
            props,
            children,
            condition,
        }
    }
}

impl Component {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            id: None,
            kind,
            style: Map::new(),
            props: Map::new(),
            children: Vec::new(),
            condition: None,
        }
    }

    /// Text node with the given template.
    pub fn text(template: &str) -> Self {
        Self::new(ComponentKind::Text).with_prop("text", Value::String(template.to_string()))
    }

    /// Container with the given children.
    pub fn container(children: Vec<Component>) -> Self {
        let mut node = Self::new(ComponentKind::Container);
        node.children = children;
        node
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_prop(mut self, key: &str, value: Value) -> Self {
        self.props.insert(key.to_string(), value);
        self
    }

    pub fn with_style(mut self, key: &str, value: Value) -> Self {
        self.style.insert(key.to_string(), value);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// String prop, if present and a string.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_roundtrip() {
        assert_eq!(ComponentKind::from("button".to_string()), ComponentKind::Button);
        assert_eq!(
            ComponentKind::from("carousel".to_string()),
            ComponentKind::Unknown("carousel".to_string())
        );
        assert_eq!(String::from(ComponentKind::Loader), "loader");
    }

    #[test]
    fn test_props_children_hoisted() {
        let node: Component = serde_json::from_value(json!({
            "type": "container",
            "props": {
                "style": {"padding": 24},
                "children": [{"type": "text", "props": {"text": "Hola"}}]
            }
        }))
        .unwrap();

        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].prop_str("text"), Some("Hola"));
        assert!(node.prop("children").is_none());
        assert!(node.prop("style").is_some());
    }

    #[test]
    fn test_direct_children_win() {
        let node: Component = serde_json::from_value(json!({
            "type": "container",
            "children": [{"type": "loader"}],
            "props": {"children": [{"type": "text"}, {"type": "text"}]}
        }))
        .unwrap();

        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].kind, ComponentKind::Loader);
    }

    #[test]
    fn test_malformed_props_children_ignored() {
        let node: Component = serde_json::from_value(json!({
            "type": "container",
            "props": {"children": "nope"}
        }))
        .unwrap();
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_missing_type_is_an_error() {
        assert!(serde_json::from_value::<Component>(json!({"props": {}})).is_err());
    }
}
