//! Turns a component tree plus a state view into an owned render tree.
//!
//! The output carries no references into the definition, so a host can keep
//! it across state changes and hand button presses back to the session.

use serde_json::{Map, Value};
use tracing::warn;

use super::condition::{evaluate, evaluate_flag, evaluate_value};
use super::template::{interpolate, interpolate_value, Scope};
use crate::error::{SduiError, SduiResult};
use crate::models::{Action, Component, ComponentKind};

/// Deepest layout nesting the renderer will walk.
pub const MAX_RENDER_DEPTH: usize = 64;

/// Receives the effects of button presses.
pub trait EffectSink {
    /// Run an action against the current state.
    fn on_action(&mut self, action: Action);

    /// Request a screen transition with already-interpolated params.
    fn on_navigate(&mut self, screen: &str, params: Option<Value>);
}

/// What a button does when pressed.
#[derive(Debug, Clone, PartialEq)]
pub enum PressAction {
    Navigate {
        screen: String,
        params: Option<Value>,
    },
    Dispatch(Action),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerNode {
    pub id: Option<String>,
    pub style: Map<String, Value>,
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub id: Option<String>,
    pub style: Map<String, Value>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderNode {
    pub id: Option<String>,
    pub style: Map<String, Value>,
    pub size: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedButton {
    pub id: Option<String>,
    pub style: Map<String, Value>,
    pub title: String,
    pub variant: String,
    pub disabled: bool,
    pub loading: bool,
    pub on_press: Option<PressAction>,
}

impl RenderedButton {
    /// Whether a press would do anything.
    pub fn is_enabled(&self) -> bool {
        !self.disabled && !self.loading && self.on_press.is_some()
    }

    /// Deliver the press to `sink`. Returns false when the button ignored
    /// it (disabled, loading, or no `onPress`).
    pub fn press(&self, sink: &mut dyn EffectSink) -> bool {
        if self.disabled || self.loading {
            return false;
        }
        match &self.on_press {
            Some(PressAction::Navigate { screen, params }) => {
                sink.on_navigate(screen, params.clone());
                true
            }
            Some(PressAction::Dispatch(action)) => {
                sink.on_action(action.clone());
                true
            }
            None => false,
        }
    }
}

/// Rendered output; the host draws this.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Container(ContainerNode),
    Text(TextNode),
    Button(RenderedButton),
    Loader(LoaderNode),
}

impl RenderNode {
    pub fn id(&self) -> Option<&str> {
        match self {
            RenderNode::Container(n) => n.id.as_deref(),
            RenderNode::Text(n) => n.id.as_deref(),
            RenderNode::Button(n) => n.id.as_deref(),
            RenderNode::Loader(n) => n.id.as_deref(),
        }
    }

    pub fn style(&self) -> &Map<String, Value> {
        match self {
            RenderNode::Container(n) => &n.style,
            RenderNode::Text(n) => &n.style,
            RenderNode::Button(n) => &n.style,
            RenderNode::Loader(n) => &n.style,
        }
    }

    /// Buttons in depth-first order.
    pub fn buttons(&self) -> Vec<&RenderedButton> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if let RenderNode::Button(button) = node {
                found.push(button);
            }
        });
        found
    }

    /// First button whose id or title equals `key`.
    pub fn find_button(&self, key: &str) -> Option<&RenderedButton> {
        self.buttons()
            .into_iter()
            .find(|b| b.id.as_deref() == Some(key) || b.title == key)
    }

    /// Text node contents in depth-first order.
    pub fn texts(&self) -> Vec<&str> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if let RenderNode::Text(text) = node {
                found.push(text.text.as_str());
            }
        });
        found
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a RenderNode)) {
        visit(self);
        if let RenderNode::Container(container) = self {
            for child in &container.children {
                child.walk(visit);
            }
        }
    }
}

/// Render `layout` against `scope`.
///
/// `Ok(None)` means the root rendered nothing (false condition or unknown
/// kind). Nesting beyond [`MAX_RENDER_DEPTH`] is an error.
pub fn render(layout: &Component, scope: &Scope<'_>) -> SduiResult<Option<RenderNode>> {
    render_node(layout, scope, 0)
}

fn render_node(
    component: &Component,
    scope: &Scope<'_>,
    depth: usize,
) -> SduiResult<Option<RenderNode>> {
    if depth >= MAX_RENDER_DEPTH {
        return Err(SduiError::Render {
            message: format!(
                "layout nests deeper than {} levels at '{}'",
                MAX_RENDER_DEPTH, component.kind
            ),
        });
    }

    if let Some(condition) = &component.condition {
        if !evaluate(condition, scope.state) {
            return Ok(None);
        }
    }

    let node = match &component.kind {
        ComponentKind::Container => {
            let mut children = Vec::with_capacity(component.children.len());
            for child in &component.children {
                if let Some(rendered) = render_node(child, scope, depth + 1)? {
                    children.push(rendered);
                }
            }
            RenderNode::Container(ContainerNode {
                id: component.id.clone(),
                style: merged_style(component),
                children,
            })
        }
        ComponentKind::Text => RenderNode::Text(TextNode {
            id: component.id.clone(),
            style: merged_style(component),
            text: text_content(component, scope),
        }),
        ComponentKind::Button => RenderNode::Button(render_button(component, scope)),
        ComponentKind::Loader => RenderNode::Loader(LoaderNode {
            id: component.id.clone(),
            style: merged_style(component),
            size: component.prop_str("size").unwrap_or("large").to_string(),
            text: component.prop_str("text").map(|t| interpolate(t, scope)),
        }),
        ComponentKind::Unknown(kind) => {
            warn!("Component type '{}' not supported, skipping", kind);
            return Ok(None);
        }
    };
    Ok(Some(node))
}

/// Node style with `props.style` layered on top.
fn merged_style(component: &Component) -> Map<String, Value> {
    let mut style = component.style.clone();
    if let Some(Value::Object(overrides)) = component.prop("style") {
        for (key, value) in overrides {
            style.insert(key.clone(), value.clone());
        }
    }
    style
}

fn text_content(component: &Component, scope: &Scope<'_>) -> String {
    let base = component.prop_str("text").unwrap_or("");
    let Some(condition) = component.prop("condition") else {
        return interpolate(base, scope);
    };
    let branch = if evaluate_value(condition, scope.state) {
        "then"
    } else {
        "else"
    };
    let variant = condition
        .get(branch)
        .and_then(|b| b.get("text"))
        .and_then(Value::as_str)
        .unwrap_or(base);
    interpolate(variant, scope)
}

fn render_button(component: &Component, scope: &Scope<'_>) -> RenderedButton {
    let flag = |key: &str| {
        component
            .prop(key)
            .map(|v| evaluate_flag(v, scope))
            .unwrap_or(false)
    };

    RenderedButton {
        id: component.id.clone(),
        style: merged_style(component),
        title: interpolate(component.prop_str("title").unwrap_or(""), scope),
        variant: component.prop_str("variant").unwrap_or("primary").to_string(),
        disabled: flag("disabled"),
        loading: flag("loading"),
        on_press: component
            .prop("onPress")
            .and_then(|raw| press_action(raw, scope)),
    }
}

fn press_action(raw: &Value, scope: &Scope<'_>) -> Option<PressAction> {
    match serde_json::from_value::<Action>(raw.clone()) {
        Ok(Action::Navigate(navigate)) => Some(PressAction::Navigate {
            screen: navigate.screen,
            params: navigate.params.map(|p| interpolate_value(&p, scope)),
        }),
        Ok(action) => Some(PressAction::Dispatch(action)),
        Err(err) => {
            warn!("Ignoring malformed onPress: {}", err);
            None
        }
    }
}
