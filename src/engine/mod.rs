//! The SDUI engine: evaluation, rendering, actions and hooks.
//!
//! Everything here is synchronous and state-free except the
//! [`HookScheduler`], which owns background timer tasks. The session drives
//! these pieces; hosts that only need to render can use
//! [`render`] with a [`Scope`] directly.

pub mod condition;
pub mod dispatcher;
pub mod expression;
pub mod hooks;
pub mod path;
pub mod renderer;
pub mod template;

pub use dispatcher::{ActionDispatcher, ApiRequest, Step, MAX_TRIGGER_DEPTH};
pub use expression::{ExpressionError, MAX_EXPRESSION_DEPTH};
pub use hooks::HookScheduler;
pub use renderer::{
    render, ContainerNode, EffectSink, LoaderNode, PressAction, RenderNode, RenderedButton,
    TextNode, MAX_RENDER_DEPTH,
};
pub use template::{interpolate, interpolate_value, Scope};
