//! Unified error handling for the SDUI engine.
//!
//! - **Error Categories**: high-level classification for error screens
//! - **Domain Errors**: network and definition errors
//! - **Unified Error Type**: `SduiError` consolidates them
//! - **Error Context**: which screen/action was involved
//! - **Result Type Alias**: `SduiResult<T>`
//!
//! Failures never crash a session. A definition load error becomes an error
//! view, an action error is routed to `onError` or logged, and malformed
//! expressions fail open.
//!
//! | Category | Source | Surfaced as |
//! |----------|--------|-------------|
//! | Network | transport, timeouts | error view / `onError` |
//! | Server | HTTP 5xx | error view / `onError` |
//! | Definition | parse, cycles, nesting | error view |
//! | Configuration | URL, text catalog | host startup failure |

mod category;
mod context;
mod network;
mod result;
mod sdui_error;

pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use network::NetworkError;
pub use result::{ResultExt, SduiResult};
pub use sdui_error::{DefinitionError, SduiError};
