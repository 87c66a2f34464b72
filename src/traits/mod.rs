//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP operations against the BFF
//! - [`Navigator`] - screen transition requests leaving the session

pub mod http;
pub mod navigator;

pub use http::{Headers, HttpClient, HttpError, HttpMethod, Response};
pub use navigator::Navigator;
