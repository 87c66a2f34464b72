//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`ChannelNavigator`] - navigation requests over a tokio channel
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::RecordingNavigator`] - Records navigation requests

pub mod channel_navigator;
pub mod mock;
pub mod reqwest_http;

pub use channel_navigator::ChannelNavigator;
pub use mock::{MockHttpClient, MockResponse, RecordingNavigator};
pub use reqwest_http::ReqwestHttpClient;
