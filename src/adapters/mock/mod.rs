//! Mock implementations for testing.
//!
//! Test doubles for the trait seams, so the engine and session can be
//! exercised without a BFF or a terminal.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`RecordingNavigator`] - navigator that records requests

pub mod http;
pub mod navigator;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use navigator::RecordingNavigator;
