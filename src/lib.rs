//! sdui - a Server-Driven UI engine.
//!
//! Screens arrive from a Backend-for-Frontend as JSON definitions (layout
//! tree, templated text, conditions, declarative actions and hooks). The
//! engine renders them against a client-held state bag, runs their actions
//! and hooks, and hands navigation requests to the host.
//!
//! This library exposes modules for the terminal host and for integration
//! tests.

pub mod adapters;
pub mod bff;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod prelude;
pub mod session;
pub mod state;
pub mod terminal;
pub mod traits;
pub mod ui;
