//! pitwall library
//!
//! Exposes the cache, API client, background loading and UI modules so the
//! binary and the integration tests share them.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod refresh;
pub mod ui;
