//! Shelfwatch - Monitored-Library Catalog Engine
//!
//! Core library providing monitored-entity aggregation, view-state
//! synchronization, bulk mutations and best-effort local caching for a
//! personal book-monitoring server.

pub mod catalog;
pub mod client;
pub mod config;
pub mod logging;
pub mod store;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
