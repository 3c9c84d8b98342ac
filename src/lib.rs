//! Scratcher EV: expected-value estimator for instant lottery tickets.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod comparator;
pub mod config;
pub mod estimator;
pub mod feeds;
pub mod fetch;
pub mod numeric;
pub mod server;
pub mod snapshot;
pub mod types;
