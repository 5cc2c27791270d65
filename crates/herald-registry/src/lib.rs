//! Herald token registry library.
//!
//! Re-exports the API router, shared state, stores and push senders so they
//! can be used by integration tests.

pub mod api;
pub mod config;
pub mod push;
pub mod state;
pub mod store;
