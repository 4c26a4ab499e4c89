//! Integration test utilities for the chat client
//!
//! Sessions run against the in-memory store by default. Tests that need a
//! live Redis server skip themselves when `REDIS_URL` is not set.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
