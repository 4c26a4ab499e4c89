//! Key-value / pub-sub store port
//!
//! The shared store is the only cross-process synchronization primitive in
//! the system. Every conditional operation here must be atomic on the
//! backend: two concurrent `set_if_absent` calls for the same key can never
//! both return `true`.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store shared between the coordinator and the components it starts
pub type SharedStore = Arc<dyn KeyValueStore>;

// ============================================================================
// Key-value store
// ============================================================================

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set `key` to `value` with an expiry, only if the key does not exist.
    /// Returns `false` when the key is already present.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool>;

    /// Set `key` to `value` with an expiry, only if the key already exists.
    /// Returns `false` when the key is missing or has expired.
    async fn set_if_present(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool>;

    /// Add `member` to the set at `key`. Returns `false` if it was already a member.
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Remove `member` from the set at `key`. Returns `false` if it was not a member.
    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Snapshot of the members of the set at `key`
    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Delete a key. Returns `false` if it did not exist.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Publish a payload to a topic, returning the number of receivers
    async fn publish(&self, topic: &str, payload: &str) -> StoreResult<u32>;

    /// Open a dedicated subscription to `topic`.
    ///
    /// Implementations must not share the subscription connection with the
    /// one used for ordinary commands.
    async fn subscribe(&self, topic: &str) -> StoreResult<Box<dyn TopicSubscription>>;

    /// Release the connections held for ordinary commands
    fn close(&self) {}
}

// ============================================================================
// Subscription
// ============================================================================

/// An event read from a subscription connection
#[derive(Debug)]
pub enum SubscriptionEvent {
    /// A payload published on the topic
    Message(String),
    /// The store confirmed the subscription to a topic
    Subscribed(String),
    /// The subscription failed; no further events will follow
    Error(StoreError),
}

#[async_trait]
pub trait TopicSubscription: Send {
    /// Wait for the next event on the subscription
    async fn next_event(&mut self) -> SubscriptionEvent;
}
