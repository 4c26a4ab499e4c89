//! # redchat-cache
//!
//! Store layer for presence records and pub/sub messaging.
//!
//! ## Features
//!
//! - **Redis Store**: pooled command connections with deadpool, dedicated pub/sub connections
//! - **Memory Store**: in-process backend with the same atomicity contract, for tests
//! - **Presence**: identity lock, heartbeat, and online set
//! - **Pub/Sub**: broadcast publishing and a subscriber that feeds a local event channel
//!
//! ## Example
//!
//! ```ignore
//! use redchat_cache::{PresenceStore, Publisher, RedisStore, RedisStoreConfig};
//!
//! let store: SharedStore = Arc::new(RedisStore::new(RedisStoreConfig::default())?);
//! let presence = PresenceStore::new(store.clone(), PRESENCE_TTL);
//!
//! if presence.claim_identity(&identity).await? {
//!     Publisher::new(store).publish(&BroadcastMessage::joined(&identity)).await?;
//! }
//! ```

pub mod presence;
pub mod pubsub;
pub mod store;

// Re-export store types
pub use store::{MemoryStore, RedisStore, RedisStoreConfig};

// Re-export presence types
pub use presence::{PresenceStore, ONLINE_SET_KEY};

// Re-export pubsub types
pub use pubsub::{Publisher, Subscriber, EVENT_CHANNEL_CAPACITY};
