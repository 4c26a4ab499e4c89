//! # redchat-core
//!
//! Domain layer containing the identity value object, the broadcast message
//! format, and the store traits the client talks to.
//! This crate has zero dependencies on infrastructure (Redis, terminal, etc.).

pub mod error;
pub mod messages;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::StoreError;
pub use messages::{BroadcastMessage, BROADCAST_TOPIC};
pub use traits::{KeyValueStore, SharedStore, StoreResult, SubscriptionEvent, TopicSubscription};
pub use value_objects::{Identity, IdentityError};
