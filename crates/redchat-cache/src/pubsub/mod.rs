//! Pub/Sub module.
//!
//! Publishes broadcast messages and forwards subscribed payloads into a
//! local event channel.

mod publisher;
mod subscriber;

pub use publisher::Publisher;
pub use subscriber::Subscriber;

/// Capacity of the local event channels feeding the session loop.
///
/// Tokio channels cannot be zero-sized; a single slot keeps the producer
/// waiting on the consumer after one pending event.
pub const EVENT_CHANNEL_CAPACITY: usize = 1;
