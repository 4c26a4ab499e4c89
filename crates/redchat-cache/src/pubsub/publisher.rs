//! Broadcast publisher.
//!
//! Publishes chat lines and presence announcements on the broadcast topic.

use redchat_core::{BroadcastMessage, SharedStore, StoreResult, BROADCAST_TOPIC};

/// Broadcast topic publisher
#[derive(Clone)]
pub struct Publisher {
    store: SharedStore,
    topic: String,
}

impl Publisher {
    /// Create a publisher on the default broadcast topic
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self::with_topic(store, BROADCAST_TOPIC)
    }

    /// Create a publisher on a custom topic
    #[must_use]
    pub fn with_topic(store: SharedStore, topic: impl Into<String>) -> Self {
        Self {
            store,
            topic: topic.into(),
        }
    }

    /// Topic this publisher writes to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish a message, returning the number of receivers
    pub async fn publish(&self, message: &BroadcastMessage) -> StoreResult<u32> {
        let payload = message.to_string();
        let receivers = self.store.publish(&self.topic, &payload).await?;

        tracing::debug!(
            topic = %self.topic,
            identity = %message.identity(),
            receivers = receivers,
            "Published message"
        );

        Ok(receivers)
    }
}
