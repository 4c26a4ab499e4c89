//! Pub/Sub subscriber.
//!
//! Holds a dedicated subscription to one topic and forwards each received
//! payload to a local channel. Any subscription error ends the loop and
//! drops the sender, so the consumer sees the channel close and nothing else.

use crate::pubsub::EVENT_CHANNEL_CAPACITY;
use redchat_core::{SharedStore, SubscriptionEvent, TopicSubscription, BROADCAST_TOPIC};
use tokio::sync::mpsc;

/// Topic subscriber
#[derive(Debug, Clone)]
pub struct Subscriber {
    topic: String,
}

impl Default for Subscriber {
    fn default() -> Self {
        Self::new(BROADCAST_TOPIC)
    }
}

impl Subscriber {
    /// Create a subscriber for `topic`
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    /// Subscribe and start the background receive loop.
    ///
    /// The subscription is established before this returns, so messages
    /// published afterwards are delivered. If subscribing fails the returned
    /// receiver is already closed.
    pub async fn start(self, store: &SharedStore) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        match store.subscribe(&self.topic).await {
            Ok(subscription) => {
                tokio::spawn(forward(self.topic, subscription, tx));
            }
            Err(e) => {
                tracing::warn!(topic = %self.topic, error = %e, "Failed to subscribe");
            }
        }

        rx
    }
}

/// Receive loop: runs until the subscription fails or the consumer goes away
pub(crate) async fn forward(
    topic: String,
    mut subscription: Box<dyn TopicSubscription>,
    tx: mpsc::Sender<String>,
) {
    loop {
        match subscription.next_event().await {
            SubscriptionEvent::Message(payload) => {
                tracing::trace!(topic = %topic, "Received message");
                if tx.send(payload).await.is_err() {
                    tracing::debug!(topic = %topic, "Event channel closed");
                    break;
                }
            }
            SubscriptionEvent::Subscribed(confirmed) => {
                tracing::debug!(topic = %confirmed, "Subscription confirmed");
            }
            SubscriptionEvent::Error(e) => {
                tracing::warn!(topic = %topic, error = %e, "Subscription ended");
                break;
            }
        }
    }
}
