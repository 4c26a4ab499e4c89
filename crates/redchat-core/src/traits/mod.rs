//! Store traits (ports) - the interface the client needs from a shared store

mod store;

pub use store::{KeyValueStore, SharedStore, StoreResult, SubscriptionEvent, TopicSubscription};
