//! Broadcast messages - the plain-text payloads carried on the chat topic

mod broadcast;

pub use broadcast::{BroadcastMessage, BROADCAST_TOPIC};
