//! Store errors - transport-level failures reported by a store backend
//!
//! A conditional operation that simply does not apply (key already present,
//! key missing, member already in the set) is not an error; backends report
//! it through the boolean result of the operation instead.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore) backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to connect to store: {0}")]
    Connection(String),

    #[error("Store command failed: {0}")]
    Command(String),

    #[error("Unexpected reply from store: {0}")]
    UnexpectedReply(String),

    #[error("Subscription failed: {0}")]
    Subscription(String),

    #[error("Store connection closed")]
    Closed,
}
