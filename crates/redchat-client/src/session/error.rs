//! Session startup errors

use redchat_common::AppError;
use redchat_core::{Identity, StoreError};

/// Failures while claiming an identity and joining the chat
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Another session holds the identity lock
    #[error("User already online")]
    IdentityTaken(Identity),

    /// The identity is still in the online set. The lock claimed just
    /// before is left behind and expires on its own.
    #[error("User still in online set")]
    StaleOnlineEntry(Identity),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::IdentityTaken(identity) => Self::IdentityTaken(identity.to_string()),
            SessionError::StaleOnlineEntry(identity) => {
                Self::StaleOnlineEntry(identity.to_string())
            }
            SessionError::Store(e) => Self::Store(e),
        }
    }
}
