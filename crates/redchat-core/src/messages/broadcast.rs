//! Broadcast message format
//!
//! Wire format (plain text, one message per publish):
//! - `<identity>: <text>`
//! - `<identity> has joined`
//! - `<identity> has left`

use crate::value_objects::Identity;
use std::fmt;

/// Topic every session publishes to and subscribes on
pub const BROADCAST_TOPIC: &str = "messages";

const JOINED_SUFFIX: &str = " has joined";
const LEFT_SUFFIX: &str = " has left";

/// A message published on the broadcast topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastMessage {
    /// A chat line typed by a user
    Chat { identity: Identity, text: String },
    /// A session came online
    Joined(Identity),
    /// A session went offline
    Left(Identity),
}

impl BroadcastMessage {
    #[must_use]
    pub fn chat(identity: &Identity, text: impl Into<String>) -> Self {
        Self::Chat {
            identity: identity.clone(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn joined(identity: &Identity) -> Self {
        Self::Joined(identity.clone())
    }

    #[must_use]
    pub fn left(identity: &Identity) -> Self {
        Self::Left(identity.clone())
    }

    /// The identity that produced this message
    pub fn identity(&self) -> &Identity {
        match self {
            Self::Chat { identity, .. } | Self::Joined(identity) | Self::Left(identity) => {
                identity
            }
        }
    }

    /// Best-effort parse of a received payload.
    ///
    /// Returns `None` for payloads that do not follow the wire format, which
    /// other clients on the same topic are free to publish.
    #[must_use]
    pub fn parse(payload: &str) -> Option<Self> {
        if let Some((name, text)) = payload.split_once(": ") {
            if let Ok(identity) = Identity::parse(name) {
                return Some(Self::Chat {
                    identity,
                    text: text.to_string(),
                });
            }
        }

        if let Some(name) = payload.strip_suffix(JOINED_SUFFIX) {
            return Identity::parse(name).ok().map(Self::Joined);
        }

        if let Some(name) = payload.strip_suffix(LEFT_SUFFIX) {
            return Identity::parse(name).ok().map(Self::Left);
        }

        None
    }
}

impl fmt::Display for BroadcastMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat { identity, text } => write!(f, "{identity}: {text}"),
            Self::Joined(identity) => write!(f, "{identity}{JOINED_SUFFIX}"),
            Self::Left(identity) => write!(f, "{identity}{LEFT_SUFFIX}"),
        }
    }
}
