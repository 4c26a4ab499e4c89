//! Identity - the username a session claims while it is online
//!
//! An identity is fixed for the lifetime of a session. It is embedded in
//! presence keys (`online.<identity>`) and in chat lines (`<identity>: text`),
//! so whitespace and control characters are rejected up front.

use std::fmt;

/// Key prefix for presence records
pub const PRESENCE_KEY_PREFIX: &str = "online.";

/// A validated chat identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(String);

/// Error when an identity string is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity must not be empty")]
    Empty,

    #[error("identity must not contain whitespace: {0:?}")]
    Whitespace(String),

    #[error("identity must not contain control characters: {0:?}")]
    ControlCharacter(String),
}

impl Identity {
    /// Validate and wrap a username
    pub fn parse(name: &str) -> Result<Self, IdentityError> {
        if name.is_empty() {
            return Err(IdentityError::Empty);
        }
        if name.chars().any(char::is_whitespace) {
            return Err(IdentityError::Whitespace(name.to_string()));
        }
        if name.chars().any(char::is_control) {
            return Err(IdentityError::ControlCharacter(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// The raw username
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key of this identity's presence record
    #[must_use]
    pub fn presence_key(&self) -> String {
        format!("{PRESENCE_KEY_PREFIX}{}", self.0)
    }

    /// Prefix carried by every chat line this identity publishes
    #[must_use]
    pub fn chat_prefix(&self) -> String {
        format!("{}: ", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identity::parse(s)
    }
}
