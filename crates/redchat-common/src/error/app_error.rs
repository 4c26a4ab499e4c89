//! Application error types
//!
//! Unified error handling for the client binary. Every variant is a startup
//! failure; once a session is running, failures end the session instead of
//! surfacing here.

use crate::config::ConfigError;
use redchat_core::{IdentityError, StoreError};

/// Exit status for any startup failure
pub const EXIT_FAILURE: i32 = 1;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Argument errors
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    InvalidIdentity(#[from] IdentityError),

    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // Presence conflicts
    #[error("User already online")]
    IdentityTaken(String),

    #[error("User still in online set")]
    StaleOnlineEntry(String),
}

impl AppError {
    /// Process exit status for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }

    /// Get error code for log records
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "USAGE",
            Self::InvalidIdentity(_) => "INVALID_IDENTITY",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::IdentityTaken(_) => "IDENTITY_TAKEN",
            Self::StaleOnlineEntry(_) => "STALE_ONLINE_ENTRY",
        }
    }

    /// Check if the usage text should be printed along with this error
    #[must_use]
    pub fn shows_usage(&self) -> bool {
        matches!(
            self,
            Self::Usage(_) | Self::InvalidIdentity(_) | Self::Config(ConfigError::MissingVar(_))
        )
    }

    /// Create a usage error
    #[must_use]
    pub fn usage(msg: impl std::fmt::Display) -> Self {
        Self::Usage(msg.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
