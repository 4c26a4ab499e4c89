//! Client configuration structs
//!
//! Built from command-line values, with environment fallbacks resolved by
//! the CLI after `.env` is loaded.

use redchat_core::Identity;
use std::time::Duration;

/// Lifetime of a presence record without a heartbeat
pub const PRESENCE_TTL: Duration = Duration::from_secs(120);

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub redis: RedisConfig,
    pub identity: Identity,
    /// Expiry applied to the presence record on claim and on every heartbeat
    pub presence_ttl: Duration,
    /// Period of the presence heartbeat
    pub heartbeat_interval: Duration,
    /// Sleep between loop iterations when no event is ready
    pub poll_interval: Duration,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

impl RedisConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_redis_max_connections(),
        }
    }

    /// URL with credentials stripped, safe to log
    #[must_use]
    pub fn redacted_url(&self) -> &str {
        self.url.split('@').next_back().unwrap_or(&self.url)
    }
}

// Default value functions
fn default_redis_max_connections() -> u32 {
    2
}

fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(100)
}

/// Load a `.env` file if present (ignore errors if not found)
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

impl ClientConfig {
    /// Create a configuration with default timings
    #[must_use]
    pub fn new(redis: RedisConfig, identity: Identity) -> Self {
        Self {
            redis,
            identity,
            presence_ttl: PRESENCE_TTL,
            heartbeat_interval: default_heartbeat_interval(),
            poll_interval: default_poll_interval(),
        }
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.redis.max_connections = max_connections;
        self
    }

    /// Check the timing invariants
    ///
    /// The heartbeat must fire well inside the presence TTL, otherwise the
    /// record can expire between two refreshes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis.url.is_empty() {
            return Err(ConfigError::MissingVar("REDIS_URL"));
        }
        if self.redis.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "max_connections",
                "must be at least 1".to_string(),
            ));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "heartbeat_interval",
                "must be non-zero".to_string(),
            ));
        }
        if self.heartbeat_interval >= self.presence_ttl {
            return Err(ConfigError::InvalidValue(
                "heartbeat_interval",
                format!(
                    "{}s must be shorter than the presence TTL of {}s",
                    self.heartbeat_interval.as_secs(),
                    self.presence_ttl.as_secs()
                ),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "poll_interval",
                "must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
