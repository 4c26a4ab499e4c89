//! Command-line arguments

use clap::{CommandFactory, Parser};
use redchat_common::{AppError, AppResult, ClientConfig, RedisConfig};
use redchat_core::Identity;
use std::time::Duration;

const AFTER_HELP: &str = "\
  e.g. redchat -r redis://redis_svr:6379 antirez

  If -r URL is not used, the REDIS_URL env must be set instead";

#[derive(Parser, Debug)]
#[command(name = "redchat", author, version, about = "Chat over a shared Redis server", after_help = AFTER_HELP)]
pub struct Cli {
    /// URL of Redis server
    #[arg(short = 'r', long = "redis-url", value_name = "URL", env = "REDIS_URL", hide_env_values = true)]
    pub redis_url: Option<String>,

    /// A single, unique username
    pub username: String,

    /// Seconds between presence heartbeats
    #[arg(long, env = "REDCHAT_HEARTBEAT_SECS", default_value_t = 60, hide = true)]
    pub heartbeat_secs: u64,

    /// Milliseconds to sleep when no event is ready
    #[arg(long, env = "REDCHAT_POLL_MS", default_value_t = 100, hide = true)]
    pub poll_ms: u64,

    /// Size of the Redis command connection pool
    #[arg(long, env = "REDIS_MAX_CONNECTIONS", default_value_t = 2, hide = true)]
    pub max_connections: u32,

    /// Verbose logging on stderr
    #[arg(long, hide = true)]
    pub debug: bool,
}

impl Cli {
    /// One-line usage text
    #[must_use]
    pub fn usage() -> String {
        let mut command = Self::command();
        format!("{}\n\n{AFTER_HELP}", command.render_usage())
    }

    /// Build and validate the client configuration
    pub fn into_config(self) -> AppResult<ClientConfig> {
        let url = self
            .redis_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::usage("a URL must be specified"))?;
        let identity = Identity::parse(&self.username)?;

        let config = ClientConfig::new(RedisConfig::new(url), identity)
            .with_max_connections(self.max_connections)
            .with_heartbeat_interval(Duration::from_secs(self.heartbeat_secs))
            .with_poll_interval(Duration::from_millis(self.poll_ms));
        config.validate()?;

        Ok(config)
    }
}
