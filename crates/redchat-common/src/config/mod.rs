//! Configuration structs

mod client_config;

pub use client_config::{load_dotenv, ClientConfig, ConfigError, RedisConfig, PRESENCE_TTL};
