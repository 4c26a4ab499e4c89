//! Redis store using deadpool-redis.
//!
//! Ordinary commands run on a small managed pool. Every subscription opens
//! its own connection from the underlying client, because a connection in
//! subscribe mode only accepts pub/sub commands.

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use redchat_core::{KeyValueStore, StoreError, StoreResult, SubscriptionEvent, TopicSubscription};
use redis::AsyncCommands;
use std::time::Duration;

/// Redis store configuration
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of command connections in the pool
    pub max_connections: usize,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 2,
        }
    }
}

impl From<&redchat_common::RedisConfig> for RedisStoreConfig {
    fn from(config: &redchat_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

fn pool_error(err: deadpool_redis::PoolError) -> StoreError {
    match err {
        deadpool_redis::PoolError::Closed => StoreError::Closed,
        other => StoreError::Connection(other.to_string()),
    }
}

fn redis_error(err: redis::RedisError) -> StoreError {
    if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Command(err.to_string())
    }
}

/// Redis's `EX` option rejects zero
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
    client: redis::Client,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisStore {
    /// Create a new Redis store with the given configuration
    ///
    /// No connection is made until the first command.
    pub fn new(config: RedisStoreConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // Redact credentials from URL for logging
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::debug!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Redis store created"
        );

        Ok(Self { pool, client })
    }

    /// Create a new Redis store from redchat-common config
    pub fn from_config(config: &redchat_common::RedisConfig) -> StoreResult<Self> {
        Self::new(RedisStoreConfig::from(config))
    }

    /// Get a command connection from the pool
    async fn get(&self) -> StoreResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(pool_error)
    }

    /// Get the current pool status
    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Check that the server is reachable by pinging it
    pub async fn health_check(&self) -> StoreResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(())
    }

    /// `SET key value <condition> EX ttl`, true when the server replied OK
    async fn set_conditional(
        &self,
        key: &str,
        value: &str,
        condition: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let mut conn = self.get().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg(condition)
            .arg("EX")
            .arg(expiry_seconds(ttl))
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        match reply.as_deref() {
            None => Ok(false),
            Some("OK") => Ok(true),
            Some(other) => Err(StoreError::UnexpectedReply(other.to_string())),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        self.set_conditional(key, value, "NX", ttl).await
    }

    async fn set_if_present(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        self.set_conditional(key, value, "XX", ttl).await
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut conn = self.get().await?;
        let added: i64 = conn.sadd(key, member).await.map_err(redis_error)?;
        Ok(added > 0)
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut conn = self.get().await?;
        let removed: i64 = conn.srem(key, member).await.map_err(redis_error)?;
        Ok(removed > 0)
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.get().await?;
        let members: Vec<String> = conn.smembers(key).await.map_err(redis_error)?;
        Ok(members)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.get().await?;
        let deleted: i64 = conn.del(key).await.map_err(redis_error)?;
        Ok(deleted > 0)
    }

    async fn publish(&self, topic: &str, payload: &str) -> StoreResult<u32> {
        let mut conn = self.get().await?;
        let receivers: u32 = conn.publish(topic, payload).await.map_err(redis_error)?;

        tracing::trace!(topic = %topic, receivers = receivers, "Published message");

        Ok(receivers)
    }

    async fn subscribe(&self, topic: &str) -> StoreResult<Box<dyn TopicSubscription>> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(redis_error)?;
        pubsub
            .subscribe(topic)
            .await
            .map_err(|e| StoreError::Subscription(e.to_string()))?;

        tracing::debug!(topic = %topic, "Subscribed to topic");

        Ok(Box::new(RedisSubscription {
            confirmed: Some(topic.to_string()),
            messages: pubsub.into_on_message().boxed(),
        }))
    }

    fn close(&self) {
        self.pool.close();
    }
}

/// Subscription on a dedicated Redis pub/sub connection
struct RedisSubscription {
    /// Topic whose confirmation has not been reported yet
    confirmed: Option<String>,
    messages: BoxStream<'static, redis::Msg>,
}

#[async_trait]
impl TopicSubscription for RedisSubscription {
    async fn next_event(&mut self) -> SubscriptionEvent {
        if let Some(topic) = self.confirmed.take() {
            return SubscriptionEvent::Subscribed(topic);
        }

        match self.messages.next().await {
            Some(msg) => match msg.get_payload::<String>() {
                Ok(payload) => SubscriptionEvent::Message(payload),
                Err(e) => SubscriptionEvent::Error(StoreError::Subscription(e.to_string())),
            },
            None => SubscriptionEvent::Error(StoreError::Closed),
        }
    }
}
