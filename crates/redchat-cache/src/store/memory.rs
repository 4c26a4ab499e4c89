//! In-memory store.
//!
//! A process-local backend with the same atomicity contract as Redis: every
//! conditional operation runs under a single lock, expiry is checked on
//! read, and pub/sub fans out through a broadcast channel per topic.
//!
//! Several [`MemoryStore`] handles can share one backend (see
//! [`MemoryStore::connect`]), each standing in for a separate client
//! connection. Closing a handle only affects that handle.

use async_trait::async_trait;
use parking_lot::Mutex;
use redchat_core::{KeyValueStore, StoreError, StoreResult, SubscriptionEvent, TopicSubscription};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Buffered messages per topic before a slow subscriber lags
const TOPIC_BUFFER: usize = 256;

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Default)]
struct Data {
    keys: HashMap<String, Entry>,
    sets: HashMap<String, HashSet<String>>,
}

impl Data {
    /// Drop `key` if it has expired, then report whether it is live
    fn purge_expired(&mut self, key: &str, now: Instant) -> bool {
        match self.keys.get(key) {
            Some(entry) if entry.is_live(now) => true,
            Some(_) => {
                self.keys.remove(key);
                false
            }
            None => false,
        }
    }
}

#[derive(Default)]
struct Backend {
    data: Mutex<Data>,
    topics: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

/// Handle to an in-memory store
pub struct MemoryStore {
    backend: Arc<Backend>,
    closed: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create a store with a fresh, empty backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: Arc::new(Backend::default()),
            closed: AtomicBool::new(false),
        }
    }

    /// Open another handle on the same backend
    #[must_use]
    pub fn connect(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            closed: AtomicBool::new(false),
        }
    }

    /// Check if this handle has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Read a live key
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut data = self.backend.data.lock();
        if data.purge_expired(key, now) {
            data.keys.get(key).map(|entry| entry.value.clone())
        } else {
            None
        }
    }

    /// Remaining lifetime of a live key
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let mut data = self.backend.data.lock();
        if data.purge_expired(key, now) {
            data.keys.get(key).map(|entry| entry.expires_at - now)
        } else {
            None
        }
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    fn topic_sender(&self, topic: &str) -> broadcast::Sender<String> {
        self.backend
            .topics
            .lock()
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_BUFFER).0)
            .clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut data = self.backend.data.lock();
        if data.purge_expired(key, now) {
            return Ok(false);
        }
        data.keys.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn set_if_present(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<bool> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut data = self.backend.data.lock();
        if !data.purge_expired(key, now) {
            return Ok(false);
        }
        data.keys.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let mut data = self.backend.data.lock();
        Ok(data
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let mut data = self.backend.data.lock();
        let removed = match data.sets.get_mut(key) {
            Some(set) => set.remove(member),
            None => false,
        };
        // Redis deletes empty sets
        if data.sets.get(key).is_some_and(HashSet::is_empty) {
            data.sets.remove(key);
        }
        Ok(removed)
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        self.ensure_open()?;
        let data = self.backend.data.lock();
        Ok(data
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut data = self.backend.data.lock();
        let live = data.purge_expired(key, now);
        data.keys.remove(key);
        Ok(live || data.sets.remove(key).is_some())
    }

    async fn publish(&self, topic: &str, payload: &str) -> StoreResult<u32> {
        self.ensure_open()?;
        let receivers = match self.backend.topics.lock().get(topic) {
            Some(sender) => sender.send(payload.to_string()).unwrap_or(0),
            None => 0,
        };
        Ok(u32::try_from(receivers).unwrap_or(u32::MAX))
    }

    async fn subscribe(&self, topic: &str) -> StoreResult<Box<dyn TopicSubscription>> {
        self.ensure_open()?;
        let receiver = self.topic_sender(topic).subscribe();
        Ok(Box::new(MemorySubscription {
            confirmed: Some(topic.to_string()),
            receiver,
        }))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

struct MemorySubscription {
    confirmed: Option<String>,
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl TopicSubscription for MemorySubscription {
    async fn next_event(&mut self) -> SubscriptionEvent {
        if let Some(topic) = self.confirmed.take() {
            return SubscriptionEvent::Subscribed(topic);
        }

        match self.receiver.recv().await {
            Ok(payload) => SubscriptionEvent::Message(payload),
            Err(broadcast::error::RecvError::Lagged(skipped)) => SubscriptionEvent::Error(
                StoreError::Subscription(format!("subscriber lagged by {skipped} messages")),
            ),
            Err(broadcast::error::RecvError::Closed) => SubscriptionEvent::Error(StoreError::Closed),
        }
    }
}
