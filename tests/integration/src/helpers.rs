//! Test helpers for integration tests
//!
//! Provides a capturable console, a handle for driving a running session,
//! and polling utilities.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use redchat_cache::{RedisStore, EVENT_CHANNEL_CAPACITY};
use redchat_client::{Session, SessionConfig, SessionError, SessionOutcome, TerminationReason};
use redchat_common::RedisConfig;
use redchat_core::{Identity, SharedStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How long helpers wait before giving up
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Console that can be read while a session writes to it
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Non-empty lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn contains_line(&self, expected: &str) -> bool {
        self.lines().iter().any(|line| line == expected)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session running on a background task
pub struct TestClient {
    pub identity: Identity,
    pub output: SharedBuffer,
    input: Option<mpsc::Sender<String>>,
    handle: JoinHandle<SessionOutcome<SharedBuffer>>,
}

impl TestClient {
    /// Start a session for `identity` and run it in the background
    pub async fn start(
        store: SharedStore,
        identity: Identity,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let output = SharedBuffer::new();

        let session = Session::start(store, identity.clone(), config, rx, output.clone()).await?;
        let handle = tokio::spawn(session.run());

        Ok(Self {
            identity,
            output,
            input: Some(tx),
            handle,
        })
    }

    /// Type a line into the session
    pub async fn type_line(&self, line: &str) {
        if let Some(input) = &self.input {
            input
                .send(line.to_string())
                .await
                .expect("session stopped reading input");
        }
    }

    /// Close the input stream without an `/exit`
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Wait until the console shows `expected` as a whole line
    pub async fn wait_for_line(&self, expected: &str) -> bool {
        let output = self.output.clone();
        wait_until(|| output.contains_line(expected)).await
    }

    /// Wait for the session to end on its own
    pub async fn finish(self) -> (TerminationReason, SharedBuffer) {
        let _input = self.input;
        let outcome = tokio::time::timeout(WAIT_TIMEOUT, self.handle)
            .await
            .expect("session did not end")
            .expect("session task panicked");
        (outcome.reason, outcome.output)
    }

    /// Send `/exit` and wait for the session to end
    pub async fn exit(self) -> (TerminationReason, SharedBuffer) {
        self.type_line("/exit").await;
        self.finish().await
    }
}

/// Poll `condition` until it holds or [`WAIT_TIMEOUT`] passes
pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Receive the next broadcast within [`WAIT_TIMEOUT`]
pub async fn next_broadcast(rx: &mut mpsc::Receiver<String>) -> Option<String> {
    tokio::time::timeout(WAIT_TIMEOUT, rx.recv()).await.ok().flatten()
}

/// Helper to check if a live Redis server is configured
pub fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Connect to the Redis server named by `REDIS_URL`
pub async fn redis_store() -> anyhow::Result<RedisStore> {
    let url = std::env::var("REDIS_URL")?;
    let store = RedisStore::from_config(&RedisConfig::new(url))?;
    store.health_check().await?;
    Ok(store)
}
