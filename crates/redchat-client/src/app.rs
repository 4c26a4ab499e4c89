//! Client bootstrap: connect, start the session, run it to completion.

use crate::input::InputReader;
use crate::session::{Session, SessionConfig, TerminationReason};
use redchat_cache::RedisStore;
use redchat_common::{AppResult, ClientConfig};
use redchat_core::SharedStore;
use std::sync::Arc;

/// Run one chat session against the configured Redis server
pub async fn run(config: ClientConfig) -> AppResult<TerminationReason> {
    tracing::info!(url = %config.redis.redacted_url(), identity = %config.identity, "Connecting");

    let redis = RedisStore::from_config(&config.redis)?;
    redis.health_check().await?;
    let store: SharedStore = Arc::new(redis);

    let input = InputReader::stdin().exit_on_interrupt().spawn();

    let session = Session::start(
        store,
        config.identity.clone(),
        SessionConfig::from(&config),
        input,
        std::io::stdout(),
    )
    .await?;

    let outcome = session.run().await;
    Ok(outcome.reason)
}
