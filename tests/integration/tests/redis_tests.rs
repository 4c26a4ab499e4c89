//! Redis Integration Tests
//!
//! These tests require:
//! - Running Redis instance
//! - Environment variable: REDIS_URL
//!
//! Every test uses identities unique to the run, so they can share a server.
//!
//! Run with: cargo test -p integration-tests --test redis_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::{
    check_test_env, fast_config, next_broadcast, quick_heartbeat_config, redis_store,
    unique_identity, TestClient,
};
use redchat_cache::{PresenceStore, Publisher, Subscriber, ONLINE_SET_KEY};
use redchat_client::{SessionError, TerminationReason};
use redchat_common::PRESENCE_TTL;
use redchat_core::{BroadcastMessage, KeyValueStore, SharedStore};

async fn shared_store() -> SharedStore {
    Arc::new(redis_store().await.expect("Failed to connect to Redis"))
}

// ============================================================================
// Store
// ============================================================================

#[tokio::test]
async fn test_conditional_sets() {
    if !check_test_env() {
        return;
    }

    let store = redis_store().await.unwrap();
    let key = unique_identity("cond").presence_key();

    assert!(!store.set_if_present(&key, "v", PRESENCE_TTL).await.unwrap());
    assert!(store.set_if_absent(&key, "v", PRESENCE_TTL).await.unwrap());
    assert!(!store.set_if_absent(&key, "other", PRESENCE_TTL).await.unwrap());
    assert!(store.set_if_present(&key, "v", PRESENCE_TTL).await.unwrap());

    assert!(store.delete(&key).await.unwrap());
    assert!(!store.delete(&key).await.unwrap());
}

#[tokio::test]
async fn test_record_expires() {
    if !check_test_env() {
        return;
    }

    let store = redis_store().await.unwrap();
    let key = unique_identity("expiry").presence_key();

    assert!(store.set_if_absent(&key, "v", Duration::from_secs(1)).await.unwrap());
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!store.set_if_present(&key, "v", PRESENCE_TTL).await.unwrap());
}

#[tokio::test]
async fn test_publish_subscribe() {
    if !check_test_env() {
        return;
    }

    let store = shared_store().await;
    let topic = format!("{}.topic", unique_identity("pubsub"));
    let mut rx = Subscriber::new(topic.clone()).start(&store).await;

    let publisher = Publisher::with_topic(store.clone(), topic);
    let alice = unique_identity("alice");
    let receivers = publisher
        .publish(&BroadcastMessage::chat(&alice, "hello"))
        .await
        .unwrap();
    assert_eq!(receivers, 1);

    assert_eq!(
        next_broadcast(&mut rx).await,
        Some(format!("{alice}: hello"))
    );
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_presence_lifecycle() {
    if !check_test_env() {
        return;
    }

    let store = shared_store().await;
    let presence = PresenceStore::new(store.clone(), PRESENCE_TTL);
    let alice = unique_identity("alice");

    assert!(presence.claim_identity(&alice).await.unwrap());
    assert!(!presence.claim_identity(&alice).await.unwrap());
    assert!(presence.join_online_set(&alice).await.unwrap());
    assert!(presence.heartbeat(&alice).await.unwrap());
    assert!(presence
        .list_online()
        .await
        .unwrap()
        .contains(&alice.to_string()));

    presence.release(&alice).await;
    assert!(!presence.heartbeat(&alice).await.unwrap());
    assert!(!store
        .set_members(ONLINE_SET_KEY)
        .await
        .unwrap()
        .contains(&alice.to_string()));
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_two_sessions_chat() {
    if !check_test_env() {
        return;
    }

    let alice_id = unique_identity("alice");
    let bob_id = unique_identity("bob");

    let alice = TestClient::start(shared_store().await, alice_id.clone(), fast_config())
        .await
        .unwrap();
    let bob = TestClient::start(shared_store().await, bob_id.clone(), fast_config())
        .await
        .unwrap();

    assert!(alice.wait_for_line(&format!("{bob_id} has joined")).await);

    alice.type_line("hello").await;
    assert!(bob.wait_for_line(&format!("{alice_id}: hello")).await);

    bob.type_line("/who").await;
    assert!(bob.wait_for_line(alice_id.as_str()).await);

    let (reason, alice_out) = alice.exit().await;
    assert_eq!(reason, TerminationReason::ExitCommand);
    assert!(!alice_out.contains_line(&format!("{alice_id}: hello")));

    assert!(bob.wait_for_line(&format!("{alice_id} has left")).await);
    bob.exit().await;
}

#[tokio::test]
async fn test_duplicate_identity_rejected() {
    if !check_test_env() {
        return;
    }

    let alice_id = unique_identity("alice");
    let alice = TestClient::start(shared_store().await, alice_id.clone(), fast_config())
        .await
        .unwrap();

    let second = TestClient::start(shared_store().await, alice_id, fast_config()).await;
    assert!(matches!(second, Err(SessionError::IdentityTaken(_))));

    alice.exit().await;
}

#[tokio::test]
async fn test_heartbeat_failure() {
    if !check_test_env() {
        return;
    }

    let store = shared_store().await;
    let alice_id = unique_identity("alice");
    let alice = TestClient::start(shared_store().await, alice_id.clone(), quick_heartbeat_config())
        .await
        .unwrap();

    store.delete(&alice_id.presence_key()).await.unwrap();
    let (reason, output) = alice.finish().await;

    assert_eq!(reason, TerminationReason::HeartbeatFailed);
    assert!(output.contains_line("Heartbeat set failed"));
}
