//! Identity lock and online set.
//!
//! An identity is claimed by creating `online.<identity>` with an expiry,
//! only if the key is absent. The owner keeps it alive by refreshing the
//! expiry, only if the key is still present. Every claimed identity is also
//! added to the `users` set, which has no expiry: a session that crashes
//! leaves its name in the set after its presence record has expired.

use redchat_core::{Identity, SharedStore, StoreResult};
use std::time::Duration;

/// Key of the set holding every online identity
pub const ONLINE_SET_KEY: &str = "users";

/// Presence store client
#[derive(Clone)]
pub struct PresenceStore {
    store: SharedStore,
    ttl: Duration,
}

impl PresenceStore {
    /// Create a presence store whose records live for `ttl` without a heartbeat
    #[must_use]
    pub fn new(store: SharedStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Claim the identity lock.
    ///
    /// Returns `false` if another session holds it.
    pub async fn claim_identity(&self, identity: &Identity) -> StoreResult<bool> {
        let claimed = self
            .store
            .set_if_absent(&identity.presence_key(), identity.as_str(), self.ttl)
            .await?;

        tracing::debug!(identity = %identity, claimed, "Claim identity");

        Ok(claimed)
    }

    /// Add the identity to the online set.
    ///
    /// Returns `false` if it was already a member, which means a stale entry
    /// from an earlier session.
    pub async fn join_online_set(&self, identity: &Identity) -> StoreResult<bool> {
        let added = self
            .store
            .set_add(ONLINE_SET_KEY, identity.as_str())
            .await?;

        tracing::debug!(identity = %identity, added, "Join online set");

        Ok(added)
    }

    /// Refresh the expiry of the identity lock.
    ///
    /// Returns `false` if the lock has expired or was removed, in which case
    /// another session may already own the identity.
    pub async fn heartbeat(&self, identity: &Identity) -> StoreResult<bool> {
        let refreshed = self
            .store
            .set_if_present(&identity.presence_key(), identity.as_str(), self.ttl)
            .await?;

        tracing::trace!(identity = %identity, refreshed, "Heartbeat");

        Ok(refreshed)
    }

    /// Snapshot of the online set, sorted. May include stale identities.
    pub async fn list_online(&self) -> StoreResult<Vec<String>> {
        let mut names = self.store.set_members(ONLINE_SET_KEY).await?;
        names.sort_unstable();
        Ok(names)
    }

    /// Drop the identity lock and leave the online set.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn release(&self, identity: &Identity) {
        if let Err(e) = self.store.delete(&identity.presence_key()).await {
            tracing::warn!(identity = %identity, error = %e, "Failed to delete presence record");
        }
        if let Err(e) = self.store.set_remove(ONLINE_SET_KEY, identity.as_str()).await {
            tracing::warn!(identity = %identity, error = %e, "Failed to leave online set");
        }

        tracing::debug!(identity = %identity, "Released identity");
    }
}
