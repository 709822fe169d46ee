//! Ephemeral guest workspace cache.
//!
//! Guest content has no persistence guarantee across restarts; it lives
//! in this process-local cache until the guest upgrades and the
//! snapshot is migrated into durable storage. The cache is an explicit,
//! injected object with a defined TTL sweep, so production can swap in
//! a distributed cache and tests a deterministic one.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tessera_core::models::snapshot::GuestWorkspace;

struct CacheEntry {
    workspaces: Vec<GuestWorkspace>,
    expires_at: DateTime<Utc>,
}

/// In-process keyed store for guest workspace snapshots.
pub struct GuestWorkspaceCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl GuestWorkspaceCache {
    /// Entries expire `ttl_secs` after their last write.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store (or replace) a guest's workspaces, refreshing the TTL.
    pub fn put(&self, guest_id: &str, workspaces: Vec<GuestWorkspace>) {
        let entry = CacheEntry {
            workspaces,
            expires_at: Utc::now() + self.ttl,
        };
        self.entries.write().insert(guest_id.to_string(), entry);
    }

    /// The guest's workspaces, if present and not expired.
    pub fn get(&self, guest_id: &str) -> Option<Vec<GuestWorkspace>> {
        let entries = self.entries.read();
        let entry = entries.get(guest_id)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        Some(entry.workspaces.clone())
    }

    /// Drop a guest's entry (e.g. after a successful migration).
    pub fn remove(&self, guest_id: &str) -> Option<Vec<GuestWorkspace>> {
        self.entries
            .write()
            .remove(guest_id)
            .map(|entry| entry.workspaces)
    }

    /// Remove all expired entries. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
