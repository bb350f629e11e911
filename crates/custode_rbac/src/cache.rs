//! Resolved-permission-set cache.

use custode_core::Permission;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache entry with expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    permissions: HashSet<Permission>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(permissions: HashSet<Permission>, ttl: Duration) -> Self {
        Self {
            permissions,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Hit/miss counters for monitoring.
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Entries removed by invalidation or expiry
    pub evictions: u64,
}

/// Sharded TTL cache of resolved permission sets keyed by `(user, tenant)`.
///
/// Entries are removed synchronously on assignment changes; the TTL is a
/// backstop, not the invalidation mechanism.
#[derive(Debug)]
pub struct PermissionCache {
    entries: DashMap<(u64, u64), CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PermissionCache {
    /// Create a cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Fetch the cached set for `(user, tenant)`, dropping expired entries.
    pub fn get(&self, user_id: u64, tenant_id: u64) -> Option<HashSet<Permission>> {
        let key = (user_id, tenant_id);
        if let Some(entry) = self.entries.get(&key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(user_id, tenant_id, "Permission cache hit");
                return Some(entry.permissions.clone());
            }
            drop(entry);
            self.entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(user_id, tenant_id, "Permission cache miss");
        None
    }

    /// Cache a resolved set.
    pub fn insert(&self, user_id: u64, tenant_id: u64, permissions: HashSet<Permission>) {
        self.entries
            .insert((user_id, tenant_id), CacheEntry::new(permissions, self.ttl));
    }

    /// Drop the entry for `(user, tenant)`. Called synchronously from
    /// assign/revoke so the next check observes the change.
    pub fn invalidate(&self, user_id: u64, tenant_id: u64) {
        if self.entries.remove(&(user_id, tenant_id)).is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(user_id, tenant_id, "Invalidated permission cache entry");
        }
    }

    /// Drop every entry. Used when a role definition changes, which can
    /// affect any user holding it.
    pub fn clear(&self) {
        let count = self.entries.len() as u64;
        self.entries.clear();
        self.evictions.fetch_add(count, Ordering::Relaxed);
        debug!(cleared = count, "Cleared permission cache");
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
