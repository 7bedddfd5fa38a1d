//! Time-bounded read cache
//!
//! A value is served from the cache while `now - fetched_at < ttl` and
//! refetched after that. There is no invalidation on write: readers accept
//! staleness up to the TTL. Failed fetches are never cached, and an expired
//! entry is never served, not even when the refetch fails.
//!
//! Keys come from request input, so the map is bounded: every insert drops
//! expired entries, and a full cache evicts its oldest entry.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use dentdir_common::Clock;

/// Hub and listing aggregates (top cities, cities by state, related cities)
pub const AGGREGATE_TTL: Duration = Duration::from_secs(60 * 60);

/// Single-page lookups (by slug, by city/state)
pub const PAGE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Indexable page list consumed by the sitemap
pub const SITEMAP_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Entry limit of a cache built with [`TtlCache::new`]
pub const DEFAULT_MAX_ENTRIES: usize = 4_096;

struct CacheEntry<V> {
    value: V,
    fetched_at: DateTime<Utc>,
}

/// Key → (value, fetched_at) map with a fixed TTL and an injectable clock
pub struct TtlCache<K, V> {
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::with_max_entries(ttl, DEFAULT_MAX_ENTRIES, clock)
    }

    pub fn with_max_entries(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value for `key` if it is still fresh
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` as fetched now, dropping expired entries first
    pub fn insert(&self, key: K, value: V) {
        let fetched_at = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| self.is_fresh(entry, fetched_at));

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(key, CacheEntry { value, fetched_at });
    }

    /// Serve a fresh cached value, or run `fetch` and cache its success
    ///
    /// The lock is not held while `fetch` runs; concurrent misses on the same
    /// key may each fetch, and the last one to finish wins.
    pub async fn get_or_try_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        // A clock that moved backwards counts as expired
        match (now - entry.fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => false,
        }
    }
}
