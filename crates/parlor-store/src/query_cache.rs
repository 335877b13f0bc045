//! Time-bounded cache for assembled query results.
//!
//! Entries expire a fixed interval after insertion and are dropped lazily on
//! the next lookup, or in bulk by [`QueryCache::purge_expired`]. Values are
//! handed out behind [`Arc`] so hits never clone the payload.

use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

/// Keyed cache with a single time-to-live for every entry.
pub struct QueryCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash,
{
    /// Entries outlive their insertion by this long unless invalidated.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    /// Cache with the default time-to-live.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    /// Cache with a caller-chosen time-to-live.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fetch a live entry, dropping it instead if its time is up.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let hit = {
            let entry = self.entries.get(key)?;
            if Instant::now() < entry.expires_at {
                Some(Arc::clone(&entry.value))
            } else {
                None
            }
        };
        if hit.is_none() {
            self.entries
                .remove_if(key, |_, entry| Instant::now() >= entry.expires_at);
        }
        hit
    }

    /// Serve from cache or compute, store, and serve.
    ///
    /// A compute error propagates to the caller and caches nothing, so the
    /// next lookup retries. Concurrent misses on one key may each compute;
    /// the last finisher's value stays.
    pub async fn get_with<F, Fut, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = Arc::new(compute().await?);
        self.entries.insert(
            key,
            CacheEntry {
                value: Arc::clone(&value),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(value)
    }

    /// Drop one entry ahead of its expiry. Returns whether one was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Sweep out every expired entry and report how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            if now < entry.expires_at {
                true
            } else {
                removed += 1;
                false
            }
        });
        if removed > 0 {
            debug!(removed, "dropped expired cache entries");
        }
        removed
    }

    /// Number of entries currently held, live or not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
