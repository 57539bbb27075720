//! Explicit TTL cache for expensive detector resources.
//!
//! Detection backends tend to hold costly handles (loaded models, sessions)
//! keyed by path or name. This cache makes the freshness rule explicit:
//! entries expire after a fixed time-to-live and are dropped on access.
//! Construct one and pass it by reference to the consumers that need it;
//! it is not a global.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    /// Create a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Look up a key, dropping the entry first if it has expired.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self
            .entries
            .get(key)
            .is_some_and(|entry| entry.inserted_at.elapsed() >= self.ttl)
        {
            self.entries.remove(key);
            debug!("cache entry expired");
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Insert a value, replacing any previous entry for the key.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Fetch the fresh value for a key, building it with `init` if the entry
    /// is missing or expired.
    pub fn get_or_insert_with(&mut self, key: K, init: impl FnOnce() -> V) -> &V {
        if self
            .entries
            .get(&key)
            .is_some_and(|entry| entry.inserted_at.elapsed() >= self.ttl)
        {
            self.entries.remove(&key);
        }
        &self
            .entries
            .entry(key)
            .or_insert_with(|| CacheEntry {
                value: init(),
                inserted_at: Instant::now(),
            })
            .value
    }

    /// Drop every expired entry.
    pub fn evict_expired(&mut self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
