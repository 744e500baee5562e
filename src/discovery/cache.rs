// Time-bounded cache for discovery responses.
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            stored_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// Unbounded TTL map keyed by request content.
///
/// Expired entries read as misses but are not removed: the stale value must
/// stay reachable for fallback when a refresh fails, and is only replaced by
/// the next successful fetch. Entry count is bounded by the size of the
/// marketplace, so there is no eviction policy beyond that.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Non-expired read.
    pub fn get_fresh(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.data.clone())
    }

    /// Read ignoring expiry, for stale fallback.
    pub fn get_stale(&self, key: &str) -> Option<T> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    pub fn insert(&mut self, key: String, data: T) {
        self.entries.insert(key, CacheEntry::new(data));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
