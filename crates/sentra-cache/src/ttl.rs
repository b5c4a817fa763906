//! Generic TTL + LRU cache.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

// ============================================================================
// Categories
// ============================================================================

/// Lookup categories with independent time-to-live budgets.
///
/// TTLs reflect how quickly each kind of fact goes stale: org structure
/// moves slowly, policy outcomes must track rule reloads closely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    EmployeeContext,
    PolicyResult,
    Relationship,
    ResourceAccess,
}

impl CacheCategory {
    pub fn ttl(self) -> Duration {
        match self {
            CacheCategory::EmployeeContext => Duration::from_secs(300),
            CacheCategory::PolicyResult => Duration::from_secs(60),
            CacheCategory::Relationship => Duration::from_secs(180),
            CacheCategory::ResourceAccess => Duration::from_secs(120),
        }
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Point-in-time counters for one cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate in percent, 0.0 when nothing has been requested yet.
    pub fn hit_rate_percent(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

// ============================================================================
// TtlCache
// ============================================================================

struct Entry<V> {
    value: V,
    expires_at: Instant,
    last_access: Instant,
}

/// Bounded map with lazy TTL expiry and true-LRU eviction.
///
/// Writes are replace-only: `set` on an existing key swaps the whole entry,
/// never patches it, so a reader can never observe a half-updated value.
pub struct TtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    max_size: usize,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    /// Creates a cache holding at most `max_size` live entries.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "cache capacity must be non-zero");
        Self {
            entries: HashMap::with_capacity(max_size),
            max_size,
            hits: 0,
            misses: 0,
        }
    }

    /// Looks up `key`, refreshing its access time on a hit.
    ///
    /// An entry past its expiry is deleted here and counted as a miss.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(entry) if now < entry.expires_at => {
                entry.last_access = now;
                self.hits += 1;
                Some(entry.value.clone())
            }
            Some(_) => {
                // Lazy expiry: drop on read.
                self.entries.remove(key);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Inserts or replaces `key`, evicting the least-recently-accessed
    /// entry first when the cache is full and the key is new.
    pub fn set(&mut self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        if self.entries.len() >= self.max_size && !self.entries.contains_key(&key) {
            self.evict_lru();
        }
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
                last_access: now,
            },
        );
    }

    /// Removes `key` if present, returning whether anything was dropped.
    pub fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Sweeps all expired entries, returning how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn evict_lru(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            tracing::debug!("evicting least-recently-used cache entry");
            self.entries.remove(&key);
        }
    }
}
