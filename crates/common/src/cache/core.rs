//! Thread-safe TTL cache with a stale-read window

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::config::CacheConfig;
use super::stats::{CacheStats, MetricsCollector};
use crate::resilience::{Clock, SystemClock};

/// Age class of an entry at lookup time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Younger than its TTL
    Fresh,
    /// Past its TTL but inside its extended TTL
    Stale,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
    extended_ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn classify(&self, now: Instant) -> Option<Freshness> {
        let age = now.saturating_duration_since(self.inserted_at);
        if age < self.ttl {
            Some(Freshness::Fresh)
        } else if age < self.extended_ttl {
            Some(Freshness::Stale)
        } else {
            None
        }
    }
}

/// Generic thread-safe cache with lazy TTL expiry
///
/// Expired entries are not swept in the background; a lookup that finds an
/// entry past its extended TTL removes it.
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use backoffice_common::cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, i32> = Cache::new(CacheConfig::ttl(Duration::from_secs(60)));
/// cache.insert("key".to_string(), 42);
/// assert_eq!(cache.get(&"key".to_string()), Some(42));
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create a cache driven by a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert with the configured default lifetimes
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.ttl, self.config.extended_ttl);
    }

    /// Insert with explicit lifetimes, replacing any existing entry
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration, extended_ttl: Duration) {
        let mut entries = self.entries.write();

        if let Some(max_size) = self.config.max_size {
            if entries.len() >= max_size && !entries.contains_key(&key) {
                self.evict_oldest(&mut entries);
            }
        }

        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
            ttl,
            extended_ttl: extended_ttl.max(ttl),
        };
        entries.insert(key, entry);

        if self.config.track_metrics {
            self.metrics.record_insert();
        }
    }

    /// Fresh value for `key`
    ///
    /// A stale entry is a miss here but stays available to `get_extended`.
    pub fn get(&self, key: &K) -> Option<V> {
        match self.lookup(key) {
            Some((value, Freshness::Fresh)) => {
                self.record(MetricsCollector::record_hit);
                Some(value)
            }
            _ => {
                self.record(MetricsCollector::record_miss);
                None
            }
        }
    }

    /// Value for `key` if it is fresh or stale
    pub fn get_extended(&self, key: &K) -> Option<(V, Freshness)> {
        let found = self.lookup(key);
        match &found {
            Some((_, Freshness::Fresh)) => self.record(MetricsCollector::record_hit),
            Some((_, Freshness::Stale)) => self.record(MetricsCollector::record_stale_hit),
            None => self.record(MetricsCollector::record_miss),
        }
        found
    }

    fn lookup(&self, key: &K) -> Option<(V, Freshness)> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            if let Some(freshness) = entry.classify(now) {
                return Some((entry.value.clone(), freshness));
            }
        }

        // Past its extended TTL: evict under the write lock, re-checking in
        // case a writer replaced it in between.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.classify(now).is_none()) {
            entries.remove(key);
            self.record(MetricsCollector::record_expiration);
        }
        None
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key).map(|entry| entry.value)
    }

    /// Remove every entry whose key matches `predicate`, returning how many
    /// were removed
    pub fn remove_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    /// Clear all entries and counters
    pub fn clear(&self) {
        self.entries.write().clear();
        self.metrics.reset();
    }

    /// Number of entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove entries past their extended TTL, returning how many were
    /// removed
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.classify(now).is_some());
        let removed = before - entries.len();
        for _ in 0..removed {
            self.record(MetricsCollector::record_expiration);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len(), self.config.max_size)
    }

    fn evict_oldest(&self, entries: &mut HashMap<K, CacheEntry<V>>) {
        let oldest =
            entries.iter().min_by_key(|(_, entry)| entry.inserted_at).map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            entries.remove(&key);
            self.record(MetricsCollector::record_eviction);
        }
    }

    fn record(&self, counter: fn(&MetricsCollector)) {
        if self.config.track_metrics {
            counter(&self.metrics);
        }
    }
}
