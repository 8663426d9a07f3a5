//! Response cache keyed by query shape
//!
//! Keys look like `invoices|GET|/invoices?page=2`, so a family's namespace is
//! every key starting with `invoices|`.

use std::time::Duration;

use backoffice_common::cache::{Cache, CacheConfig, CacheStats, Freshness};
use backoffice_common::Clock;
use backoffice_domain::{Operation, Payload, ResourceFamily, ResponseShape};
use tracing::debug;

/// Cache key for an operation, `None` when the operation is not cacheable
/// (mutations and binary documents)
pub fn cache_key(family: &ResourceFamily, operation: &Operation) -> Option<String> {
    if operation.is_mutation() || operation.shape == ResponseShape::Binary {
        None
    } else {
        Some(operation.cache_key(family.as_str()))
    }
}

/// Session-scoped cache of successful read payloads
pub struct ResponseCache<C: Clock> {
    inner: Cache<String, Payload, C>,
}

impl<C: Clock> ResponseCache<C> {
    pub fn new(max_entries: usize, clock: C) -> Self {
        let config = CacheConfig::builder().max_size(max_entries).track_metrics(true).build();
        Self { inner: Cache::with_clock(config, clock) }
    }

    /// Fresh payload for `key`
    pub fn get(&self, key: &str) -> Option<Payload> {
        let hit = self.inner.get(&key.to_string());
        debug!(key, hit = hit.is_some(), "cache lookup");
        hit
    }

    /// Payload for `key` within the extended TTL, the last resort after a
    /// failed re-fetch
    pub fn get_extended(&self, key: &str) -> Option<(Payload, Freshness)> {
        self.inner.get_extended(&key.to_string())
    }

    /// Store a payload. `extended_ttl` shorter than `ttl` is raised to `ttl`.
    pub fn put(&self, key: String, payload: Payload, ttl: Duration, extended_ttl: Duration) {
        self.inner.insert_with_ttl(key, payload, ttl, extended_ttl);
    }

    pub fn invalidate(&self, key: &str) {
        self.inner.remove(&key.to_string());
    }

    /// Drop every entry of a family, returning how many were dropped
    pub fn invalidate_family(&self, family: &ResourceFamily) -> usize {
        let prefix = format!("{family}|");
        let removed = self.inner.remove_where(|key| key.starts_with(&prefix));
        debug!(family = %family, removed, "invalidated family cache namespace");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

#[cfg(test)]
mod tests {
    use backoffice_common::MockClock;
    use serde_json::json;

    use super::*;

    const TTL: Duration = Duration::from_secs(300);
    const EXTENDED: Duration = Duration::from_secs(600);

    fn cache() -> (ResponseCache<MockClock>, MockClock) {
        let clock = MockClock::new();
        (ResponseCache::new(64, clock.clone()), clock)
    }

    #[test]
    fn test_hit_before_ttl_miss_at_ttl() {
        let (cache, clock) = cache();
        let key = cache_key(&ResourceFamily::invoices(), &Operation::get("/invoices")).unwrap();
        cache.put(key.clone(), Payload::Json(json!([1])), TTL, EXTENDED);

        clock.advance(TTL - Duration::from_millis(1));
        assert!(cache.get(&key).is_some());

        clock.advance(Duration::from_millis(1));
        assert!(cache.get(&key).is_none());
        assert!(matches!(cache.get_extended(&key), Some((_, Freshness::Stale))));
    }

    #[test]
    fn test_invalidate_family_spares_other_families() {
        let (cache, _) = cache();
        let payload = Payload::Json(json!([]));
        cache.put("invoices|GET|/invoices".into(), payload.clone(), TTL, EXTENDED);
        cache.put("invoices|GET|/invoices/7".into(), payload.clone(), TTL, EXTENDED);
        cache.put("invoices_archive|GET|/archive".into(), payload.clone(), TTL, EXTENDED);
        cache.put("products|GET|/products".into(), payload, TTL, EXTENDED);

        assert_eq!(cache.invalidate_family(&ResourceFamily::invoices()), 2);
        assert!(cache.get("products|GET|/products").is_some());
        assert!(cache.get("invoices_archive|GET|/archive").is_some());
    }

    #[test]
    fn test_mutations_and_documents_are_not_cacheable() {
        let family = ResourceFamily::invoices();
        assert!(cache_key(&family, &Operation::delete("/invoices/1")).is_none());
        assert!(cache_key(&family, &Operation::document("/invoices/1/pdf")).is_none());
    }

    #[test]
    fn test_invalidate_single_key() {
        let (cache, _) = cache();
        cache.put("products|GET|/products".into(), Payload::Json(json!([])), TTL, EXTENDED);
        cache.invalidate("products|GET|/products");
        assert!(cache.get_extended("products|GET|/products").is_none());
    }
}
