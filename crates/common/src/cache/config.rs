//! Cache configuration types and builder

use std::time::Duration;

/// Configuration for cache behavior
///
/// Entries have two lifetimes. Within `ttl` they are fresh and returned by
/// `Cache::get`. Between `ttl` and `extended_ttl` they are stale: kept, and
/// readable only through `Cache::get_extended`. Past `extended_ttl` they are
/// evicted on the next lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries (None = unlimited). The oldest insertion is
    /// evicted first.
    pub max_size: Option<usize>,

    /// Default freshness window
    pub ttl: Duration,

    /// Default retention window, never shorter than `ttl`
    pub extended_ttl: Duration,

    /// Whether to collect hit/miss counters
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            ttl: Duration::from_secs(300),
            extended_ttl: Duration::from_secs(600),
            track_metrics: true,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Entries live for `ttl` and are evicted as soon as they go stale
    pub fn ttl(ttl: Duration) -> Self {
        Self { ttl, extended_ttl: ttl, ..Self::default() }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = Some(size);
        self
    }

    pub fn ttl(mut self, duration: Duration) -> Self {
        self.config.ttl = duration;
        self
    }

    pub fn extended_ttl(mut self, duration: Duration) -> Self {
        self.config.extended_ttl = duration;
        self
    }

    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration. An extended TTL shorter than the TTL is
    /// raised to match it.
    pub fn build(mut self) -> CacheConfig {
        if self.config.extended_ttl < self.config.ttl {
            self.config.extended_ttl = self.config.ttl;
        }
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let config = CacheConfig::builder()
            .max_size(10)
            .ttl(Duration::from_secs(30))
            .extended_ttl(Duration::from_secs(90))
            .track_metrics(false)
            .build();

        assert_eq!(config.max_size, Some(10));
        assert_eq!(config.ttl, Duration::from_secs(30));
        assert_eq!(config.extended_ttl, Duration::from_secs(90));
        assert!(!config.track_metrics);
    }

    #[test]
    fn test_extended_ttl_never_below_ttl() {
        let config = CacheConfig::builder()
            .ttl(Duration::from_secs(60))
            .extended_ttl(Duration::from_secs(10))
            .build();
        assert_eq!(config.extended_ttl, Duration::from_secs(60));
    }
}
