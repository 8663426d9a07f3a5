//! Generic TTL cache
//!
//! # Features
//!
//! - **Thread-safe**: `parking_lot::RwLock` around a `HashMap`
//! - **Two lifetimes**: a freshness TTL and a longer retention window for
//!   last-resort reads
//! - **Lazy expiry**: no background sweeper
//! - **Testable**: Clock abstraction for deterministic time-based testing
//!
//! # Example
//! ```
//! use std::time::Duration;
//!
//! use backoffice_common::cache::{Cache, CacheConfig, Freshness};
//!
//! let config = CacheConfig::builder()
//!     .ttl(Duration::from_secs(300))
//!     .extended_ttl(Duration::from_secs(600))
//!     .max_size(1000)
//!     .build();
//! let cache: Cache<String, Vec<u8>> = Cache::new(config);
//!
//! cache.insert("report".to_string(), vec![1, 2, 3]);
//! assert_eq!(cache.get_extended(&"report".to_string()), Some((vec![1, 2, 3], Freshness::Fresh)));
//! ```

mod config;
mod core;
mod stats;

pub use core::{Cache, Freshness};

pub use config::{CacheConfig, CacheConfigBuilder};
pub use stats::CacheStats;
