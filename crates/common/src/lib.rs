//! Generic building blocks shared across the backoffice crates.
//!
//! Nothing in here knows about resource families or backends. The gateway
//! composes these pieces in `backoffice-core`.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: clock abstraction, backoff arithmetic, TTL cache
//! - `observability`: tracing of retry decisions
//! - `runtime`: async retry execution on tokio

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod cache;
#[cfg(feature = "foundation")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use cache::{Cache, CacheConfig, CacheConfigBuilder, CacheStats, Freshness};
#[cfg(feature = "runtime")]
pub use resilience::retry_with_policy;
#[cfg(feature = "foundation")]
pub use resilience::{
    BackoffStrategy, Clock, MockClock, RetryConfig, RetryDecision, RetryOutcome, SystemClock,
};
