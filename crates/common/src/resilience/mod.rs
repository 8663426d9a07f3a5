//! Resilience primitives
//!
//! - **Clock**: monotonic and wall time behind a trait so TTLs and
//!   availability timestamps can be driven by `MockClock` in tests
//! - **Retry**: bounded attempts with fixed or linear backoff, plus an async
//!   executor that sleeps between attempts
//!
//! Failover across candidates is not here; it is a gateway concern and
//! lives in `backoffice-core`.

pub mod clock;
pub mod retry;

pub use clock::{Clock, MockClock, SystemClock};
#[cfg(feature = "runtime")]
pub use retry::retry_with_policy;
pub use retry::{BackoffStrategy, RetryConfig, RetryDecision, RetryError, RetryOutcome};
