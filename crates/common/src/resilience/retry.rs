//! Bounded retry with fixed or linear backoff
//!
//! The policy answers one question: after attempt `n` failed, should there
//! be another attempt and how long to wait first. Which errors are worth
//! retrying is decided by the caller.

use std::fmt;
#[cfg(feature = "runtime")]
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while validating a retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Linear backoff: `initial_delay + attempt * increment`
    Linear { initial_delay: Duration, increment: Duration },
}

impl BackoffStrategy {
    /// `attempt * step`: 1s, 2s, 3s... for a one second step
    pub fn linear(step: Duration) -> Self {
        Self::Linear { initial_delay: Duration::ZERO, increment: step }
    }

    /// Delay before the attempt following failed attempt number `attempt`
    /// (1-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Linear { initial_delay, increment } => {
                *initial_delay + increment.saturating_mul(attempt)
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(1))
    }
}

impl RetryConfig {
    pub fn linear(max_attempts: u32, step: Duration) -> Self {
        Self { max_attempts, backoff: BackoffStrategy::linear(step) }
    }

    /// A single attempt, never retried
    pub fn once() -> Self {
        Self { max_attempts: 1, backoff: BackoffStrategy::Fixed(Duration::ZERO) }
    }

    /// # Errors
    /// Fails when `max_attempts` is zero.
    pub fn validate(&self) -> Result<(), RetryError> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Decide what happens after attempt number `attempt` (1-based) failed
    pub fn decide(&self, attempt: u32, retryable: bool) -> RetryDecision {
        if !retryable || attempt >= self.max_attempts {
            RetryDecision::Stop
        } else {
            RetryDecision::RetryAfter(self.backoff.calculate_delay(attempt))
        }
    }
}

/// Outcome of a retry execution including summary statistics
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    /// Attempts actually made
    pub attempts: u32,
    /// Time spent sleeping between attempts
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl<T, E: fmt::Display> fmt::Display for RetryOutcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(_) => write!(f, "succeeded after {} attempt(s)", self.attempts),
            Err(e) => write!(f, "failed after {} attempt(s): {e}", self.attempts),
        }
    }
}

/// Run `operation` until it succeeds, returns a non-retryable error, or
/// `config.max_attempts` attempts were made.
///
/// `operation` receives the 1-based attempt number.
#[cfg(feature = "runtime")]
pub async fn retry_with_policy<T, E, F, Fut, P>(
    config: &RetryConfig,
    mut operation: F,
    is_retryable: P,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display,
{
    let mut attempt = 0;
    let mut total_delay = Duration::ZERO;

    loop {
        attempt += 1;
        let error = match operation(attempt).await {
            Ok(value) => return RetryOutcome { result: Ok(value), attempts: attempt, total_delay },
            Err(error) => error,
        };

        match config.decide(attempt, is_retryable(&error)) {
            RetryDecision::Stop => {
                return RetryOutcome { result: Err(error), attempts: attempt, total_delay };
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                total_delay += delay;
            }
        }
    }
}
