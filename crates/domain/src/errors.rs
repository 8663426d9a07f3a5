//! Error types used throughout the gateway

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::HttpMethod;

/// Categories of gateway errors for failover decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No transport-level connection (connection refused, DNS, reset)
    Network,
    /// Attempt exceeded its per-attempt timeout
    Timeout,
    /// 4xx - the caller's request was invalid, never masked by fallback
    Client,
    /// 5xx or unparseable body - this candidate is unhealthy
    Server,
    /// Every candidate failed
    Exhausted,
    /// Configuration or bootstrap problem
    Config,
    /// Durable offline store could not be read or written
    Persistence,
    /// Caller abandoned the call
    Cancelled,
}

/// Main error type for the gateway
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum GatewayError {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Request rejected with status {status}: {message}")]
    ClientRejected { status: u16, message: String },

    #[error("Server fault with status {status}: {message}")]
    ServerFault { status: u16, message: String },

    #[error("All {attempts} candidate(s) for '{family}' failed")]
    AllCandidatesExhausted { family: String, attempts: usize },

    #[error("Response did not match expected shape: {0}")]
    ParseFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Offline store error: {0}")]
    Persistence(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NetworkUnavailable(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::ClientRejected { .. } => ErrorCategory::Client,
            Self::ServerFault { .. } | Self::ParseFailure(_) => ErrorCategory::Server,
            Self::AllCandidatesExhausted { .. } => ErrorCategory::Exhausted,
            Self::Config(_) => ErrorCategory::Config,
            Self::Persistence(_) => ErrorCategory::Persistence,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether another attempt against the *same* candidate may succeed.
    ///
    /// Reads retry on network failures, timeouts and gateway-class statuses
    /// (502/503/504). Writes retry only when the request never reached a
    /// server, so a mutation is never submitted twice.
    pub fn is_retryable_for(&self, method: HttpMethod) -> bool {
        match self {
            Self::NetworkUnavailable(_) => true,
            Self::Timeout(_) => method.is_safe(),
            Self::ServerFault { status, .. } => {
                method.is_safe() && is_gateway_status(*status)
            }
            _ => false,
        }
    }

    /// Whether the gateway may absorb this error and try the next candidate
    /// without reporting it to the caller.
    pub fn is_absorbed_by_failover(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ClientRejected { status, .. } | Self::ServerFault { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build the error matching an HTTP status outside the 2xx range.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            Self::ClientRejected { status, message }
        } else {
            Self::ServerFault { status, message }
        }
    }
}

/// 502, 503 and 504 are produced by proxies in front of a backend and are
/// transient by nature.
fn is_gateway_status(status: u16) -> bool {
    matches!(status, 502..=504)
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            GatewayError::NetworkUnavailable("refused".into()).category(),
            ErrorCategory::Network
        );
        assert_eq!(GatewayError::ParseFailure("bad".into()).category(), ErrorCategory::Server);
        assert_eq!(GatewayError::from_status(404, "gone").category(), ErrorCategory::Client);
        assert_eq!(GatewayError::from_status(500, "boom").category(), ErrorCategory::Server);
    }

    #[test]
    fn test_terminal_statuses_never_retry() {
        for status in [400, 401, 404, 409, 422, 500, 501] {
            let err = GatewayError::from_status(status, "x");
            assert!(!err.is_retryable_for(HttpMethod::Get), "status {status} should be terminal");
        }
    }

    #[test]
    fn test_gateway_statuses_retry_reads_only() {
        let err = GatewayError::from_status(504, "upstream timeout");
        assert!(err.is_retryable_for(HttpMethod::Get));
        assert!(!err.is_retryable_for(HttpMethod::Post));
        assert!(!err.is_retryable_for(HttpMethod::Delete));
    }

    #[test]
    fn test_connection_failures_retry_writes() {
        let err = GatewayError::NetworkUnavailable("connection refused".into());
        assert!(err.is_retryable_for(HttpMethod::Post));
        assert!(err.is_retryable_for(HttpMethod::Patch));

        let timeout = GatewayError::Timeout(Duration::from_secs(5));
        assert!(timeout.is_retryable_for(HttpMethod::Get));
        assert!(!timeout.is_retryable_for(HttpMethod::Put));
    }

    #[test]
    fn test_client_rejection_is_not_absorbed() {
        assert!(!GatewayError::from_status(400, "bad").is_absorbed_by_failover());
        assert!(GatewayError::from_status(500, "bad").is_absorbed_by_failover());
        assert!(GatewayError::Timeout(Duration::from_secs(3)).is_absorbed_by_failover());
    }

    #[test]
    fn test_serialized_shape() {
        let err = GatewayError::ClientRejected { status: 422, message: "invalid".into() };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "ClientRejected");
        assert_eq!(json["detail"]["status"], 422);
    }
}
