//! Port interface for issuing operations against one candidate

use async_trait::async_trait;
use backoffice_domain::{EndpointCandidate, Operation, Payload, Result};

/// Executes one operation against one candidate, including that
/// candidate's retry/backoff policy.
///
/// Errors are classified with `GatewayError`; the gateway decides whether to
/// move on to the next candidate.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, candidate: &EndpointCandidate, operation: &Operation) -> Result<Payload>;
}
