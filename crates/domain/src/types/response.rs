//! What the gateway hands back to callers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::Payload;
use super::resource::ResourceFamily;
use crate::errors::GatewayError;

/// Where a read payload came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum ResponseOrigin {
    /// A backend candidate answered
    Live { address: String },
    /// Fresh cache entry
    Cache,
    /// Expired entry still inside the extended TTL, used after every
    /// candidate failed
    StaleCache,
    /// Placeholder data from the fallback synthesizer
    Synthetic,
}

/// Result of a read through the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub payload: Payload,
    pub origin: ResponseOrigin,
    /// True when the payload is not live or fresh-cached data
    pub degraded: bool,
    /// `AllCandidatesExhausted` when the failover walk failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<GatewayError>,
}

impl GatewayResponse {
    pub fn live(payload: Payload, address: impl Into<String>) -> Self {
        Self {
            payload,
            origin: ResponseOrigin::Live { address: address.into() },
            degraded: false,
            failure: None,
        }
    }

    pub fn cached(payload: Payload) -> Self {
        Self { payload, origin: ResponseOrigin::Cache, degraded: false, failure: None }
    }

    pub fn stale(payload: Payload, failure: GatewayError) -> Self {
        Self { payload, origin: ResponseOrigin::StaleCache, degraded: true, failure: Some(failure) }
    }

    pub fn synthetic(payload: Payload, failure: GatewayError) -> Self {
        Self { payload, origin: ResponseOrigin::Synthetic, degraded: true, failure: Some(failure) }
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == ResponseOrigin::Synthetic
    }
}

/// Result of a mutation through the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    /// A backend accepted the mutation
    Applied { payload: Payload, address: String },
    /// Every candidate was unreachable; the mutation was queued durably
    Queued { mutation_id: Uuid, notice: String },
}

impl MutationOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }
}

/// Summary of one drain of a family's pending-mutation queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub family: Option<ResourceFamily>,
    /// Replayed successfully and removed from the queue
    pub replayed: Vec<Uuid>,
    /// Failed transiently, left in the queue
    pub deferred: Vec<Uuid>,
    /// Rejected by the backend (4xx), kept in the queue until an operator
    /// discards it
    pub rejected: Vec<Uuid>,
    /// Another drain of the same family was already running
    pub skipped: bool,
}

impl ReplayReport {
    pub fn for_family(family: ResourceFamily) -> Self {
        Self { family: Some(family), ..Self::default() }
    }

    pub fn attempted(&self) -> usize {
        self.replayed.len() + self.deferred.len() + self.rejected.len()
    }
}
