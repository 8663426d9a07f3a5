//! Backend availability per resource family

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::ResourceFamily;

/// Reachability of a resource family's backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityState {
    /// No call has completed yet
    Unknown,
    /// Last call succeeded
    Available,
    /// At least one candidate failed during the current walk
    Degraded,
    /// Every candidate failed during the last walk
    Unavailable,
}

crate::impl_domain_status_conversions!(AvailabilityState {
    Unknown => "UNKNOWN",
    Available => "AVAILABLE",
    Degraded => "DEGRADED",
    Unavailable => "UNAVAILABLE",
});

/// Current availability of one family with the reason for the last transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityStatus {
    pub state: AvailabilityState,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_at: Option<DateTime<Utc>>,
}

impl Default for AvailabilityStatus {
    fn default() -> Self {
        Self {
            state: AvailabilityState::Unknown,
            reason: "no calls completed yet".to_string(),
            last_transition_at: None,
        }
    }
}

/// User-facing degraded-mode notice, one per unavailable family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedNotice {
    pub family: ResourceFamily,
    pub reason: String,
    pub since: DateTime<Utc>,
}

impl DegradedNotice {
    /// Short message suitable for a banner
    pub fn message(&self) -> String {
        format!(
            "{} are temporarily unavailable; showing offline data ({})",
            self.family.as_str().replace('_', " "),
            self.reason
        )
    }
}
