//! Durable offline state: pending mutations and offline deletions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operation::{HttpMethod, Operation};
use super::resource::ResourceFamily;

/// A mutation accepted while every candidate was unreachable.
///
/// Replayed in enqueue order on the next successful contact with the family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSyntheticMutation {
    pub id: Uuid,
    pub family: ResourceFamily,
    pub operation: Operation,
    pub enqueued_at: DateTime<Utc>,
}

impl PendingSyntheticMutation {
    /// Ids are UUIDv7 so they roughly sort by creation time in logs.
    pub fn new(family: ResourceFamily, operation: Operation, enqueued_at: DateTime<Utc>) -> Self {
        Self { id: Uuid::now_v7(), family, operation, enqueued_at }
    }

    /// The deletion a queued DELETE implies for degraded reads
    pub fn offline_deletion(&self) -> Option<OfflineDeletion> {
        if self.operation.method != HttpMethod::Delete {
            return None;
        }
        self.operation.resource_id().map(|resource_id| OfflineDeletion {
            family: self.family.clone(),
            resource_id: resource_id.to_string(),
            deleted_at: self.enqueued_at,
        })
    }
}

/// A resource deleted locally while its family was offline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineDeletion {
    pub family: ResourceFamily,
    pub resource_id: String,
    pub deleted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let now = Utc::now();
        let first = PendingSyntheticMutation::new(
            ResourceFamily::products(),
            Operation::delete("/products/1"),
            now,
        );
        let second = PendingSyntheticMutation::new(
            ResourceFamily::products(),
            Operation::delete("/products/2"),
            now,
        );
        assert_ne!(first.id, second.id);
        assert_eq!(first.id.get_version_num(), 7);
    }

    #[test]
    fn test_only_deletes_imply_an_offline_deletion() {
        let now = Utc::now();
        let delete =
            PendingSyntheticMutation::new(ResourceFamily::products(), Operation::delete("/products/9"), now);
        let deletion = delete.offline_deletion().unwrap();
        assert_eq!(deletion.resource_id, "9");
        assert_eq!(deletion.deleted_at, now);

        let update = PendingSyntheticMutation::new(
            ResourceFamily::products(),
            Operation::put("/products/9", serde_json::json!({ "name": "b" })),
            now,
        );
        assert!(update.offline_deletion().is_none());
    }
}
