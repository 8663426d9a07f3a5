//! Serializable offline state shared by the store implementations

use backoffice_domain::constants::OFFLINE_STORE_VERSION;
use backoffice_domain::{OfflineDeletion, PendingSyntheticMutation, ResourceFamily};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pending queue plus offline deletions, as persisted on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineState {
    /// Format version, bumped on incompatible changes
    pub version: u32,
    /// All families, in enqueue order
    #[serde(default)]
    pub pending: Vec<PendingSyntheticMutation>,
    #[serde(default)]
    pub deletions: Vec<OfflineDeletion>,
}

impl Default for OfflineState {
    fn default() -> Self {
        Self { version: OFFLINE_STORE_VERSION, pending: Vec::new(), deletions: Vec::new() }
    }
}

impl OfflineState {
    /// Append a mutation together with the deletion it implies, if any
    pub fn enqueue(&mut self, mutation: PendingSyntheticMutation) {
        if let Some(deletion) = mutation.offline_deletion() {
            self.record_deletion(deletion);
        }
        self.pending.push(mutation);
    }

    pub fn pending_for(&self, family: &ResourceFamily) -> Vec<PendingSyntheticMutation> {
        self.pending.iter().filter(|m| &m.family == family).cloned().collect()
    }

    /// Remove a mutation and the deletion it implied, returning the mutation
    pub fn settle(&mut self, id: Uuid) -> Option<PendingSyntheticMutation> {
        let index = self.pending.iter().position(|m| m.id == id)?;
        let mutation = self.pending.remove(index);
        if let Some(deletion) = mutation.offline_deletion() {
            self.clear_deletion(&deletion.family, &deletion.resource_id);
        }
        Some(mutation)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.pending.iter().any(|m| m.id == id)
    }

    /// Families in order of their oldest pending mutation
    pub fn families_with_pending(&self) -> Vec<ResourceFamily> {
        let mut families: Vec<ResourceFamily> = Vec::new();
        for mutation in &self.pending {
            if !families.contains(&mutation.family) {
                families.push(mutation.family.clone());
            }
        }
        families
    }

    /// Record a deletion; a repeated deletion of the same resource is kept once
    pub fn record_deletion(&mut self, deletion: OfflineDeletion) -> bool {
        let exists = self
            .deletions
            .iter()
            .any(|d| d.family == deletion.family && d.resource_id == deletion.resource_id);
        if !exists {
            self.deletions.push(deletion);
        }
        !exists
    }

    pub fn clear_deletion(&mut self, family: &ResourceFamily, resource_id: &str) -> bool {
        let before = self.deletions.len();
        self.deletions.retain(|d| !(&d.family == family && d.resource_id == resource_id));
        self.deletions.len() != before
    }

    pub fn deletions_for(&self, family: &ResourceFamily) -> Vec<OfflineDeletion> {
        self.deletions.iter().filter(|d| &d.family == family).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use backoffice_domain::Operation;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn mutation(family: ResourceFamily, path: &str) -> PendingSyntheticMutation {
        PendingSyntheticMutation::new(family, Operation::post(path, json!({})), Utc::now())
    }

    #[test]
    fn test_pending_is_fifo_per_family() {
        let mut state = OfflineState::default();
        let first = mutation(ResourceFamily::invoices(), "/invoices");
        let other = mutation(ResourceFamily::products(), "/products");
        let second = mutation(ResourceFamily::invoices(), "/invoices/2");
        state.enqueue(first.clone());
        state.enqueue(other);
        state.enqueue(second.clone());

        let ids: Vec<_> =
            state.pending_for(&ResourceFamily::invoices()).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(
            state.families_with_pending(),
            vec![ResourceFamily::invoices(), ResourceFamily::products()]
        );
    }

    #[test]
    fn test_settle_reports_presence() {
        let mut state = OfflineState::default();
        let item = mutation(ResourceFamily::invoices(), "/invoices");
        state.enqueue(item.clone());
        assert_eq!(state.settle(item.id), Some(item.clone()));
        assert_eq!(state.settle(item.id), None);
        assert!(!state.contains(item.id));
    }

    #[test]
    fn test_delete_and_its_deletion_come_and_go_together() {
        let mut state = OfflineState::default();
        let delete =
            PendingSyntheticMutation::new(ResourceFamily::products(), Operation::delete("/products/5"), Utc::now());
        state.enqueue(delete.clone());
        assert_eq!(state.deletions_for(&ResourceFamily::products())[0].resource_id, "5");

        state.settle(delete.id);
        assert!(state.pending.is_empty());
        assert!(state.deletions.is_empty());
    }

    #[test]
    fn test_deletions_are_deduplicated() {
        let mut state = OfflineState::default();
        let deletion = OfflineDeletion {
            family: ResourceFamily::products(),
            resource_id: "17".into(),
            deleted_at: Utc::now(),
        };
        assert!(state.record_deletion(deletion.clone()));
        assert!(!state.record_deletion(deletion));
        assert_eq!(state.deletions_for(&ResourceFamily::products()).len(), 1);

        assert!(state.clear_deletion(&ResourceFamily::products(), "17"));
        assert!(state.deletions_for(&ResourceFamily::products()).is_empty());
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let state: OfflineState = serde_json::from_str(r#"{ "version": 1 }"#).unwrap();
        assert!(state.pending.is_empty());
        assert!(state.deletions.is_empty());
    }
}
