//! In-memory offline store

use async_trait::async_trait;
use backoffice_domain::{OfflineDeletion, PendingSyntheticMutation, ResourceFamily, Result};
use parking_lot::Mutex;
use uuid::Uuid;

use super::ports::OfflineStore;
use super::state::OfflineState;

/// Offline store that lives for the process only
///
/// Used when no store path is configured and as the test double for the
/// gateway.
#[derive(Debug, Default)]
pub struct MemoryOfflineStore {
    state: Mutex<OfflineState>,
}

impl MemoryOfflineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> OfflineState {
        self.state.lock().clone()
    }
}

#[async_trait]
impl OfflineStore for MemoryOfflineStore {
    async fn enqueue(&self, mutation: &PendingSyntheticMutation) -> Result<()> {
        self.state.lock().enqueue(mutation.clone());
        Ok(())
    }

    async fn pending(&self, family: &ResourceFamily) -> Result<Vec<PendingSyntheticMutation>> {
        Ok(self.state.lock().pending_for(family))
    }

    async fn settle(&self, id: Uuid) -> Result<Option<PendingSyntheticMutation>> {
        Ok(self.state.lock().settle(id))
    }

    async fn families_with_pending(&self) -> Result<Vec<ResourceFamily>> {
        Ok(self.state.lock().families_with_pending())
    }

    async fn deletions(&self, family: &ResourceFamily) -> Result<Vec<OfflineDeletion>> {
        Ok(self.state.lock().deletions_for(family))
    }
}
