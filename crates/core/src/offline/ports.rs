//! Port interface for durable offline state

use async_trait::async_trait;
use backoffice_domain::{OfflineDeletion, PendingSyntheticMutation, ResourceFamily, Result};
use uuid::Uuid;

/// Durable storage for mutations accepted while a family was unreachable and
/// for resources deleted offline
#[async_trait]
pub trait OfflineStore: Send + Sync {
    /// Append a mutation to the end of its family's queue. A DELETE's
    /// offline deletion is recorded in the same write.
    async fn enqueue(&self, mutation: &PendingSyntheticMutation) -> Result<()>;

    /// Pending mutations for a family, oldest first
    async fn pending(&self, family: &ResourceFamily) -> Result<Vec<PendingSyntheticMutation>>;

    /// Remove a mutation once it was replayed or discarded, clearing its
    /// offline deletion in the same write. Returns the removed mutation.
    async fn settle(&self, id: Uuid) -> Result<Option<PendingSyntheticMutation>>;

    /// Families with at least one pending mutation
    async fn families_with_pending(&self) -> Result<Vec<ResourceFamily>>;

    /// Offline deletions for a family
    async fn deletions(&self, family: &ResourceFamily) -> Result<Vec<OfflineDeletion>>;
}
