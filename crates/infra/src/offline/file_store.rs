//! JSON-file offline store
//!
//! The whole state is one versioned JSON document, rewritten atomically on
//! every change: serialize, write to a sibling temp file, fsync, rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use backoffice_core::{OfflineState, OfflineStore};
use backoffice_domain::constants::OFFLINE_STORE_VERSION;
use backoffice_domain::{
    GatewayError, OfflineDeletion, PendingSyntheticMutation, ResourceFamily, Result,
};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::InfraError;

/// Offline store persisted to a JSON file
///
/// A missing file is an empty store. A corrupt or newer-format file is
/// logged and replaced on the next write rather than failing startup.
#[derive(Debug)]
pub struct JsonFileOfflineStore {
    path: PathBuf,
    state: Mutex<OfflineState>,
}

impl JsonFileOfflineStore {
    /// Open the store at `path`, loading any state already there.
    ///
    /// # Errors
    /// `GatewayError::Persistence` when the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state(&path).await?;
        info!(
            path = %path.display(),
            pending = state.pending.len(),
            deletions = state.deletions.len(),
            "offline store opened"
        );
        Ok(Self { path, state: Mutex::new(state) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the state, persist it, then publish it.
    /// On a write failure the in-memory state is left untouched.
    async fn update<T>(&self, change: impl FnOnce(&mut OfflineState) -> T) -> Result<T> {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        let output = change(&mut next);
        if let Err(err) = write_state(&self.path, &next).await {
            error!(path = %self.path.display(), error = %err, "failed to persist offline state");
            return Err(err);
        }
        *guard = next;
        Ok(output)
    }
}

#[async_trait]
impl OfflineStore for JsonFileOfflineStore {
    async fn enqueue(&self, mutation: &PendingSyntheticMutation) -> Result<()> {
        let mutation = mutation.clone();
        self.update(|state| state.enqueue(mutation)).await
    }

    async fn pending(&self, family: &ResourceFamily) -> Result<Vec<PendingSyntheticMutation>> {
        Ok(self.state.lock().await.pending_for(family))
    }

    async fn settle(&self, id: Uuid) -> Result<Option<PendingSyntheticMutation>> {
        if !self.state.lock().await.contains(id) {
            return Ok(None);
        }
        self.update(|state| state.settle(id)).await
    }

    async fn families_with_pending(&self) -> Result<Vec<ResourceFamily>> {
        Ok(self.state.lock().await.families_with_pending())
    }

    async fn deletions(&self, family: &ResourceFamily) -> Result<Vec<OfflineDeletion>> {
        Ok(self.state.lock().await.deletions_for(family))
    }
}

async fn load_state(path: &Path) -> Result<OfflineState> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no offline state yet");
            return Ok(OfflineState::default());
        }
        Err(err) => return Err(InfraError::from(err).into()),
    };

    if contents.trim().is_empty() {
        return Ok(OfflineState::default());
    }

    match serde_json::from_str::<OfflineState>(&contents) {
        Ok(state) if state.version > OFFLINE_STORE_VERSION => {
            warn!(
                path = %path.display(),
                found = state.version,
                supported = OFFLINE_STORE_VERSION,
                "offline state written by a newer version, starting empty"
            );
            Ok(OfflineState::default())
        }
        Ok(mut state) => {
            state.version = OFFLINE_STORE_VERSION;
            Ok(state)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "offline state is corrupt, starting empty");
            Ok(OfflineState::default())
        }
    }
}

async fn write_state(path: &Path, state: &OfflineState) -> Result<()> {
    let encoded = serde_json::to_vec_pretty(state).map_err(InfraError::from)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
    }

    let temp = temp_path(path);
    let mut file = tokio::fs::File::create(&temp).await.map_err(InfraError::from)?;
    file.write_all(&encoded).await.map_err(InfraError::from)?;
    file.sync_all().await.map_err(InfraError::from)?;
    drop(file);

    tokio::fs::rename(&temp, path).await.map_err(|err| {
        GatewayError::Persistence(format!(
            "could not replace {} with {}: {err}",
            path.display(),
            temp.display()
        ))
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_sits_next_to_the_store() {
        let temp = temp_path(Path::new("/var/lib/backoffice/offline.json"));
        assert_eq!(temp, PathBuf::from("/var/lib/backoffice/offline.json.tmp"));
    }
}
