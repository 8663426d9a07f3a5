//! Degraded-mode substitute data and offline mutation capture

use std::collections::HashSet;
use std::sync::Arc;

use backoffice_common::Clock;
use backoffice_domain::{
    Operation, PendingSyntheticMutation, Payload, ResourceFamily, ResponseShape, Result,
};
use serde_json::Value;
use tracing::{error, info, warn};

use super::catalog;
use crate::offline::OfflineStore;

/// Generates placeholder data when no backend answers and records mutations
/// attempted while offline
pub struct FallbackSynthesizer<C: Clock> {
    store: Arc<dyn OfflineStore>,
    clock: C,
}

impl<C: Clock> FallbackSynthesizer<C> {
    pub fn new(store: Arc<dyn OfflineStore>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Placeholder payload for a read.
    ///
    /// Query parameters are ignored. A detail path whose trailing segment
    /// names a catalog record yields that record; anything else yields the
    /// family's whole catalog. Documents yield a marked placeholder PDF.
    pub fn synthesize(&self, family: &ResourceFamily, operation: &Operation) -> Payload {
        warn!(family = %family, path = %operation.path, "serving synthetic data");

        if operation.shape == ResponseShape::Binary {
            return Payload::Binary(catalog::placeholder_pdf());
        }

        let records = catalog::records_for(family);
        let detail = operation.resource_id().and_then(|id| {
            records.iter().find(|record| record_id(record).as_deref() == Some(id)).cloned()
        });
        Payload::Json(detail.unwrap_or(Value::Array(records)))
    }

    /// Queue a mutation that could not reach any candidate.
    ///
    /// A DELETE also marks its trailing path segment as deleted offline, in
    /// the same store write, so degraded reads hide the resource until the
    /// delete is replayed.
    ///
    /// # Errors
    /// `GatewayError::Persistence` when the intent could not be saved; nothing
    /// is recorded in that case.
    pub async fn enqueue_mutation(
        &self,
        family: &ResourceFamily,
        operation: Operation,
    ) -> Result<PendingSyntheticMutation> {
        let mutation = PendingSyntheticMutation::new(family.clone(), operation, self.clock.utc_now());

        if let Err(e) = self.store.enqueue(&mutation).await {
            error!(family = %family, error = %e, "failed to persist pending mutation");
            return Err(e);
        }

        info!(
            family = %family,
            mutation_id = %mutation.id,
            method = %mutation.operation.method,
            "mutation queued for synchronization"
        );
        Ok(mutation)
    }

    /// Remove records deleted offline from a degraded payload, returning how
    /// many were removed
    ///
    /// # Errors
    /// Propagates offline store read failures.
    pub async fn hide_deleted(&self, family: &ResourceFamily, payload: &mut Payload) -> Result<usize> {
        let deletions = self.store.deletions(family).await?;
        if deletions.is_empty() {
            return Ok(0);
        }
        let deleted: HashSet<String> = deletions.into_iter().map(|d| d.resource_id).collect();

        let Some(value) = payload.as_json_mut() else {
            return Ok(0);
        };
        let records = match value {
            Value::Array(records) => records,
            Value::Object(map) => match ["data", "items"]
                .into_iter()
                .find_map(|key| map.get(key).is_some_and(Value::is_array).then_some(key))
            {
                Some(key) => match map.get_mut(key) {
                    Some(Value::Array(records)) => records,
                    _ => return Ok(0),
                },
                None => return Ok(0),
            },
            _ => return Ok(0),
        };

        let before = records.len();
        records.retain(|record| record_id(record).map_or(true, |id| !deleted.contains(&id)));
        Ok(before - records.len())
    }
}

/// A record's `id` as a string, for string and numeric ids
fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use backoffice_common::MockClock;
    use backoffice_domain::constants::SYNTHETIC_MARKER_FIELD;
    use backoffice_domain::{GatewayError, OfflineDeletion};
    use serde_json::json;

    use super::*;
    use crate::offline::MemoryOfflineStore;

    fn synthesizer() -> (FallbackSynthesizer<MockClock>, Arc<MemoryOfflineStore>) {
        let store = Arc::new(MemoryOfflineStore::new());
        (FallbackSynthesizer::new(store.clone(), MockClock::new()), store)
    }

    #[test]
    fn test_collection_read_is_parameter_insensitive() {
        let (synth, _) = synthesizer();
        let family = ResourceFamily::invoices();
        let plain = synth.synthesize(&family, &Operation::get("/invoices"));
        let filtered = synth.synthesize(
            &family,
            &Operation::get("/invoices").with_query("status", "paid").with_query("page", "4"),
        );

        assert_eq!(plain, filtered);
        assert!(plain.is_synthetic());
        assert_eq!(plain.as_json().and_then(Value::as_array).map(Vec::len), Some(3));
    }

    #[test]
    fn test_detail_read_returns_matching_record() {
        let (synth, _) = synthesizer();
        let payload = synth.synthesize(&ResourceFamily::products(), &Operation::get("/products/SYN-PRD-2"));
        let record = payload.as_json().unwrap();
        assert_eq!(record["id"], "SYN-PRD-2");
        assert_eq!(record[SYNTHETIC_MARKER_FIELD], true);
    }

    #[test]
    fn test_document_gets_placeholder_pdf() {
        let (synth, _) = synthesizer();
        let payload = synth.synthesize(&ResourceFamily::invoices(), &Operation::document("/invoices/1/pdf"));
        assert!(payload.as_bytes().is_some());
        assert!(payload.is_synthetic());
    }

    #[tokio::test]
    async fn test_delete_records_offline_deletion() {
        let (synth, store) = synthesizer();
        let family = ResourceFamily::products();
        let mutation = synth.enqueue_mutation(&family, Operation::delete("/products/SYN-PRD-1")).await.unwrap();

        assert_eq!(store.pending(&family).await.unwrap()[0].id, mutation.id);
        let deletions = store.deletions(&family).await.unwrap();
        assert_eq!(deletions.len(), 1);
        assert_eq!(deletions[0].resource_id, "SYN-PRD-1");

        let mut payload = synth.synthesize(&family, &Operation::get("/products"));
        assert_eq!(synth.hide_deleted(&family, &mut payload).await.unwrap(), 1);
        let ids: Vec<_> = payload.as_json().unwrap().as_array().unwrap().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!("SYN-PRD-2"), json!("SYN-PRD-3")]);
    }

    #[tokio::test]
    async fn test_non_delete_records_no_deletion() {
        let (synth, store) = synthesizer();
        let family = ResourceFamily::invoices();
        synth.enqueue_mutation(&family, Operation::post("/invoices", json!({ "total": 5 }))).await.unwrap();
        assert!(store.deletions(&family).await.unwrap().is_empty());
    }

    /// Store whose writes always fail
    struct ReadOnlyStore(MemoryOfflineStore);

    #[async_trait::async_trait]
    impl OfflineStore for ReadOnlyStore {
        async fn enqueue(&self, _mutation: &PendingSyntheticMutation) -> Result<()> {
            Err(GatewayError::Persistence("disk full".into()))
        }

        async fn pending(&self, family: &ResourceFamily) -> Result<Vec<PendingSyntheticMutation>> {
            self.0.pending(family).await
        }

        async fn settle(&self, _id: uuid::Uuid) -> Result<Option<PendingSyntheticMutation>> {
            Err(GatewayError::Persistence("disk full".into()))
        }

        async fn families_with_pending(&self) -> Result<Vec<ResourceFamily>> {
            self.0.families_with_pending().await
        }

        async fn deletions(&self, family: &ResourceFamily) -> Result<Vec<OfflineDeletion>> {
            self.0.deletions(family).await
        }
    }

    #[tokio::test]
    async fn test_failed_delete_enqueue_hides_nothing() {
        let store = Arc::new(ReadOnlyStore(MemoryOfflineStore::new()));
        let synth = FallbackSynthesizer::new(store.clone(), MockClock::new());
        let family = ResourceFamily::products();

        let result = synth.enqueue_mutation(&family, Operation::delete("/products/SYN-PRD-1")).await;
        assert!(matches!(result, Err(GatewayError::Persistence(_))));

        assert!(store.pending(&family).await.unwrap().is_empty());
        assert!(store.deletions(&family).await.unwrap().is_empty());
        let mut payload = synth.synthesize(&family, &Operation::get("/products"));
        assert_eq!(synth.hide_deleted(&family, &mut payload).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_hide_deleted_handles_wrapped_and_numeric_ids() {
        let (synth, _) = synthesizer();
        let family = ResourceFamily::products();
        synth.enqueue_mutation(&family, Operation::delete("/products/42")).await.unwrap();

        let mut payload = Payload::Json(json!({ "data": [{ "id": 42 }, { "id": 43 }] }));
        assert_eq!(synth.hide_deleted(&family, &mut payload).await.unwrap(), 1);
        assert_eq!(payload.as_json().unwrap()["data"], json!([{ "id": 43 }]));
    }
}
