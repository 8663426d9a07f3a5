//! `submit`: mutations through the gateway

use backoffice_domain::{MutationOutcome, Operation, Payload, ResourceFamily};
use serde_json::{json, Value};

use crate::context::AppContext;

pub async fn submit(
    context: &AppContext,
    family: &ResourceFamily,
    operation: Operation,
) -> anyhow::Result<Value> {
    let rendered = match context.gateway.submit(family, operation).await? {
        MutationOutcome::Applied { payload, address } => json!({
            "status": "applied",
            "address": address,
            "payload": match payload {
                Payload::Json(value) => value,
                Payload::Binary(bytes) => json!({ "bytes": bytes.len() }),
            },
        }),
        MutationOutcome::Queued { mutation_id, notice } => json!({
            "status": "queued",
            "mutation_id": mutation_id,
            "notice": notice,
        }),
    };
    Ok(rendered)
}
