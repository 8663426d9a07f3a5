//! `fetch`: reads through the gateway

use std::path::Path;

use anyhow::Context;
use backoffice_domain::{Operation, Payload, ResourceFamily};
use serde_json::{json, Value};

use crate::context::AppContext;

/// Fetch a resource and render the response with its provenance.
///
/// Binary payloads are summarised, or written to `output` when given.
pub async fn fetch(
    context: &AppContext,
    family: &ResourceFamily,
    operation: Operation,
    output: Option<&Path>,
) -> anyhow::Result<Value> {
    let response = context.gateway.fetch(family, operation).await?;

    let payload = match &response.payload {
        Payload::Json(value) => value.clone(),
        Payload::Binary(bytes) => match output {
            Some(path) => {
                tokio::fs::write(path, bytes)
                    .await
                    .with_context(|| format!("could not write {}", path.display()))?;
                json!({ "written": path.display().to_string(), "bytes": bytes.len() })
            }
            None => json!({ "bytes": bytes.len() }),
        },
    };

    Ok(json!({
        "source": response.origin,
        "degraded": response.degraded,
        "synthetic": response.is_synthetic(),
        "failure": response.failure.as_ref().map(ToString::to_string),
        "payload": payload,
    }))
}
