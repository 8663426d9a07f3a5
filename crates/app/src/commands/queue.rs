//! `pending`, `replay` and `discard`: the offline mutation queue

use anyhow::anyhow;
use backoffice_domain::ResourceFamily;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::AppContext;

/// Queued mutations for one family, or for every family with a backlog
pub async fn pending(context: &AppContext, family: Option<&ResourceFamily>) -> anyhow::Result<Value> {
    let families = match family {
        Some(family) => vec![family.clone()],
        None => context.gateway.families_with_pending().await?,
    };

    let mut rendered = Vec::new();
    for family in families {
        for mutation in context.gateway.pending_mutations(&family).await? {
            rendered.push(json!({
                "id": mutation.id,
                "family": mutation.family,
                "method": mutation.operation.method,
                "path": mutation.operation.path,
                "enqueued_at": mutation.enqueued_at,
            }));
        }
    }
    Ok(Value::Array(rendered))
}

/// Replay now instead of waiting for the next successful call
pub async fn replay(context: &AppContext, family: Option<&ResourceFamily>) -> anyhow::Result<Value> {
    let reports = match family {
        Some(family) => vec![context.gateway.replay_pending(family).await?],
        None => context.gateway.replay_all().await?,
    };
    Ok(serde_json::to_value(reports)?)
}

/// Remove a queued mutation, typically one the backend keeps rejecting
pub async fn discard(context: &AppContext, id: Uuid) -> anyhow::Result<Value> {
    let mutation = context
        .gateway
        .discard_pending(id)
        .await?
        .ok_or_else(|| anyhow!("no pending mutation with id {id}"))?;
    Ok(json!({
        "discarded": mutation.id,
        "family": mutation.family,
        "method": mutation.operation.method,
        "path": mutation.operation.path,
    }))
}
