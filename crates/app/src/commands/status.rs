//! `status`: availability per family, degraded-mode notices and cache stats

use serde_json::{json, Value};

use crate::context::AppContext;

pub fn status(context: &AppContext) -> anyhow::Result<Value> {
    let families: Vec<Value> = context
        .gateway
        .availability_snapshot()
        .into_iter()
        .map(|(family, status)| {
            json!({
                "family": family,
                "state": status.state,
                "reason": status.reason,
                "last_transition_at": status.last_transition_at,
            })
        })
        .collect();

    let notices: Vec<Value> = context
        .gateway
        .degraded_notices()
        .iter()
        .map(|notice| json!({ "family": notice.family, "message": notice.message(), "since": notice.since }))
        .collect();

    Ok(json!({
        "families": families,
        "notices": notices,
        "cache": context.gateway.cache_stats(),
    }))
}
