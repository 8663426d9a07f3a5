//! Gateway assembly from configuration

use std::sync::Arc;

use backoffice_core::{Gateway, MemoryOfflineStore, OfflineStore, RequestExecutor};
use backoffice_domain::{GatewayConfig, Result};
use tracing::info;

use crate::http::{AccessTokenProvider, HttpRequestExecutor, NoTokenProvider, StaticTokenProvider};
use crate::offline::JsonFileOfflineStore;

/// Bearer token for backend requests
pub const API_TOKEN_VAR: &str = "BACKOFFICE_API_TOKEN";

/// Token provider from `BACKOFFICE_API_TOKEN`, unauthenticated when unset
pub fn token_provider_from_env() -> Arc<dyn AccessTokenProvider> {
    match std::env::var(API_TOKEN_VAR) {
        Ok(token) if !token.trim().is_empty() => Arc::new(StaticTokenProvider::new(token)),
        _ => Arc::new(NoTokenProvider),
    }
}

/// Offline store selected by `config.offline.store_path`
///
/// # Errors
/// `GatewayError::Persistence` when an existing store file cannot be read.
pub async fn open_offline_store(config: &GatewayConfig) -> Result<Arc<dyn OfflineStore>> {
    match &config.offline.store_path {
        Some(path) => Ok(Arc::new(JsonFileOfflineStore::open(path).await?)),
        None => {
            info!("no offline store path configured, pending mutations live in memory only");
            Ok(Arc::new(MemoryOfflineStore::new()))
        }
    }
}

/// Build a gateway with the HTTP executor and the configured offline store
///
/// # Errors
/// `Config` for an invalid configuration, `Persistence` for an unreadable
/// offline store.
pub async fn build_gateway(config: GatewayConfig, tokens: Arc<dyn AccessTokenProvider>) -> Result<Gateway> {
    let executor: Arc<dyn RequestExecutor> = Arc::new(HttpRequestExecutor::from_config(&config, tokens)?);
    let store = open_offline_store(&config).await?;
    let gateway = Gateway::new(config, executor, store)?;
    info!(
        families = gateway.config().families.len(),
        default_address = %gateway.config().default_address,
        "gateway ready"
    );
    Ok(gateway)
}
