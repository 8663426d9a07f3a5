//! Application context - dependency injection container

use std::sync::Arc;

use backoffice_core::Gateway;
use backoffice_domain::{GatewayConfig, Result};
use backoffice_infra::{build_gateway, config, token_provider_from_env};
use tracing::info;

/// Application context - holds the shared gateway
pub struct AppContext {
    pub gateway: Arc<Gateway>,
}

impl AppContext {
    /// Load configuration from the environment and assemble the gateway
    ///
    /// # Errors
    /// Configuration or offline-store failures.
    pub async fn new() -> Result<Self> {
        let config = config::load()?;
        Self::from_config(config).await
    }

    /// Assemble the gateway from an explicit configuration
    ///
    /// # Errors
    /// Configuration or offline-store failures.
    pub async fn from_config(config: GatewayConfig) -> Result<Self> {
        let gateway = build_gateway(config, token_provider_from_env()).await?;
        info!("application context initialised");
        Ok(Self { gateway: Arc::new(gateway) })
    }

    pub fn from_gateway(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}
