//! Shared fixtures for `backoffice-infra` integration tests.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{Gateway, MemoryOfflineStore, OfflineStore};
use backoffice_domain::{
    EndpointCandidate, FamilyConfig, GatewayConfig, GatewayError, Result,
};
use backoffice_infra::{AccessTokenProvider, HttpRequestExecutor, NoTokenProvider};

/// Address of a port nobody listens on: bind, read the port, drop.
pub fn closed_port_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api")
}

/// Configuration with short backoff and timeouts so retries stay fast
pub fn fast_config(addresses: &[String]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.retry.max_attempts = 3;
    config.retry.backoff_step_ms = 10;
    config.timeouts.read_ms = 1_000;
    config.timeouts.write_ms = 1_000;
    config.offline.store_path = None;
    if let Some(first) = addresses.first() {
        config.default_address = first.clone();
    }
    for name in ["invoices", "products", "purchase_orders", "stock_movements"] {
        let family = config.families.entry(name.to_string()).or_insert_with(FamilyConfig::default);
        family.addresses = addresses.to_vec();
    }
    config
}

pub fn candidate(address: impl Into<String>) -> EndpointCandidate {
    EndpointCandidate::new(address, 0)
}

pub fn executor(config: &GatewayConfig) -> HttpRequestExecutor {
    HttpRequestExecutor::from_config(config, Arc::new(NoTokenProvider)).expect("executor")
}

pub fn executor_with_tokens(
    config: &GatewayConfig,
    tokens: Arc<dyn AccessTokenProvider>,
) -> HttpRequestExecutor {
    HttpRequestExecutor::from_config(config, tokens).expect("executor")
}

/// Gateway over the HTTP executor and `store`
pub fn gateway(config: GatewayConfig, store: Arc<dyn OfflineStore>) -> Gateway {
    let executor = Arc::new(executor(&config));
    Gateway::new(config, executor, store).expect("gateway")
}

pub fn memory_gateway(config: GatewayConfig) -> Gateway {
    gateway(config, Arc::new(MemoryOfflineStore::new()))
}

/// Token provider that always fails
pub struct FailingTokenProvider;

#[async_trait]
impl AccessTokenProvider for FailingTokenProvider {
    async fn access_token(&self) -> Result<Option<String>> {
        Err(GatewayError::Config("token endpoint unreachable".into()))
    }
}
