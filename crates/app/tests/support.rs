//! Shared fixtures for `backoffice-app` integration tests.

#![allow(dead_code)]

use std::net::TcpListener;

use backoffice_app::AppContext;
use backoffice_domain::{FamilyConfig, GatewayConfig};

/// Address of a port nobody listens on
pub fn closed_port_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// In-memory configuration pointing every family at `addresses`
pub fn config_for(addresses: &[String]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.retry.max_attempts = 2;
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

pub async fn context_for(addresses: &[String]) -> AppContext {
    AppContext::from_config(config_for(addresses)).await.expect("context")
}
