//! Shared test helpers for `backoffice-core` integration tests.
//!
//! `ScriptedExecutor` stands in for the HTTP adapter: each candidate address
//! gets a queue of canned results and an optional fallback used once the
//! queue is drained.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backoffice_common::MockClock;
use backoffice_core::{Gateway, MemoryOfflineStore, OfflineStore, RequestExecutor};
use backoffice_domain::{
    AvailabilityState, EndpointCandidate, FamilyConfig, GatewayConfig, GatewayError, Operation,
    Payload, Result,
};
use parking_lot::Mutex;
use serde_json::Value;

pub const PRIMARY: &str = "http://primary.test/api";
pub const SECONDARY: &str = "http://secondary.test/api";

#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<String, VecDeque<Result<Payload>>>>,
    fallbacks: Mutex<HashMap<String, Result<Payload>>>,
    calls: Mutex<Vec<(String, Operation)>>,
    delay: Option<Duration>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    /// Queue one result for `address`
    pub fn push(&self, address: &str, result: Result<Payload>) {
        self.scripts.lock().entry(address.to_string()).or_default().push_back(result);
    }

    /// Result returned for `address` whenever its queue is empty
    pub fn always(&self, address: &str, result: Result<Payload>) {
        self.fallbacks.lock().insert(address.to_string(), result);
    }

    pub fn calls(&self) -> Vec<(String, Operation)> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, address: &str) -> usize {
        self.calls.lock().iter().filter(|(a, _)| a == address).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn execute(&self, candidate: &EndpointCandidate, operation: &Operation) -> Result<Payload> {
        self.calls.lock().push((candidate.address.clone(), operation.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.scripts.lock().get_mut(&candidate.address).and_then(VecDeque::pop_front);
        if let Some(result) = queued {
            return result;
        }
        self.fallbacks.lock().get(&candidate.address).cloned().unwrap_or_else(|| {
            Err(GatewayError::NetworkUnavailable(format!("{} unreachable", candidate.address)))
        })
    }
}

pub fn json(value: Value) -> Result<Payload> {
    Ok(Payload::Json(value))
}

pub fn down() -> Result<Payload> {
    Err(GatewayError::NetworkUnavailable("connection refused".into()))
}

pub fn server_error() -> Result<Payload> {
    Err(GatewayError::ServerFault { status: 503, message: "maintenance".into() })
}

pub fn rejected(status: u16) -> Result<Payload> {
    Err(GatewayError::ClientRejected { status, message: "invalid request".into() })
}

/// Configuration with `addresses` as candidates for every built-in family
pub fn config_with(addresses: &[&str]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.default_address = PRIMARY.to_string();
    for name in ["invoices", "products", "purchase_orders", "stock_movements"] {
        let family = config.families.entry(name.to_string()).or_insert_with(FamilyConfig::default);
        family.addresses = addresses.iter().map(|a| (*a).to_string()).collect();
    }
    config
}

pub struct Harness {
    pub gateway: Gateway<MockClock>,
    pub executor: Arc<ScriptedExecutor>,
    pub store: Arc<MemoryOfflineStore>,
    pub clock: MockClock,
}

impl Harness {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_executor(config, ScriptedExecutor::new())
    }

    pub fn with_executor(config: GatewayConfig, executor: ScriptedExecutor) -> Self {
        let executor = Arc::new(executor);
        let store = Arc::new(MemoryOfflineStore::new());
        let clock = MockClock::new();
        let gateway = Gateway::with_clock(
            config,
            Arc::clone(&executor) as Arc<dyn RequestExecutor>,
            Arc::clone(&store) as Arc<dyn OfflineStore>,
            clock.clone(),
        )
        .expect("valid config");
        Self { gateway, executor, store, clock }
    }

    pub fn state(&self, family: &backoffice_domain::ResourceFamily) -> AvailabilityState {
        self.gateway.availability(family).state
    }
}
