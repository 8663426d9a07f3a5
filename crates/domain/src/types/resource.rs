//! Resource families and endpoint candidates

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    FAMILY_INVOICES, FAMILY_PRODUCTS, FAMILY_PURCHASE_ORDERS, FAMILY_STOCK_MOVEMENTS,
};

/// A class of data sharing one candidate list, one cache namespace and one
/// availability state (e.g. "invoices", "products").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceFamily(String);

impl ResourceFamily {
    /// Create a family from any identifier. Identifiers are trimmed and
    /// lowercased so configuration and call sites agree.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    pub fn invoices() -> Self {
        Self::new(FAMILY_INVOICES)
    }

    pub fn products() -> Self {
        Self::new(FAMILY_PRODUCTS)
    }

    pub fn purchase_orders() -> Self {
        Self::new(FAMILY_PURCHASE_ORDERS)
    }

    pub fn stock_movements() -> Self {
        Self::new(FAMILY_STOCK_MOVEMENTS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceFamily {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceFamily {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One concrete network address eligible to serve a family's requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    /// Base address, e.g. `https://api-1.example.com/v1`
    pub address: String,
    /// Rank in the failover walk, 0 is tried first
    pub priority: u32,
    /// Wall-clock time of the last successful operation against this address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
}

impl EndpointCandidate {
    pub fn new(address: impl Into<String>, priority: u32) -> Self {
        Self { address: address.into(), priority, last_success_at: None }
    }

    /// Join the base address and an operation path with exactly one slash.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.address.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}
