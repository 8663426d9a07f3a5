//! Gateway configuration structures
//!
//! Everything the gateway needs to know about its environment lives here:
//! candidate addresses per family, cache lifetimes, retry policy, timeouts
//! and the durable store location. Loading (env/file) lives in the infra
//! crate; this module only describes the shape and its defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_STEP_MS, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CANDIDATE_ADDRESS,
    DEFAULT_EXTENDED_TTL_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_OFFLINE_STORE_PATH,
    DEFAULT_READ_TIMEOUT_MS, DEFAULT_READ_TTL_SECS, DEFAULT_WRITE_TIMEOUT_MS, FAMILY_INVOICES,
    FAMILY_PURCHASE_ORDERS, VOCABULARY_INVOICE_STATUS, VOCABULARY_ORDER_STATUS,
};
use crate::errors::{GatewayError, Result};
use crate::types::{OperationClass, ResourceFamily, VocabularyDefinition};

/// Top-level gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Single candidate used for families without configured addresses
    pub default_address: String,
    /// Per-family settings keyed by family name
    pub families: BTreeMap<String, FamilyConfig>,
    pub retry: RetrySettings,
    pub timeouts: TimeoutSettings,
    pub cache: CacheSettings,
    pub offline: OfflineSettings,
    /// Upper bound on a whole failover walk. Unset means unbounded: the walk
    /// may take candidates x attempts x per-attempt timeout in the worst case.
    pub walk_deadline_ms: Option<u64>,
    /// Vocabularies in addition to the built-in invoice and order tables
    pub vocabularies: Vec<VocabularyDefinition>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_address: DEFAULT_CANDIDATE_ADDRESS.to_string(),
            families: default_families(),
            retry: RetrySettings::default(),
            timeouts: TimeoutSettings::default(),
            cache: CacheSettings::default(),
            offline: OfflineSettings::default(),
            walk_deadline_ms: None,
            vocabularies: Vec::new(),
        }
    }
}

fn default_families() -> BTreeMap<String, FamilyConfig> {
    let mut families = BTreeMap::new();
    families.insert(
        FAMILY_INVOICES.to_string(),
        FamilyConfig {
            status_field: Some(StatusBinding::new("status", VOCABULARY_INVOICE_STATUS)),
            ..FamilyConfig::default()
        },
    );
    families.insert(
        FAMILY_PURCHASE_ORDERS.to_string(),
        FamilyConfig {
            status_field: Some(StatusBinding::new("status", VOCABULARY_ORDER_STATUS)),
            ..FamilyConfig::default()
        },
    );
    families
}

impl GatewayConfig {
    /// Settings for a family, if it is configured
    pub fn family(&self, family: &ResourceFamily) -> Option<&FamilyConfig> {
        self.families.get(family.as_str())
    }

    /// Read TTL for a family, falling back to the global default
    pub fn read_ttl(&self, family: &ResourceFamily) -> Duration {
        let secs = self
            .family(family)
            .and_then(|f| f.read_ttl_secs)
            .unwrap_or(self.cache.read_ttl_secs);
        Duration::from_secs(secs)
    }

    /// Extended (last-resort) TTL for a family
    pub fn extended_ttl(&self, family: &ResourceFamily) -> Duration {
        let secs = self
            .family(family)
            .and_then(|f| f.extended_ttl_secs)
            .unwrap_or(self.cache.extended_ttl_secs);
        Duration::from_secs(secs)
    }

    pub fn walk_deadline(&self) -> Option<Duration> {
        self.walk_deadline_ms.map(Duration::from_millis)
    }

    /// Built-in vocabularies followed by configured ones. A configured
    /// vocabulary with a built-in name replaces the built-in table.
    pub fn all_vocabularies(&self) -> Vec<VocabularyDefinition> {
        let mut all: Vec<VocabularyDefinition> = VocabularyDefinition::builtin()
            .into_iter()
            .filter(|builtin| !self.vocabularies.iter().any(|v| v.name == builtin.name))
            .collect();
        all.extend(self.vocabularies.iter().cloned());
        all
    }

    /// Structural validation. Address syntax is checked by the loader.
    ///
    /// # Errors
    /// Returns `GatewayError::Config` describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(GatewayError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.default_address.trim().is_empty() {
            return Err(GatewayError::Config("default_address must not be empty".into()));
        }
        if self.cache.extended_ttl_secs < self.cache.read_ttl_secs {
            return Err(GatewayError::Config(
                "cache.extended_ttl_secs must not be shorter than cache.read_ttl_secs".into(),
            ));
        }

        for (name, family) in &self.families {
            let family_id = ResourceFamily::new(name);
            if self.extended_ttl(&family_id) < self.read_ttl(&family_id) {
                return Err(GatewayError::Config(format!(
                    "family '{name}': extended TTL must not be shorter than read TTL"
                )));
            }
            if family.addresses.iter().any(|a| a.trim().is_empty()) {
                return Err(GatewayError::Config(format!("family '{name}': empty address")));
            }
            if let Some(binding) = &family.status_field {
                let known = self.all_vocabularies().iter().any(|v| v.name == binding.vocabulary);
                if !known {
                    return Err(GatewayError::Config(format!(
                        "family '{name}': unknown vocabulary '{}'",
                        binding.vocabulary
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Per-family configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyConfig {
    /// Candidate base addresses in priority order
    pub addresses: Vec<String>,
    pub read_ttl_secs: Option<u64>,
    pub extended_ttl_secs: Option<u64>,
    /// JSON field holding a status code to translate
    pub status_field: Option<StatusBinding>,
}

/// Binds a JSON field of a family's records to a status vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBinding {
    pub field: String,
    pub vocabulary: String,
}

impl StatusBinding {
    pub fn new(field: impl Into<String>, vocabulary: impl Into<String>) -> Self {
        Self { field: field.into(), vocabulary: vocabulary.into() }
    }
}

/// Per-candidate retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per candidate, including the first
    pub max_attempts: u32,
    /// Linear backoff step: the wait after attempt `n` is `n * step`
    pub backoff_step_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, backoff_step_ms: DEFAULT_BACKOFF_STEP_MS }
    }
}

impl RetrySettings {
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

/// Per-attempt timeouts by operation class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub read_ms: u64,
    pub write_ms: u64,
    /// Unset means documents stream without a bound
    pub document_ms: Option<u64>,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            read_ms: DEFAULT_READ_TIMEOUT_MS,
            write_ms: DEFAULT_WRITE_TIMEOUT_MS,
            document_ms: None,
        }
    }
}

impl TimeoutSettings {
    /// Timeout for one attempt of the given class, `None` for unbounded
    pub fn for_class(&self, class: OperationClass) -> Option<Duration> {
        match class {
            OperationClass::Read => Some(Duration::from_millis(self.read_ms)),
            OperationClass::Write => Some(Duration::from_millis(self.write_ms)),
            OperationClass::Document => self.document_ms.map(Duration::from_millis),
        }
    }
}

/// Response cache defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub read_ttl_secs: u64,
    pub extended_ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            read_ttl_secs: DEFAULT_READ_TTL_SECS,
            extended_ttl_secs: DEFAULT_EXTENDED_TTL_SECS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

/// Durable offline state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineSettings {
    /// JSON file holding pending mutations and offline deletions. Unset keeps
    /// the state in memory only.
    pub store_path: Option<String>,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        Self { store_path: Some(DEFAULT_OFFLINE_STORE_PATH.to_string()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let config = GatewayConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_step(), Duration::from_secs(1));
        assert_eq!(config.read_ttl(&ResourceFamily::products()), Duration::from_secs(300));
        assert_eq!(config.extended_ttl(&ResourceFamily::products()), Duration::from_secs(600));
        assert_eq!(config.timeouts.for_class(OperationClass::Read), Some(Duration::from_secs(3)));
        assert_eq!(config.timeouts.for_class(OperationClass::Write), Some(Duration::from_secs(5)));
        assert_eq!(config.timeouts.for_class(OperationClass::Document), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_family_overrides_ttl() {
        let mut config = GatewayConfig::default();
        config.families.insert(
            "products".into(),
            FamilyConfig { read_ttl_secs: Some(60), ..FamilyConfig::default() },
        );
        assert_eq!(config.read_ttl(&ResourceFamily::products()), Duration::from_secs(60));
        assert_eq!(config.extended_ttl(&ResourceFamily::products()), Duration::from_secs(600));
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let mut config = GatewayConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_unknown_vocabulary() {
        let mut config = GatewayConfig::default();
        config.families.insert(
            "stock_movements".into(),
            FamilyConfig {
                status_field: Some(StatusBinding::new("state", "movement_status")),
                ..FamilyConfig::default()
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("movement_status"));
    }

    #[test]
    fn test_configured_vocabulary_replaces_builtin() {
        let mut config = GatewayConfig::default();
        let mut custom = VocabularyDefinition::invoice_status();
        custom.default_external = "draft".into();
        config.vocabularies.push(custom);

        let all = config.all_vocabularies();
        let invoice: Vec<_> = all.iter().filter(|v| v.name == "invoice_status").collect();
        assert_eq!(invoice.len(), 1);
        assert_eq!(invoice[0].default_external, "draft");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            default_address = "http://fallback.local"

            [families.products]
            addresses = ["http://a.local", "http://b.local"]
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.families["products"].addresses.len(), 2);
        assert!(!config.families.contains_key("invoices"));
    }
}
