//! Status vocabulary tables
//!
//! The persistence layer and the presentation layer name the same domain
//! states differently. A vocabulary is the closed table pairing the two.

use serde::{Deserialize, Serialize};

use crate::constants::{VOCABULARY_INVOICE_STATUS, VOCABULARY_ORDER_STATUS};

/// One row of a vocabulary: the persistence-layer code and its presentation
/// counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPair {
    pub internal: String,
    pub external: String,
}

impl StatusPair {
    pub fn new(internal: impl Into<String>, external: impl Into<String>) -> Self {
        Self { internal: internal.into(), external: external.into() }
    }
}

/// Definition of a vocabulary as it appears in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyDefinition {
    pub name: String,
    /// External code rendered for an unknown internal code
    pub default_external: String,
    /// Table order matters: the first internal code is the fallback for
    /// unknown external codes
    pub entries: Vec<StatusPair>,
}

impl VocabularyDefinition {
    /// Invoice lifecycle
    pub fn invoice_status() -> Self {
        Self {
            name: VOCABULARY_INVOICE_STATUS.to_string(),
            default_external: "pending".to_string(),
            entries: vec![
                StatusPair::new("DRAFT", "draft"),
                StatusPair::new("ISSUED", "pending"),
                StatusPair::new("PAID", "paid"),
                StatusPair::new("OVERDUE", "overdue"),
                StatusPair::new("VOID", "cancelled"),
            ],
        }
    }

    /// Purchase order lifecycle
    pub fn order_status() -> Self {
        Self {
            name: VOCABULARY_ORDER_STATUS.to_string(),
            default_external: "pending".to_string(),
            entries: vec![
                StatusPair::new("CREATED", "pending"),
                StatusPair::new("APPROVED", "approved"),
                StatusPair::new("RECEIVED", "received"),
                StatusPair::new("CANCELLED", "cancelled"),
            ],
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![Self::invoice_status(), Self::order_status()]
    }
}
