//! Gateway constants
//!
//! Centralized defaults for the data-access gateway. Every value here can be
//! overridden through [`crate::GatewayConfig`].

// Retry policy
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_STEP_MS: u64 = 1_000;

// Per-attempt timeouts by operation class (documents stream and are unbounded)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;

// Response cache
pub const DEFAULT_READ_TTL_SECS: u64 = 300;
pub const DEFAULT_EXTENDED_TTL_SECS: u64 = 600;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 512;

// Endpoint resolution
pub const DEFAULT_CANDIDATE_ADDRESS: &str = "http://localhost:8080/api";

// Durable offline state
pub const DEFAULT_OFFLINE_STORE_PATH: &str = "backoffice-offline.json";
pub const OFFLINE_STORE_VERSION: u32 = 1;

// Synthetic data marker carried by every placeholder record
pub const SYNTHETIC_MARKER_FIELD: &str = "_synthetic";
/// Document-information entry stamped into placeholder PDFs. The token is
/// fixed so genuine documents never carry it by accident.
pub const SYNTHETIC_PDF_MARKER: &[u8] =
    b"/BackofficeSynthetic (7c1f9e52-3b0a-4d8e-a6f4-2e9d51c08b37)";

// Well-known resource families
pub const FAMILY_INVOICES: &str = "invoices";
pub const FAMILY_PRODUCTS: &str = "products";
pub const FAMILY_PURCHASE_ORDERS: &str = "purchase_orders";
pub const FAMILY_STOCK_MOVEMENTS: &str = "stock_movements";

// Built-in status vocabularies
pub const VOCABULARY_INVOICE_STATUS: &str = "invoice_status";
pub const VOCABULARY_ORDER_STATUS: &str = "order_status";
