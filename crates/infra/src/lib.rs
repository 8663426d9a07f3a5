//! # Backoffice Infrastructure
//!
//! Infrastructure implementations of the gateway's ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP client and `RequestExecutor`
//! - Bearer token providers
//! - The JSON-file `OfflineStore`
//! - Configuration loading (file + environment)
//! - Tracing initialisation and gateway bootstrap
//!
//! ## Architecture
//! - Implements traits defined in `backoffice-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod offline;

// Re-export commonly used items
pub use bootstrap::{build_gateway, open_offline_store, token_provider_from_env};
pub use errors::InfraError;
pub use http::{
    AccessTokenProvider, HttpClient, HttpRequestExecutor, NoTokenProvider, StaticTokenProvider,
};
pub use observability::{init_tracing, LogFormat};
pub use offline::JsonFileOfflineStore;
