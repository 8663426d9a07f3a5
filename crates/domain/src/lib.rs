//! # Backoffice Domain
//!
//! Domain types shared by every layer of the data-access gateway.
//!
//! This crate contains:
//! - The gateway error taxonomy and Result alias
//! - Resource families, operations, payloads and gateway responses
//! - Availability states and degraded-mode notices
//! - Status vocabulary tables (invoice, purchase order)
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - No dependencies on other backoffice crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
