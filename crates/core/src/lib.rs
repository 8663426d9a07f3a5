//! # Backoffice Core
//!
//! Pure gateway logic - no HTTP or filesystem code.
//!
//! This crate contains:
//! - Status vocabulary translation
//! - Availability tracking per resource family
//! - The read-response cache
//! - Endpoint resolution and the failover walk
//! - Degraded-mode synthesis and offline mutation replay
//! - Port interfaces (`RequestExecutor`, `OfflineStore`)
//!
//! ## Architecture Principles
//! - Depends only on `backoffice-common` and `backoffice-domain`
//! - All I/O goes through the ports; adapters live in `backoffice-infra`
//! - Time comes from a `Clock` so every TTL is testable

pub mod availability;
pub mod cache;
pub mod fallback;
pub mod gateway;
pub mod offline;
pub mod translation;

// Re-export specific items to avoid ambiguity
pub use availability::{AvailabilityListener, AvailabilityTracker};
pub use cache::ResponseCache;
pub use fallback::FallbackSynthesizer;
pub use gateway::{EndpointResolver, Gateway, RequestExecutor};
pub use offline::{MemoryOfflineStore, OfflineState, OfflineStore};
pub use translation::{StatusTranslator, VocabularyRegistry};
