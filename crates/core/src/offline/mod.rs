//! Durable offline state: pending mutations and offline deletions
//!
//! The port lives here with the serializable state both adapters share. The
//! JSON-file adapter is in `backoffice-infra`.

pub mod memory;
pub mod ports;
pub mod state;

pub use memory::MemoryOfflineStore;
pub use ports::OfflineStore;
pub use state::OfflineState;
