//! # Backoffice App
//!
//! Operator CLI over the resilient gateway: reads, mutations, the offline
//! queue and availability status.

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

pub use cli::{Cli, Command};
pub use commands::execute;
pub use context::AppContext;
