//! Degraded-mode fallback
//!
//! When every candidate of a family failed, reads get clearly marked
//! placeholder data and mutations are queued durably for later replay.

pub mod catalog;
pub mod synthesizer;

pub use synthesizer::FallbackSynthesizer;
