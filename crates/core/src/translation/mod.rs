//! Status vocabulary translation
//!
//! The persistence layer and the presentation layer name the same states
//! differently (`ISSUED` vs `pending`). Reads are rewritten to the
//! presentation vocabulary, write bodies to the persistence vocabulary.

pub mod registry;
pub mod translator;

pub use registry::{Direction, VocabularyRegistry};
pub use translator::StatusTranslator;
