//! Bidirectional status-code translation for one vocabulary

use std::collections::HashSet;

use backoffice_domain::{GatewayError, Result, StatusPair, VocabularyDefinition};
use tracing::warn;

/// Translates status codes between the persistence layer (internal) and the
/// presentation layer (external).
///
/// The table is a bijection, so `to_internal(to_external(x)) == x` holds for
/// every internal code in it. Unknown codes never fail: an unknown internal
/// code becomes the default external code and an unknown external code
/// becomes the first internal code of the table.
#[derive(Debug, Clone)]
pub struct StatusTranslator {
    name: String,
    entries: Vec<StatusPair>,
    default_external: String,
}

impl StatusTranslator {
    /// Build a translator from a vocabulary definition.
    ///
    /// # Errors
    /// `GatewayError::Config` when the table is empty, contains a blank code,
    /// or repeats a code on either side.
    pub fn new(definition: &VocabularyDefinition) -> Result<Self> {
        let name = definition.name.trim().to_string();
        if definition.entries.is_empty() {
            return Err(GatewayError::Config(format!("vocabulary '{name}' has no entries")));
        }

        let mut internal_seen = HashSet::new();
        let mut external_seen = HashSet::new();
        let mut entries = Vec::with_capacity(definition.entries.len());

        for pair in &definition.entries {
            let internal = pair.internal.trim();
            let external = pair.external.trim();
            if internal.is_empty() || external.is_empty() {
                return Err(GatewayError::Config(format!("vocabulary '{name}' has a blank code")));
            }
            if !internal_seen.insert(internal.to_ascii_lowercase()) {
                return Err(GatewayError::Config(format!(
                    "vocabulary '{name}' repeats internal code '{internal}'"
                )));
            }
            if !external_seen.insert(external.to_ascii_lowercase()) {
                return Err(GatewayError::Config(format!(
                    "vocabulary '{name}' repeats external code '{external}'"
                )));
            }
            entries.push(StatusPair::new(internal, external));
        }

        Ok(Self { name, entries, default_external: definition.default_external.trim().to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[StatusPair] {
        &self.entries
    }

    /// Internal code to external code
    pub fn to_external(&self, internal: &str) -> String {
        match find(&self.entries, internal, |pair| &pair.internal) {
            Some(pair) => pair.external.clone(),
            None => {
                warn!(
                    vocabulary = %self.name,
                    code = internal,
                    fallback = %self.default_external,
                    "unknown internal status code, using default"
                );
                self.default_external.clone()
            }
        }
    }

    /// External code to internal code
    pub fn to_internal(&self, external: &str) -> String {
        if let Some(pair) = find(&self.entries, external, |pair| &pair.external) {
            return pair.internal.clone();
        }

        // Non-empty by construction
        let fallback = self.entries.first().map(|pair| pair.internal.clone()).unwrap_or_default();
        warn!(
            vocabulary = %self.name,
            code = external,
            fallback = %fallback,
            "unknown external status code, using first internal code"
        );
        fallback
    }
}

/// Exact match after trimming, then a case-insensitive match
fn find<'a, F>(entries: &'a [StatusPair], code: &str, side: F) -> Option<&'a StatusPair>
where
    F: Fn(&StatusPair) -> &String,
{
    let code = code.trim();
    entries
        .iter()
        .find(|pair| side(pair) == code)
        .or_else(|| entries.iter().find(|pair| side(pair).eq_ignore_ascii_case(code)))
}
