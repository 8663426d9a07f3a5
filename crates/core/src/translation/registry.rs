//! Vocabulary lookup and payload translation per resource family

use std::collections::HashMap;

use backoffice_domain::{GatewayConfig, GatewayError, ResourceFamily, Result};
use serde_json::Value;

use super::translator::StatusTranslator;

/// Direction of a payload translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Persistence codes to presentation codes (read responses)
    ToExternal,
    /// Presentation codes to persistence codes (write bodies)
    ToInternal,
}

#[derive(Debug, Clone)]
struct FieldBinding {
    field: String,
    vocabulary: String,
}

/// All configured vocabularies plus the family-to-field bindings
#[derive(Debug, Clone, Default)]
pub struct VocabularyRegistry {
    translators: HashMap<String, StatusTranslator>,
    bindings: HashMap<ResourceFamily, FieldBinding>,
}

impl VocabularyRegistry {
    /// Build the registry from configuration
    ///
    /// # Errors
    /// `GatewayError::Config` for an invalid vocabulary table or a binding
    /// naming an unknown vocabulary.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let mut translators = HashMap::new();
        for definition in config.all_vocabularies() {
            let translator = StatusTranslator::new(&definition)?;
            translators.insert(translator.name().to_string(), translator);
        }

        let mut bindings = HashMap::new();
        for (family, family_config) in &config.families {
            let Some(binding) = &family_config.status_field else {
                continue;
            };
            if !translators.contains_key(&binding.vocabulary) {
                return Err(GatewayError::Config(format!(
                    "family '{family}' binds unknown vocabulary '{}'",
                    binding.vocabulary
                )));
            }
            bindings.insert(
                ResourceFamily::new(family),
                FieldBinding { field: binding.field.clone(), vocabulary: binding.vocabulary.clone() },
            );
        }

        Ok(Self { translators, bindings })
    }

    pub fn translator(&self, vocabulary: &str) -> Option<&StatusTranslator> {
        self.translators.get(vocabulary)
    }

    /// Translate the bound status field of every record in `payload`.
    ///
    /// Records are the payload itself when it is an object, the elements of
    /// a top-level array, or the elements of an array under `data` or
    /// `items`. Non-string status values are left alone. Returns the number
    /// of fields rewritten.
    pub fn translate(&self, family: &ResourceFamily, payload: &mut Value, direction: Direction) -> usize {
        let Some(binding) = self.bindings.get(family) else {
            return 0;
        };
        let Some(translator) = self.translators.get(&binding.vocabulary) else {
            return 0;
        };

        let mut rewritten = 0;
        for record in records_mut(payload) {
            let Some(Value::String(code)) = record.get_mut(&binding.field) else {
                continue;
            };
            let translated = match direction {
                Direction::ToExternal => translator.to_external(code.as_str()),
                Direction::ToInternal => translator.to_internal(code.as_str()),
            };
            *code = translated;
            rewritten += 1;
        }
        rewritten
    }
}

fn records_mut(payload: &mut Value) -> Vec<&mut serde_json::Map<String, Value>> {
    match payload {
        Value::Array(items) => items.iter_mut().filter_map(Value::as_object_mut).collect(),
        Value::Object(map) => {
            let wrapped = ["data", "items"]
                .into_iter()
                .find(|key| map.get(*key).is_some_and(Value::is_array));
            match wrapped {
                Some(key) => match map.get_mut(key) {
                    Some(Value::Array(items)) => {
                        items.iter_mut().filter_map(Value::as_object_mut).collect()
                    }
                    _ => Vec::new(),
                },
                None => vec![map],
            }
        }
        _ => Vec::new(),
    }
}
