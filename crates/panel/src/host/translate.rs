//! Map-backed translator

use std::collections::HashMap;
use std::sync::Arc;

use super::Translator;

/// Translator backed by a key → text map, falling back to the key itself
#[derive(Debug, Clone, Default)]
pub struct MapTranslator {
    strings: HashMap<String, String>,
}

impl MapTranslator {
    pub fn new(strings: HashMap<String, String>) -> Self {
        Self { strings }
    }

    /// Built-in English strings for the keys the panel uses
    pub fn english() -> Self {
        let strings = [
            ("JS_ERROR", "Error"),
            ("JS_ADDED_RELATION_SUCCESSFULLY", "Relation added successfully"),
            ("JS_REMOVED_RELATION_SUCCESSFULLY", "Relation removed successfully"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { strings }
    }

    /// Overlay additional strings, replacing existing keys
    pub fn extend(mut self, strings: HashMap<String, String>) -> Self {
        self.strings.extend(strings);
        self
    }
}

impl Translator for MapTranslator {
    fn translate(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Overrides looked up first, everything else answered by `fallback`
pub struct LayeredTranslator {
    overrides: HashMap<String, String>,
    fallback: Arc<dyn Translator>,
}

impl LayeredTranslator {
    pub fn new(overrides: HashMap<String, String>, fallback: Arc<dyn Translator>) -> Self {
        Self {
            overrides,
            fallback,
        }
    }
}

impl Translator for LayeredTranslator {
    fn translate(&self, key: &str) -> String {
        match self.overrides.get(key) {
            Some(text) => text.clone(),
            None => self.fallback.translate(key),
        }
    }
}
