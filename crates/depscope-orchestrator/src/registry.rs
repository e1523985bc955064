//! Enricher registry
//!
//! Holds constructed enrichers keyed by their stable plugin names.

use crate::enricher::Enricher;
use std::collections::HashMap;

/// Registry of all available enrichers.
pub struct EnricherRegistry {
    enrichers: HashMap<String, Box<dyn Enricher>>,
}

impl EnricherRegistry {
    pub fn new() -> Self {
        Self {
            enrichers: HashMap::new(),
        }
    }

    pub fn register(&mut self, enricher: Box<dyn Enricher>) {
        self.enrichers
            .insert(enricher.name().to_string(), enricher);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Enricher> {
        self.enrichers.get(name).map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.enrichers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enrichers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.enrichers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for EnricherRegistry {
    fn default() -> Self {
        Self::new()
    }
}
