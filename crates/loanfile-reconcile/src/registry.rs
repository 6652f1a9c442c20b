//! Field schema registry: the read-only view of field definitions used by one recompute.

use std::collections::HashSet;

use tracing::debug;

use loanfile_core::{FieldDefinition, ReconcileConfig};

/// Indexed field definitions plus the keys accepted outside the schema.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    definitions: Vec<FieldDefinition>,
    keys: HashSet<String>,
    sentinel_keys: Vec<String>,
}

impl FieldRegistry {
    /// Build a registry. When a key is defined twice the first definition wins.
    pub fn new(definitions: Vec<FieldDefinition>, config: &ReconcileConfig) -> Self {
        let mut unique = Vec::with_capacity(definitions.len());
        let mut keys = HashSet::with_capacity(definitions.len());
        for def in definitions {
            if !keys.insert(def.key.clone()) {
                debug!(field_key = %def.key, "Duplicate field definition ignored");
                continue;
            }
            unique.push(def);
        }
        Self {
            definitions: unique,
            keys,
            sentinel_keys: config.sentinel_keys.clone(),
        }
    }

    /// Whether `key` is declared or is a sentinel key.
    pub fn accepts(&self, key: &str) -> bool {
        self.keys.contains(key) || self.sentinel_keys.iter().any(|k| k == key)
    }

    /// All definitions, in schema order.
    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.definitions.iter().filter(|d| d.required)
    }

    pub fn optional(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.definitions.iter().filter(|d| !d.required)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
