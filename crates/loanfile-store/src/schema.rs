//! Field schema provider backed by an in-memory list.

use async_trait::async_trait;
use tokio::sync::RwLock;

use loanfile_core::{FieldDefinition, FieldSchemaProvider, Result};

/// Schema provider whose definitions can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticSchemaProvider {
    definitions: RwLock<Vec<FieldDefinition>>,
}

impl StaticSchemaProvider {
    pub fn new(definitions: Vec<FieldDefinition>) -> Self {
        Self {
            definitions: RwLock::new(definitions),
        }
    }

    /// Replace the whole schema. Takes effect on the next recompute.
    pub async fn set_definitions(&self, definitions: Vec<FieldDefinition>) {
        *self.definitions.write().await = definitions;
    }
}

#[async_trait]
impl FieldSchemaProvider for StaticSchemaProvider {
    async fn field_definitions(&self) -> Result<Vec<FieldDefinition>> {
        Ok(self.definitions.read().await.clone())
    }
}
