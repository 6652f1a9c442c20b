//! Audit sinks for manual field mutations.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use loanfile_core::{AuditSink, FieldEvent, Result};

/// Audit sink that keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    events: RwLock<Vec<FieldEvent>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<FieldEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn log_field_event(&self, event: FieldEvent) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}

/// Audit sink that writes each event as a structured `info` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn log_field_event(&self, event: FieldEvent) -> Result<()> {
        let old_value = event
            .old_value
            .as_ref()
            .map(|v| v.raw.to_string())
            .unwrap_or_default();
        let new_value = event
            .new_value
            .as_ref()
            .map(|v| v.raw.to_string())
            .unwrap_or_default();
        info!(
            subsystem = "audit",
            submission_id = %event.submission_id,
            field_key = %event.key,
            action = %event.action,
            actor_id = %event.actor_id,
            old_value = %old_value,
            new_value = %new_value,
            "Field event"
        );
        Ok(())
    }
}
