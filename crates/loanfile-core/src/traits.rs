//! Core traits for loanfile collaborators.
//!
//! The reconciliation engine never talks to storage, extraction or audit
//! backends directly. These traits define the interfaces that concrete
//! implementations must satisfy, enabling pluggable backends and in-memory
//! fakes in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// SCHEMA
// =============================================================================

/// Source of the master field schema.
#[async_trait]
pub trait FieldSchemaProvider: Send + Sync {
    /// Current field definitions. Read once per recompute.
    async fn field_definitions(&self) -> Result<Vec<FieldDefinition>>;
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Source of document entries and their extraction output.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Documents attached to a submission, in upload order.
    ///
    /// The order is significant: the resolver's final tie-break picks the
    /// candidate from the earliest document.
    async fn document_entries(&self, submission_id: Uuid) -> Result<Vec<DocumentEntry>>;
}

// =============================================================================
// SUBMISSIONS
// =============================================================================

/// Persistence for submissions and their resolved state.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Fetch a submission, or `Error::SubmissionNotFound`.
    async fn fetch(&self, submission_id: Uuid) -> Result<Submission>;

    /// Atomically replace the resolved fields, eligibility snapshot and status.
    ///
    /// Readers must never observe a partially written state.
    async fn replace_resolved_state(
        &self,
        submission_id: Uuid,
        state: ResolvedState,
    ) -> Result<Submission>;
}

// =============================================================================
// AUDIT
// =============================================================================

/// Destination for manual field mutation records.
///
/// Failures are logged and swallowed by callers; they never roll back a write.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_field_event(&self, event: FieldEvent) -> Result<()>;
}

/// Audit sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAuditSink;

#[async_trait]
impl AuditSink for NoOpAuditSink {
    async fn log_field_event(&self, _event: FieldEvent) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_noop_audit_sink_accepts_events() {
        let sink = NoOpAuditSink;
        let event = FieldEvent {
            submission_id: Uuid::new_v4(),
            key: "loan_amount".to_string(),
            action: FieldAction::Set,
            old_value: None,
            new_value: Some(FieldValue::raw(250000)),
            actor_id: "reviewer-1".to_string(),
            occurred_at: Utc::now(),
        };
        assert!(sink.log_field_event(event).await.is_ok());
    }

    #[test]
    fn test_traits_are_object_safe() {
        fn assert_object<T: ?Sized>() {}
        assert_object::<dyn FieldSchemaProvider>();
        assert_object::<dyn DocumentSource>();
        assert_object::<dyn SubmissionRepository>();
        assert_object::<dyn AuditSink>();
    }
}
