//! Reconciliation service: reads collaborators, runs the pure pass, writes once.
//!
//! Every entry point follows read-current-state → compute-next-state →
//! atomic-replace. Audit events for manual edits are emitted only after the
//! replace succeeds, and audit failures never fail the operation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use loanfile_core::{
    AuditSink, DocumentSource, Error, FieldAction, FieldEvent, FieldSchemaProvider, ManualEdits,
    NoOpAuditSink, RecomputeOutcome, RecomputeTrigger, ReconcileConfig, Result,
    SubmissionRepository,
};

use crate::engine::{diff_fields, reconcile, ReconcileInput};
use crate::overrides::{index_fields, ManualOverrides};
use crate::registry::FieldRegistry;

/// Caller-facing entry point for recomputes and manual edits.
#[derive(Clone)]
pub struct ReconciliationService {
    schema: Arc<dyn FieldSchemaProvider>,
    documents: Arc<dyn DocumentSource>,
    submissions: Arc<dyn SubmissionRepository>,
    audit: Arc<dyn AuditSink>,
    config: ReconcileConfig,
}

impl ReconciliationService {
    /// Create a service with default config and no audit sink.
    pub fn new(
        schema: Arc<dyn FieldSchemaProvider>,
        documents: Arc<dyn DocumentSource>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            schema,
            documents,
            submissions,
            audit: Arc::new(NoOpAuditSink),
            config: ReconcileConfig::default(),
        }
    }

    /// Set the audit sink for manual edits.
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Set the reconciliation config.
    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Recompute a submission's resolved fields and eligibility.
    pub async fn recompute(&self, submission_id: Uuid) -> Result<RecomputeOutcome> {
        self.run(submission_id, RecomputeTrigger::Explicit, None)
            .await
    }

    /// Recompute after a document was attached.
    pub async fn on_document_added(&self, submission_id: Uuid) -> Result<RecomputeOutcome> {
        self.run(submission_id, RecomputeTrigger::DocumentAdded, None)
            .await
    }

    /// Recompute after a document's file or extraction was replaced.
    pub async fn on_document_replaced(&self, submission_id: Uuid) -> Result<RecomputeOutcome> {
        self.run(submission_id, RecomputeTrigger::DocumentReplaced, None)
            .await
    }

    /// Recompute after a document was removed.
    pub async fn on_document_removed(&self, submission_id: Uuid) -> Result<RecomputeOutcome> {
        self.run(submission_id, RecomputeTrigger::DocumentRemoved, None)
            .await
    }

    /// Apply a reviewer's set/review/clear batch, then recompute.
    ///
    /// The edits and the recompute land in a single atomic replace. Items for
    /// keys outside the schema are skipped.
    pub async fn apply_manual_edits(
        &self,
        submission_id: Uuid,
        edits: &ManualEdits,
        actor_id: &str,
    ) -> Result<RecomputeOutcome> {
        if actor_id.trim().is_empty() {
            return Err(Error::InvalidInput("actor_id must not be empty".to_string()));
        }
        self.run(
            submission_id,
            RecomputeTrigger::ManualEdit,
            Some((edits, actor_id)),
        )
        .await
    }

    async fn load_registry(&self) -> Result<FieldRegistry> {
        let definitions = self.schema.field_definitions().await?;
        let registry = FieldRegistry::new(definitions, &self.config);
        if registry.is_empty() {
            return Err(Error::SchemaUnavailable(
                "no field definitions configured".to_string(),
            ));
        }
        debug!(field_count = registry.len(), "Field schema loaded");
        Ok(registry)
    }

    #[instrument(skip(self, edits), fields(
        subsystem = "reconcile",
        component = "service",
        op = "recompute",
        submission_id = %submission_id,
        trigger = %trigger,
    ))]
    async fn run(
        &self,
        submission_id: Uuid,
        trigger: RecomputeTrigger,
        edits: Option<(&ManualEdits, &str)>,
    ) -> Result<RecomputeOutcome> {
        let start = Instant::now();

        // Read everything before computing anything.
        let registry = self.load_registry().await?;
        let submission = self.submissions.fetch(submission_id).await?;
        let documents = self.documents.document_entries(submission_id).await?;
        let now = Utc::now();

        let mut working = index_fields(&submission.fields);
        let events = match edits {
            Some((edits, actor_id)) => {
                ManualOverrides::new(&registry, submission_id, actor_id, now)
                    .apply(&mut working, edits)
            }
            None => Vec::new(),
        };
        let reviewed_now: BTreeSet<String> = events
            .iter()
            .filter(|e| e.action == FieldAction::Review)
            .map(|e| e.key.clone())
            .collect();

        let state = reconcile(ReconcileInput {
            registry: &registry,
            documents: &documents,
            previous: &working,
            reviewed_now: &reviewed_now,
            status: submission.status,
            config: &self.config,
            now,
        });
        let changes = diff_fields(&submission.fields, &state.fields);

        let updated = self
            .submissions
            .replace_resolved_state(submission_id, state)
            .await?;
        let eligibility = updated.eligibility.clone().ok_or_else(|| {
            Error::Internal("repository returned submission without eligibility".to_string())
        })?;

        self.emit_events(events).await;

        if updated.status != submission.status {
            debug!(from = %submission.status, to = %updated.status, "Submission status changed");
        }
        info!(
            document_count = documents.len(),
            field_count = updated.fields.len(),
            missing_count = eligibility.missing_required_keys.len(),
            eligible = eligibility.eligible,
            status = %updated.status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Recompute complete"
        );

        Ok(RecomputeOutcome {
            submission_id,
            resolved_fields: updated.fields,
            eligibility,
            status: updated.status,
            previous_status: submission.status,
            changes,
        })
    }

    async fn emit_events(&self, events: Vec<FieldEvent>) {
        if !self.config.audit_enabled {
            return;
        }
        for event in events {
            let key = event.key.clone();
            let action = event.action;
            if let Err(e) = self.audit.log_field_event(event).await {
                warn!(
                    field_key = %key,
                    action = %action,
                    error = %e,
                    "Audit write failed; continuing"
                );
            }
        }
    }
}
