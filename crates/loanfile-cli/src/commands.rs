//! Subcommand implementations over a snapshot-backed store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::ValueEnum;
use tracing::info;
use uuid::Uuid;

use loanfile_core::{ManualEdits, RecomputeOutcome, ReconcileConfig};
use loanfile_reconcile::ReconciliationService;
use loanfile_store::{MemoryStore, StoreSnapshot, TracingAuditSink};

/// Which lifecycle event a recompute is reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TriggerArg {
    #[default]
    Explicit,
    DocumentAdded,
    DocumentReplaced,
    DocumentRemoved,
}

/// A store loaded from a snapshot file plus a service wired to it.
pub struct Session {
    path: PathBuf,
    store: MemoryStore,
    service: ReconciliationService,
}

impl Session {
    pub async fn open(path: &Path, config: ReconcileConfig) -> anyhow::Result<Self> {
        let snapshot = StoreSnapshot::load(path)
            .await
            .with_context(|| format!("loading snapshot {}", path.display()))?;
        let store = MemoryStore::from_snapshot(snapshot).await;
        let service = ReconciliationService::new(
            store.schema.clone(),
            store.submissions.clone(),
            store.submissions.clone(),
        )
        .with_audit_sink(Arc::new(TracingAuditSink))
        .with_config(config);
        Ok(Self {
            path: path.to_path_buf(),
            store,
            service,
        })
    }

    /// Recompute one submission, or every submission when `submission` is `None`.
    pub async fn recompute(
        &self,
        submission: Option<Uuid>,
        trigger: TriggerArg,
    ) -> anyhow::Result<Vec<RecomputeOutcome>> {
        let ids = match submission {
            Some(id) => vec![id],
            None => self
                .store
                .submissions
                .records()
                .await
                .into_iter()
                .map(|r| r.submission.id)
                .collect(),
        };

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let outcome = match trigger {
                TriggerArg::Explicit => self.service.recompute(id).await,
                TriggerArg::DocumentAdded => self.service.on_document_added(id).await,
                TriggerArg::DocumentReplaced => self.service.on_document_replaced(id).await,
                TriggerArg::DocumentRemoved => self.service.on_document_removed(id).await,
            }
            .with_context(|| format!("recomputing submission {}", id))?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Apply an edits file to one submission.
    pub async fn edit(
        &self,
        submission: Uuid,
        edits_path: &Path,
        actor_id: &str,
    ) -> anyhow::Result<RecomputeOutcome> {
        let json = tokio::fs::read_to_string(edits_path)
            .await
            .with_context(|| format!("reading edits {}", edits_path.display()))?;
        let edits: ManualEdits = serde_json::from_str(&json)
            .with_context(|| format!("parsing edits {}", edits_path.display()))?;
        if edits.is_empty() {
            info!("Edits file is empty; recomputing only");
        }
        let outcome = self
            .service
            .apply_manual_edits(submission, &edits, actor_id)
            .await
            .with_context(|| format!("editing submission {}", submission))?;
        Ok(outcome)
    }

    /// Write the store back over the snapshot it was loaded from.
    pub async fn save(&self) -> anyhow::Result<()> {
        let snapshot = self.store.to_snapshot().await?;
        snapshot
            .save(&self.path)
            .await
            .with_context(|| format!("writing snapshot {}", self.path.display()))?;
        info!(path = %self.path.display(), "Snapshot written");
        Ok(())
    }
}

/// One line per outcome: id, status transition, counts and missing keys.
pub fn summary_line(outcome: &RecomputeOutcome) -> String {
    let e = &outcome.eligibility;
    let mut line = format!(
        "{} {} -> {} eligible={} required={}/{} optional={}/{}",
        outcome.submission_id,
        outcome.previous_status,
        outcome.status,
        e.eligible,
        e.filled_required,
        e.required_total,
        e.filled_optional,
        e.optional_total,
    );
    if !e.missing_required_keys.is_empty() {
        line.push_str(&format!(" missing=[{}]", e.missing_required_keys.join(",")));
    }
    if !e.needs_review_keys.is_empty() {
        line.push_str(&format!(" review=[{}]", e.needs_review_keys.join(",")));
    }
    line
}
