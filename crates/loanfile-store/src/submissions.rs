//! In-memory submission and document storage.
//!
//! One `RwLock` guards every submission, so `replace_resolved_state` swaps
//! fields, eligibility and status under a single write guard and readers
//! never see a half-written submission.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use loanfile_core::{
    DocumentEntry, DocumentSource, Error, ResolvedState, Result, Submission, SubmissionRepository,
};

/// A submission together with its attached documents, in upload order.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub submission: Submission,
    pub documents: Vec<DocumentEntry>,
}

/// Submission repository and document source held in memory.
#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    records: RwLock<HashMap<Uuid, SubmissionRecord>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a submission and its documents.
    pub async fn insert(&self, submission: Submission, documents: Vec<DocumentEntry>) {
        let mut records = self.records.write().await;
        records.insert(
            submission.id,
            SubmissionRecord {
                submission,
                documents,
            },
        );
    }

    /// Create an empty pending submission.
    pub async fn create(&self) -> Uuid {
        let submission = Submission::new(Uuid::now_v7());
        let id = submission.id;
        self.insert(submission, Vec::new()).await;
        id
    }

    /// Attach a document at the end of the upload order.
    pub async fn add_document(&self, submission_id: Uuid, document: DocumentEntry) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&submission_id)
            .ok_or(Error::SubmissionNotFound(submission_id))?;
        if record.documents.iter().any(|d| d.id == document.id) {
            return Err(Error::InvalidInput(format!(
                "Document {} already attached",
                document.id
            )));
        }
        debug!(submission_id = %submission_id, document_id = %document.id, "Document added");
        record.documents.push(document);
        Ok(())
    }

    /// Replace a document in place, keeping its upload position.
    pub async fn replace_document(
        &self,
        submission_id: Uuid,
        document_id: Uuid,
        document: DocumentEntry,
    ) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&submission_id)
            .ok_or(Error::SubmissionNotFound(submission_id))?;
        let slot = record
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| Error::NotFound(format!("Document {}", document_id)))?;
        *slot = document;
        debug!(submission_id = %submission_id, document_id = %document_id, "Document replaced");
        Ok(())
    }

    /// Detach a document. Derived fields disappear on the next recompute.
    pub async fn remove_document(
        &self,
        submission_id: Uuid,
        document_id: Uuid,
    ) -> Result<DocumentEntry> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&submission_id)
            .ok_or(Error::SubmissionNotFound(submission_id))?;
        let index = record
            .documents
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(|| Error::NotFound(format!("Document {}", document_id)))?;
        debug!(submission_id = %submission_id, document_id = %document_id, "Document removed");
        Ok(record.documents.remove(index))
    }

    /// Snapshot of every record, ordered by submission id.
    pub async fn records(&self) -> Vec<SubmissionRecord> {
        let records = self.records.read().await;
        let mut all: Vec<SubmissionRecord> = records.values().cloned().collect();
        all.sort_by_key(|r| r.submission.id);
        all
    }
}

#[async_trait]
impl SubmissionRepository for MemorySubmissionStore {
    async fn fetch(&self, submission_id: Uuid) -> Result<Submission> {
        self.records
            .read()
            .await
            .get(&submission_id)
            .map(|r| r.submission.clone())
            .ok_or(Error::SubmissionNotFound(submission_id))
    }

    async fn replace_resolved_state(
        &self,
        submission_id: Uuid,
        state: ResolvedState,
    ) -> Result<Submission> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&submission_id)
            .ok_or(Error::SubmissionNotFound(submission_id))?;
        let submission = &mut record.submission;
        submission.fields = state.fields;
        submission.eligibility = Some(state.eligibility);
        submission.status = state.status;
        submission.updated_at = Utc::now();
        Ok(submission.clone())
    }
}

#[async_trait]
impl DocumentSource for MemorySubmissionStore {
    async fn document_entries(&self, submission_id: Uuid) -> Result<Vec<DocumentEntry>> {
        self.records
            .read()
            .await
            .get(&submission_id)
            .map(|r| r.documents.clone())
            .ok_or(Error::SubmissionNotFound(submission_id))
    }
}
