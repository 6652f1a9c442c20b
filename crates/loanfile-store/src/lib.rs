//! # loanfile-store
//!
//! In-memory implementations of the loanfile collaborator traits, plus JSON
//! snapshots so a store can be loaded from and written back to disk.
//!
//! ## Example
//!
//! ```ignore
//! use loanfile_store::{MemoryStore, StoreSnapshot};
//!
//! let store = MemoryStore::from_snapshot(StoreSnapshot::load("store.json").await?).await;
//! let submission = store.submissions.fetch(id).await?;
//! ```

use std::sync::Arc;

use tracing::info;

use loanfile_core::{FieldDefinition, FieldSchemaProvider};

pub mod audit;
pub mod schema;
pub mod snapshot;
pub mod submissions;

pub use audit::{MemoryAuditLog, TracingAuditSink};
pub use schema::StaticSchemaProvider;
pub use snapshot::{StoreSnapshot, SubmissionSnapshot};
pub use submissions::{MemorySubmissionStore, SubmissionRecord};

/// Every in-memory collaborator behind one handle.
///
/// The submission store serves both the submission repository and the
/// document source. Fields are `Arc`s so they can be handed to a service as
/// trait objects while the caller keeps access to the concrete types.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// Master field schema.
    pub schema: Arc<StaticSchemaProvider>,
    /// Submissions and their attached documents.
    pub submissions: Arc<MemorySubmissionStore>,
    /// Recorded manual field events.
    pub audit: Arc<MemoryAuditLog>,
}

impl MemoryStore {
    /// Empty store with the given schema.
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Self {
            schema: Arc::new(StaticSchemaProvider::new(fields)),
            submissions: Arc::new(MemorySubmissionStore::new()),
            audit: Arc::new(MemoryAuditLog::new()),
        }
    }

    /// Build a store from a snapshot.
    pub async fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new(snapshot.fields);
        let count = snapshot.submissions.len();
        for record in snapshot.submissions {
            store
                .submissions
                .insert(record.submission, record.documents)
                .await;
        }
        info!(
            subsystem = "store",
            submission_count = count,
            "Memory store initialized from snapshot"
        );
        store
    }

    /// Capture the current schema and submissions.
    pub async fn to_snapshot(&self) -> loanfile_core::Result<StoreSnapshot> {
        let fields = self.schema.field_definitions().await?;
        let submissions = self
            .submissions
            .records()
            .await
            .into_iter()
            .map(SubmissionSnapshot::from)
            .collect();
        Ok(StoreSnapshot {
            fields,
            submissions,
        })
    }
}
