//! JSON snapshots of a whole store.
//!
//! A snapshot file carries the field schema plus every submission with its
//! documents:
//!
//! ```json
//! {
//!   "fields": [{ "key": "legal_name", "type": "string", "required": true }],
//!   "submissions": [
//!     { "submission": { "id": "..." }, "documents": [ ... ] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use loanfile_core::{DocumentEntry, Error, FieldDefinition, Result, Submission};

use crate::submissions::SubmissionRecord;

/// One submission and its documents as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSnapshot {
    pub submission: Submission,
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

impl From<SubmissionRecord> for SubmissionSnapshot {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            submission: record.submission,
            documents: record.documents,
        }
    }
}

/// Serialized form of a [`crate::MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub submissions: Vec<SubmissionSnapshot>,
}

impl StoreSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a snapshot file.
    #[instrument(skip_all, fields(subsystem = "store", component = "snapshot", op = "load"))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        let snapshot = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            field_count = snapshot.fields.len(),
            submission_count = snapshot.submissions.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write a snapshot file, replacing any existing one.
    ///
    /// The JSON goes to a sibling temp file first and is renamed into place.
    #[instrument(skip_all, fields(subsystem = "store", component = "snapshot", op = "save"))]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "Snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanfile_core::FieldType;
    use uuid::Uuid;

    const FIXTURE: &str = r#"{
        "fields": [
            { "key": "legal_name", "type": "string", "required": true },
            { "key": "loan_amount", "type": "number", "required": true },
            { "key": "co_applicant", "type": "string", "required": false }
        ],
        "submissions": [
            {
                "submission": { "id": "0192d3a4-5b6c-7d8e-9f00-112233445566" },
                "documents": [
                    {
                        "id": "0192d3a4-5b6c-7d8e-9f00-aabbccddeeff",
                        "document_name": "application.pdf",
                        "extracted_candidates": [
                            { "key": "loan_amount", "value": { "raw": 2500000 }, "confidence": "high" }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_fixture() {
        let snapshot = StoreSnapshot::from_json(FIXTURE).unwrap();
        assert_eq!(snapshot.fields.len(), 3);
        assert_eq!(snapshot.fields[1].field_type, FieldType::Number);
        assert!(!snapshot.fields[2].required);

        let record = &snapshot.submissions[0];
        assert!(record.submission.fields.is_empty());
        assert_eq!(record.documents.len(), 1);
        assert_eq!(record.documents[0].extracted_candidates.len(), 1);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = StoreSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut snapshot = StoreSnapshot::from_json(FIXTURE).unwrap();
        snapshot.submissions.push(SubmissionSnapshot {
            submission: Submission::new(Uuid::new_v4()),
            documents: vec![],
        });
        snapshot.save(&path).await.unwrap();

        let loaded = StoreSnapshot::load(&path).await.unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreSnapshot::load(dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
