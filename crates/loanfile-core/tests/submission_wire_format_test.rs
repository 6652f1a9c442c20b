//! Tests for the persisted JSON shape of submissions and resolved fields.
//!
//! Stored submissions are read by other services, so key names and tag
//! values must stay stable.

use chrono::{TimeZone, Utc};
use loanfile_core::{
    Confidence, EligibilitySnapshot, FieldSource, FieldValue, ManualEdits, ResolvedField,
    Submission, SubmissionStatus,
};
use serde_json::json;
use uuid::Uuid;

fn manual_field() -> ResolvedField {
    let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
    ResolvedField {
        key: "cnic".to_string(),
        value: FieldValue::raw("35202-1234567-1"),
        confidence: Confidence::High,
        conflicts: vec![],
        occurrences: vec![],
        notes: None,
        validation: None,
        traceability: None,
        source: FieldSource::Manual {
            actor_id: "reviewer-7".to_string(),
            set_at: at,
        },
        is_reviewed: true,
        reviewed_at: Some(at),
        reviewed_by: Some("reviewer-7".to_string()),
    }
}

#[test]
fn test_resolved_field_key_names() {
    let value = serde_json::to_value(manual_field()).unwrap();

    assert_eq!(value["confidence"], json!("high"));
    assert_eq!(value["source"]["type"], json!("manual"));
    assert_eq!(value["source"]["actorId"], json!("reviewer-7"));
    assert!(value["source"].get("setAt").is_some());
    assert_eq!(value["is_reviewed"], json!(true));
    assert!(value.get("reviewedAt").is_some());
    assert_eq!(value["reviewedBy"], json!("reviewer-7"));
    assert!(value.get("validation").is_none());
}

#[test]
fn test_extraction_source_key_names() {
    let id = Uuid::new_v4();
    let source = FieldSource::Extraction {
        document_entry_id: id,
        file_id: Some("file-1".to_string()),
        document_name: Some("application.pdf".to_string()),
        extracted_at: None,
    };
    let value = serde_json::to_value(&source).unwrap();

    assert_eq!(value["type"], json!("extraction"));
    assert_eq!(value["documentEntryId"], json!(id.to_string()));
    assert_eq!(value["fileId"], json!("file-1"));
    assert_eq!(source.document_entry_id(), Some(id));
}

#[test]
fn test_submission_status_and_eligibility_names() {
    let mut submission = Submission::new(Uuid::new_v4());
    submission.status = SubmissionStatus::Review;
    submission.fields.push(manual_field());
    submission.eligibility = Some(EligibilitySnapshot {
        eligible: false,
        required_total: 3,
        filled_required: 2,
        missing_required_keys: vec!["application_date".to_string()],
        needs_review_keys: vec![],
        optional_total: 0,
        filled_optional: 0,
        missing_optional_keys: vec![],
        needs_review_optional_keys: vec![],
        updated_at: Utc::now(),
    });

    let value = serde_json::to_value(&submission).unwrap();
    assert_eq!(value["status"], json!("review"));
    assert_eq!(value["eligibility"]["filled_required"], json!(2));
    assert!(value["eligibility"].get("updatedAt").is_some());

    let back: Submission = serde_json::from_value(value).unwrap();
    assert_eq!(back, submission);
}

#[test]
fn test_manual_edits_accepts_camel_case_clear() {
    let edits: ManualEdits = serde_json::from_value(json!({
        "set": [{ "key": "cnic", "value": { "raw": "35202-1234567-1" } }],
        "clearManual": ["legal_name"]
    }))
    .unwrap();

    assert_eq!(edits.set.len(), 1);
    assert!(edits.review.is_empty());
    assert_eq!(edits.clear_manual, vec!["legal_name"]);
    assert!(!edits.is_empty());
}
