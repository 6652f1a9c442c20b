//! Candidate collection: turns per-document extraction output into candidates keyed by field.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use loanfile_core::defaults::EXTRACTION_METHOD;
use loanfile_core::{
    CandidateRecord, Confidence, DocumentEntry, ExtractedCandidate, FieldSource, Traceability,
};

use crate::registry::FieldRegistry;

/// Candidates per field key, each list in document order.
pub type CandidateMap = BTreeMap<String, Vec<ExtractedCandidate>>;

/// Normalize one wire record into a candidate attributed to `document`.
///
/// Returns `None` for records without a usable key. Traceability fields the
/// extractor left empty are filled from the document identity.
pub fn candidate_from_record(
    record: &CandidateRecord,
    document: &DocumentEntry,
) -> Option<ExtractedCandidate> {
    let key = record.key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;

    let mut traceability = record.traceability.clone().unwrap_or_default();
    fill_traceability(&mut traceability, document);

    Some(ExtractedCandidate {
        key: key.to_string(),
        value: record.value.clone().unwrap_or_default(),
        confidence: Confidence::parse_lenient(record.confidence.as_deref()),
        conflicts: record.conflicts.clone(),
        occurrences: record.occurrences.clone(),
        notes: record.notes.clone(),
        validation: record.validation.clone(),
        source: FieldSource::Extraction {
            document_entry_id: document.id,
            file_id: document.file_id.clone(),
            document_name: Some(document.document_name.clone()),
            extracted_at: document.extracted_at,
        },
        traceability,
    })
}

fn fill_traceability(traceability: &mut Traceability, document: &DocumentEntry) {
    if traceability
        .document_name
        .as_deref()
        .map_or(true, |n| n.trim().is_empty())
    {
        traceability.document_name = Some(document.document_name.clone());
    }
    if traceability.document_id.is_none() {
        traceability.document_id = Some(document.id);
    }
    if traceability.file_id.is_none() {
        traceability.file_id = document.file_id.clone();
    }
    if traceability.extracted_at.is_none() {
        traceability.extracted_at = document.extracted_at;
    }
    if traceability.extraction_method.is_none() {
        traceability.extraction_method = Some(EXTRACTION_METHOD.to_string());
    }
}

/// Gather every candidate from every document, keyed by field key.
///
/// Keys outside the registry are dropped unless they are sentinel keys;
/// records without a key are dropped.
pub fn collect_candidates(documents: &[DocumentEntry], registry: &FieldRegistry) -> CandidateMap {
    let mut map = CandidateMap::new();
    let mut malformed = 0usize;
    let mut unknown = 0usize;

    for document in documents {
        for record in &document.extracted_candidates {
            let Some(candidate) = candidate_from_record(record, document) else {
                malformed += 1;
                continue;
            };
            if !registry.accepts(&candidate.key) {
                trace!(
                    field_key = %candidate.key,
                    document_id = %document.id,
                    "Dropping candidate for key outside schema"
                );
                unknown += 1;
                continue;
            }
            map.entry(candidate.key.clone()).or_default().push(candidate);
        }
    }

    if malformed > 0 || unknown > 0 {
        debug!(
            document_count = documents.len(),
            malformed, unknown, "Dropped candidates during collection"
        );
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanfile_core::{FieldDefinition, FieldType, FieldValue, ReconcileConfig};
    use serde_json::json;
    use uuid::Uuid;

    fn record(key: Option<&str>, raw: serde_json::Value, confidence: &str) -> CandidateRecord {
        CandidateRecord {
            key: key.map(str::to_string),
            value: Some(FieldValue::raw(raw)),
            confidence: Some(confidence.to_string()),
            ..Default::default()
        }
    }

    fn document(name: &str, records: Vec<CandidateRecord>) -> DocumentEntry {
        DocumentEntry {
            id: Uuid::new_v4(),
            file_id: Some(format!("file-{}", name)),
            document_name: name.to_string(),
            extracted_at: None,
            extracted_candidates: records,
        }
    }

    fn registry() -> FieldRegistry {
        FieldRegistry::new(
            vec![
                FieldDefinition::required("mortgagor_1_name", FieldType::String),
                FieldDefinition::required("loan_amount", FieldType::Number),
            ],
            &ReconcileConfig::default(),
        )
    }

    #[test]
    fn test_collects_across_documents_in_order() {
        let docs = vec![
            document(
                "application.pdf",
                vec![record(Some("loan_amount"), json!(5_000_000), "high")],
            ),
            document(
                "sanction_letter.pdf",
                vec![
                    record(Some("loan_amount"), json!(4_500_000), "medium"),
                    record(Some("mortgagor_1_name"), json!("Ayesha Khan"), "high"),
                ],
            ),
        ];
        let map = collect_candidates(&docs, &registry());
        assert_eq!(map.len(), 2);
        let amounts = &map["loan_amount"];
        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[0].value.raw, json!(5_000_000));
        assert_eq!(amounts[1].source.document_entry_id(), Some(docs[1].id));
    }

    #[test]
    fn test_drops_unknown_keys_but_keeps_legal_name() {
        let docs = vec![document(
            "cnic.jpg",
            vec![
                record(Some("legal_name"), json!("AYESHA KHAN"), "high"),
                record(Some("shoe_size"), json!(7), "high"),
            ],
        )];
        let map = collect_candidates(&docs, &registry());
        assert!(map.contains_key("legal_name"));
        assert!(!map.contains_key("shoe_size"));
    }

    #[test]
    fn test_drops_records_without_key() {
        let docs = vec![document(
            "application.pdf",
            vec![
                record(None, json!("orphan"), "high"),
                record(Some("   "), json!("blank"), "high"),
                record(Some(" loan_amount "), json!(1), "low"),
            ],
        )];
        let map = collect_candidates(&docs, &registry());
        assert_eq!(map.len(), 1);
        assert_eq!(map["loan_amount"][0].key, "loan_amount");
    }

    #[test]
    fn test_candidate_normalization_defaults() {
        let doc = document("application.pdf", vec![]);
        let record = CandidateRecord {
            key: Some("loan_amount".to_string()),
            confidence: Some("very sure".to_string()),
            ..Default::default()
        };
        let candidate = candidate_from_record(&record, &doc).unwrap();
        assert_eq!(candidate.confidence, Confidence::Low);
        assert!(candidate.value.raw.is_null());
        assert_eq!(
            candidate.traceability.document_name.as_deref(),
            Some("application.pdf")
        );
        assert_eq!(
            candidate.traceability.file_id.as_deref(),
            Some("file-application.pdf")
        );
        assert_eq!(candidate.traceability.document_id, Some(doc.id));
        assert_eq!(candidate.traceability.extraction_method.as_deref(), Some("llm"));
    }

    #[test]
    fn test_extractor_traceability_is_kept() {
        let doc = document("application.pdf", vec![]);
        let record = CandidateRecord {
            key: Some("loan_amount".to_string()),
            traceability: Some(Traceability {
                document_name: Some("page-2-crop.png".to_string()),
                extraction_method: Some("vision".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let candidate = candidate_from_record(&record, &doc).unwrap();
        assert_eq!(
            candidate.traceability.document_name.as_deref(),
            Some("page-2-crop.png")
        );
        assert_eq!(candidate.traceability.extraction_method.as_deref(), Some("vision"));
    }

    #[test]
    fn test_malformed_wire_records_are_normalized() {
        let doc: DocumentEntry = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "document_name": "application.pdf",
            "extracted_candidates": [
                { "key": "loan_amount", "value": { "raw": 2500000 }, "confidence": 0.9, "conflicts": null },
                { "key": 7, "value": { "raw": "orphan" }, "confidence": "high" },
                { "key": "mortgagor_1_name", "value": "Ayesha Khan", "occurrences": null }
            ]
        }))
        .unwrap();

        let map = collect_candidates(std::slice::from_ref(&doc), &registry());
        assert_eq!(map.len(), 2);
        let amount = &map["loan_amount"][0];
        assert_eq!(amount.confidence, Confidence::Low);
        assert!(amount.conflicts.is_empty());
        let name = &map["mortgagor_1_name"][0];
        assert_eq!(name.value.raw, json!("Ayesha Khan"));
        assert!(name.occurrences.is_empty());
    }
}
