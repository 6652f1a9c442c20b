//! Manual override store: reviewer set, review and clear operations.
//!
//! Operates on a submission's working field map before it is reconciled.
//! Items whose key is outside the schema (and not a sentinel) are skipped
//! individually; the rest of the batch still applies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use loanfile_core::{
    Confidence, FieldAction, FieldEvent, FieldSource, FieldValue, ManualEdits, ManualFieldSet,
    ResolvedField,
};

use crate::registry::FieldRegistry;

/// Working set of resolved fields keyed by field key.
pub type FieldMap = BTreeMap<String, ResolvedField>;

/// Index stored fields by key. If a key appears twice, a manual entry wins,
/// otherwise the first one.
pub fn index_fields(fields: &[ResolvedField]) -> FieldMap {
    let mut map = FieldMap::new();
    for field in fields {
        let replace = match map.get(&field.key) {
            Some(existing) => !existing.is_manual() && field.is_manual(),
            None => true,
        };
        if replace {
            map.insert(field.key.clone(), field.clone());
        }
    }
    map
}

/// Build the pinned field for a reviewer-supplied value.
pub fn manual_field(set: &ManualFieldSet, actor_id: &str, now: DateTime<Utc>) -> ResolvedField {
    ResolvedField {
        key: set.key.clone(),
        value: set.value.clone(),
        confidence: Confidence::High,
        conflicts: Vec::new(),
        occurrences: Vec::new(),
        notes: set.notes.clone(),
        validation: None,
        traceability: None,
        source: FieldSource::Manual {
            actor_id: actor_id.to_string(),
            set_at: now,
        },
        is_reviewed: true,
        reviewed_at: Some(now),
        reviewed_by: Some(actor_id.to_string()),
    }
}

/// Applies manual edits for one reviewer and records what changed.
pub struct ManualOverrides<'a> {
    registry: &'a FieldRegistry,
    submission_id: Uuid,
    actor_id: &'a str,
    now: DateTime<Utc>,
    events: Vec<FieldEvent>,
}

impl<'a> ManualOverrides<'a> {
    pub fn new(
        registry: &'a FieldRegistry,
        submission_id: Uuid,
        actor_id: &'a str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            registry,
            submission_id,
            actor_id,
            now,
            events: Vec::new(),
        }
    }

    fn accepts(&self, key: &str, action: FieldAction) -> bool {
        let ok = self.registry.accepts(key);
        if !ok {
            debug!(field_key = %key, action = %action, "Skipping manual edit for key outside schema");
        }
        ok
    }

    fn record(
        &mut self,
        key: &str,
        action: FieldAction,
        old_value: Option<FieldValue>,
        new_value: Option<FieldValue>,
    ) {
        self.events.push(FieldEvent {
            submission_id: self.submission_id,
            key: key.to_string(),
            action,
            old_value,
            new_value,
            actor_id: self.actor_id.to_string(),
            occurred_at: self.now,
        });
    }

    /// Pin a reviewer-supplied value, replacing whatever the key held.
    pub fn set(&mut self, fields: &mut FieldMap, set: &ManualFieldSet) -> bool {
        if !self.accepts(&set.key, FieldAction::Set) {
            return false;
        }
        let field = manual_field(set, self.actor_id, self.now);
        let old = fields.insert(set.key.clone(), field).map(|f| f.value);
        self.record(&set.key, FieldAction::Set, old, Some(set.value.clone()));
        true
    }

    /// Mark an existing field reviewed without touching its value.
    pub fn review(&mut self, fields: &mut FieldMap, key: &str) -> bool {
        if !self.accepts(key, FieldAction::Review) {
            return false;
        }
        let Some(field) = fields.get_mut(key) else {
            return false;
        };
        field.is_reviewed = true;
        field.reviewed_at = Some(self.now);
        field.reviewed_by = Some(self.actor_id.to_string());
        let value = field.value.clone();
        self.record(key, FieldAction::Review, Some(value.clone()), Some(value));
        true
    }

    /// Remove a manual pin so the key falls back to extraction.
    pub fn clear(&mut self, fields: &mut FieldMap, key: &str) -> bool {
        if !self.accepts(key, FieldAction::ClearManual) {
            return false;
        }
        if !fields.get(key).is_some_and(ResolvedField::is_manual) {
            return false;
        }
        let old = fields.remove(key).map(|f| f.value);
        self.record(key, FieldAction::ClearManual, old, None);
        true
    }

    /// Apply a batch in order: every set, then every review, then every clear.
    pub fn apply(mut self, fields: &mut FieldMap, edits: &ManualEdits) -> Vec<FieldEvent> {
        for set in &edits.set {
            self.set(fields, set);
        }
        for key in &edits.review {
            self.review(fields, key);
        }
        for key in &edits.clear_manual {
            self.clear(fields, key);
        }
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanfile_core::{FieldDefinition, FieldType, ReconcileConfig};
    use serde_json::json;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(
            vec![
                FieldDefinition::required("mortgagor_1_name", FieldType::String),
                FieldDefinition::required("loan_amount", FieldType::Number),
            ],
            &ReconcileConfig::default(),
        )
    }

    fn extracted(key: &str, raw: serde_json::Value) -> ResolvedField {
        ResolvedField {
            key: key.to_string(),
            value: FieldValue::raw(raw),
            confidence: Confidence::Low,
            conflicts: vec![],
            occurrences: vec![],
            notes: None,
            validation: None,
            traceability: None,
            source: FieldSource::Extraction {
                document_entry_id: Uuid::new_v4(),
                file_id: None,
                document_name: None,
                extracted_at: None,
            },
            is_reviewed: false,
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    fn set(key: &str, raw: serde_json::Value) -> ManualFieldSet {
        ManualFieldSet {
            key: key.to_string(),
            value: FieldValue::raw(raw),
            notes: Some("checked against CNIC".to_string()),
        }
    }

    #[test]
    fn test_set_pins_value_and_records_old() {
        let registry = registry();
        let now = Utc::now();
        let mut fields = FieldMap::new();
        fields.insert("loan_amount".to_string(), extracted("loan_amount", json!(100)));

        let edits = ManualEdits {
            set: vec![set("loan_amount", json!(250))],
            ..Default::default()
        };
        let events =
            ManualOverrides::new(&registry, Uuid::nil(), "rev-1", now).apply(&mut fields, &edits);

        let field = &fields["loan_amount"];
        assert!(field.is_manual());
        assert!(field.is_reviewed);
        assert_eq!(field.reviewed_at, Some(now));
        assert_eq!(field.confidence, Confidence::High);
        assert!(field.conflicts.is_empty());
        assert_eq!(field.notes.as_deref(), Some("checked against CNIC"));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, FieldAction::Set);
        assert_eq!(events[0].old_value, Some(FieldValue::raw(json!(100))));
        assert_eq!(events[0].new_value, Some(FieldValue::raw(json!(250))));
        assert_eq!(events[0].actor_id, "rev-1");
    }

    #[test]
    fn test_unknown_keys_are_skipped_individually() {
        let registry = registry();
        let mut fields = FieldMap::new();
        let edits = ManualEdits {
            set: vec![
                set("favourite_colour", json!("blue")),
                set("legal_name", json!("AYESHA KHAN")),
                set("loan_amount", json!(250)),
            ],
            ..Default::default()
        };
        let events = ManualOverrides::new(&registry, Uuid::nil(), "rev-1", Utc::now())
            .apply(&mut fields, &edits);

        assert!(!fields.contains_key("favourite_colour"));
        assert!(fields.contains_key("legal_name"));
        assert!(fields.contains_key("loan_amount"));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_review_marks_without_changing_value() {
        let registry = registry();
        let now = Utc::now();
        let mut fields = FieldMap::new();
        fields.insert("loan_amount".to_string(), extracted("loan_amount", json!(100)));

        let edits = ManualEdits {
            review: vec!["loan_amount".to_string(), "mortgagor_1_name".to_string()],
            ..Default::default()
        };
        let events =
            ManualOverrides::new(&registry, Uuid::nil(), "rev-2", now).apply(&mut fields, &edits);

        let field = &fields["loan_amount"];
        assert!(field.is_reviewed);
        assert!(!field.is_manual());
        assert_eq!(field.value, FieldValue::raw(json!(100)));
        assert_eq!(field.reviewed_by.as_deref(), Some("rev-2"));
        // Reviewing a key with no field is a no-op
        assert_eq!(events.len(), 1);
        assert!(!fields.contains_key("mortgagor_1_name"));
    }

    #[test]
    fn test_clear_only_removes_manual_fields() {
        let registry = registry();
        let now = Utc::now();
        let mut fields = FieldMap::new();
        fields.insert("loan_amount".to_string(), extracted("loan_amount", json!(100)));
        fields.insert(
            "mortgagor_1_name".to_string(),
            manual_field(&set("mortgagor_1_name", json!("Ayesha")), "rev-1", now),
        );

        let edits = ManualEdits {
            clear_manual: vec!["loan_amount".to_string(), "mortgagor_1_name".to_string()],
            ..Default::default()
        };
        let events =
            ManualOverrides::new(&registry, Uuid::nil(), "rev-1", now).apply(&mut fields, &edits);

        assert!(fields.contains_key("loan_amount"));
        assert!(!fields.contains_key("mortgagor_1_name"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, FieldAction::ClearManual);
        assert_eq!(events[0].new_value, None);
    }

    #[test]
    fn test_set_then_clear_in_same_batch() {
        let registry = registry();
        let mut fields = FieldMap::new();
        let edits = ManualEdits {
            set: vec![set("loan_amount", json!(1))],
            review: vec![],
            clear_manual: vec!["loan_amount".to_string()],
        };
        let events = ManualOverrides::new(&registry, Uuid::nil(), "rev-1", Utc::now())
            .apply(&mut fields, &edits);
        assert!(fields.is_empty());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_index_fields_prefers_manual_duplicate() {
        let now = Utc::now();
        let fields = vec![
            extracted("loan_amount", json!(1)),
            manual_field(&set("loan_amount", json!(2)), "rev-1", now),
            extracted("loan_amount", json!(3)),
        ];
        let map = index_fields(&fields);
        assert_eq!(map.len(), 1);
        assert_eq!(map["loan_amount"].value, FieldValue::raw(json!(2)));
    }
}
