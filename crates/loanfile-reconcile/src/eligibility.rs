//! Eligibility calculation over the schema's required/optional partition.

use chrono::{DateTime, Utc};

use loanfile_core::{is_filled_by_type, EligibilitySnapshot, FieldDefinition};

use crate::overrides::FieldMap;
use crate::registry::FieldRegistry;

#[derive(Default)]
struct Tally {
    total: usize,
    filled: usize,
    missing: Vec<String>,
    needs_review: Vec<String>,
}

impl Tally {
    fn count(&mut self, def: &FieldDefinition, fields: &FieldMap) {
        self.total += 1;
        match fields.get(&def.key) {
            Some(field) if is_filled_by_type(def.field_type, field.value.effective()) => {
                self.filled += 1;
                if field.needs_review() {
                    self.needs_review.push(def.key.clone());
                }
            }
            _ => self.missing.push(def.key.clone()),
        }
    }
}

/// Compute the eligibility snapshot for a submission's final field map.
///
/// Keys are listed in schema order. Sentinel keys outside the schema are not
/// counted.
pub fn compute_eligibility(
    registry: &FieldRegistry,
    fields: &FieldMap,
    now: DateTime<Utc>,
) -> EligibilitySnapshot {
    let mut required = Tally::default();
    for def in registry.required() {
        required.count(def, fields);
    }
    let mut optional = Tally::default();
    for def in registry.optional() {
        optional.count(def, fields);
    }

    EligibilitySnapshot {
        eligible: required.missing.is_empty(),
        required_total: required.total,
        filled_required: required.filled,
        missing_required_keys: required.missing,
        needs_review_keys: required.needs_review,
        optional_total: optional.total,
        filled_optional: optional.filled,
        missing_optional_keys: optional.missing,
        needs_review_optional_keys: optional.needs_review,
        updated_at: now,
    }
}
