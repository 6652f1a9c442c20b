//! Pure reconciliation pass: documents + schema + previous fields → next resolved state.
//!
//! This function holds no state between runs. Given the same inputs it
//! produces the same fields and eligibility; only timestamps taken from `now`
//! can differ, and only where review state actually changes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use loanfile_core::{
    DocumentEntry, FieldChanges, ReconcileConfig, ResolvedField, ResolvedState, SubmissionStatus,
};

use crate::collector::collect_candidates;
use crate::eligibility::compute_eligibility;
use crate::overrides::FieldMap;
use crate::registry::FieldRegistry;
use crate::resolver::{resolve, Resolution};
use crate::review::{requires_review, review_state};

/// Everything one reconciliation pass reads.
pub struct ReconcileInput<'a> {
    pub registry: &'a FieldRegistry,
    /// Documents in upload order.
    pub documents: &'a [DocumentEntry],
    /// Fields currently on the submission, including any pinned manual values.
    pub previous: &'a FieldMap,
    /// Keys a reviewer marked reviewed in the edit batch applied to `previous`.
    /// Their marks hold for this pass even when review preservation is off.
    pub reviewed_now: &'a BTreeSet<String>,
    pub status: SubmissionStatus,
    pub config: &'a ReconcileConfig,
    pub now: DateTime<Utc>,
}

fn resolved_field(
    resolution: Resolution,
    previous: Option<&ResolvedField>,
    keep_reviewer_mark: bool,
    now: DateTime<Utc>,
) -> ResolvedField {
    let Resolution {
        chosen,
        conflicts,
        validation,
        traceability,
    } = resolution;

    let needs_review = requires_review(chosen.confidence, &conflicts, validation.as_ref());
    let review = review_state(
        &chosen.value,
        needs_review,
        previous,
        keep_reviewer_mark,
        now,
    );

    ResolvedField {
        key: chosen.key,
        value: chosen.value,
        confidence: chosen.confidence,
        conflicts,
        occurrences: chosen.occurrences,
        notes: chosen.notes,
        validation,
        traceability: Some(traceability),
        source: chosen.source,
        is_reviewed: review.is_reviewed,
        reviewed_at: review.reviewed_at,
        reviewed_by: review.reviewed_by,
    }
}

/// Run collector → resolver → review tracker, merge manual pins, then compute
/// eligibility and the next status.
///
/// Manual fields are carried over untouched. Extraction-derived fields are
/// rebuilt from the current documents; a key with no surviving candidate is
/// dropped.
pub fn reconcile(input: ReconcileInput<'_>) -> ResolvedState {
    let candidates = collect_candidates(input.documents, input.registry);

    let mut next: FieldMap = input
        .previous
        .iter()
        .filter(|(_, field)| field.is_manual())
        .map(|(key, field)| (key.clone(), field.clone()))
        .collect();

    for (key, list) in &candidates {
        if next.contains_key(key) {
            debug!(field_key = %key, candidate_count = list.len(), "Manual value pinned; skipping resolver");
            continue;
        }
        if let Some(resolution) = resolve(list) {
            let keep_reviewer_mark =
                input.config.preserve_human_review || input.reviewed_now.contains(key);
            let field = resolved_field(
                resolution,
                input.previous.get(key),
                keep_reviewer_mark,
                input.now,
            );
            next.insert(key.clone(), field);
        }
    }

    let eligibility = compute_eligibility(input.registry, &next, input.now);
    let status = input.status.after_recompute(eligibility.eligible);

    ResolvedState {
        fields: next.into_values().collect(),
        eligibility,
        status,
    }
}

/// Keys added, changed (value or source) or dropped between two field lists.
pub fn diff_fields(before: &[ResolvedField], after: &[ResolvedField]) -> FieldChanges {
    let before: BTreeMap<&str, &ResolvedField> =
        before.iter().map(|f| (f.key.as_str(), f)).collect();
    let after: BTreeMap<&str, &ResolvedField> =
        after.iter().map(|f| (f.key.as_str(), f)).collect();
    let keys: BTreeSet<&str> = before.keys().chain(after.keys()).copied().collect();

    let mut changes = FieldChanges::default();
    for key in keys {
        match (before.get(key), after.get(key)) {
            (None, Some(_)) => changes.added.push(key.to_string()),
            (Some(_), None) => changes.dropped.push(key.to_string()),
            (Some(b), Some(a)) if b.value != a.value || b.source.is_manual() != a.source.is_manual() => {
                changes.changed.push(key.to_string())
            }
            _ => {}
        }
    }
    changes
}
