//! Candidate resolution: choose one canonical candidate per field key.
//!
//! ## Ranking
//!
//! Candidates are ordered by, in turn:
//! 1. Confidence (`high` > `medium` > `low`)
//! 2. Fewer self-reported conflicts
//! 3. A non-null raw value over a null one
//! 4. More occurrences
//! 5. Earlier position in document order
//!
//! The first candidate in that order wins. Conflicts are then computed across
//! every candidate's raw value, independently of the self-reported lists used
//! for ranking.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::trace;

use loanfile_core::{
    canonical_string, Conflict, ExtractedCandidate, FieldValidation, Traceability,
};

/// Outcome of resolving one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The winning candidate; supplies value, confidence, occurrences, notes and source.
    pub chosen: ExtractedCandidate,
    /// Distinct raw values, other than the chosen one, seen across candidates.
    pub conflicts: Vec<Conflict>,
    /// Best validation outcome across candidates.
    pub validation: Option<FieldValidation>,
    /// Most complete traceability across candidates.
    pub traceability: Traceability,
}

/// Compare two candidates; `Less` means `a` ranks ahead of `b`.
pub fn rank(a: &ExtractedCandidate, b: &ExtractedCandidate) -> Ordering {
    b.confidence
        .cmp(&a.confidence)
        .then_with(|| a.conflicts.len().cmp(&b.conflicts.len()))
        .then_with(|| (!b.value.raw.is_null()).cmp(&!a.value.raw.is_null()))
        .then_with(|| b.occurrences.len().cmp(&a.occurrences.len()))
}

/// The best-ranked candidate. Ties go to the earliest candidate.
pub fn choose(candidates: &[ExtractedCandidate]) -> Option<&ExtractedCandidate> {
    // `min_by` returns the first of several equal minima.
    candidates.iter().min_by(|a, b| rank(a, b))
}

/// Distinct canonical raw values across `candidates`, excluding `chosen`'s own.
pub fn cross_conflicts(
    candidates: &[ExtractedCandidate],
    chosen: &ExtractedCandidate,
) -> Vec<Conflict> {
    let chosen_value = canonical_string(&chosen.value.raw);
    let mut seen = HashSet::new();
    let mut conflicts = Vec::new();

    for candidate in candidates {
        let Some(value) = canonical_string(&candidate.value.raw) else {
            continue;
        };
        if chosen_value.as_deref() == Some(value.as_str()) {
            continue;
        }
        if seen.insert(value.clone()) {
            conflicts.push(Conflict {
                raw: value.into(),
            });
        }
    }

    conflicts
}

/// Best validation: a clean pass first, then the fewest errors, then the earliest.
pub fn best_validation(candidates: &[ExtractedCandidate]) -> Option<FieldValidation> {
    candidates
        .iter()
        .filter_map(|c| c.validation.as_ref())
        .min_by(|a, b| {
            b.is_clean_pass()
                .cmp(&a.is_clean_pass())
                .then_with(|| a.errors.len().cmp(&b.errors.len()))
        })
        .cloned()
}

/// Most complete traceability: the first with both document name and file id,
/// otherwise the chosen candidate's own.
pub fn best_traceability(
    candidates: &[ExtractedCandidate],
    chosen: &ExtractedCandidate,
) -> Traceability {
    if chosen.traceability.is_complete() {
        return chosen.traceability.clone();
    }
    candidates
        .iter()
        .map(|c| &c.traceability)
        .find(|t| t.is_complete())
        .unwrap_or(&chosen.traceability)
        .clone()
}

/// Resolve one key's candidates. Returns `None` for an empty list.
pub fn resolve(candidates: &[ExtractedCandidate]) -> Option<Resolution> {
    let chosen = choose(candidates)?;
    let conflicts = cross_conflicts(candidates, chosen);

    trace!(
        field_key = %chosen.key,
        candidate_count = candidates.len(),
        confidence = %chosen.confidence,
        conflict_count = conflicts.len(),
        "Resolved field candidate"
    );

    Some(Resolution {
        conflicts,
        validation: best_validation(candidates),
        traceability: best_traceability(candidates, chosen),
        chosen: chosen.clone(),
    })
}
