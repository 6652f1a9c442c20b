//! Review-state tracking for extraction-derived fields.

use chrono::{DateTime, Utc};

use loanfile_core::{Confidence, Conflict, FieldValidation, FieldValue, ResolvedField};

/// Review flags carried on a resolved field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewState {
    pub is_reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
}

impl ReviewState {
    pub fn unreviewed() -> Self {
        Self {
            is_reviewed: false,
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    pub fn auto(at: DateTime<Utc>) -> Self {
        Self {
            is_reviewed: true,
            reviewed_at: Some(at),
            reviewed_by: None,
        }
    }
}

/// A value needs a human when confidence is low, other documents disagree,
/// or validation failed with at least one error.
pub fn requires_review(
    confidence: Confidence,
    conflicts: &[Conflict],
    validation: Option<&FieldValidation>,
) -> bool {
    confidence == Confidence::Low
        || !conflicts.is_empty()
        || validation.is_some_and(FieldValidation::failed)
}

/// Review state for a freshly resolved value.
///
/// When the previous field for the key held the same value, its review is
/// carried over: a reviewer's mark survives when `keep_reviewer_mark` is
/// set, and an auto-review keeps its original timestamp.
pub fn review_state(
    value: &FieldValue,
    needs_review: bool,
    previous: Option<&ResolvedField>,
    keep_reviewer_mark: bool,
    now: DateTime<Utc>,
) -> ReviewState {
    let unchanged = previous.filter(|p| p.is_reviewed && !p.is_manual() && &p.value == value);

    if let Some(prev) = unchanged {
        if prev.reviewed_by.is_some() && keep_reviewer_mark {
            return ReviewState {
                is_reviewed: true,
                reviewed_at: prev.reviewed_at,
                reviewed_by: prev.reviewed_by.clone(),
            };
        }
        if !needs_review && prev.reviewed_by.is_none() {
            return ReviewState::auto(prev.reviewed_at.unwrap_or(now));
        }
    }

    if needs_review {
        ReviewState::unreviewed()
    } else {
        ReviewState::auto(now)
    }
}
