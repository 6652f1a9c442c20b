//! Structured logging schema and field name constants for loanfile.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query reconciliation events by the same names
//! across the engine, the store and the CLI.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and nothing was persisted |
//! | WARN  | Recoverable issue swallowed (audit sink failure) |
//! | INFO  | Recompute and manual-edit completions |
//! | DEBUG | Decision points (dropped candidates, skipped keys, status changes) |
//! | TRACE | Per-candidate and per-field iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "reconcile", "store", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "collector", "resolver", "eligibility", "service"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "recompute", "apply_manual_edits", "replace_resolved_state"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Submission UUID being reconciled.
pub const SUBMISSION_ID: &str = "submission_id";

/// Field key being resolved or edited.
pub const FIELD_KEY: &str = "field_key";

/// Reviewer performing a manual edit.
pub const ACTOR_ID: &str = "actor_id";

/// Document entry a candidate came from.
pub const DOCUMENT_ID: &str = "document_id";

/// What caused a recompute ("document_added", "manual_edit", ...).
pub const TRIGGER: &str = "trigger";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of document entries read for a submission.
pub const DOCUMENT_COUNT: &str = "document_count";

/// Number of candidates considered.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of resolved fields written.
pub const FIELD_COUNT: &str = "field_count";

/// Number of required keys still missing.
pub const MISSING_COUNT: &str = "missing_count";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Submission eligibility after recompute.
pub const ELIGIBLE: &str = "eligible";

/// Submission status after recompute.
pub const STATUS: &str = "status";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
