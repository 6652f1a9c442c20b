//! Centralized default constants for loanfile.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own literals.

// =============================================================================
// FIELD KEYS
// =============================================================================

/// Key that is always accepted even when absent from the field schema.
///
/// Populated by the identity-card extraction flow rather than the master schema.
pub const LEGAL_NAME_KEY: &str = "legal_name";

/// Default set of keys accepted outside the schema.
pub const SENTINEL_KEYS: &[&str] = &[LEGAL_NAME_KEY];

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Keep a reviewer's mark on an extraction-derived field while its value is unchanged.
pub const PRESERVE_HUMAN_REVIEW: bool = true;

/// Emit audit events for manual edits.
pub const AUDIT_ENABLED: bool = true;

/// Extraction method recorded when the extractor did not report one.
pub const EXTRACTION_METHOD: &str = "llm";

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Comma-separated keys accepted outside the schema.
pub const ENV_SENTINEL_KEYS: &str = "LOANFILE_SENTINEL_KEYS";

/// Toggle for [`PRESERVE_HUMAN_REVIEW`].
pub const ENV_PRESERVE_HUMAN_REVIEW: &str = "LOANFILE_PRESERVE_HUMAN_REVIEW";

/// Toggle for [`AUDIT_ENABLED`].
pub const ENV_AUDIT_ENABLED: &str = "LOANFILE_AUDIT_ENABLED";
