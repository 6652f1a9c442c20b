//! # loanfile-reconcile
//!
//! Field reconciliation and eligibility engine for loanfile.
//!
//! This crate provides:
//! - Candidate collection from per-document extraction output
//! - Deterministic candidate ranking and cross-document conflict detection
//! - Review-state tracking with reviewer marks preserved across recomputes
//! - Manual overrides (set / review / clear) pinned against re-extraction
//! - Type-aware eligibility calculation and status transitions
//! - [`ReconciliationService`], which reads collaborators, runs the pure pass
//!   and writes the result in one atomic replace
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use loanfile_reconcile::ReconciliationService;
//!
//! let service = ReconciliationService::new(schema, documents, submissions)
//!     .with_audit_sink(audit)
//!     .with_config(ReconcileConfig::from_env());
//!
//! let outcome = service.on_document_added(submission_id).await?;
//! println!("eligible: {}", outcome.eligibility.eligible);
//! ```

pub mod collector;
pub mod eligibility;
pub mod engine;
pub mod overrides;
pub mod registry;
pub mod resolver;
pub mod review;
pub mod service;

// Re-export core types
pub use loanfile_core::*;

pub use collector::{candidate_from_record, collect_candidates, CandidateMap};
pub use eligibility::compute_eligibility;
pub use engine::{diff_fields, reconcile, ReconcileInput};
pub use overrides::{index_fields, manual_field, FieldMap, ManualOverrides};
pub use registry::FieldRegistry;
pub use resolver::{resolve, Resolution};
pub use review::{requires_review, review_state, ReviewState};
pub use service::ReconciliationService;
