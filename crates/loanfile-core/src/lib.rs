//! # loanfile-core
//!
//! Core types, traits, and abstractions for the loanfile reconciliation engine.
//!
//! This crate provides the field schema, candidate and resolved-field models,
//! the eligibility snapshot, and the collaborator traits (schema provider,
//! document source, submission repository, audit sink) that the other
//! loanfile crates depend on.

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod value;

// Re-export commonly used types at crate root
pub use config::ReconcileConfig;
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use value::{canonical_string, is_filled_by_type};
