//! Error types for loanfile.

use thiserror::Error;

/// Result type alias using loanfile's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for loanfile operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Submission not found
    #[error("Submission not found: {0}")]
    SubmissionNotFound(uuid::Uuid),

    /// Field definitions could not be loaded or are empty
    #[error("Field schema unavailable: {0}")]
    SchemaUnavailable(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Audit sink rejected an event
    #[error("Audit error: {0}")]
    Audit(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error belongs to the NotFound class (missing submission or schema).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::SubmissionNotFound(_) | Error::SchemaUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
