//! Posting error type.

use thiserror::Error;
use tijara_shared::AppError;

use crate::ledger::LedgerError;
use crate::workflow::WorkflowError;

/// Errors that can occur while preparing a source document posting.
#[derive(Debug, Error)]
pub enum PostingError {
    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Status transition refused.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.status_code(),
            Self::Workflow(e) => e.status_code(),
        }
    }
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        Self::from_status(err.status_code(), err.to_string())
    }
}
