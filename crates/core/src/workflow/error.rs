//! Workflow error types for lifecycle transitions.

use thiserror::Error;
use tijara_shared::AppError;
use tijara_shared::types::{CreditNoteId, SourceDocumentId};

/// Errors that can occur during status transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid {entity} status transition from {from} to {to}")]
    InvalidTransition {
        /// What is transitioning (`credit note`, `refund`, ...).
        entity: &'static str,
        /// The current status.
        from: String,
        /// The attempted target status.
        to: String,
    },

    /// The document has already been posted to the ledger.
    #[error("Source document {0} is already posted")]
    AlreadyPosted(SourceDocumentId),

    /// Voided documents cannot be posted or credited.
    #[error("Source document {0} is voided")]
    DocumentVoided(SourceDocumentId),

    /// Issued credit notes are corrected with a reversing note, not cancelled.
    #[error(
        "Credit note {0} is already issued and cannot be cancelled; issue a reversing credit note instead"
    )]
    CancelRequiresReversal(CreditNoteId),

    /// Cancellation reason is required but not provided.
    #[error("Cancellation reason is required")]
    CancelReasonRequired,
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::CancelReasonRequired => 400,
            Self::InvalidTransition { .. }
            | Self::AlreadyPosted(_)
            | Self::DocumentVoided(_)
            | Self::CancelRequiresReversal(_) => 409,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::DocumentVoided(_) => "DOCUMENT_VOIDED",
            Self::CancelRequiresReversal(_) => "CANCEL_REQUIRES_REVERSAL",
            Self::CancelReasonRequired => "CANCEL_REASON_REQUIRED",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        Self::from_status(err.status_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WorkflowError::AlreadyPosted(SourceDocumentId::new()).status_code(),
            409
        );
        assert_eq!(WorkflowError::CancelReasonRequired.status_code(), 400);
        assert_eq!(
            WorkflowError::InvalidTransition {
                entity: "credit note",
                from: "draft".into(),
                to: "processed".into(),
            }
            .status_code(),
            409
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            WorkflowError::AlreadyPosted(SourceDocumentId::new()).error_code(),
            "ALREADY_POSTED"
        );
        assert_eq!(
            WorkflowError::CancelRequiresReversal(CreditNoteId::new()).error_code(),
            "CANCEL_REQUIRES_REVERSAL"
        );
    }

    #[test]
    fn test_error_display() {
        let err = WorkflowError::InvalidTransition {
            entity: "credit note",
            from: "draft".into(),
            to: "processed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid credit note status transition from draft to processed"
        );
    }

    #[test]
    fn test_converts_into_app_error() {
        let app: AppError = WorkflowError::AlreadyPosted(SourceDocumentId::new()).into();
        assert!(matches!(app, AppError::Conflict(_)));
    }
}
