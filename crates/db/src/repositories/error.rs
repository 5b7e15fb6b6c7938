//! Error type shared by the ledger repositories.

use sea_orm::DbErr;
use tijara_core::aging::AgingError;
use tijara_core::credit_note::CreditNoteError;
use tijara_core::ledger::LedgerError;
use tijara_core::posting::PostingError;
use tijara_core::reconciliation::ReconciliationError;
use tijara_core::workflow::WorkflowError;
use tijara_shared::AppError;
use uuid::Uuid;

/// Errors raised by repository operations.
///
/// Engine errors pass through unchanged so callers see the same code and
/// status whether a rule was checked in memory or against the database.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Ledger rule violation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Refused status transition.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Posting failure.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Credit note failure.
    #[error(transparent)]
    CreditNote(#[from] CreditNoteError),

    /// Reconciliation or VAT failure.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Aging or provisioning failure.
    #[error(transparent)]
    Aging(#[from] AgingError),

    /// Branch not found.
    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    /// Account not found in the branch.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Party not found.
    #[error("Party not found: {0}")]
    PartyNotFound(Uuid),

    /// Source document not found.
    #[error("Source document not found: {0}")]
    DocumentNotFound(Uuid),

    /// Credit note not found.
    #[error("Credit note not found: {0}")]
    CreditNoteNotFound(Uuid),

    /// Dimension not found.
    #[error("Dimension not found: {0}")]
    DimensionNotFound(String),

    /// Dimension value not found.
    #[error("Dimension value not found: {0}")]
    DimensionValueNotFound(Uuid),

    /// VAT reconciliation not found.
    #[error("VAT reconciliation not found: {0}")]
    VatReconciliationNotFound(Uuid),

    /// A code that must be unique is already taken.
    #[error("Code '{0}' already exists")]
    DuplicateCode(String),

    /// A document to register is malformed.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl RepositoryError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Database(_) => 500,
            Self::Ledger(e) => e.status_code(),
            Self::Workflow(e) => e.status_code(),
            Self::Posting(e) => e.status_code(),
            Self::CreditNote(e) => e.status_code(),
            Self::Reconciliation(e) => e.status_code(),
            Self::Aging(e) => e.status_code(),
            Self::BranchNotFound(_)
            | Self::AccountNotFound(_)
            | Self::PartyNotFound(_)
            | Self::DocumentNotFound(_)
            | Self::CreditNoteNotFound(_)
            | Self::DimensionNotFound(_)
            | Self::DimensionValueNotFound(_)
            | Self::VatReconciliationNotFound(_) => 404,
            Self::DuplicateCode(_) => 409,
            Self::InvalidDocument(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Ledger(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::Posting(e) => e.error_code(),
            Self::CreditNote(e) => e.error_code(),
            Self::Reconciliation(e) => e.error_code(),
            Self::Aging(e) => e.error_code(),
            Self::BranchNotFound(_) => "BRANCH_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::CreditNoteNotFound(_) => "CREDIT_NOTE_NOT_FOUND",
            Self::DimensionNotFound(_) => "DIMENSION_NOT_FOUND",
            Self::DimensionValueNotFound(_) => "DIMENSION_VALUE_NOT_FOUND",
            Self::VatReconciliationNotFound(_) => "VAT_RECONCILIATION_NOT_FOUND",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                Self::Database(e.to_string())
            }
            other => Self::from_status(other.status_code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_codes_pass_through() {
        let err: RepositoryError = LedgerError::Unbalanced {
            debit: rust_decimal::Decimal::ONE,
            credit: rust_decimal::Decimal::ZERO,
        }
        .into();
        assert_eq!(err.error_code(), "UNBALANCED_LEDGER");
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_not_found_maps_to_app_not_found() {
        let app: AppError = RepositoryError::CreditNoteNotFound(Uuid::nil()).into();
        assert!(matches!(app, AppError::NotFound(_)));
    }

    #[test]
    fn test_database_error_is_server_side() {
        let err = RepositoryError::Database(DbErr::Custom("boom".into()));
        assert_eq!(err.status_code(), 500);
        let app: AppError = err.into();
        assert!(!app.is_client_error());
    }
}
