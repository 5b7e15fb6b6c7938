//! Credit note error types.

use rust_decimal::Decimal;
use thiserror::Error;
use tijara_shared::AppError;
use tijara_shared::types::{SourceDocumentId, SourceLineId};

use crate::document::SourceKind;
use crate::ledger::LedgerError;
use crate::workflow::WorkflowError;

/// Errors raised while creating, approving or refunding credit notes.
#[derive(Debug, Error)]
pub enum CreditNoteError {
    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Status transition refused.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The note would take credited totals past the source total.
    #[error("Credit note total {requested} exceeds the refundable remainder {max_refundable}")]
    OverRefund {
        /// Total of the new note.
        requested: Decimal,
        /// Amount still creditable on the source.
        max_refundable: Decimal,
    },

    /// Returned quantity is not within the original line quantity.
    #[error("Returned quantity {requested} for line {source_line_id} must be within (0, {available}]")]
    InvalidQuantity {
        /// Source line.
        source_line_id: SourceLineId,
        /// Quantity requested.
        requested: Decimal,
        /// Quantity still returnable from the source line.
        available: Decimal,
    },

    /// The item does not reference a line of the source.
    #[error("Line {0} does not belong to the credited document")]
    UnknownSourceLine(SourceLineId),

    /// A credit note needs at least one item.
    #[error("Credit note has no items")]
    NoItems,

    /// The source must be posted before its reversal.
    #[error("Source document {0} is not posted to the ledger")]
    SourceNotPosted(SourceDocumentId),

    /// Only sales and invoices can be credited.
    #[error("Cannot issue a credit note against a {0}")]
    UnsupportedSource(SourceKind),

    /// Refund amount outside `(0, remaining]`.
    #[error("Refund amount {requested} must be within (0, {remaining}]")]
    InvalidRefundAmount {
        /// Amount requested.
        requested: Decimal,
        /// Amount not yet refunded.
        remaining: Decimal,
    },
}

impl CreditNoteError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.status_code(),
            Self::Workflow(e) => e.status_code(),
            Self::OverRefund { .. } | Self::InvalidRefundAmount { .. } => 422,
            Self::InvalidQuantity { .. }
            | Self::UnknownSourceLine(_)
            | Self::NoItems
            | Self::UnsupportedSource(_) => 400,
            Self::SourceNotPosted(_) => 409,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::OverRefund { .. } => "OVER_REFUND",
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::UnknownSourceLine(_) => "UNKNOWN_SOURCE_LINE",
            Self::NoItems => "NO_ITEMS",
            Self::SourceNotPosted(_) => "SOURCE_NOT_POSTED",
            Self::UnsupportedSource(_) => "UNSUPPORTED_SOURCE",
            Self::InvalidRefundAmount { .. } => "INVALID_REFUND_AMOUNT",
        }
    }
}

impl From<CreditNoteError> for AppError {
    fn from(err: CreditNoteError) -> Self {
        Self::from_status(err.status_code(), err.to_string())
    }
}
