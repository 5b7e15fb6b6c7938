//! Reconciliation error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tijara_shared::AppError;

/// Errors raised by reconciliation and VAT settlement.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Period start is after its end.
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// VAT payment must be positive.
    #[error("VAT payment amount {0} must be positive")]
    InvalidPaymentAmount(Decimal),

    /// VAT payment larger than what is still owed.
    #[error("VAT payment {amount} exceeds the outstanding liability {outstanding}")]
    Overpayment {
        /// Amount offered.
        amount: Decimal,
        /// Amount still owed.
        outstanding: Decimal,
    },

    /// Nothing is owed for the period.
    #[error("No VAT is due for the period")]
    NothingDue,
}

impl ReconciliationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPeriod { .. } | Self::InvalidPaymentAmount(_) => 400,
            Self::Overpayment { .. } => 422,
            Self::NothingDue => 409,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::InvalidPaymentAmount(_) => "INVALID_AMOUNT",
            Self::Overpayment { .. } => "VAT_OVERPAYMENT",
            Self::NothingDue => "NOTHING_DUE",
        }
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        Self::from_status(err.status_code(), err.to_string())
    }
}
