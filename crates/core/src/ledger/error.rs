//! Ledger error types for posting and validation failures.

use rust_decimal::Decimal;
use thiserror::Error;
use tijara_shared::AppError;
use tijara_shared::types::{AccountId, DimensionId, DimensionValueId, PartyId};

use super::types::AccountRole;

/// Errors that can occur while building or validating ledger transactions.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transaction must have at least 2 lines.
    #[error("Transaction must have at least 2 lines")]
    InsufficientLines,

    /// Transaction has only debit lines or only credit lines.
    #[error("Transaction must have both debit and credit lines")]
    SingleSided,

    /// Debits and credits differ by more than the absorbable rounding remainder.
    #[error("Ledger is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Amount is not acceptable for posting.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // ========== Account Errors ==========
    /// No account was resolved for a role the posting needs.
    #[error("No ledger account resolved for role {0}")]
    MissingAccount(AccountRole),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    // ========== Dimension Errors ==========
    /// Dimension value is unknown, inactive, or belongs to another dimension.
    #[error("Invalid dimension value {value_id}: {reason}")]
    InvalidDimension {
        /// The offending value.
        value_id: DimensionValueId,
        /// Why it was rejected.
        reason: String,
    },

    /// Split percentages for one dimension exceed 100.
    #[error("Allocation for dimension {dimension_id} totals {total}%, more than 100%")]
    AllocationExceeded {
        /// The dimension being split.
        dimension_id: DimensionId,
        /// Sum of the supplied percentages.
        total: Decimal,
    },

    // ========== Credit Errors ==========
    /// Posting would take the party over its credit limit.
    #[error("Credit limit {limit} for party {party_id} exceeded: exposure would be {exposure}")]
    InsufficientCreditLimit {
        /// The party.
        party_id: PartyId,
        /// Configured credit limit.
        limit: Decimal,
        /// Outstanding balance plus the new document.
        exposure: Decimal,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::SingleSided => "SINGLE_SIDED",
            Self::Unbalanced { .. } => "UNBALANCED_LEDGER",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::MissingAccount(_) => "MISSING_ACCOUNT",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::InvalidDimension { .. } => "INVALID_DIMENSION",
            Self::AllocationExceeded { .. } => "ALLOCATION_EXCEEDED",
            Self::InsufficientCreditLimit { .. } => "INSUFFICIENT_CREDIT_LIMIT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::InvalidAmount(_)
            | Self::InvalidDimension { .. }
            | Self::AllocationExceeded { .. } => 400,

            // 422 Unprocessable - business rules
            Self::InsufficientLines
            | Self::SingleSided
            | Self::Unbalanced { .. }
            | Self::MissingAccount(_)
            | Self::AccountInactive(_)
            | Self::InsufficientCreditLimit { .. } => 422,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::from_status(err.status_code(), err.to_string())
    }
}
