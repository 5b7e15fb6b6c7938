//! Aging error types.

use thiserror::Error;
use tijara_shared::AppError;

use super::types::AgingEntity;
use crate::ledger::LedgerError;

/// Errors raised by aging and credit-loss provisioning.
#[derive(Debug, Error)]
pub enum AgingError {
    /// Ledger failure while building the provision entry.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Credit-loss provisions only apply to receivables.
    #[error("Credit-loss provisions cannot be computed for {}", .0.as_str())]
    ProvisionNotApplicable(AgingEntity),
}

impl AgingError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.status_code(),
            Self::ProvisionNotApplicable(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::ProvisionNotApplicable(_) => "PROVISION_NOT_APPLICABLE",
        }
    }
}

impl From<AgingError> for AppError {
    fn from(err: AgingError) -> Self {
        Self::from_status(err.status_code(), err.to_string())
    }
}
