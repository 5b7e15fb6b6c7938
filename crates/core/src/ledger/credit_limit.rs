//! Customer credit limit check for sales on account.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tijara_shared::types::PartyId;

use super::error::LedgerError;

/// A party's current credit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPosition {
    /// The party.
    pub party_id: PartyId,
    /// Configured limit; `None` means unlimited.
    pub credit_limit: Option<Decimal>,
    /// Amount the party already owes.
    pub outstanding: Decimal,
}

impl CreditPosition {
    /// Ensures `amount` more exposure stays within the limit.
    ///
    /// # Errors
    ///
    /// `InsufficientCreditLimit` when `outstanding + amount > limit`.
    pub fn ensure_headroom(&self, amount: Decimal) -> Result<(), LedgerError> {
        let Some(limit) = self.credit_limit else {
            return Ok(());
        };
        let exposure = self.outstanding + amount;
        if exposure > limit {
            return Err(LedgerError::InsufficientCreditLimit {
                party_id: self.party_id,
                limit,
                exposure,
            });
        }
        Ok(())
    }

    /// Remaining headroom, `None` when unlimited.
    #[must_use]
    pub fn headroom(&self) -> Option<Decimal> {
        self.credit_limit
            .map(|limit| (limit - self.outstanding).max(Decimal::ZERO))
    }
}
