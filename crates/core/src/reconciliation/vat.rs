//! VAT position and settlement.
//!
//! Output VAT is the net credit movement on VAT Payable (credit note
//! reversals debit it back), input VAT the net debit movement on VAT
//! Receivable.

use rust_decimal::Decimal;

use super::error::ReconciliationError;
use super::types::{Period, VatMovements, VatPaymentStatus, VatPosition};

/// Stateless VAT settlement service.
pub struct VatService;

impl VatService {
    /// Computes the VAT position of a period.
    #[must_use]
    pub fn position(period: Period, movements: VatMovements, amount_settled: Decimal) -> VatPosition {
        let vat_collected = movements.payable_credits - movements.payable_debits;
        let vat_paid = movements.receivable_debits - movements.receivable_credits;
        let net_liability = vat_collected - vat_paid;
        VatPosition {
            period,
            vat_collected,
            vat_paid,
            net_liability,
            amount_settled,
            payment_status: Self::status(net_liability, amount_settled),
        }
    }

    /// Settlement status for a liability and the amount paid against it.
    #[must_use]
    pub fn status(net_liability: Decimal, amount_settled: Decimal) -> VatPaymentStatus {
        if net_liability < Decimal::ZERO {
            VatPaymentStatus::Refundable
        } else if amount_settled >= net_liability {
            VatPaymentStatus::Paid
        } else if amount_settled > Decimal::ZERO {
            VatPaymentStatus::PartiallyPaid
        } else {
            VatPaymentStatus::Unpaid
        }
    }

    /// Applies a payment to the tax authority and returns the new position.
    ///
    /// # Errors
    ///
    /// `InvalidPaymentAmount` for non-positive amounts, `NothingDue` when
    /// the period is refundable or already paid, and `Overpayment` when the
    /// amount exceeds what is still owed.
    pub fn record_payment(
        position: &VatPosition,
        amount: Decimal,
    ) -> Result<VatPosition, ReconciliationError> {
        if amount <= Decimal::ZERO {
            return Err(ReconciliationError::InvalidPaymentAmount(amount));
        }
        let outstanding = position.net_liability - position.amount_settled;
        if position.net_liability <= Decimal::ZERO || outstanding <= Decimal::ZERO {
            return Err(ReconciliationError::NothingDue);
        }
        if amount > outstanding {
            return Err(ReconciliationError::Overpayment {
                amount,
                outstanding,
            });
        }

        let amount_settled = position.amount_settled + amount;
        Ok(VatPosition {
            amount_settled,
            payment_status: Self::status(position.net_liability, amount_settled),
            ..*position
        })
    }
}
