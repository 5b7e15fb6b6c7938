//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal` rounded to [`MONEY_SCALE`]
//! places with Banker's Rounding before it reaches the ledger.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places stored for ledger amounts.
pub const MONEY_SCALE: u32 = 2;

/// The smallest representable ledger amount (0.01).
pub const ONE_CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds an amount to ledger precision using Banker's Rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Returns `rate` percent of `amount`, rounded to ledger precision.
///
/// `rate` is expressed in percent (14 means 14%).
#[must_use]
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount * rate / Decimal::ONE_HUNDRED)
}
