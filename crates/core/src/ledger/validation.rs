//! Business rule validation for ledger drafts.

use rust_decimal::Decimal;
use tijara_shared::types::ONE_CENT;

use super::entry::DraftLine;
use super::error::LedgerError;
use super::types::Direction;

/// Validates that a set of draft lines can be posted.
///
/// Rules: at least two lines, both sides present, every amount positive,
/// debits exactly equal to credits.
///
/// # Errors
///
/// Returns the first rule the lines violate.
pub fn validate_lines(lines: &[DraftLine]) -> Result<(), LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for line in lines {
        if line.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "line amount {} must be positive",
                line.amount
            )));
        }

        match line.direction {
            Direction::Debit => {
                total_debits += line.amount;
                has_debit = true;
            }
            Direction::Credit => {
                total_credits += line.amount;
                has_credit = true;
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(LedgerError::SingleSided);
    }

    if total_debits != total_credits {
        return Err(LedgerError::Unbalanced {
            debit: total_debits,
            credit: total_credits,
        });
    }

    Ok(())
}

/// Absorbs a rounding remainder into the last line of the short side.
///
/// The remainder may be at most one cent per line; anything larger is an
/// unbalanced posting. Returns the amount absorbed.
///
/// # Errors
///
/// Returns `Unbalanced` when the difference exceeds the allowance.
pub fn absorb_rounding_remainder(lines: &mut [DraftLine]) -> Result<Decimal, LedgerError> {
    let (debit, credit) = lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), l| {
        let (ld, lc) = l.debit_credit();
        (d + ld, c + lc)
    });

    let difference = debit - credit;
    if difference.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let allowance = ONE_CENT * Decimal::from(lines.len());
    if difference.abs() > allowance {
        return Err(LedgerError::Unbalanced { debit, credit });
    }

    let short_side = if difference > Decimal::ZERO {
        Direction::Credit
    } else {
        Direction::Debit
    };

    // Single-sided drafts are reported by validate_lines.
    if let Some(line) = lines.iter_mut().rev().find(|l| l.direction == short_side) {
        line.amount += difference.abs();
    }

    Ok(difference.abs())
}
