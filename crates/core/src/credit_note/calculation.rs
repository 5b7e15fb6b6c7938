//! Pricing of returned items.
//!
//! Discount and VAT are always recomputed from the rates stored on the
//! source line, never from current settings:
//!
//! ```text
//! gross    = unit_price × quantity
//! discount = gross × discount_rate / 100
//! net      = gross − discount
//! vat      = net × vat_rate / 100
//! total    = net + vat
//! ```

use rust_decimal::Decimal;
use tijara_shared::types::{CreditNoteItemId, percent_of, round_money};

use super::error::CreditNoteError;
use super::types::{CreditNoteItem, CreditNoteTotals, ItemCondition, PriorCredits, ReturnItem};
use crate::document::{SourceDocument, SourceLine};

/// Stateless calculator for credit note amounts.
pub struct CreditNoteCalculator;

impl CreditNoteCalculator {
    /// Prices `quantity` units of `line`.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` unless `0 < quantity <= line.quantity`.
    pub fn price_item(
        line: &SourceLine,
        quantity: Decimal,
        condition: ItemCondition,
    ) -> Result<CreditNoteItem, CreditNoteError> {
        if quantity <= Decimal::ZERO || quantity > line.quantity {
            return Err(CreditNoteError::InvalidQuantity {
                source_line_id: line.id,
                requested: quantity,
                available: line.quantity,
            });
        }

        let gross = round_money(line.unit_price * quantity);
        let discount = percent_of(gross, line.discount_rate);
        let net = gross - discount;
        let vat = percent_of(net, line.vat_rate);

        Ok(CreditNoteItem {
            id: CreditNoteItemId::new(),
            source_line_id: line.id,
            product_id: line.product_id,
            description: line.description.clone(),
            quantity,
            condition,
            unit_price: line.unit_price,
            discount,
            net,
            vat,
            total: net + vat,
        })
    }

    /// Prices every returned item against the source lines.
    ///
    /// Repeated lines are checked on their combined quantity, on top of what
    /// earlier notes already returned from the same line.
    ///
    /// # Errors
    ///
    /// `NoItems`, `UnknownSourceLine` or `InvalidQuantity`.
    pub fn price_items(
        source: &SourceDocument,
        items: &[ReturnItem],
        prior: &PriorCredits,
    ) -> Result<Vec<CreditNoteItem>, CreditNoteError> {
        if items.is_empty() {
            return Err(CreditNoteError::NoItems);
        }

        let mut priced = Vec::with_capacity(items.len());
        for item in items {
            let line = source
                .line(item.source_line_id)
                .ok_or(CreditNoteError::UnknownSourceLine(item.source_line_id))?;

            let combined: Decimal = items
                .iter()
                .filter(|i| i.source_line_id == item.source_line_id)
                .map(|i| i.quantity)
                .sum();
            let available = (line.quantity - prior.returned(line.id)).max(Decimal::ZERO);
            if combined > available {
                return Err(CreditNoteError::InvalidQuantity {
                    source_line_id: line.id,
                    requested: combined,
                    available,
                });
            }

            priced.push(Self::price_item(line, item.quantity, item.condition)?);
        }
        Ok(priced)
    }

    /// Sums item amounts.
    #[must_use]
    pub fn totals(items: &[CreditNoteItem]) -> CreditNoteTotals {
        items.iter().fold(CreditNoteTotals::default(), |acc, item| CreditNoteTotals {
            subtotal: acc.subtotal + item.net,
            discount: acc.discount + item.discount,
            vat: acc.vat + item.vat,
            total: acc.total + item.total,
        })
    }

    /// Checks that a new note keeps credited totals within the source total.
    ///
    /// `already_credited` is the sum of the source's non-cancelled notes.
    ///
    /// # Errors
    ///
    /// `OverRefund` naming the remaining refundable amount.
    pub fn ensure_within_refundable(
        source_total: Decimal,
        already_credited: Decimal,
        new_total: Decimal,
    ) -> Result<(), CreditNoteError> {
        let max_refundable = (source_total - already_credited).max(Decimal::ZERO);
        if new_total > max_refundable {
            return Err(CreditNoteError::OverRefund {
                requested: new_total,
                max_refundable,
            });
        }
        Ok(())
    }
}
