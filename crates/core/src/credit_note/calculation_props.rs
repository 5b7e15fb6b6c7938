//! Property-based tests for credit note amounts.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tijara_shared::types::SourceLineId;
use uuid::Uuid;

use crate::credit_note::calculation::CreditNoteCalculator;
use crate::credit_note::error::CreditNoteError;
use crate::credit_note::types::ItemCondition;
use crate::document::SourceLine;

fn arb_line() -> impl Strategy<Value = SourceLine> {
    (1i64..=1_000, 1i64..=10_000_000, 0i64..=50, prop_oneof![Just(0i64), Just(5), Just(14)]).prop_map(
        |(quantity, price_cents, discount_rate, vat_rate)| SourceLine {
            id: SourceLineId::new(),
            product_id: Uuid::nil(),
            description: "Item".into(),
            quantity: Decimal::from(quantity),
            unit_price: Decimal::new(price_cents, 2),
            discount_rate: Decimal::from(discount_rate),
            vat_rate: Decimal::from(vat_rate),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Item amounts are consistent and never exceed the undiscounted gross plus VAT.
    #[test]
    fn prop_item_amounts_consistent(line in arb_line(), pick in 1u32..=100) {
        let quantity = (line.quantity * Decimal::from(pick) / Decimal::ONE_HUNDRED).ceil().max(Decimal::ONE);
        let item = CreditNoteCalculator::price_item(&line, quantity, ItemCondition::Good)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(item.total, item.net + item.vat);
        prop_assert!(item.net >= Decimal::ZERO);
        prop_assert!(item.discount >= Decimal::ZERO);
        prop_assert!(item.vat >= Decimal::ZERO);
        prop_assert!(item.net <= line.unit_price * quantity);
        prop_assert!(item.net.scale() <= 2 && item.vat.scale() <= 2);
    }

    /// Accepted notes never credit more than the source total, whatever the sequence.
    #[test]
    fn prop_credited_never_exceeds_source(
        source_cents in 1i64..=10_000_000,
        attempts in prop::collection::vec(1i64..=5_000_000, 1..12),
    ) {
        let source_total = Decimal::new(source_cents, 2);
        let mut credited = Decimal::ZERO;

        for cents in attempts {
            let amount = Decimal::new(cents, 2);
            match CreditNoteCalculator::ensure_within_refundable(source_total, credited, amount) {
                Ok(()) => credited += amount,
                Err(CreditNoteError::OverRefund { max_refundable, .. }) => {
                    prop_assert_eq!(max_refundable, source_total - credited);
                    prop_assert!(amount > max_refundable);
                }
                Err(other) => return Err(TestCaseError::fail(other.to_string())),
            }
            prop_assert!(credited <= source_total);
        }
    }
}
