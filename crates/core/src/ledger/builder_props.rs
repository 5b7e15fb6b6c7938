//! Property-based tests for the ledger entry builder.
//!
//! Every draft the builder returns must balance exactly, whatever the
//! document amounts, payment mode or VAT rate.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tijara_shared::types::{BranchId, UserId, percent_of};

use super::accounts::AccountResolver;
use super::accounts::fixtures::full_chart;
use super::builder::LedgerEntryBuilder;
use super::types::{AccountRole, Direction, PaymentMode, TransactionKind};
use crate::document::SourceKind;
use crate::document::fixtures::cash_sale;

/// Strategy to generate a positive amount from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a VAT rate between 0% and 25% with two decimals.
fn vat_rate() -> impl Strategy<Value = Decimal> {
    (0i64..2500i64).prop_map(|bp| Decimal::new(bp, 2))
}

fn payment_mode() -> impl Strategy<Value = PaymentMode> {
    prop_oneof![
        Just(PaymentMode::Cash),
        Just(PaymentMode::Bank),
        Just(PaymentMode::Credit),
    ]
}

fn source_kind() -> impl Strategy<Value = SourceKind> {
    prop_oneof![
        Just(SourceKind::Sale),
        Just(SourceKind::Invoice),
        Just(SourceKind::Purchase),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting any positive document yields a balanced draft with gross on
    /// the settlement side.
    #[test]
    fn prop_document_posting_balances(
        net in positive_amount(),
        rate in vat_rate(),
        mode in payment_mode(),
        kind in source_kind(),
    ) {
        let tax = percent_of(net, rate);
        let mut doc = cash_sale();
        doc.kind = kind;
        doc.payment_mode = mode;
        doc.subtotal = net;
        doc.tax = tax;
        doc.total_amount = net + tax;

        let draft = LedgerEntryBuilder::for_source_document(&doc, &full_chart(), UserId::new())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(draft.is_balanced());
        prop_assert_eq!(draft.total_debits(), net + tax);
        prop_assert!(draft.lines.iter().all(|l| l.amount > Decimal::ZERO));
        prop_assert_eq!(draft.lines.len(), if tax.is_zero() { 2 } else { 3 });
    }

    /// Splitting an amount across several credit lines with sub-cent
    /// precision is absorbed into a balanced draft.
    #[test]
    fn prop_sub_cent_splits_are_absorbed(
        cents in 100i64..100_000_000i64,
        parts in 2u32..7u32,
    ) {
        let chart = full_chart();
        let cash = chart.require(AccountRole::Cash).cloned().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let revenue = chart.require(AccountRole::SalesRevenue).cloned().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let total = Decimal::new(cents, 2);
        let share = total / Decimal::from(parts);

        let mut builder = LedgerEntryBuilder::new(
            TransactionKind::Sale,
            BranchId::new(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            UserId::new(),
        )
        .debit(&cash, total, "receipt");
        for i in 0..parts {
            builder = builder.credit(&revenue, share, format!("part {i}"));
        }

        let draft = builder.build().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(draft.is_balanced());
        prop_assert_eq!(draft.total_debits(), total);
        prop_assert_eq!(draft.lines.iter().filter(|l| l.direction == Direction::Credit).count(), parts as usize);
    }
}
