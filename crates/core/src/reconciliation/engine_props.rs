//! Property-based tests for the reconciliation engine.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tijara_shared::types::{DimensionId, DimensionValueId, LedgerLineId, SourceDocumentId};

use crate::dimension::{DimensionAssignment, DocumentDimensions};
use crate::document::{DocumentStatus, SourceKind};
use crate::ledger::{Direction, LineOrigin};
use crate::reconciliation::engine::ReconciliationEngine;
use crate::reconciliation::types::{GlLineRecord, Period, ReconciliationDomain, SubledgerRecord};

fn period() -> Period {
    Period {
        start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default(),
        end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap_or_default(),
    }
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..60).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2026, 2, 15).unwrap_or_default() + chrono::Days::new(offset)
    })
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Posted sales: each document has matching credit lines on the same date.
fn arb_posted_sales() -> impl Strategy<Value = (Vec<SubledgerRecord>, Vec<GlLineRecord>)> {
    let cost_center = DimensionId::new();
    let values = [DimensionValueId::new(), DimensionValueId::new()];
    prop::collection::vec((arb_date(), arb_amount(), 1u32..=99, any::<Option<bool>>()), 0..20).prop_map(
        move |rows| {
            let mut docs = Vec::new();
            let mut lines = Vec::new();
            for (date, total, revenue_pct, dimension) in rows {
                let value = dimension.map(|first| if first { values[0] } else { values[1] });
                docs.push(SubledgerRecord {
                    document_id: SourceDocumentId::new(),
                    kind: SourceKind::Sale,
                    document_date: date,
                    total_amount: total,
                    status: DocumentStatus::Active,
                    dimensions: DocumentDimensions {
                        cost_center_id: value,
                        ..DocumentDimensions::default()
                    },
                });
                let revenue = (total * Decimal::from(revenue_pct) / Decimal::ONE_HUNDRED).round_dp(2);
                let assignments: Vec<DimensionAssignment> = value
                    .map(|v| vec![DimensionAssignment::full(cost_center, v)])
                    .unwrap_or_default();
                for amount in [revenue, total - revenue] {
                    if amount > Decimal::ZERO {
                        lines.push(GlLineRecord {
                            line_id: LedgerLineId::new(),
                            transaction_date: date,
                            origin: LineOrigin::PosAuto,
                            direction: Direction::Credit,
                            amount,
                            assignments: assignments.clone(),
                        });
                    }
                }
            }
            (docs, lines)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Running reconciliation twice on the same data gives the same report.
    #[test]
    fn prop_reconcile_idempotent((docs, lines) in arb_posted_sales()) {
        let engine = ReconciliationEngine::with_tolerance(Decimal::new(1, 2));
        let first = engine.reconcile(period(), ReconciliationDomain::Sales, &docs, &lines);
        let second = engine.reconcile(period(), ReconciliationDomain::Sales, &docs, &lines);
        prop_assert_eq!(first, second);
    }

    /// Fully posted sales always reconcile, in total and per dimension value.
    #[test]
    fn prop_posted_sales_reconcile((docs, lines) in arb_posted_sales()) {
        let engine = ReconciliationEngine::with_tolerance(Decimal::new(1, 2));
        let report = engine.reconcile(period(), ReconciliationDomain::Sales, &docs, &lines);
        prop_assert!(report.is_reconciled);
        prop_assert_eq!(report.variance, Decimal::ZERO);
        for row in &report.by_dimension {
            prop_assert_eq!(row.variance, Decimal::ZERO);
        }
    }
}
