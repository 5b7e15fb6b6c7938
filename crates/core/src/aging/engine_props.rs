//! Property-based tests for the aging engine.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tijara_shared::EclRates;
use tijara_shared::types::SourceDocumentId;

use crate::aging::engine::AgingEngine;
use crate::aging::types::{AgingEntity, AgingOutcome, OutstandingRecord};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 30).unwrap_or_default()
}

fn arb_record() -> impl Strategy<Value = OutstandingRecord> {
    (-30i64..400, -1_000i64..10_000_000).prop_map(|(age, cents)| {
        let document_date = if age >= 0 {
            as_of() - Days::new(age.unsigned_abs())
        } else {
            as_of() + Days::new(age.unsigned_abs())
        };
        OutstandingRecord {
            document_id: SourceDocumentId::new(),
            party_id: None,
            number: format!("INV-{age}"),
            document_date,
            outstanding_amount: Decimal::new(cents, 2),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every record is either bucketed or skipped, and bucket totals add up.
    #[test]
    fn prop_every_record_accounted_for(records in prop::collection::vec(arb_record(), 0..40)) {
        let report = AgingEngine::with_rates(EclRates::default())
            .age(as_of(), AgingEntity::Receivables, &records);

        prop_assert_eq!(report.rows.len(), records.len());

        let included: Decimal = report
            .rows
            .iter()
            .filter(|r| matches!(r.outcome, AgingOutcome::Included { .. }))
            .map(|r| r.outstanding_amount)
            .sum();
        prop_assert_eq!(included, report.total_outstanding);

        let counted: usize = report.buckets.iter().map(|b| b.count).sum();
        prop_assert_eq!(counted + report.skipped().count(), records.len());
    }

    /// With default rates the provision stays within half the outstanding
    /// balance, give or take a rounded cent per bucket.
    #[test]
    fn prop_provision_bounded(records in prop::collection::vec(arb_record(), 0..40)) {
        let report = AgingEngine::with_rates(EclRates::default())
            .age(as_of(), AgingEntity::Receivables, &records);
        prop_assert!(report.total_provision >= Decimal::ZERO);
        let ceiling = report.total_outstanding / Decimal::TWO + Decimal::new(5, 2);
        prop_assert!(report.total_provision <= ceiling);
    }
}
