//! Subledger to general ledger reconciliation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tijara_shared::LedgerSettings;
use tijara_shared::types::{DimensionId, DimensionValueId};

use super::types::{
    DimensionVariance, GlLineRecord, Period, ReconciliationDomain, ReconciliationReport,
    SubledgerRecord,
};
use crate::dimension::DimensionAssignment;
use crate::document::DocumentStatus;
use crate::ledger::{AllocationUtil, Direction};

/// Compares subledger totals with ledger credits.
///
/// The engine is a pure function of its inputs: the same documents and
/// lines always produce the same report.
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine {
    tolerance: Decimal,
}

impl ReconciliationEngine {
    /// Creates an engine using the configured tolerance.
    #[must_use]
    pub const fn new(settings: &LedgerSettings) -> Self {
        Self {
            tolerance: settings.reconciliation_tolerance,
        }
    }

    /// Creates an engine with an explicit tolerance.
    #[must_use]
    pub const fn with_tolerance(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Reconciles one subledger over `period`.
    ///
    /// Documents of another kind, voided documents and anything dated
    /// outside the period are ignored, as are lines with another origin and
    /// debit lines. Rows without dimensions count in the totals but not in
    /// the per-dimension table.
    #[must_use]
    pub fn reconcile(
        &self,
        period: Period,
        domain: ReconciliationDomain,
        documents: &[SubledgerRecord],
        lines: &[GlLineRecord],
    ) -> ReconciliationReport {
        let kind = domain.source_kind();
        let origin = domain.origin();
        let mut by_value: BTreeMap<DimensionValueId, (Decimal, Decimal)> = BTreeMap::new();

        let mut subledger_total = Decimal::ZERO;
        for doc in documents.iter().filter(|d| {
            d.kind == kind && d.status == DocumentStatus::Active && period.contains(d.document_date)
        }) {
            subledger_total += doc.total_amount;
            for (_, value_id) in doc.dimensions.values() {
                by_value.entry(value_id).or_default().0 += doc.total_amount;
            }
        }

        let mut gl_total = Decimal::ZERO;
        for line in lines.iter().filter(|l| {
            l.origin == origin
                && l.direction == Direction::Credit
                && period.contains(l.transaction_date)
        }) {
            gl_total += line.amount;
            for (value_id, share) in split_by_assignment(line.amount, &line.assignments) {
                by_value.entry(value_id).or_default().1 += share;
            }
        }

        let variance = gl_total - subledger_total;
        let by_dimension = by_value
            .into_iter()
            .map(|(value_id, (subledger, gl))| DimensionVariance {
                value_id,
                subledger_total: subledger,
                gl_total: gl,
                variance: gl - subledger,
            })
            .collect();

        ReconciliationReport {
            domain,
            period,
            subledger_total,
            gl_total,
            variance,
            is_reconciled: variance.abs() < self.tolerance,
            by_dimension,
        }
    }
}

/// Splits a line amount across its assignments, dimension by dimension.
fn split_by_assignment(
    amount: Decimal,
    assignments: &[DimensionAssignment],
) -> Vec<(DimensionValueId, Decimal)> {
    let mut per_dimension: BTreeMap<DimensionId, Vec<&DimensionAssignment>> = BTreeMap::new();
    for assignment in assignments {
        per_dimension
            .entry(assignment.dimension_id)
            .or_default()
            .push(assignment);
    }

    per_dimension
        .into_values()
        .flat_map(|group| {
            let percentages: Vec<Decimal> = group.iter().map(|a| a.percentage).collect();
            let shares = AllocationUtil::allocate_by_percentages(amount, &percentages);
            group
                .into_iter()
                .map(|a| a.value_id)
                .zip(shares)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::DocumentDimensions;
    use crate::document::SourceKind;
    use crate::ledger::LineOrigin;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tijara_shared::types::{LedgerLineId, SourceDocumentId};

    fn march() -> Period {
        Period::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn sale(total: Decimal, date: NaiveDate, cost_center: Option<DimensionValueId>) -> SubledgerRecord {
        SubledgerRecord {
            document_id: SourceDocumentId::new(),
            kind: SourceKind::Sale,
            document_date: date,
            total_amount: total,
            status: DocumentStatus::Active,
            dimensions: DocumentDimensions {
                cost_center_id: cost_center,
                ..DocumentDimensions::default()
            },
        }
    }

    fn credit(amount: Decimal, date: NaiveDate, assignments: Vec<DimensionAssignment>) -> GlLineRecord {
        GlLineRecord {
            line_id: LedgerLineId::new(),
            transaction_date: date,
            origin: LineOrigin::PosAuto,
            direction: Direction::Credit,
            amount,
            assignments,
        }
    }

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(&LedgerSettings::default())
    }

    #[test]
    fn test_matching_sale_reconciles() {
        let docs = vec![sale(dec!(1140.00), day(15), None)];
        let lines = vec![
            credit(dec!(1000.00), day(15), vec![]),
            credit(dec!(140.00), day(15), vec![]),
        ];
        let report = engine().reconcile(march(), ReconciliationDomain::Sales, &docs, &lines);
        assert_eq!(report.subledger_total, dec!(1140.00));
        assert_eq!(report.gl_total, dec!(1140.00));
        assert_eq!(report.variance, dec!(0));
        assert!(report.is_reconciled);
        assert!(report.by_dimension.is_empty());
    }

    #[test]
    fn test_unposted_sale_shows_variance() {
        let docs = vec![
            sale(dec!(1140.00), day(15), None),
            sale(dec!(500.00), day(20), None),
        ];
        let lines = vec![credit(dec!(1140.00), day(15), vec![])];
        let report = engine().reconcile(march(), ReconciliationDomain::Sales, &docs, &lines);
        assert_eq!(report.variance, dec!(-500.00));
        assert!(!report.is_reconciled);
    }

    #[test]
    fn test_filters_period_status_and_origin() {
        let mut voided = sale(dec!(100), day(10), None);
        voided.status = DocumentStatus::Voided;
        let mut invoice = sale(dec!(100), day(10), None);
        invoice.kind = SourceKind::Invoice;
        let outside = sale(dec!(100), NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(), None);

        let mut debit = credit(dec!(100), day(10), vec![]);
        debit.direction = Direction::Debit;
        let mut purchase_line = credit(dec!(100), day(10), vec![]);
        purchase_line.origin = LineOrigin::Purchase;

        let report = engine().reconcile(
            march(),
            ReconciliationDomain::Sales,
            &[voided, invoice, outside],
            &[debit, purchase_line],
        );
        assert_eq!(report.subledger_total, dec!(0));
        assert_eq!(report.gl_total, dec!(0));
        assert!(report.is_reconciled);
    }

    #[test]
    fn test_tolerance_is_strict() {
        let docs = vec![sale(dec!(100.00), day(1), None)];
        let lines = vec![credit(dec!(100.01), day(1), vec![])];
        let strict = engine().reconcile(march(), ReconciliationDomain::Sales, &docs, &lines);
        assert!(!strict.is_reconciled);

        let loose = ReconciliationEngine::with_tolerance(dec!(0.05))
            .reconcile(march(), ReconciliationDomain::Sales, &docs, &lines);
        assert!(loose.is_reconciled);
    }

    #[test]
    fn test_by_dimension_splits_gl_by_percentage() {
        let cost_center = DimensionId::new();
        let cc1 = DimensionValueId::new();
        let cc2 = DimensionValueId::new();
        let docs = vec![
            sale(dec!(60.00), day(3), Some(cc1)),
            sale(dec!(40.00), day(3), Some(cc2)),
        ];
        let lines = vec![credit(
            dec!(100.00),
            day(3),
            vec![
                DimensionAssignment {
                    dimension_id: cost_center,
                    value_id: cc1,
                    percentage: dec!(60),
                },
                DimensionAssignment {
                    dimension_id: cost_center,
                    value_id: cc2,
                    percentage: dec!(40),
                },
            ],
        )];
        let report = engine().reconcile(march(), ReconciliationDomain::Sales, &docs, &lines);
        assert_eq!(report.by_dimension.len(), 2);
        assert!(report.by_dimension.iter().all(|d| d.variance.is_zero()));
        let cc1_row = report.by_dimension.iter().find(|d| d.value_id == cc1).unwrap();
        assert_eq!(cc1_row.gl_total, dec!(60.00));
    }

    #[test]
    fn test_dimensionless_rows_only_in_totals() {
        let cc1 = DimensionValueId::new();
        let docs = vec![sale(dec!(50), day(3), Some(cc1)), sale(dec!(70), day(3), None)];
        let report = engine().reconcile(march(), ReconciliationDomain::Sales, &docs, &[]);
        assert_eq!(report.subledger_total, dec!(120));
        assert_eq!(report.by_dimension.len(), 1);
        assert_eq!(report.by_dimension[0].subledger_total, dec!(50));
    }
}
