//! Property-based tests for dimension propagation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::catalog::fixtures::standard;
use super::propagation::{DimensionPropagator, OriginLine};
use super::types::{DimensionAssignment, DimensionOverride, DimensionSplit};
use crate::ledger::{Direction, LedgerError};

#[derive(Debug, Clone, Copy)]
enum OverrideChoice {
    None,
    Active,
    Inactive,
}

fn override_choice() -> impl Strategy<Value = OverrideChoice> {
    prop_oneof![
        Just(OverrideChoice::None),
        Just(OverrideChoice::Active),
        Just(OverrideChoice::Inactive),
    ]
}

fn origin_with_noise(noise_lines: usize, revenue_name: &str, assignment: DimensionAssignment) -> Vec<OriginLine> {
    let mut lines: Vec<OriginLine> = (0..noise_lines)
        .map(|i| OriginLine {
            account_name: format!("Cash drawer {i}"),
            direction: Direction::Debit,
            assignments: vec![],
        })
        .collect();
    lines.push(OriginLine {
        account_name: revenue_name.to_string(),
        direction: Direction::Credit,
        assignments: vec![assignment],
    });
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A derived line carries the originating cost center unless an active
    /// override is supplied; inactive overrides are rejected.
    #[test]
    fn prop_cost_center_propagates_unless_overridden(
        choice in override_choice(),
        noise in 0usize..4,
        upper in any::<bool>(),
    ) {
        let f = standard();
        let name = if upper { "SALES REVENUE" } else { "Revenue - retail" };
        let origin = origin_with_noise(noise, name, DimensionAssignment::full(f.cost_center, f.cc1));

        let overrides: Vec<DimensionOverride> = match choice {
            OverrideChoice::None => vec![],
            OverrideChoice::Active => vec![DimensionOverride { dimension_id: f.cost_center, value_id: f.cc2 }],
            OverrideChoice::Inactive => vec![DimensionOverride { dimension_id: f.cost_center, value_id: f.cc_inactive }],
        };

        let result = DimensionPropagator::propagate(&origin, &overrides, &[], &f.catalog);
        match choice {
            OverrideChoice::None => {
                let outcome = result.map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(outcome.assignments, vec![DimensionAssignment::full(f.cost_center, f.cc1)]);
                prop_assert!(outcome.overrides.is_empty());
            }
            OverrideChoice::Active => {
                let outcome = result.map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(outcome.assignments, vec![DimensionAssignment::full(f.cost_center, f.cc2)]);
                prop_assert_eq!(outcome.overrides.len(), 1);
            }
            OverrideChoice::Inactive => {
                let is_invalid_dimension = matches!(result, Err(LedgerError::InvalidDimension { .. }));
                prop_assert!(is_invalid_dimension);
            }
        }
    }

    /// Accepted splits never exceed 100% for a dimension.
    #[test]
    fn prop_split_totals_never_exceed_one_hundred(a in 1i64..=100, b in 1i64..=100) {
        let f = standard();
        let splits = [DimensionSplit {
            dimension_id: f.cost_center,
            shares: vec![(f.cc1, Decimal::from(a)), (f.cc2, Decimal::from(b))],
        }];
        match DimensionPropagator::propagate(&[], &[], &splits, &f.catalog) {
            Ok(outcome) => {
                let total: Decimal = outcome.assignments.iter().map(|x| x.percentage).sum();
                prop_assert!(total <= Decimal::ONE_HUNDRED);
                prop_assert!(a + b <= 100);
            }
            Err(LedgerError::AllocationExceeded { .. }) => prop_assert!(a + b > 100),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
