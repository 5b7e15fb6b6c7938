//! Amount allocation using the Largest Remainder Method.
//!
//! Splitting a ledger amount across dimension values must not lose or
//! invent cents:
//! 1. Calculate exact allocations
//! 2. Round down each allocation
//! 3. Calculate the remainder (target - sum of rounded)
//! 4. Distribute remainder units to items with largest fractional parts

use rust_decimal::prelude::*;
use tijara_shared::types::{MONEY_SCALE, round_money};

/// Allocation utility for distributing amounts.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Allocates `total` by percentages.
    ///
    /// The allocated sum is exactly `total × Σpercentages / 100` rounded to
    /// ledger precision, so a full 100% split returns exactly `total` and a
    /// partial split leaves the rest unallocated.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tijara_core::ledger::AllocationUtil;
    ///
    /// let result = AllocationUtil::allocate_by_percentages(dec!(100), &[dec!(50), dec!(30), dec!(20)]);
    /// assert_eq!(result, vec![dec!(50), dec!(30), dec!(20)]);
    /// ```
    #[must_use]
    pub fn allocate_by_percentages(total: Decimal, percentages: &[Decimal]) -> Vec<Decimal> {
        if percentages.is_empty() {
            return vec![];
        }

        let unit = Decimal::new(1, MONEY_SCALE);
        let total_rounded = round_money(total);
        let percentage_sum: Decimal = percentages.iter().copied().sum();
        let target = round_money(total_rounded * percentage_sum / Decimal::ONE_HUNDRED);

        let exact: Vec<Decimal> = percentages
            .iter()
            .map(|p| total_rounded * *p / Decimal::ONE_HUNDRED)
            .collect();

        let mut rounded: Vec<Decimal> = exact
            .iter()
            .map(|a| a.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero))
            .collect();

        let sum_rounded: Decimal = rounded.iter().copied().sum();
        let remainder = target - sum_rounded;

        let units_to_distribute = (remainder / unit)
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .to_u64()
            .unwrap_or(0);
        let units_to_distribute = usize::try_from(units_to_distribute).unwrap_or(0);

        if units_to_distribute == 0 {
            return rounded;
        }

        let mut remainders: Vec<(usize, Decimal)> = exact
            .iter()
            .zip(rounded.iter())
            .enumerate()
            .map(|(i, (e, r))| (i, e.abs() - r.abs()))
            .collect();

        // Largest fractional part first; ties keep input order.
        remainders.sort_by(|a, b| b.1.cmp(&a.1));

        let step = if total_rounded.is_sign_negative() { -unit } else { unit };
        for (idx, _) in remainders.iter().cycle().take(units_to_distribute) {
            rounded[*idx] += step;
        }

        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_allocate_empty() {
        assert!(AllocationUtil::allocate_by_percentages(dec!(100), &[]).is_empty());
    }

    #[test]
    fn test_allocate_single_full() {
        let result = AllocationUtil::allocate_by_percentages(dec!(100), &[dec!(100)]);
        assert_eq!(result, vec![dec!(100)]);
    }

    #[test]
    fn test_allocate_thirds() {
        let percentages = vec![dec!(33.33), dec!(33.33), dec!(33.34)];
        let result = AllocationUtil::allocate_by_percentages(dec!(100), &percentages);
        assert_eq!(result.iter().sum::<Decimal>(), dec!(100));
    }

    #[test]
    fn test_allocate_uneven_cents() {
        // 10.00 split in three equal parts must still sum to 10.00
        let third = dec!(100) / dec!(3);
        let result = AllocationUtil::allocate_by_percentages(dec!(10), &[third, third, third]);
        assert_eq!(result.iter().sum::<Decimal>(), dec!(10));
        assert_eq!(result[0], dec!(3.34));
        assert_eq!(result[1], dec!(3.33));
    }

    #[test]
    fn test_partial_allocation_leaves_remainder() {
        let result = AllocationUtil::allocate_by_percentages(dec!(200), &[dec!(25), dec!(25)]);
        assert_eq!(result, vec![dec!(50), dec!(50)]);
    }

    #[test]
    fn test_sum_invariant_table() {
        let test_cases = [
            (dec!(100), vec![dec!(33.33), dec!(33.33), dec!(33.34)]),
            (dec!(1000), vec![dec!(25), dec!(25), dec!(25), dec!(25)]),
            (dec!(99.99), vec![dec!(10), dec!(20), dec!(30), dec!(40)]),
        ];

        for (total, percentages) in test_cases {
            let result = AllocationUtil::allocate_by_percentages(total, &percentages);
            assert_eq!(
                result.iter().sum::<Decimal>(),
                total,
                "Sum invariant failed for total={total}, percentages={percentages:?}"
            );
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A split that covers 100% returns exactly the total.
        #[test]
        fn prop_full_split_preserves_total(
            cents in 1i64..100_000_000i64,
            weights in prop::collection::vec(1u32..1000u32, 1..8),
        ) {
            let total = Decimal::new(cents, 2);
            let weight_sum: u32 = weights.iter().sum();
            let mut percentages: Vec<Decimal> = weights
                .iter()
                .map(|w| Decimal::from(*w) * Decimal::ONE_HUNDRED / Decimal::from(weight_sum))
                .collect();
            // Force an exact 100 so the property is about allocation, not input rounding.
            let head: Decimal = percentages[..percentages.len() - 1].iter().copied().sum();
            if let Some(last) = percentages.last_mut() {
                *last = Decimal::ONE_HUNDRED - head;
            }

            let result = AllocationUtil::allocate_by_percentages(total, &percentages);
            prop_assert_eq!(result.iter().copied().sum::<Decimal>(), total);
        }
    }
}
