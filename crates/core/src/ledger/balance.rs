//! Account running totals and trial balance.
//!
//! Accounts keep `total_debits`/`total_credits` updated with SQL-side
//! increments; the balance is always derived from them according to the
//! account's normal side.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tijara_shared::types::AccountId;

use super::entry::DraftLine;
use super::types::{AccountType, Direction};

/// Running totals of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Sum of all debit lines.
    pub total_debits: Decimal,
    /// Sum of all credit lines.
    pub total_credits: Decimal,
}

impl AccountBalance {
    /// Balance on the account's normal side.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.account_type
            .balance_change(self.total_debits, self.total_credits)
    }

    /// Applies one line to the totals.
    pub fn apply(&mut self, direction: Direction, amount: Decimal) {
        match direction {
            Direction::Debit => self.total_debits += amount,
            Direction::Credit => self.total_credits += amount,
        }
    }
}

/// Net change to apply to one account for a posted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    /// The account ID.
    pub account_id: AccountId,
    /// Debits to add.
    pub debit: Decimal,
    /// Credits to add.
    pub credit: Decimal,
}

impl BalanceDelta {
    /// Balance change for an account of `account_type`.
    #[must_use]
    pub fn balance_change(&self, account_type: AccountType) -> Decimal {
        account_type.balance_change(self.debit, self.credit)
    }
}

/// Aggregates lines into one delta per account.
///
/// Deltas are ordered by account ID so concurrent postings update account
/// rows in the same order.
#[must_use]
pub fn aggregate_deltas(lines: &[DraftLine]) -> Vec<BalanceDelta> {
    let mut by_account: BTreeMap<uuid::Uuid, BalanceDelta> = BTreeMap::new();
    for line in lines {
        let (debit, credit) = line.debit_credit();
        let delta = by_account
            .entry(line.account_id.into_inner())
            .or_insert(BalanceDelta {
                account_id: line.account_id,
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
            });
        delta.debit += debit;
        delta.credit += credit;
    }
    by_account.into_values().collect()
}

/// Trial balance over a set of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// One row per account, in code order.
    pub rows: Vec<AccountBalance>,
    /// Sum of all debit totals.
    pub total_debits: Decimal,
    /// Sum of all credit totals.
    pub total_credits: Decimal,
}

impl TrialBalance {
    /// Builds a trial balance, sorting rows by account code.
    #[must_use]
    pub fn new(mut rows: Vec<AccountBalance>) -> Self {
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        let total_debits = rows.iter().map(|r| r.total_debits).sum();
        let total_credits = rows.iter().map(|r| r.total_credits).sum();
        Self {
            rows,
            total_debits,
            total_credits,
        }
    }

    /// Returns true when debits equal credits across the ledger.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debits == self.total_credits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::LineOrigin;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use tijara_shared::types::LedgerLineId;

    fn balance(account_type: AccountType, code: &str) -> AccountBalance {
        AccountBalance {
            account_id: AccountId::new(),
            code: code.into(),
            name: code.into(),
            account_type,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
        }
    }

    fn line(account_id: AccountId, direction: Direction, amount: Decimal) -> DraftLine {
        DraftLine {
            id: LedgerLineId::new(),
            account_id,
            direction,
            amount,
            description: String::new(),
            origin: LineOrigin::PosAuto,
            assignments: vec![],
        }
    }

    #[test]
    fn test_balance_is_normal_side_aware() {
        let mut cash = balance(AccountType::Asset, "1000");
        cash.apply(Direction::Debit, dec!(1140));
        cash.apply(Direction::Credit, dec!(140));
        assert_eq!(cash.balance(), dec!(1000));

        let mut revenue = balance(AccountType::Revenue, "4000");
        revenue.apply(Direction::Credit, dec!(1000));
        assert_eq!(revenue.balance(), dec!(1000));
    }

    #[test]
    fn test_aggregate_deltas_groups_by_account() {
        let a = AccountId::new();
        let b = AccountId::new();
        let lines = vec![
            line(a, Direction::Debit, dec!(10)),
            line(b, Direction::Credit, dec!(25)),
            line(a, Direction::Debit, dec!(15)),
        ];
        let deltas = aggregate_deltas(&lines);
        assert_eq!(deltas.len(), 2);
        let delta_a = deltas.iter().find(|d| d.account_id == a).unwrap();
        assert_eq!(delta_a.debit, dec!(25));
        assert_eq!(delta_a.credit, dec!(0));
        assert_eq!(delta_a.balance_change(AccountType::Asset), dec!(25));
    }

    #[test]
    fn test_deltas_are_ordered_by_account() {
        let ids: Vec<AccountId> = (0..5).map(|_| AccountId::new()).collect();
        let lines: Vec<DraftLine> = ids
            .iter()
            .rev()
            .map(|id| line(*id, Direction::Debit, dec!(1)))
            .collect();
        let deltas = aggregate_deltas(&lines);
        let order: Vec<uuid::Uuid> = deltas.iter().map(|d| d.account_id.into_inner()).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_trial_balance_sorted_and_balanced() {
        let mut revenue = balance(AccountType::Revenue, "4000");
        revenue.apply(Direction::Credit, dec!(100));
        let mut cash = balance(AccountType::Asset, "1000");
        cash.apply(Direction::Debit, dec!(100));
        let tb = TrialBalance::new(vec![revenue, cash]);
        assert_eq!(tb.rows[0].code, "1000");
        assert!(tb.is_balanced());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The balance always equals the sum of signed changes on the normal side.
        #[test]
        fn prop_balance_matches_applied_lines(
            changes in prop::collection::vec((any::<bool>(), 1i64..1_000_000i64), 1..20),
        ) {
            let mut account = balance(AccountType::Asset, "1000");
            let mut expected = Decimal::ZERO;
            for (is_debit, cents) in changes {
                let amount = Decimal::new(cents, 2);
                if is_debit {
                    account.apply(Direction::Debit, amount);
                    expected += amount;
                } else {
                    account.apply(Direction::Credit, amount);
                    expected -= amount;
                }
            }
            prop_assert_eq!(account.balance(), expected);
        }
    }
}
