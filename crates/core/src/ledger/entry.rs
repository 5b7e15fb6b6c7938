//! Ledger transaction and line drafts.
//!
//! A draft is what the builder hands to persistence: ids are assigned up
//! front so dimension assignments and audit records can reference lines
//! before they are inserted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tijara_shared::types::{AccountId, BranchId, LedgerLineId, LedgerTransactionId, UserId};
use uuid::Uuid;

use super::types::{Direction, LineOrigin, TransactionKind};
use crate::dimension::DimensionAssignment;

/// Reference to the business document a transaction was posted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Kind of the source document.
    pub kind: TransactionKind,
    /// ID of the source document.
    pub id: Uuid,
}

impl SourceRef {
    /// Creates a source reference.
    #[must_use]
    pub fn new(kind: TransactionKind, id: impl Into<Uuid>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// A single line of a draft transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftLine {
    /// Line ID.
    pub id: LedgerLineId,
    /// The account affected.
    pub account_id: AccountId,
    /// Debit or credit.
    pub direction: Direction,
    /// Non-negative amount, rounded to ledger precision.
    pub amount: Decimal,
    /// Line description.
    pub description: String,
    /// Origin tag.
    pub origin: LineOrigin,
    /// Dimension assignments attached by the propagator.
    pub assignments: Vec<DimensionAssignment>,
}

impl DraftLine {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Debit => self.amount,
            Direction::Credit => -self.amount,
        }
    }

    /// Returns `(debit, credit)` for this line.
    #[must_use]
    pub fn debit_credit(&self) -> (Decimal, Decimal) {
        match self.direction {
            Direction::Debit => (self.amount, Decimal::ZERO),
            Direction::Credit => (Decimal::ZERO, self.amount),
        }
    }
}

/// A validated, balanced transaction ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTransaction {
    /// Transaction ID.
    pub id: LedgerTransactionId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Business event kind.
    pub kind: TransactionKind,
    /// Date the transaction is recorded for.
    pub transaction_date: NaiveDate,
    /// Narrative.
    pub particulars: String,
    /// Book the transaction belongs to.
    pub journal: String,
    /// Source document, if any.
    pub source: Option<SourceRef>,
    /// Transaction reversed by this one.
    pub reverses: Option<LedgerTransactionId>,
    /// Acting user.
    pub created_by: UserId,
    /// Balanced lines.
    pub lines: Vec<DraftLine>,
}

impl DraftTransaction {
    /// Sum of debit lines.
    #[must_use]
    pub fn total_debits(&self) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.direction == Direction::Debit)
            .map(|l| l.amount)
            .sum()
    }

    /// Sum of credit lines.
    #[must_use]
    pub fn total_credits(&self) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.direction == Direction::Credit)
            .map(|l| l.amount)
            .sum()
    }

    /// Returns true when debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }

    /// Lines posted to `account_id`.
    pub fn lines_for(&self, account_id: AccountId) -> impl Iterator<Item = &DraftLine> {
        self.lines.iter().filter(move |l| l.account_id == account_id)
    }
}
