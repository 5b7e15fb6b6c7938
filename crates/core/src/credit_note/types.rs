//! Credit note domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tijara_shared::types::{
    BranchId, CreditNoteId, CreditNoteItemId, LedgerTransactionId, RefundId, SourceDocumentId,
    SourceLineId,
};
use uuid::Uuid;

use crate::dimension::{DimensionSplit, DocumentDimensions};
use crate::document::SourceKind;
use crate::ledger::{AccountRole, DraftTransaction, PaymentMode};
use crate::workflow::{CreditNoteStatus, StatusChange};

/// How a credit note is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMethod {
    /// Cash handed back.
    Cash,
    /// Bank transfer.
    Bank,
    /// Reduces the customer's receivable.
    CreditAdjustment,
    /// Issued as store credit.
    StoreCredit,
}

impl RefundMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::CreditAdjustment => "credit_adjustment",
            Self::StoreCredit => "store_credit",
        }
    }

    /// Parses a method from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "bank" => Some(Self::Bank),
            "credit_adjustment" => Some(Self::CreditAdjustment),
            "store_credit" => Some(Self::StoreCredit),
            _ => None,
        }
    }

    /// Account credited when the refund is paid out.
    #[must_use]
    pub const fn account_role(self) -> AccountRole {
        match self {
            Self::Cash => AccountRole::Cash,
            Self::Bank => AccountRole::Bank,
            Self::CreditAdjustment => AccountRole::AccountsReceivable,
            Self::StoreCredit => AccountRole::StoreCreditLiability,
        }
    }
}

impl fmt::Display for RefundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition of a returned item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    /// Still sealed.
    Unopened,
    /// Opened but resellable.
    Good,
    /// Physically damaged.
    Damaged,
    /// Does not work.
    Faulty,
}

impl ItemCondition {
    /// Returns the string representation of the condition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unopened => "unopened",
            Self::Good => "good",
            Self::Damaged => "damaged",
            Self::Faulty => "faulty",
        }
    }

    /// Parses a condition from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unopened" => Some(Self::Unopened),
            "good" => Some(Self::Good),
            "damaged" => Some(Self::Damaged),
            "faulty" => Some(Self::Faulty),
            _ => None,
        }
    }

    /// Stock movement generated when the return is approved.
    #[must_use]
    pub const fn movement(self) -> StockMovementKind {
        match self {
            Self::Unopened | Self::Good => StockMovementKind::Restock,
            Self::Damaged | Self::Faulty => StockMovementKind::WriteOff,
        }
    }
}

/// Kind of stock movement produced by a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockMovementKind {
    /// Back on the shelf.
    Restock,
    /// Removed from inventory.
    WriteOff,
}

impl StockMovementKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restock => "restock",
            Self::WriteOff => "write_off",
        }
    }
}

/// A line being returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    /// Line of the source document.
    pub source_line_id: SourceLineId,
    /// Quantity returned.
    pub quantity: Decimal,
    /// Condition on return.
    pub condition: ItemCondition,
}

/// Input for creating a credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCreditNote {
    /// Credit note number.
    pub number: String,
    /// Why the goods came back.
    pub reason: String,
    /// How the customer is paid back.
    pub refund_method: RefundMethod,
    /// Date of the note.
    pub credit_date: NaiveDate,
    /// Items returned.
    pub items: Vec<ReturnItem>,
    /// Dimension values overriding those of the source.
    pub dimensions: DocumentDimensions,
    /// Explicit splits applied to the reversal lines.
    #[serde(default)]
    pub splits: Vec<DimensionSplit>,
}

/// What the non-cancelled notes of a source already credit, read with the
/// source row locked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorCredits {
    /// Sum of note totals.
    pub total: Decimal,
    /// Quantity returned per source line.
    pub returned: HashMap<SourceLineId, Decimal>,
}

impl PriorCredits {
    /// Quantity of `line` already returned.
    #[must_use]
    pub fn returned(&self, line: SourceLineId) -> Decimal {
        self.returned.get(&line).copied().unwrap_or_default()
    }
}

/// Input for a refund against an issued note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Amount to pay out; the remaining balance when absent.
    pub amount: Option<Decimal>,
    /// Method; the note's refund method when absent.
    pub method: Option<RefundMethod>,
    /// Date of the refund.
    pub refund_date: NaiveDate,
}

/// A priced credit note item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNoteItem {
    /// Item ID.
    pub id: CreditNoteItemId,
    /// Line of the source document.
    pub source_line_id: SourceLineId,
    /// Product returned.
    pub product_id: Uuid,
    /// Description copied from the source line.
    pub description: String,
    /// Quantity returned.
    pub quantity: Decimal,
    /// Condition on return.
    pub condition: ItemCondition,
    /// Unit price of the source line.
    pub unit_price: Decimal,
    /// Discount amount.
    pub discount: Decimal,
    /// Net of discount, before VAT.
    pub net: Decimal,
    /// VAT amount.
    pub vat: Decimal,
    /// Net plus VAT.
    pub total: Decimal,
}

/// Aggregated amounts of a credit note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNoteTotals {
    /// Sum of item net amounts.
    pub subtotal: Decimal,
    /// Sum of item discounts.
    pub discount: Decimal,
    /// Sum of item VAT.
    pub vat: Decimal,
    /// Sum of item totals.
    pub total: Decimal,
}

/// A credit note against a sale or invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNote {
    /// Credit note ID.
    pub id: CreditNoteId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Credited document.
    pub source_id: SourceDocumentId,
    /// Kind of the credited document.
    pub source_kind: SourceKind,
    /// Credit note number.
    pub number: String,
    /// Reason for the return.
    pub reason: String,
    /// Refund method.
    pub refund_method: RefundMethod,
    /// Date of the note.
    pub credit_date: NaiveDate,
    /// Amounts.
    pub totals: CreditNoteTotals,
    /// Lifecycle status.
    pub status: CreditNoteStatus,
    /// Ledger transaction posted on approval.
    pub approval_transaction_id: Option<LedgerTransactionId>,
    /// Dimension overrides.
    pub dimensions: DocumentDimensions,
    /// Dimension splits for the reversal.
    pub splits: Vec<DimensionSplit>,
    /// Items.
    pub items: Vec<CreditNoteItem>,
}

/// Liability credited when a credit note is approved.
///
/// Credit-origin documents reduce the receivable; cash and bank documents
/// owe the customer a refund.
#[must_use]
pub const fn settlement_role(payment_mode: PaymentMode) -> AccountRole {
    match payment_mode {
        PaymentMode::Credit => AccountRole::AccountsReceivable,
        PaymentMode::Cash | PaymentMode::Bank => AccountRole::RefundPayable,
    }
}

/// Inventory effect of one approved item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Originating credit note item.
    pub credit_note_item_id: CreditNoteItemId,
    /// Product moved.
    pub product_id: Uuid,
    /// Quantity moved.
    pub quantity: Decimal,
    /// Restock or write-off.
    pub kind: StockMovementKind,
}

/// Everything persistence writes when a credit note is approved.
#[derive(Debug, Clone)]
pub struct PreparedApproval {
    /// Reversal transaction.
    pub draft: DraftTransaction,
    /// Draft → Issued.
    pub status_change: StatusChange<CreditNoteStatus>,
    /// Inventory movements.
    pub stock_movements: Vec<StockMovement>,
    /// Amount to take off the source and party outstanding balances.
    pub receivable_reduction: Option<Decimal>,
}

/// Everything persistence writes for one refund.
#[derive(Debug, Clone)]
pub struct RefundPlan {
    /// Refund row ID.
    pub refund_id: RefundId,
    /// Amount paid out.
    pub amount: Decimal,
    /// Method used.
    pub method: RefundMethod,
    /// Date of the refund.
    pub refund_date: NaiveDate,
    /// Settlement transaction, absent when both sides hit the same account.
    pub draft: Option<DraftTransaction>,
    /// Issued → Processed once the note is fully refunded.
    pub settlement: Option<StatusChange<CreditNoteStatus>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refund_method_accounts() {
        assert_eq!(RefundMethod::Cash.account_role(), AccountRole::Cash);
        assert_eq!(RefundMethod::Bank.account_role(), AccountRole::Bank);
        assert_eq!(
            RefundMethod::CreditAdjustment.account_role(),
            AccountRole::AccountsReceivable
        );
        assert_eq!(
            RefundMethod::StoreCredit.account_role(),
            AccountRole::StoreCreditLiability
        );
    }

    #[test]
    fn test_refund_method_round_trip() {
        for method in [
            RefundMethod::Cash,
            RefundMethod::Bank,
            RefundMethod::CreditAdjustment,
            RefundMethod::StoreCredit,
        ] {
            assert_eq!(RefundMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(RefundMethod::parse("cheque"), None);
    }

    #[test]
    fn test_condition_movements() {
        assert_eq!(ItemCondition::Unopened.movement(), StockMovementKind::Restock);
        assert_eq!(ItemCondition::Good.movement(), StockMovementKind::Restock);
        assert_eq!(ItemCondition::Damaged.movement(), StockMovementKind::WriteOff);
        assert_eq!(ItemCondition::Faulty.movement(), StockMovementKind::WriteOff);
        assert_eq!(ItemCondition::parse("GOOD"), Some(ItemCondition::Good));
    }

    #[test]
    fn test_settlement_role() {
        assert_eq!(
            settlement_role(PaymentMode::Credit),
            AccountRole::AccountsReceivable
        );
        assert_eq!(settlement_role(PaymentMode::Cash), AccountRole::RefundPayable);
        assert_eq!(settlement_role(PaymentMode::Bank), AccountRole::RefundPayable);
    }
}
