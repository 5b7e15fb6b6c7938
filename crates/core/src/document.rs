//! Source documents (sales, invoices, purchases) as the engines see them.
//!
//! Persistence maps its rows into these types; every engine in this crate
//! works on them without knowing how they are stored.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tijara_shared::types::{
    AccountId, BranchId, LedgerTransactionId, PartyId, SourceDocumentId, SourceLineId,
};
use uuid::Uuid;

use crate::dimension::DocumentDimensions;
use crate::ledger::{AccountRole, PaymentMode, TransactionKind};
use crate::workflow::PostingStatus;

/// Kind of source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Point-of-sale sale.
    Sale,
    /// Sales invoice.
    Invoice,
    /// Purchase from a supplier.
    Purchase,
}

impl SourceKind {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Invoice => "invoice",
            Self::Purchase => "purchase",
        }
    }

    /// Parses a source kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sale" => Some(Self::Sale),
            "invoice" => Some(Self::Invoice),
            "purchase" => Some(Self::Purchase),
            _ => None,
        }
    }

    /// Ledger transaction kind used when posting this document.
    #[must_use]
    pub const fn transaction_kind(self) -> TransactionKind {
        match self {
            Self::Sale => TransactionKind::Sale,
            Self::Invoice => TransactionKind::Invoice,
            Self::Purchase => TransactionKind::Purchase,
        }
    }

    /// Returns true for the customer side (sales and invoices).
    #[must_use]
    pub const fn is_sales_side(self) -> bool {
        matches!(self, Self::Sale | Self::Invoice)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a source document, independent of posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Live document.
    Active,
    /// Voided; excluded from posting and reconciliation.
    Voided,
}

impl DocumentStatus {
    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Voided => "voided",
        }
    }

    /// Parses a document status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }
}

/// GL accounts chosen on the document itself, overriding the role defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlAccountOverrides {
    /// Replaces Sales Revenue.
    pub revenue_account_id: Option<AccountId>,
    /// Replaces Accounts Receivable.
    pub receivable_account_id: Option<AccountId>,
    /// Replaces Purchases.
    pub expense_account_id: Option<AccountId>,
    /// Replaces Accounts Payable.
    pub payable_account_id: Option<AccountId>,
}

impl GlAccountOverrides {
    /// The overrides as `(role, account)` pairs.
    #[must_use]
    pub fn bindings(&self) -> Vec<(AccountRole, AccountId)> {
        [
            (AccountRole::SalesRevenue, self.revenue_account_id),
            (AccountRole::AccountsReceivable, self.receivable_account_id),
            (AccountRole::Purchases, self.expense_account_id),
            (AccountRole::AccountsPayable, self.payable_account_id),
        ]
        .into_iter()
        .filter_map(|(role, id)| id.map(|id| (role, id)))
        .collect()
    }
}

/// A line of a source document with the rates in force when it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// Line ID.
    pub id: SourceLineId,
    /// Product sold or bought.
    pub product_id: Uuid,
    /// Description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price, before discount and VAT.
    pub unit_price: Decimal,
    /// Discount rate in percent.
    pub discount_rate: Decimal,
    /// VAT rate in percent.
    pub vat_rate: Decimal,
}

/// A sale, invoice or purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document ID.
    pub id: SourceDocumentId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Sale, invoice or purchase.
    pub kind: SourceKind,
    /// Document number.
    pub number: String,
    /// Document date.
    pub document_date: NaiveDate,
    /// How the document was paid.
    pub payment_mode: PaymentMode,
    /// Customer or supplier.
    pub party_id: Option<PartyId>,
    /// Sum of line amounts before discount and tax.
    pub subtotal: Decimal,
    /// Discount amount.
    pub discount: Decimal,
    /// Tax amount.
    pub tax: Decimal,
    /// Gross total.
    pub total_amount: Decimal,
    /// Amount still unpaid.
    pub outstanding_amount: Decimal,
    /// Active or voided.
    pub status: DocumentStatus,
    /// Draft or posted.
    pub posting_status: PostingStatus,
    /// Dimension values set on the header.
    pub dimensions: DocumentDimensions,
    /// GL account overrides.
    pub gl_overrides: GlAccountOverrides,
    /// Ledger transaction created when the document was posted.
    pub ledger_transaction_id: Option<LedgerTransactionId>,
    /// Document lines.
    pub lines: Vec<SourceLine>,
}

impl SourceDocument {
    /// Finds a line by ID.
    #[must_use]
    pub fn line(&self, id: SourceLineId) -> Option<&SourceLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Returns true when the document is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DocumentStatus::Active
    }
}
