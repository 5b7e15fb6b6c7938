//! Reconciliation data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tijara_shared::types::{DimensionValueId, LedgerLineId, SourceDocumentId};

use super::error::ReconciliationError;
use crate::dimension::{DimensionAssignment, DocumentDimensions};
use crate::document::{DocumentStatus, SourceKind};
use crate::ledger::{Direction, LineOrigin};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl Period {
    /// Creates a period.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReconciliationError> {
        if start > end {
            return Err(ReconciliationError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns true when `date` falls within the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Subledger reconciled against the general ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationDomain {
    /// POS sales.
    Sales,
    /// Customer invoices.
    Invoices,
    /// Supplier purchases.
    Purchases,
}

impl ReconciliationDomain {
    /// Returns the string representation of the domain.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Invoices => "invoices",
            Self::Purchases => "purchases",
        }
    }

    /// Parses a domain from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sales" => Some(Self::Sales),
            "invoices" => Some(Self::Invoices),
            "purchases" => Some(Self::Purchases),
            _ => None,
        }
    }

    /// Documents belonging to this subledger.
    #[must_use]
    pub const fn source_kind(self) -> SourceKind {
        match self {
            Self::Sales => SourceKind::Sale,
            Self::Invoices => SourceKind::Invoice,
            Self::Purchases => SourceKind::Purchase,
        }
    }

    /// Origin tag of the ledger lines posted for this subledger.
    #[must_use]
    pub const fn origin(self) -> LineOrigin {
        self.source_kind().transaction_kind().origin()
    }
}

/// A source document as seen by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubledgerRecord {
    /// Document ID.
    pub document_id: SourceDocumentId,
    /// Sale, invoice or purchase.
    pub kind: SourceKind,
    /// Document date.
    pub document_date: NaiveDate,
    /// Gross total.
    pub total_amount: Decimal,
    /// Active or voided.
    pub status: DocumentStatus,
    /// Header dimension values.
    pub dimensions: DocumentDimensions,
}

/// A posted ledger line as seen by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlLineRecord {
    /// Line ID.
    pub line_id: LedgerLineId,
    /// Date of the owning transaction.
    pub transaction_date: NaiveDate,
    /// Origin tag.
    pub origin: LineOrigin,
    /// Debit or credit.
    pub direction: Direction,
    /// Amount.
    pub amount: Decimal,
    /// Dimension assignments.
    pub assignments: Vec<DimensionAssignment>,
}

/// Subledger and GL totals for one dimension value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionVariance {
    /// Dimension value.
    pub value_id: DimensionValueId,
    /// Subledger total attributed to the value.
    pub subledger_total: Decimal,
    /// GL credits attributed to the value.
    pub gl_total: Decimal,
    /// `gl_total − subledger_total`.
    pub variance: Decimal,
}

/// Result of reconciling one subledger for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Reconciled subledger.
    pub domain: ReconciliationDomain,
    /// Period covered.
    pub period: Period,
    /// Σ active document totals.
    pub subledger_total: Decimal,
    /// Σ credit amounts on the domain's lines.
    pub gl_total: Decimal,
    /// `gl_total − subledger_total`.
    pub variance: Decimal,
    /// `|variance| < tolerance`.
    pub is_reconciled: bool,
    /// Per dimension value, ordered by value ID.
    pub by_dimension: Vec<DimensionVariance>,
}

/// Settlement status of a VAT period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatPaymentStatus {
    /// Nothing settled yet.
    Unpaid,
    /// Settled in part.
    PartiallyPaid,
    /// Fully settled.
    Paid,
    /// Input VAT exceeds output VAT.
    Refundable,
}

impl VatPaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Refundable => "refundable",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(Self::Unpaid),
            "partially_paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "refundable" => Some(Self::Refundable),
            _ => None,
        }
    }
}

/// Movement on the VAT accounts within a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatMovements {
    /// Credits on VAT Payable.
    pub payable_credits: Decimal,
    /// Debits on VAT Payable (credit note reversals).
    pub payable_debits: Decimal,
    /// Debits on VAT Receivable.
    pub receivable_debits: Decimal,
    /// Credits on VAT Receivable.
    pub receivable_credits: Decimal,
}

/// VAT position for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatPosition {
    /// Period covered.
    pub period: Period,
    /// Output VAT net of reversals.
    pub vat_collected: Decimal,
    /// Input VAT.
    pub vat_paid: Decimal,
    /// `vat_collected − vat_paid`; negative when refundable.
    pub net_liability: Decimal,
    /// Amount paid to the tax authority so far.
    pub amount_settled: Decimal,
    /// Settlement status.
    pub payment_status: VatPaymentStatus,
}
