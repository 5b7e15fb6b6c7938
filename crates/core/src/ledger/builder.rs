//! Ledger entry builder.
//!
//! Every posting in the system goes through [`LedgerEntryBuilder::build`]:
//! amounts are rounded to ledger precision, zero lines dropped, a sub-cent
//! remainder absorbed, and the result validated before anything reaches
//! persistence.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tijara_shared::types::{AccountId, BranchId, LedgerLineId, LedgerTransactionId, UserId, round_money};

use super::accounts::{AccountResolver, ResolvedAccount};
use super::entry::{DraftLine, DraftTransaction, SourceRef};
use super::error::LedgerError;
use super::types::{AccountRole, Direction, TransactionKind};
use super::validation::{absorb_rounding_remainder, validate_lines};
use crate::document::{SourceDocument, SourceKind};

#[derive(Debug, Clone)]
struct PendingLine {
    account_id: AccountId,
    direction: Direction,
    amount: Decimal,
    description: String,
}

/// Fluent builder for one balanced ledger transaction.
#[derive(Debug, Clone)]
pub struct LedgerEntryBuilder {
    kind: TransactionKind,
    branch_id: BranchId,
    transaction_date: NaiveDate,
    created_by: UserId,
    particulars: String,
    source: Option<SourceRef>,
    reverses: Option<LedgerTransactionId>,
    lines: Vec<PendingLine>,
}

impl LedgerEntryBuilder {
    /// Starts a transaction of `kind`.
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        branch_id: BranchId,
        transaction_date: NaiveDate,
        created_by: UserId,
    ) -> Self {
        Self {
            kind,
            branch_id,
            transaction_date,
            created_by,
            particulars: String::new(),
            source: None,
            reverses: None,
            lines: Vec::new(),
        }
    }

    /// Sets the narrative.
    #[must_use]
    pub fn particulars(mut self, particulars: impl Into<String>) -> Self {
        self.particulars = particulars.into();
        self
    }

    /// Links the transaction to its source document.
    #[must_use]
    pub fn source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Marks the transaction as reversing another one.
    #[must_use]
    pub fn reverses(mut self, original: LedgerTransactionId) -> Self {
        self.reverses = Some(original);
        self
    }

    /// Adds a debit line.
    #[must_use]
    pub fn debit(
        self,
        account: &ResolvedAccount,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        self.line(Direction::Debit, account.id, amount, description)
    }

    /// Adds a credit line.
    #[must_use]
    pub fn credit(
        self,
        account: &ResolvedAccount,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        self.line(Direction::Credit, account.id, amount, description)
    }

    /// Adds a line on either side.
    #[must_use]
    pub fn line(
        mut self,
        direction: Direction,
        account_id: AccountId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        self.lines.push(PendingLine {
            account_id,
            direction,
            amount,
            description: description.into(),
        });
        self
    }

    /// Rounds, drops zero lines, absorbs the rounding remainder and validates.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` for negative lines, otherwise whatever
    /// [`validate_lines`] reports.
    pub fn build(self) -> Result<DraftTransaction, LedgerError> {
        let origin = self.kind.origin();
        let mut lines = Vec::with_capacity(self.lines.len());

        for pending in self.lines {
            if pending.amount < Decimal::ZERO {
                return Err(LedgerError::InvalidAmount(format!(
                    "{} line amount {} is negative",
                    pending.direction, pending.amount
                )));
            }
            let amount = round_money(pending.amount);
            if amount.is_zero() {
                continue;
            }
            lines.push(DraftLine {
                id: LedgerLineId::new(),
                account_id: pending.account_id,
                direction: pending.direction,
                amount,
                description: pending.description,
                origin,
                assignments: Vec::new(),
            });
        }

        absorb_rounding_remainder(&mut lines)?;
        validate_lines(&lines)?;

        Ok(DraftTransaction {
            id: LedgerTransactionId::new(),
            branch_id: self.branch_id,
            kind: self.kind,
            transaction_date: self.transaction_date,
            particulars: self.particulars,
            journal: self.kind.journal().to_string(),
            source: self.source,
            reverses: self.reverses,
            created_by: self.created_by,
            lines,
        })
    }

    /// Builds the posting for a sale, invoice or purchase.
    ///
    /// - Sale/Invoice: debit Cash/Bank/AR gross, credit Sales Revenue net,
    ///   credit VAT Payable tax.
    /// - Purchase: debit Purchases net, debit VAT Receivable tax, credit
    ///   Cash/Bank/AP gross.
    ///
    /// Roles are only required for lines that carry an amount.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` when the total is not positive or the tax is outside
    /// `0..=total`; `MissingAccount`/`AccountInactive` from the resolver.
    pub fn for_source_document(
        document: &SourceDocument,
        accounts: &impl AccountResolver,
        created_by: UserId,
    ) -> Result<DraftTransaction, LedgerError> {
        let gross = round_money(document.total_amount);
        let tax = round_money(document.tax);

        if gross <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "total amount {gross} must be positive"
            )));
        }
        if tax < Decimal::ZERO || tax > gross {
            return Err(LedgerError::InvalidAmount(format!(
                "tax {tax} must be between 0 and the total {gross}"
            )));
        }
        let net = gross - tax;
        let kind = document.kind.transaction_kind();
        let number = &document.number;

        let builder = Self::new(kind, document.branch_id, document.document_date, created_by)
            .source(SourceRef::new(kind, document.id))
            .particulars(format!("{} {number}", kind_label(document.kind)));

        let builder = match document.kind {
            SourceKind::Sale | SourceKind::Invoice => {
                let settlement = accounts.require(document.payment_mode.receipt_role())?;
                let revenue = accounts.require(AccountRole::SalesRevenue)?;
                let builder = builder
                    .debit(settlement, gross, format!("Receipt for {number}"))
                    .credit(revenue, net, format!("Revenue for {number}"));
                if tax.is_zero() {
                    builder
                } else {
                    let vat = accounts.require(AccountRole::VatPayable)?;
                    builder.credit(vat, tax, format!("VAT on {number}"))
                }
            }
            SourceKind::Purchase => {
                let purchases = accounts.require(AccountRole::Purchases)?;
                let settlement = accounts.require(document.payment_mode.payment_role())?;
                let builder = builder.debit(purchases, net, format!("Purchase {number}"));
                let builder = if tax.is_zero() {
                    builder
                } else {
                    let vat = accounts.require(AccountRole::VatReceivable)?;
                    builder.debit(vat, tax, format!("Input VAT on {number}"))
                };
                builder.credit(settlement, gross, format!("Payment for {number}"))
            }
        };

        builder.build()
    }
}

fn kind_label(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Sale => "Sale",
        SourceKind::Invoice => "Invoice",
        SourceKind::Purchase => "Purchase",
    }
}
