//! Source document repository.
//!
//! Sales, invoices and purchases are registered here with their lines and
//! header dimensions, priced from the line rates. Posting reads them back as
//! core [`SourceDocument`]s.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tijara_core::dimension::DocumentDimensions;
use tijara_core::document::{
    DocumentStatus, GlAccountOverrides, SourceDocument, SourceKind, SourceLine,
};
use tijara_core::ledger::PaymentMode;
use tijara_core::workflow::{PostingStatus, WorkflowError};
use tijara_shared::LedgerSettings;
use tijara_shared::types::{
    BranchId, PartyId, SourceDocumentId, SourceLineId, percent_of, round_money,
};
use tracing::info;
use uuid::Uuid;

use super::error::RepositoryError;
use crate::entities::sea_orm_active_enums::{
    DocumentStatus as DbDocumentStatus, PostingStatus as DbPostingStatus,
    SourceKind as DbSourceKind,
};
use crate::entities::{source_document_lines, source_documents};

/// A line of a document to register.
#[derive(Debug, Clone)]
pub struct NewDocumentLine {
    /// Product sold or bought.
    pub product_id: Uuid,
    /// Line description.
    pub description: String,
    /// Quantity, positive.
    pub quantity: Decimal,
    /// Unit price before discount and VAT.
    pub unit_price: Decimal,
    /// Discount in percent.
    pub discount_rate: Decimal,
    /// VAT in percent; the configured default when `None`.
    pub vat_rate: Option<Decimal>,
}

/// A document to register.
#[derive(Debug, Clone)]
pub struct NewSourceDocument {
    /// Owning branch.
    pub branch_id: BranchId,
    /// Sale, invoice or purchase.
    pub kind: SourceKind,
    /// Document number, unique per branch and kind.
    pub number: String,
    /// Document date.
    pub document_date: chrono::NaiveDate,
    /// Cash, bank or credit.
    pub payment_mode: PaymentMode,
    /// Customer or supplier; required on credit.
    pub party_id: Option<PartyId>,
    /// Header dimension values.
    pub dimensions: DocumentDimensions,
    /// Per-document GL account overrides.
    pub gl_overrides: GlAccountOverrides,
    /// Lines, at least one.
    pub lines: Vec<NewDocumentLine>,
}

/// Source document repository.
#[derive(Debug, Clone)]
pub struct SourceDocumentRepository {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl SourceDocumentRepository {
    /// Creates a new source document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Registers a draft document.
    ///
    /// Each line is priced as `quantity × unit_price`, less its discount,
    /// plus VAT on the discounted amount. Documents on credit start with
    /// their full total outstanding.
    ///
    /// # Errors
    ///
    /// `InvalidDocument` for an empty document, a non-positive quantity, a
    /// negative price, a rate outside `0..=100` or a credit document without
    /// a party; `DuplicateCode` when the number is taken.
    pub async fn create(
        &self,
        input: NewSourceDocument,
    ) -> Result<SourceDocument, RepositoryError> {
        validate(&input)?;

        let existing = source_documents::Entity::find()
            .filter(source_documents::Column::BranchId.eq(input.branch_id.into_inner()))
            .filter(source_documents::Column::Kind.eq(DbSourceKind::from(input.kind)))
            .filter(source_documents::Column::Number.eq(&input.number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::DuplicateCode(input.number));
        }

        let document_id = SourceDocumentId::new().into_inner();
        let mut subtotal = Decimal::ZERO;
        let mut discount = Decimal::ZERO;
        let mut tax = Decimal::ZERO;
        let mut lines = Vec::with_capacity(input.lines.len());
        for (line_no, line) in (1_i32..).zip(&input.lines) {
            let vat_rate = line.vat_rate.unwrap_or(self.settings.default_vat_rate);
            let gross = round_money(line.quantity * line.unit_price);
            let line_discount = percent_of(gross, line.discount_rate);
            subtotal += gross;
            discount += line_discount;
            tax += percent_of(gross - line_discount, vat_rate);
            lines.push(source_document_lines::ActiveModel {
                id: Set(SourceLineId::new().into_inner()),
                document_id: Set(document_id),
                line_no: Set(line_no),
                product_id: Set(line.product_id),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                discount_rate: Set(line.discount_rate),
                vat_rate: Set(vat_rate),
            });
        }
        let total = subtotal - discount + tax;
        let outstanding = if input.payment_mode == PaymentMode::Credit {
            total
        } else {
            Decimal::ZERO
        };

        let now = chrono::Utc::now().into();
        let dims = input.dimensions;
        let overrides = input.gl_overrides;
        let document = source_documents::ActiveModel {
            id: Set(document_id),
            branch_id: Set(input.branch_id.into_inner()),
            kind: Set(input.kind.into()),
            number: Set(input.number),
            document_date: Set(input.document_date),
            payment_mode: Set(input.payment_mode.into()),
            party_id: Set(input.party_id.map(Into::into)),
            subtotal: Set(subtotal),
            discount: Set(discount),
            tax: Set(tax),
            total_amount: Set(total),
            outstanding_amount: Set(outstanding),
            status: Set(DbDocumentStatus::Active),
            posting_status: Set(DbPostingStatus::Draft),
            cost_center_id: Set(dims.cost_center_id.map(Into::into)),
            project_id: Set(dims.project_id.map(Into::into)),
            department_id: Set(dims.department_id.map(Into::into)),
            revenue_account_id: Set(overrides.revenue_account_id.map(Into::into)),
            receivable_account_id: Set(overrides.receivable_account_id.map(Into::into)),
            expense_account_id: Set(overrides.expense_account_id.map(Into::into)),
            payable_account_id: Set(overrides.payable_account_id.map(Into::into)),
            ledger_transaction_id: Set(None),
            posted_by: Set(None),
            posted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let txn = self.db.begin().await?;
        let document = document.insert(&txn).await?;
        source_document_lines::Entity::insert_many(lines)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(
            document_id = %document.id,
            kind = input.kind.as_str(),
            number = %document.number,
            total = %document.total_amount,
            "Source document registered"
        );
        self.find(document.id.into()).await
    }

    /// Loads a document with its lines.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, or a database error.
    pub async fn find(
        &self,
        document_id: SourceDocumentId,
    ) -> Result<SourceDocument, RepositoryError> {
        load_document(&self.db, document_id.into_inner(), false).await
    }

    /// Voids a draft document. Posted documents are reversed with a credit
    /// note instead.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, `AlreadyPosted`, or a database error.
    pub async fn void(
        &self,
        document_id: SourceDocumentId,
    ) -> Result<SourceDocument, RepositoryError> {
        let txn = self.db.begin().await?;
        let document = load_document(&txn, document_id.into_inner(), true).await?;
        if document.posting_status == PostingStatus::Posted {
            return Err(WorkflowError::AlreadyPosted(document.id).into());
        }
        source_documents::Entity::update_many()
            .col_expr(
                source_documents::Column::Status,
                sea_orm::sea_query::Expr::val(DbDocumentStatus::Voided)
                    .as_enum(DbDocumentStatus::name()),
            )
            .col_expr(
                source_documents::Column::OutstandingAmount,
                sea_orm::sea_query::Expr::value(Decimal::ZERO),
            )
            .col_expr(
                source_documents::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now()),
            )
            .filter(source_documents::Column::Id.eq(document_id.into_inner()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(document_id = %document_id, "Source document voided");
        self.find(document_id).await
    }
}

fn validate(input: &NewSourceDocument) -> Result<(), RepositoryError> {
    let invalid = |reason: String| Err(RepositoryError::InvalidDocument(reason));
    if input.lines.is_empty() {
        return invalid(format!("document {} has no lines", input.number));
    }
    if input.payment_mode == PaymentMode::Credit && input.party_id.is_none() {
        return invalid(format!("credit document {} has no party", input.number));
    }
    let rate_range = Decimal::ZERO..=Decimal::ONE_HUNDRED;
    for line in &input.lines {
        if line.quantity <= Decimal::ZERO {
            return invalid(format!("quantity {} must be positive", line.quantity));
        }
        if line.unit_price < Decimal::ZERO {
            return invalid(format!("unit price {} must not be negative", line.unit_price));
        }
        let vat_ok = line.vat_rate.is_none_or(|rate| rate_range.contains(&rate));
        if !rate_range.contains(&line.discount_rate) || !vat_ok {
            return invalid(format!("rates on '{}' must be within 0..=100", line.description));
        }
    }
    Ok(())
}

/// Loads a document, optionally locking its row until `conn` commits.
pub(crate) async fn load_document<C>(
    conn: &C,
    document_id: Uuid,
    lock: bool,
) -> Result<SourceDocument, RepositoryError>
where
    C: ConnectionTrait,
{
    let query = source_documents::Entity::find_by_id(document_id);
    let query = if lock { query.lock_exclusive() } else { query };
    let document = query
        .one(conn)
        .await?
        .ok_or(RepositoryError::DocumentNotFound(document_id))?;
    let lines = source_document_lines::Entity::find()
        .filter(source_document_lines::Column::DocumentId.eq(document_id))
        .order_by_asc(source_document_lines::Column::LineNo)
        .all(conn)
        .await?;
    Ok(to_core(document, lines))
}

/// Converts a document row and its lines into the core document.
#[must_use]
pub fn to_core(
    document: source_documents::Model,
    lines: Vec<source_document_lines::Model>,
) -> SourceDocument {
    SourceDocument {
        id: document.id.into(),
        branch_id: document.branch_id.into(),
        kind: document.kind.into(),
        number: document.number,
        document_date: document.document_date,
        payment_mode: document.payment_mode.into(),
        party_id: document.party_id.map(Into::into),
        subtotal: document.subtotal,
        discount: document.discount,
        tax: document.tax,
        total_amount: document.total_amount,
        outstanding_amount: document.outstanding_amount,
        status: DocumentStatus::from(document.status),
        posting_status: document.posting_status.into(),
        dimensions: DocumentDimensions {
            cost_center_id: document.cost_center_id.map(Into::into),
            project_id: document.project_id.map(Into::into),
            department_id: document.department_id.map(Into::into),
        },
        gl_overrides: GlAccountOverrides {
            revenue_account_id: document.revenue_account_id.map(Into::into),
            receivable_account_id: document.receivable_account_id.map(Into::into),
            expense_account_id: document.expense_account_id.map(Into::into),
            payable_account_id: document.payable_account_id.map(Into::into),
        },
        ledger_transaction_id: document.ledger_transaction_id.map(Into::into),
        lines: lines
            .into_iter()
            .map(|line| SourceLine {
                id: line.id.into(),
                product_id: line.product_id,
                description: line.description,
                quantity: line.quantity,
                unit_price: line.unit_price,
                discount_rate: line.discount_rate,
                vat_rate: line.vat_rate,
            })
            .collect(),
    }
}
