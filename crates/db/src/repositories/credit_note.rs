//! Credit note repository: creation, approval, cancellation and refunds.
//!
//! Rows are locked note first, then the credited document, then the party,
//! so approvals and refunds of the same note serialize and over-crediting a
//! document is checked against committed totals only.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    Iterable, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use tijara_core::credit_note::{
    CreateCreditNote, CreditNote, CreditNoteError, CreditNoteItem, CreditNoteService,
    CreditNoteTotals, PriorCredits, RefundMethod, RefundPlan, RefundRequest,
};
use tijara_core::dimension::{DimensionSplit, DocumentDimensions};
use tijara_core::workflow::{
    CreditNoteStatus as CoreCreditNoteStatus, RefundStatus as CoreRefundStatus, WorkflowService,
};
use tijara_shared::LedgerSettings;
use tijara_shared::types::{CreditNoteId, SourceDocumentId, UserId};
use tracing::{error, info};
use uuid::Uuid;

use super::account::resolve_accounts;
use super::dimension::load_catalog;
use super::document::load_document;
use super::error::RepositoryError;
use super::ledger::{origin_lines, write_transaction};
use super::party::adjust_outstanding;
use crate::entities::sea_orm_active_enums::{CreditNoteStatus, RefundStatus};
use crate::entities::{
    credit_note_items, credit_note_splits, credit_notes, refund_transactions, source_documents,
    stock_movements,
};

/// Result of approving a credit note.
#[derive(Debug, Clone)]
pub struct ApprovedCreditNote {
    /// The issued note.
    pub credit_note: CreditNote,
    /// The reversing ledger transaction.
    pub transaction_id: Uuid,
    /// Inventory movements for the returned items.
    pub stock_movements: Vec<stock_movements::Model>,
}

/// Credit note repository.
#[derive(Debug, Clone)]
pub struct CreditNoteRepository {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl CreditNoteRepository {
    /// Creates a new credit note repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Creates a draft credit note against a sale or invoice.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, `OVER_REFUND`, `INVALID_QUANTITY`,
    /// `UNSUPPORTED_SOURCE`, `DOCUMENT_VOIDED`, `DuplicateCode` for a taken
    /// number, or a database error.
    pub async fn create(
        &self,
        source_id: SourceDocumentId,
        request: CreateCreditNote,
        created_by: UserId,
    ) -> Result<CreditNote, RepositoryError> {
        let txn = self.db.begin().await?;
        let source = load_document(&txn, source_id.into_inner(), true).await?;

        let taken = credit_notes::Entity::find()
            .filter(credit_notes::Column::BranchId.eq(source.branch_id.into_inner()))
            .filter(credit_notes::Column::Number.eq(&request.number))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(RepositoryError::DuplicateCode(request.number));
        }

        let prior = prior_credits(&txn, source_id.into_inner()).await?;
        let note = CreditNoteService::create(&source, &prior, request)?;

        let now = chrono::Utc::now().into();
        credit_notes::ActiveModel {
            id: Set(note.id.into_inner()),
            branch_id: Set(note.branch_id.into_inner()),
            source_type: Set(note.source_kind.into()),
            source_id: Set(note.source_id.into_inner()),
            number: Set(note.number.clone()),
            reason: Set(note.reason.clone()),
            refund_method: Set(note.refund_method.into()),
            credit_date: Set(note.credit_date),
            subtotal: Set(note.totals.subtotal),
            discount: Set(note.totals.discount),
            vat: Set(note.totals.vat),
            total: Set(note.totals.total),
            status: Set(note.status.into()),
            approval_transaction_id: Set(None),
            cost_center_id: Set(note.dimensions.cost_center_id.map(Into::into)),
            project_id: Set(note.dimensions.project_id.map(Into::into)),
            department_id: Set(note.dimensions.department_id.map(Into::into)),
            created_by: Set(created_by.into_inner()),
            approved_by: Set(None),
            approved_at: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            cancellation_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let items: Vec<credit_note_items::ActiveModel> = note
            .items
            .iter()
            .map(|item| credit_note_items::ActiveModel {
                id: Set(item.id.into_inner()),
                credit_note_id: Set(note.id.into_inner()),
                source_line_id: Set(item.source_line_id.into_inner()),
                product_id: Set(item.product_id),
                description: Set(item.description.clone()),
                quantity: Set(item.quantity),
                condition: Set(item.condition.into()),
                unit_price: Set(item.unit_price),
                discount: Set(item.discount),
                net: Set(item.net),
                vat: Set(item.vat),
                total: Set(item.total),
            })
            .collect();
        credit_note_items::Entity::insert_many(items).exec(&txn).await?;

        let splits: Vec<credit_note_splits::ActiveModel> = note
            .splits
            .iter()
            .flat_map(|split| {
                split.shares.iter().map(|(value_id, percentage)| {
                    credit_note_splits::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        credit_note_id: Set(note.id.into_inner()),
                        dimension_id: Set(split.dimension_id.into_inner()),
                        dimension_value_id: Set(value_id.into_inner()),
                        percentage: Set(*percentage),
                    }
                })
            })
            .collect();
        if !splits.is_empty() {
            credit_note_splits::Entity::insert_many(splits).exec(&txn).await?;
        }
        txn.commit().await?;

        info!(
            credit_note_id = %note.id,
            source_id = %source_id,
            total = %note.totals.total,
            already_credited = %prior.total,
            "Credit note created"
        );
        Ok(note)
    }

    /// Loads a credit note with its items.
    ///
    /// # Errors
    ///
    /// `CreditNoteNotFound`, or a database error.
    pub async fn find(&self, credit_note_id: CreditNoteId) -> Result<CreditNote, RepositoryError> {
        load_note(&self.db, credit_note_id.into_inner(), false).await
    }

    /// Lists the refunds recorded against a note, failed ones included.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn refunds(
        &self,
        credit_note_id: CreditNoteId,
    ) -> Result<Vec<refund_transactions::Model>, RepositoryError> {
        Ok(refund_transactions::Entity::find()
            .filter(refund_transactions::Column::CreditNoteId.eq(credit_note_id.into_inner()))
            .order_by_asc(refund_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Approves a draft note: posts the reversal, records the stock
    /// movements and, for credit sales, reduces what the customer owes.
    ///
    /// # Errors
    ///
    /// `CreditNoteNotFound`, `INVALID_TRANSITION`, `SOURCE_NOT_POSTED`,
    /// ledger and dimension errors, or a database error.
    pub async fn approve(
        &self,
        credit_note_id: CreditNoteId,
        approved_by: UserId,
    ) -> Result<ApprovedCreditNote, RepositoryError> {
        let txn = self.db.begin().await?;
        let note = load_note(&txn, credit_note_id.into_inner(), true).await?;
        let source = load_document(&txn, note.source_id.into_inner(), true).await?;

        let origin = match source.ledger_transaction_id {
            Some(original) => origin_lines(&txn, original.into_inner()).await?,
            None => Vec::new(),
        };
        let accounts =
            resolve_accounts(&txn, &self.settings, note.branch_id, &source.gl_overrides).await?;
        let dimensions = load_catalog(&txn, note.branch_id).await?;

        let prepared = CreditNoteService::approve(
            &note,
            &source,
            &origin,
            &accounts,
            &dimensions,
            approved_by,
        )?;
        let header = write_transaction(&txn, &prepared.draft).await?;

        let now: sea_orm::prelude::DateTimeWithTimeZone = prepared.status_change.changed_at.into();
        let movements: Vec<stock_movements::ActiveModel> = prepared
            .stock_movements
            .iter()
            .map(|movement| stock_movements::ActiveModel {
                id: Set(Uuid::now_v7()),
                credit_note_item_id: Set(movement.credit_note_item_id.into_inner()),
                product_id: Set(movement.product_id),
                quantity: Set(movement.quantity),
                kind: Set(movement.kind.into()),
                created_at: Set(now),
            })
            .collect();
        let mut stored_movements = Vec::with_capacity(movements.len());
        for movement in movements {
            stored_movements.push(movement.insert(&txn).await?);
        }

        credit_notes::Entity::update_many()
            .col_expr(
                credit_notes::Column::Status,
                Expr::val(CreditNoteStatus::from(prepared.status_change.to))
                    .as_enum(CreditNoteStatus::name()),
            )
            .col_expr(
                credit_notes::Column::ApprovalTransactionId,
                Expr::value(Some(header.id)),
            )
            .col_expr(
                credit_notes::Column::ApprovedBy,
                Expr::value(Some(approved_by.into_inner())),
            )
            .col_expr(credit_notes::Column::ApprovedAt, Expr::value(Some(now)))
            .col_expr(credit_notes::Column::UpdatedAt, Expr::value(now))
            .filter(credit_notes::Column::Id.eq(note.id.into_inner()))
            .exec(&txn)
            .await?;

        if let Some(reduction) = prepared.receivable_reduction {
            source_documents::Entity::update_many()
                .col_expr(
                    source_documents::Column::OutstandingAmount,
                    Expr::col(source_documents::Column::OutstandingAmount).sub(reduction),
                )
                .col_expr(source_documents::Column::UpdatedAt, Expr::value(now))
                .filter(source_documents::Column::Id.eq(source.id.into_inner()))
                .exec(&txn)
                .await?;
            if let Some(party_id) = source.party_id {
                adjust_outstanding(&txn, party_id.into_inner(), -reduction).await?;
            }
        }
        txn.commit().await?;

        info!(
            credit_note_id = %note.id,
            transaction_id = %header.id,
            movements = stored_movements.len(),
            "Credit note approved"
        );
        Ok(ApprovedCreditNote {
            credit_note: self.find(note.id).await?,
            transaction_id: header.id,
            stock_movements: stored_movements,
        })
    }

    /// Cancels a draft note.
    ///
    /// # Errors
    ///
    /// `CreditNoteNotFound`, `CANCEL_REASON_REQUIRED`,
    /// `CANCEL_REQUIRES_REVERSAL`, `INVALID_TRANSITION`, or a database error.
    pub async fn cancel(
        &self,
        credit_note_id: CreditNoteId,
        reason: &str,
        cancelled_by: UserId,
    ) -> Result<CreditNote, RepositoryError> {
        let txn = self.db.begin().await?;
        let note = load_note(&txn, credit_note_id.into_inner(), true).await?;
        let change = CreditNoteService::cancel(&note, reason, cancelled_by)?;

        let at: sea_orm::prelude::DateTimeWithTimeZone = change.changed_at.into();
        credit_notes::Entity::update_many()
            .col_expr(
                credit_notes::Column::Status,
                Expr::val(CreditNoteStatus::from(change.to))
                    .as_enum(CreditNoteStatus::name()),
            )
            .col_expr(
                credit_notes::Column::CancelledBy,
                Expr::value(Some(cancelled_by.into_inner())),
            )
            .col_expr(credit_notes::Column::CancelledAt, Expr::value(Some(at)))
            .col_expr(
                credit_notes::Column::CancellationReason,
                Expr::value(Some(reason.trim().to_owned())),
            )
            .col_expr(credit_notes::Column::UpdatedAt, Expr::value(at))
            .filter(credit_notes::Column::Id.eq(note.id.into_inner()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(credit_note_id = %note.id, "Credit note cancelled");
        self.find(note.id).await
    }

    /// Refunds an issued note, in full by default.
    ///
    /// The refund row and its ledger transaction are written together. When
    /// the ledger step fails the work is rolled back and a failed refund is
    /// recorded on its own, so the attempt stays visible.
    ///
    /// # Errors
    ///
    /// `CreditNoteNotFound`, `INVALID_TRANSITION` unless issued,
    /// `INVALID_REFUND_AMOUNT`, the ledger failure, or a database error.
    pub async fn process_refund(
        &self,
        credit_note_id: CreditNoteId,
        request: RefundRequest,
        processed_by: UserId,
    ) -> Result<refund_transactions::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let note = load_note(&txn, credit_note_id.into_inner(), true).await?;
        let source = load_document(&txn, note.source_id.into_inner(), false).await?;
        let already_refunded = refunded_total(&txn, note.id.into_inner()).await?;
        let accounts =
            resolve_accounts(&txn, &self.settings, note.branch_id, &source.gl_overrides).await?;
        let origin = match note.approval_transaction_id {
            Some(approval) => origin_lines(&txn, approval.into_inner()).await?,
            None => Vec::new(),
        };
        let dimensions = load_catalog(&txn, note.branch_id).await?;

        let failed = FailedRefund {
            amount: request.amount.unwrap_or(note.totals.total - already_refunded),
            method: request.method.unwrap_or(note.refund_method),
            refund_date: request.refund_date,
        };
        let plan = match CreditNoteService::plan_refund(
            &note,
            source.payment_mode,
            already_refunded,
            &request,
            &origin,
            &accounts,
            &dimensions,
            processed_by,
        ) {
            Ok(plan) => plan,
            Err(CreditNoteError::Ledger(e)) => {
                drop(txn);
                return Err(self.record_failed(&note, &failed, processed_by, e.into()).await);
            }
            Err(e) => return Err(e.into()),
        };

        let applied = match apply_refund(&txn, &note, &plan, processed_by).await {
            Ok(refund) => txn.commit().await.map(|()| refund).map_err(RepositoryError::from),
            Err(e) => {
                drop(txn);
                Err(e)
            }
        };
        match applied {
            Ok(refund) => {
                info!(
                    credit_note_id = %note.id,
                    refund_id = %refund.id,
                    amount = %refund.amount,
                    settled = plan.settlement.is_some(),
                    "Refund processed"
                );
                Ok(refund)
            }
            Err(e) => {
                let failed = FailedRefund {
                    amount: plan.amount,
                    ..failed
                };
                Err(self.record_failed(&note, &failed, processed_by, e).await)
            }
        }
    }

    /// Records a failed refund attempt and hands back the original error.
    async fn record_failed(
        &self,
        note: &CreditNote,
        failed: &FailedRefund,
        processed_by: UserId,
        cause: RepositoryError,
    ) -> RepositoryError {
        error!(
            credit_note_id = %note.id,
            amount = %failed.amount,
            code = cause.error_code(),
            error = %cause,
            "Refund failed"
        );
        let change = match WorkflowService::fail_refund(CoreRefundStatus::Pending, processed_by) {
            Ok(change) => change,
            Err(e) => return e.into(),
        };
        let row = refund_transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            credit_note_id: Set(note.id.into_inner()),
            amount: Set(failed.amount),
            method: Set(failed.method.into()),
            status: Set(RefundStatus::from(change.to)),
            refund_date: Set(failed.refund_date),
            ledger_transaction_id: Set(None),
            failure_reason: Set(Some(cause.to_string())),
            processed_by: Set(processed_by.into_inner()),
            processed_at: Set(Some(change.changed_at.into())),
            created_at: Set(change.changed_at.into()),
        };
        if let Err(e) = row.insert(&self.db).await {
            error!(credit_note_id = %note.id, error = %e, "Failed refund could not be recorded");
        }
        cause
    }
}

#[derive(Debug, Clone, Copy)]
struct FailedRefund {
    amount: Decimal,
    method: RefundMethod,
    refund_date: chrono::NaiveDate,
}

async fn apply_refund<C>(
    conn: &C,
    note: &CreditNote,
    plan: &RefundPlan,
    processed_by: UserId,
) -> Result<refund_transactions::Model, RepositoryError>
where
    C: ConnectionTrait,
{
    let transaction_id = match &plan.draft {
        Some(draft) => Some(write_transaction(conn, draft).await?.id),
        None => None,
    };
    let change = WorkflowService::complete_refund(CoreRefundStatus::Pending, processed_by)?;
    let at: sea_orm::prelude::DateTimeWithTimeZone = change.changed_at.into();

    let refund = refund_transactions::ActiveModel {
        id: Set(plan.refund_id.into_inner()),
        credit_note_id: Set(note.id.into_inner()),
        amount: Set(plan.amount),
        method: Set(plan.method.into()),
        status: Set(RefundStatus::from(change.to)),
        refund_date: Set(plan.refund_date),
        ledger_transaction_id: Set(transaction_id),
        failure_reason: Set(None),
        processed_by: Set(processed_by.into_inner()),
        processed_at: Set(Some(at)),
        created_at: Set(at),
    }
    .insert(conn)
    .await?;

    if let Some(settlement) = &plan.settlement {
        credit_notes::Entity::update_many()
            .col_expr(
                credit_notes::Column::Status,
                Expr::val(CreditNoteStatus::from(settlement.to))
                    .as_enum(CreditNoteStatus::name()),
            )
            .col_expr(credit_notes::Column::UpdatedAt, Expr::value(at))
            .filter(credit_notes::Column::Id.eq(note.id.into_inner()))
            .exec(conn)
            .await?;
    }
    Ok(refund)
}

/// Totals and per-line quantities of the notes that count against a source.
async fn prior_credits<C>(conn: &C, source_id: Uuid) -> Result<PriorCredits, RepositoryError>
where
    C: ConnectionTrait,
{
    let counted: Vec<CreditNoteStatus> = CreditNoteStatus::iter()
        .filter(|status| CoreCreditNoteStatus::from(*status).counts_against_source())
        .collect();
    let total: Option<Option<Decimal>> = credit_notes::Entity::find()
        .select_only()
        .column_as(Expr::col(credit_notes::Column::Total).sum(), "total")
        .filter(credit_notes::Column::SourceId.eq(source_id))
        .filter(credit_notes::Column::Status.is_in(counted.clone()))
        .into_tuple()
        .one(conn)
        .await?;

    let returned: Vec<(Uuid, Option<Decimal>)> = credit_note_items::Entity::find()
        .select_only()
        .column(credit_note_items::Column::SourceLineId)
        .column_as(Expr::col(credit_note_items::Column::Quantity).sum(), "returned")
        .join(JoinType::InnerJoin, credit_note_items::Relation::CreditNotes.def())
        .filter(credit_notes::Column::SourceId.eq(source_id))
        .filter(credit_notes::Column::Status.is_in(counted))
        .group_by(credit_note_items::Column::SourceLineId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(PriorCredits {
        total: total.flatten().unwrap_or_default(),
        returned: returned
            .into_iter()
            .map(|(line_id, quantity)| (line_id.into(), quantity.unwrap_or_default()))
            .collect(),
    })
}

/// Sum of processed refunds against a note.
async fn refunded_total<C>(conn: &C, credit_note_id: Uuid) -> Result<Decimal, RepositoryError>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = refund_transactions::Entity::find()
        .select_only()
        .column_as(Expr::col(refund_transactions::Column::Amount).sum(), "total")
        .filter(refund_transactions::Column::CreditNoteId.eq(credit_note_id))
        .filter(refund_transactions::Column::Status.eq(RefundStatus::Processed))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(total.flatten().unwrap_or_default())
}

/// Loads a note with its items and splits, optionally locking the note row.
async fn load_note<C>(
    conn: &C,
    credit_note_id: Uuid,
    lock: bool,
) -> Result<CreditNote, RepositoryError>
where
    C: ConnectionTrait,
{
    let query = credit_notes::Entity::find_by_id(credit_note_id);
    let query = if lock { query.lock_exclusive() } else { query };
    let note = query
        .one(conn)
        .await?
        .ok_or(RepositoryError::CreditNoteNotFound(credit_note_id))?;
    let items = credit_note_items::Entity::find()
        .filter(credit_note_items::Column::CreditNoteId.eq(credit_note_id))
        .order_by_asc(credit_note_items::Column::Id)
        .all(conn)
        .await?;
    let splits = credit_note_splits::Entity::find()
        .filter(credit_note_splits::Column::CreditNoteId.eq(credit_note_id))
        .order_by_asc(credit_note_splits::Column::Id)
        .all(conn)
        .await?;
    Ok(to_core(note, items, splits))
}

/// Groups split rows by dimension, in the order the dimensions first appear.
fn group_splits(rows: Vec<credit_note_splits::Model>) -> Vec<DimensionSplit> {
    let mut splits: Vec<DimensionSplit> = Vec::new();
    for row in rows {
        let share = (row.dimension_value_id.into(), row.percentage);
        match splits
            .iter_mut()
            .find(|split| split.dimension_id.into_inner() == row.dimension_id)
        {
            Some(split) => split.shares.push(share),
            None => splits.push(DimensionSplit {
                dimension_id: row.dimension_id.into(),
                shares: vec![share],
            }),
        }
    }
    splits
}

/// Converts a note row with its items and split rows into the core credit note.
#[must_use]
pub fn to_core(
    note: credit_notes::Model,
    items: Vec<credit_note_items::Model>,
    splits: Vec<credit_note_splits::Model>,
) -> CreditNote {
    CreditNote {
        id: note.id.into(),
        branch_id: note.branch_id.into(),
        source_id: note.source_id.into(),
        source_kind: note.source_type.into(),
        number: note.number,
        reason: note.reason,
        refund_method: note.refund_method.into(),
        credit_date: note.credit_date,
        totals: CreditNoteTotals {
            subtotal: note.subtotal,
            discount: note.discount,
            vat: note.vat,
            total: note.total,
        },
        status: note.status.into(),
        approval_transaction_id: note.approval_transaction_id.map(Into::into),
        dimensions: DocumentDimensions {
            cost_center_id: note.cost_center_id.map(Into::into),
            project_id: note.project_id.map(Into::into),
            department_id: note.department_id.map(Into::into),
        },
        splits: group_splits(splits),
        items: items
            .into_iter()
            .map(|item| CreditNoteItem {
                id: item.id.into(),
                source_line_id: item.source_line_id.into(),
                product_id: item.product_id,
                description: item.description,
                quantity: item.quantity,
                condition: item.condition.into(),
                unit_price: item.unit_price,
                discount: item.discount,
                net: item.net,
                vat: item.vat,
                total: item.total,
            })
            .collect(),
    }
}
