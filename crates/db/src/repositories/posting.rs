//! Posting repository: writes source documents to the ledger.
//!
//! One database transaction per document. The document row is locked first,
//! then the party row for credit sales, so two concurrent posts of the same
//! document serialize and the second sees it already posted.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use tijara_core::posting::{BatchPostingReport, PostOutcome, PostingService};
use tijara_shared::LedgerSettings;
use tijara_shared::types::{BranchId, LedgerTransactionId, SourceDocumentId, UserId};
use tracing::{info, warn};
use uuid::Uuid;

use super::account::resolve_accounts;
use super::dimension::load_catalog;
use super::document::load_document;
use super::error::RepositoryError;
use super::ledger::write_transaction;
use super::party::{adjust_outstanding, lock_credit_position};
use crate::entities::sea_orm_active_enums::{DocumentStatus, PostingStatus};
use crate::entities::source_documents;

/// Posting repository.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Posts a draft document.
    ///
    /// Writes the balanced transaction with the header dimensions on every
    /// line, marks the document posted and, for credit sales, adds the total
    /// to the customer's outstanding balance. Nothing is written on failure.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, `ALREADY_POSTED`, `DOCUMENT_VOIDED`,
    /// `INSUFFICIENT_CREDIT_LIMIT`, `INVALID_DIMENSION`, account resolution
    /// errors, or a database error.
    pub async fn post(
        &self,
        document_id: SourceDocumentId,
        posted_by: UserId,
    ) -> Result<LedgerTransactionId, RepositoryError> {
        let txn = self.db.begin().await?;
        let document = load_document(&txn, document_id.into_inner(), true).await?;

        let credit = match document.party_id {
            Some(party_id) if document.kind.is_sales_side() => {
                Some(lock_credit_position(&txn, party_id.into_inner()).await?)
            }
            _ => None,
        };
        let accounts =
            resolve_accounts(&txn, &self.settings, document.branch_id, &document.gl_overrides)
                .await?;
        let dimensions = load_catalog(&txn, document.branch_id).await?;

        let prepared =
            PostingService::prepare(&document, &accounts, &dimensions, credit.as_ref(), posted_by)?;
        let header = write_transaction(&txn, &prepared.draft).await?;

        source_documents::Entity::update_many()
            .col_expr(
                source_documents::Column::PostingStatus,
                Expr::val(PostingStatus::from(prepared.status_change.to))
                    .as_enum(PostingStatus::name()),
            )
            .col_expr(
                source_documents::Column::LedgerTransactionId,
                Expr::value(Some(header.id)),
            )
            .col_expr(
                source_documents::Column::PostedBy,
                Expr::value(Some(posted_by.into_inner())),
            )
            .col_expr(
                source_documents::Column::PostedAt,
                Expr::value(Some(prepared.status_change.changed_at)),
            )
            .col_expr(
                source_documents::Column::UpdatedAt,
                Expr::value(prepared.status_change.changed_at),
            )
            .filter(source_documents::Column::Id.eq(document_id.into_inner()))
            .exec(&txn)
            .await?;

        if let (Some(increase), Some(party_id)) = (prepared.receivable_increase, document.party_id)
        {
            adjust_outstanding(&txn, party_id.into_inner(), increase).await?;
        }
        txn.commit().await?;

        info!(
            document_id = %document_id,
            transaction_id = %header.id,
            kind = document.kind.as_str(),
            total = %document.total_amount,
            "Source document posted"
        );
        Ok(header.id.into())
    }

    /// Posts a document right after the sale was recorded.
    ///
    /// Never fails: when posting is refused the document stays in draft and
    /// the reason is returned for the next batch run to retry.
    pub async fn post_after_sale(
        &self,
        document_id: SourceDocumentId,
        posted_by: UserId,
    ) -> PostOutcome {
        match self.post(document_id, posted_by).await {
            Ok(transaction_id) => PostOutcome::Posted(transaction_id),
            Err(e) => {
                warn!(
                    document_id = %document_id,
                    code = e.error_code(),
                    error = %e,
                    "Posting deferred"
                );
                PostOutcome::Deferred {
                    code: e.error_code().to_owned(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Posts every active draft document of a branch, oldest first.
    ///
    /// Each document is posted in its own transaction; a failure is recorded
    /// in the report and the run continues.
    ///
    /// # Errors
    ///
    /// Returns a database error if the drafts cannot be listed.
    pub async fn post_pending(
        &self,
        branch_id: BranchId,
        posted_by: UserId,
    ) -> Result<BatchPostingReport, RepositoryError> {
        let pending: Vec<Uuid> = source_documents::Entity::find()
            .select_only()
            .column(source_documents::Column::Id)
            .filter(source_documents::Column::BranchId.eq(branch_id.into_inner()))
            .filter(source_documents::Column::Status.eq(DocumentStatus::Active))
            .filter(source_documents::Column::PostingStatus.eq(PostingStatus::Draft))
            .order_by_asc(source_documents::Column::DocumentDate)
            .order_by_asc(source_documents::Column::CreatedAt)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut report = BatchPostingReport::default();
        for document_id in pending {
            let document_id = SourceDocumentId::from(document_id);
            let outcome = self.post_after_sale(document_id, posted_by).await;
            report.record(document_id, outcome);
        }

        info!(
            branch_id = %branch_id,
            posted = report.posted_count(),
            deferred = report.deferred_count(),
            "Pending documents processed"
        );
        Ok(report)
    }
}
