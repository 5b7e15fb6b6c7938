//! Aging repository and credit-loss provisioning.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tijara_core::aging::{AgingEngine, AgingEntity, AgingReport, OutstandingRecord, ProvisionPlan};
use tijara_core::document::GlAccountOverrides;
use tijara_shared::LedgerSettings;
use tijara_shared::types::{BranchId, UserId};
use tracing::info;

use super::account::{lock_allowance_balance, resolve_accounts};
use super::error::RepositoryError;
use super::ledger::write_transaction;
use crate::entities::sea_orm_active_enums::{
    DocumentStatus, PaymentMode, PostingStatus, SourceKind,
};
use crate::entities::source_documents;

/// Result of a provision run.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    /// Aging the provision was computed from.
    pub report: AgingReport,
    /// Adjustment applied.
    pub plan: ProvisionPlan,
    /// Adjustment transaction, absent when nothing changed.
    pub transaction_id: Option<uuid::Uuid>,
}

/// Aging repository.
#[derive(Debug, Clone)]
pub struct AgingRepository {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl AgingRepository {
    /// Creates a new aging repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Ages the open credit documents of a branch.
    ///
    /// Receivables are posted credit sales and invoices, payables posted
    /// credit purchases.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn age(
        &self,
        branch_id: BranchId,
        as_of: NaiveDate,
        entity: AgingEntity,
    ) -> Result<AgingReport, RepositoryError> {
        age_with(&self.db, &self.settings, branch_id, as_of, entity).await
    }

    /// Brings the allowance for credit losses in line with the receivables
    /// aging at `as_of`, posting the difference.
    ///
    /// # Errors
    ///
    /// Ledger errors from the adjustment, or a database error.
    pub async fn post_provision(
        &self,
        branch_id: BranchId,
        as_of: NaiveDate,
        created_by: UserId,
    ) -> Result<ProvisionOutcome, RepositoryError> {
        let txn = self.db.begin().await?;
        let report =
            age_with(&txn, &self.settings, branch_id, as_of, AgingEntity::Receivables).await?;
        let accounts =
            resolve_accounts(&txn, &self.settings, branch_id, &GlAccountOverrides::default())
                .await?;
        let current = lock_allowance_balance(&txn, &self.settings, branch_id).await?;

        let plan = AgingEngine::plan_provision(&report, current, &accounts, branch_id, created_by)?;
        let transaction_id = match &plan.draft {
            Some(draft) => Some(write_transaction(&txn, draft).await?.id),
            None => None,
        };
        txn.commit().await?;

        info!(
            branch_id = %branch_id,
            as_of = %as_of,
            required = %plan.required,
            current = %plan.current_allowance,
            delta = %plan.delta,
            "Credit-loss provision adjusted"
        );
        Ok(ProvisionOutcome {
            report,
            plan,
            transaction_id,
        })
    }
}

async fn age_with<C>(
    conn: &C,
    settings: &LedgerSettings,
    branch_id: BranchId,
    as_of: NaiveDate,
    entity: AgingEntity,
) -> Result<AgingReport, RepositoryError>
where
    C: ConnectionTrait,
{
    let kinds = match entity {
        AgingEntity::Receivables => vec![SourceKind::Sale, SourceKind::Invoice],
        AgingEntity::Payables => vec![SourceKind::Purchase],
    };
    let rows = source_documents::Entity::find()
        .filter(source_documents::Column::BranchId.eq(branch_id.into_inner()))
        .filter(source_documents::Column::Kind.is_in(kinds))
        .filter(source_documents::Column::PaymentMode.eq(PaymentMode::Credit))
        .filter(source_documents::Column::Status.eq(DocumentStatus::Active))
        .filter(source_documents::Column::PostingStatus.eq(PostingStatus::Posted))
        .filter(source_documents::Column::OutstandingAmount.ne(Decimal::ZERO))
        .order_by_asc(source_documents::Column::DocumentDate)
        .order_by_asc(source_documents::Column::Number)
        .all(conn)
        .await?;

    let records: Vec<OutstandingRecord> = rows
        .into_iter()
        .map(|doc| OutstandingRecord {
            document_id: doc.id.into(),
            party_id: doc.party_id.map(Into::into),
            number: doc.number,
            document_date: doc.document_date,
            outstanding_amount: doc.outstanding_amount,
        })
        .collect();
    Ok(AgingEngine::new(settings).age(as_of, entity, &records))
}
