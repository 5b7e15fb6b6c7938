//! Reconciliation and VAT repository.
//!
//! Loads subledger documents and posted ledger lines for a branch and period
//! and runs the pure reconciliation engine over them. VAT positions are
//! computed from the movement on the VAT accounts and persisted per period
//! together with the payments made against them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tijara_core::dimension::DocumentDimensions;
use tijara_core::ledger::{AccountRole, Direction};
use tijara_core::reconciliation::{
    GlLineRecord, Period, ReconciliationDomain, ReconciliationEngine, ReconciliationReport,
    SubledgerRecord, VatMovements, VatPosition, VatService,
};
use tijara_shared::LedgerSettings;
use tijara_shared::types::{BranchId, UserId};
use tracing::{info, warn};
use uuid::Uuid;

use super::account::get_or_create;
use super::error::RepositoryError;
use super::ledger::load_assignments;
use crate::entities::sea_orm_active_enums::{
    DocumentStatus, LineOrigin, PostingStatus, SourceKind, VatPaymentStatus,
};
use crate::entities::{
    ledger_lines, ledger_transactions, source_documents, vat_payments, vat_reconciliations,
};

/// Input for recording a VAT payment.
#[derive(Debug, Clone)]
pub struct VatPaymentInput {
    /// Reconciliation the payment settles.
    pub reconciliation_id: Uuid,
    /// Amount paid to the tax authority.
    pub amount: Decimal,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Bank or authority reference.
    pub reference: Option<String>,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Reconciles one subledger of a branch against the ledger.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn reconcile(
        &self,
        branch_id: BranchId,
        period: Period,
        domain: ReconciliationDomain,
    ) -> Result<ReconciliationReport, RepositoryError> {
        let documents = self.subledger(branch_id, period, domain).await?;
        let lines = self.gl_lines(branch_id, period, domain).await?;

        let report =
            ReconciliationEngine::new(&self.settings).reconcile(period, domain, &documents, &lines);
        if report.is_reconciled {
            info!(
                branch_id = %branch_id,
                domain = domain.as_str(),
                total = %report.gl_total,
                "Subledger reconciled"
            );
        } else {
            warn!(
                branch_id = %branch_id,
                domain = domain.as_str(),
                subledger_total = %report.subledger_total,
                gl_total = %report.gl_total,
                variance = %report.variance,
                "Subledger does not reconcile"
            );
        }
        Ok(report)
    }

    async fn subledger(
        &self,
        branch_id: BranchId,
        period: Period,
        domain: ReconciliationDomain,
    ) -> Result<Vec<SubledgerRecord>, RepositoryError> {
        let rows = source_documents::Entity::find()
            .filter(source_documents::Column::BranchId.eq(branch_id.into_inner()))
            .filter(source_documents::Column::Kind.eq(SourceKind::from(domain.source_kind())))
            .filter(source_documents::Column::Status.eq(DocumentStatus::Active))
            .filter(source_documents::Column::DocumentDate.between(period.start, period.end))
            .order_by_asc(source_documents::Column::DocumentDate)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|doc| SubledgerRecord {
                document_id: doc.id.into(),
                kind: doc.kind.into(),
                document_date: doc.document_date,
                total_amount: doc.total_amount,
                status: doc.status.into(),
                dimensions: DocumentDimensions {
                    cost_center_id: doc.cost_center_id.map(Into::into),
                    project_id: doc.project_id.map(Into::into),
                    department_id: doc.department_id.map(Into::into),
                },
            })
            .collect())
    }

    async fn gl_lines(
        &self,
        branch_id: BranchId,
        period: Period,
        domain: ReconciliationDomain,
    ) -> Result<Vec<GlLineRecord>, RepositoryError> {
        let rows = ledger_lines::Entity::find()
            .filter(ledger_lines::Column::Origin.eq(LineOrigin::from(domain.origin())))
            .find_also_related(ledger_transactions::Entity)
            .filter(ledger_transactions::Column::BranchId.eq(branch_id.into_inner()))
            .filter(ledger_transactions::Column::Status.eq(PostingStatus::Posted))
            .filter(
                ledger_transactions::Column::TransactionDate.between(period.start, period.end),
            )
            .order_by_asc(ledger_lines::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|(line, _)| line.id).collect();
        let mut assignments = load_assignments(&self.db, &ids).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(line, header)| {
                let header = header?;
                Some(GlLineRecord {
                    line_id: line.id.into(),
                    transaction_date: header.transaction_date,
                    origin: line.origin.into(),
                    direction: line.direction.into(),
                    amount: line.amount,
                    assignments: assignments.remove(&line.id).unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Computes the VAT position of a period without persisting it.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn vat_position(
        &self,
        branch_id: BranchId,
        period: Period,
    ) -> Result<VatPosition, RepositoryError> {
        let movements = vat_movements(&self.db, &self.settings, branch_id, period).await?;
        let settled = find_reconciliation(&self.db, branch_id, period, false)
            .await?
            .map_or(Decimal::ZERO, |row| row.amount_settled);
        Ok(VatService::position(period, movements, settled))
    }

    /// Recomputes and stores the VAT reconciliation of a period. Payments
    /// already recorded against the period are kept.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn reconcile_vat(
        &self,
        branch_id: BranchId,
        period: Period,
        created_by: UserId,
    ) -> Result<vat_reconciliations::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let existing = find_reconciliation(&txn, branch_id, period, true).await?;
        let movements = vat_movements(&txn, &self.settings, branch_id, period).await?;
        let settled = existing.as_ref().map_or(Decimal::ZERO, |row| row.amount_settled);
        let position = VatService::position(period, movements, settled);
        let now = chrono::Utc::now().into();

        let stored = match existing {
            Some(row) => {
                let mut active: vat_reconciliations::ActiveModel = row.into();
                active.vat_collected = Set(position.vat_collected);
                active.vat_paid = Set(position.vat_paid);
                active.net_liability = Set(position.net_liability);
                active.payment_status = Set(VatPaymentStatus::from(position.payment_status));
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                vat_reconciliations::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    branch_id: Set(branch_id.into_inner()),
                    period_start: Set(period.start),
                    period_end: Set(period.end),
                    vat_collected: Set(position.vat_collected),
                    vat_paid: Set(position.vat_paid),
                    net_liability: Set(position.net_liability),
                    amount_settled: Set(Decimal::ZERO),
                    payment_status: Set(VatPaymentStatus::from(position.payment_status)),
                    created_by: Set(created_by.into_inner()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };
        txn.commit().await?;

        info!(
            branch_id = %branch_id,
            period_start = %period.start,
            period_end = %period.end,
            net_liability = %stored.net_liability,
            status = position.payment_status.as_str(),
            "VAT reconciliation stored"
        );
        Ok(stored)
    }

    /// Records a payment to the tax authority against a stored period.
    ///
    /// # Errors
    ///
    /// `VatReconciliationNotFound`, `INVALID_PAYMENT_AMOUNT`, `NOTHING_DUE`,
    /// `OVERPAYMENT`, or a database error.
    pub async fn record_vat_payment(
        &self,
        input: VatPaymentInput,
        paid_by: UserId,
    ) -> Result<vat_reconciliations::Model, RepositoryError> {
        let txn = self.db.begin().await?;
        let row = vat_reconciliations::Entity::find_by_id(input.reconciliation_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::VatReconciliationNotFound(input.reconciliation_id))?;

        let position = VatPosition {
            period: Period::new(row.period_start, row.period_end)?,
            vat_collected: row.vat_collected,
            vat_paid: row.vat_paid,
            net_liability: row.net_liability,
            amount_settled: row.amount_settled,
            payment_status: row.payment_status.into(),
        };
        let updated = VatService::record_payment(&position, input.amount)?;
        let now = chrono::Utc::now().into();

        vat_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            vat_reconciliation_id: Set(row.id),
            amount: Set(input.amount),
            payment_date: Set(input.payment_date),
            reference: Set(input.reference),
            paid_by: Set(paid_by.into_inner()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: vat_reconciliations::ActiveModel = row.into();
        active.amount_settled = Set(updated.amount_settled);
        active.payment_status = Set(VatPaymentStatus::from(updated.payment_status));
        active.updated_at = Set(now);
        let stored = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            reconciliation_id = %stored.id,
            amount = %input.amount,
            settled = %stored.amount_settled,
            status = updated.payment_status.as_str(),
            "VAT payment recorded"
        );
        Ok(stored)
    }

    /// Lists the payments recorded against a stored period.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn vat_payments(
        &self,
        reconciliation_id: Uuid,
    ) -> Result<Vec<vat_payments::Model>, RepositoryError> {
        Ok(vat_payments::Entity::find()
            .filter(vat_payments::Column::VatReconciliationId.eq(reconciliation_id))
            .order_by_asc(vat_payments::Column::PaymentDate)
            .all(&self.db)
            .await?)
    }
}

async fn find_reconciliation<C>(
    conn: &C,
    branch_id: BranchId,
    period: Period,
    lock: bool,
) -> Result<Option<vat_reconciliations::Model>, RepositoryError>
where
    C: ConnectionTrait,
{
    let query = vat_reconciliations::Entity::find()
        .filter(vat_reconciliations::Column::BranchId.eq(branch_id.into_inner()))
        .filter(vat_reconciliations::Column::PeriodStart.eq(period.start))
        .filter(vat_reconciliations::Column::PeriodEnd.eq(period.end));
    let query = if lock { query.lock_exclusive() } else { query };
    Ok(query.one(conn).await?)
}

/// Sums the posted movement on VAT Payable and VAT Receivable in a period.
async fn vat_movements<C>(
    conn: &C,
    settings: &LedgerSettings,
    branch_id: BranchId,
    period: Period,
) -> Result<VatMovements, RepositoryError>
where
    C: ConnectionTrait,
{
    let payable = get_or_create(conn, settings, branch_id, AccountRole::VatPayable).await?;
    let receivable = get_or_create(conn, settings, branch_id, AccountRole::VatReceivable).await?;

    let lines = ledger_lines::Entity::find()
        .join(JoinType::InnerJoin, ledger_lines::Relation::LedgerTransactions.def())
        .filter(ledger_lines::Column::AccountId.is_in([payable.id, receivable.id]))
        .filter(ledger_transactions::Column::BranchId.eq(branch_id.into_inner()))
        .filter(ledger_transactions::Column::Status.eq(PostingStatus::Posted))
        .filter(ledger_transactions::Column::TransactionDate.between(period.start, period.end))
        .all(conn)
        .await?;

    let mut movements = VatMovements::default();
    for line in lines {
        let direction = Direction::from(line.direction);
        let slot = match (line.account_id == payable.id, direction) {
            (true, Direction::Credit) => &mut movements.payable_credits,
            (true, Direction::Debit) => &mut movements.payable_debits,
            (false, Direction::Debit) => &mut movements.receivable_debits,
            (false, Direction::Credit) => &mut movements.receivable_credits,
        };
        *slot += line.amount;
    }
    Ok(movements)
}
