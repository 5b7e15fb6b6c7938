//! Ledger persistence.
//!
//! Every posting path (documents, credit notes, refunds, provisions) hands a
//! balanced [`DraftTransaction`] to [`write_transaction`] inside the database
//! transaction that holds its locks. The header, lines and dimension
//! assignments are inserted and the running account totals are incremented
//! in SQL, so concurrent postings to the same account never lose an update.

use std::collections::{BTreeSet, HashMap};

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tijara_core::dimension::{DimensionAssignment, OriginLine};
use tijara_core::ledger::{AccountType, DraftTransaction, TransactionKind, aggregate_deltas};
use tracing::debug;
use uuid::Uuid;

use super::error::RepositoryError;
use crate::entities::sea_orm_active_enums::{PostingStatus, TransactionKind as DbTransactionKind};
use crate::entities::{dimension_assignments, ledger_accounts, ledger_lines, ledger_transactions};

/// A stored transaction with its lines in posting order.
#[derive(Debug, Clone)]
pub struct StoredTransaction {
    /// Header row.
    pub header: ledger_transactions::Model,
    /// Lines ordered by `line_no`.
    pub lines: Vec<StoredLine>,
}

/// A stored line with its dimension assignments.
#[derive(Debug, Clone)]
pub struct StoredLine {
    /// Line row.
    pub line: ledger_lines::Model,
    /// Assignments on the line.
    pub assignments: Vec<DimensionAssignment>,
}

/// Read access to posted transactions.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads a transaction with its lines and assignments.
    ///
    /// # Errors
    ///
    /// Returns a database error; `None` when the transaction does not exist.
    pub async fn find_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<StoredTransaction>, RepositoryError> {
        let Some(header) = ledger_transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let lines = ledger_lines::Entity::find()
            .filter(ledger_lines::Column::TransactionId.eq(transaction_id))
            .order_by_asc(ledger_lines::Column::LineNo)
            .all(&self.db)
            .await?;
        let ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();
        let mut assignments = load_assignments(&self.db, &ids).await?;
        let lines = lines
            .into_iter()
            .map(|line| StoredLine {
                assignments: assignments.remove(&line.id).unwrap_or_default(),
                line,
            })
            .collect();
        Ok(Some(StoredTransaction { header, lines }))
    }

    /// Finds the transactions recorded for a source (document, credit note,
    /// refund), oldest first.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn find_by_source(
        &self,
        kind: TransactionKind,
        source_id: Uuid,
    ) -> Result<Vec<ledger_transactions::Model>, RepositoryError> {
        let rows = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::SourceType.eq(DbTransactionKind::from(kind)))
            .filter(ledger_transactions::Column::SourceId.eq(source_id))
            .order_by_asc(ledger_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

/// Writes a balanced draft as a posted transaction and updates the account
/// totals it touches.
///
/// Every account must belong to the draft's branch. Account rows are updated
/// in id order.
///
/// # Errors
///
/// `AccountNotFound` when a line references an account outside the branch,
/// or a database error (including the deferred balance check at commit).
pub(crate) async fn write_transaction<C>(
    conn: &C,
    draft: &DraftTransaction,
) -> Result<ledger_transactions::Model, RepositoryError>
where
    C: ConnectionTrait,
{
    let account_ids: BTreeSet<Uuid> = draft
        .lines
        .iter()
        .map(|line| line.account_id.into_inner())
        .collect();
    let account_types: HashMap<Uuid, AccountType> = ledger_accounts::Entity::find()
        .filter(ledger_accounts::Column::Id.is_in(account_ids.iter().copied()))
        .filter(ledger_accounts::Column::BranchId.eq(draft.branch_id.into_inner()))
        .all(conn)
        .await?
        .into_iter()
        .map(|account| (account.id, account.account_type.into()))
        .collect();
    if let Some(missing) = account_ids.iter().find(|id| !account_types.contains_key(id)) {
        return Err(RepositoryError::AccountNotFound(*missing));
    }

    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    let header = ledger_transactions::ActiveModel {
        id: Set(draft.id.into_inner()),
        branch_id: Set(draft.branch_id.into_inner()),
        kind: Set(draft.kind.into()),
        transaction_date: Set(draft.transaction_date),
        particulars: Set(draft.particulars.clone()),
        journal: Set(draft.journal.clone()),
        status: Set(PostingStatus::Posted),
        source_type: Set(draft.source.map(|source| source.kind.into())),
        source_id: Set(draft.source.map(|source| source.id)),
        reverses_transaction_id: Set(draft.reverses.map(Into::into)),
        total_debits: Set(draft.total_debits()),
        total_credits: Set(draft.total_credits()),
        created_by: Set(draft.created_by.into_inner()),
        posted_at: Set(Some(now)),
        created_at: Set(now),
    };
    let header = header.insert(conn).await?;

    let lines: Vec<ledger_lines::ActiveModel> = (1_i32..)
        .zip(&draft.lines)
        .map(|(line_no, line)| ledger_lines::ActiveModel {
            id: Set(line.id.into_inner()),
            transaction_id: Set(header.id),
            line_no: Set(line_no),
            account_id: Set(line.account_id.into_inner()),
            direction: Set(line.direction.into()),
            amount: Set(line.amount),
            description: Set(line.description.clone()),
            origin: Set(line.origin.into()),
            created_by: Set(draft.created_by.into_inner()),
            created_at: Set(now),
        })
        .collect();
    ledger_lines::Entity::insert_many(lines).exec(conn).await?;

    let assignments: Vec<dimension_assignments::ActiveModel> = draft
        .lines
        .iter()
        .flat_map(|line| {
            line.assignments
                .iter()
                .map(move |a| dimension_assignments::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    line_id: Set(line.id.into_inner()),
                    dimension_id: Set(a.dimension_id.into_inner()),
                    dimension_value_id: Set(a.value_id.into_inner()),
                    percentage: Set(a.percentage),
                    created_at: Set(now),
                })
        })
        .collect();
    let assignment_count = assignments.len();
    if !assignments.is_empty() {
        dimension_assignments::Entity::insert_many(assignments)
            .exec(conn)
            .await?;
    }

    for delta in aggregate_deltas(&draft.lines) {
        let account_id = delta.account_id.into_inner();
        let Some(account_type) = account_types.get(&account_id) else {
            return Err(RepositoryError::AccountNotFound(account_id));
        };
        let change = delta.balance_change(*account_type);
        ledger_accounts::Entity::update_many()
            .col_expr(
                ledger_accounts::Column::TotalDebits,
                Expr::col(ledger_accounts::Column::TotalDebits).add(delta.debit),
            )
            .col_expr(
                ledger_accounts::Column::TotalCredits,
                Expr::col(ledger_accounts::Column::TotalCredits).add(delta.credit),
            )
            .col_expr(
                ledger_accounts::Column::Balance,
                Expr::col(ledger_accounts::Column::Balance).add(change),
            )
            .col_expr(ledger_accounts::Column::UpdatedAt, Expr::value(now))
            .filter(ledger_accounts::Column::Id.eq(account_id))
            .exec(conn)
            .await?;
    }

    debug!(
        transaction_id = %header.id,
        kind = draft.kind.as_str(),
        lines = draft.lines.len(),
        assignments = assignment_count,
        "Ledger transaction written"
    );
    Ok(header)
}

/// Loads the assignments of `line_ids`, keyed by line.
///
/// # Errors
///
/// Returns a database error.
pub(crate) async fn load_assignments<C>(
    conn: &C,
    line_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<DimensionAssignment>>, RepositoryError>
where
    C: ConnectionTrait,
{
    if line_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = dimension_assignments::Entity::find()
        .filter(dimension_assignments::Column::LineId.is_in(line_ids.iter().copied()))
        .order_by_asc(dimension_assignments::Column::CreatedAt)
        .all(conn)
        .await?;

    let mut by_line: HashMap<Uuid, Vec<DimensionAssignment>> = HashMap::new();
    for row in rows {
        by_line.entry(row.line_id).or_default().push(DimensionAssignment {
            dimension_id: row.dimension_id.into(),
            value_id: row.dimension_value_id.into(),
            percentage: row.percentage,
        });
    }
    Ok(by_line)
}

/// Loads the lines of `transaction_id` in posting order, as propagation
/// input for a derived transaction.
///
/// # Errors
///
/// Returns a database error.
pub(crate) async fn origin_lines<C>(
    conn: &C,
    transaction_id: Uuid,
) -> Result<Vec<OriginLine>, RepositoryError>
where
    C: ConnectionTrait,
{
    let rows = ledger_lines::Entity::find()
        .filter(ledger_lines::Column::TransactionId.eq(transaction_id))
        .order_by_asc(ledger_lines::Column::LineNo)
        .find_also_related(ledger_accounts::Entity)
        .all(conn)
        .await?;
    let ids: Vec<Uuid> = rows.iter().map(|(line, _)| line.id).collect();
    let mut assignments = load_assignments(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|(line, account)| OriginLine {
            account_name: account.map(|a| a.name).unwrap_or_default(),
            direction: line.direction.into(),
            assignments: assignments.remove(&line.id).unwrap_or_default(),
        })
        .collect())
}
