//! Account repository for the per-branch chart of accounts.
//!
//! Posting resolves accounts by role. Each role maps to a code (the
//! configured override or the role's default); an account missing for a
//! code is created on first use.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tijara_core::document::GlAccountOverrides;
use tijara_core::ledger::{
    AccountBalance, AccountRole, AccountType, ResolvedAccount, ResolvedAccounts, TrialBalance,
};
use tijara_shared::LedgerSettings;
use tijara_shared::types::{AccountId, BranchId};
use tracing::info;

use super::error::RepositoryError;
use crate::entities::ledger_accounts;

/// Input for creating an account outside the default chart.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning branch.
    pub branch_id: BranchId,
    /// Account code, unique within the branch.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Returns the account code bound to `role`.
    #[must_use]
    pub fn code_for(&self, role: AccountRole) -> &str {
        code_for(&self.settings, role)
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// `DuplicateCode` when the branch already has the code.
    pub async fn create(
        &self,
        input: CreateAccountInput,
    ) -> Result<ledger_accounts::Model, RepositoryError> {
        if self
            .find_by_code(input.branch_id, &input.code)
            .await?
            .is_some()
        {
            return Err(RepositoryError::DuplicateCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let account = ledger_accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            branch_id: Set(input.branch_id.into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            total_debits: Set(Decimal::ZERO),
            total_credits: Set(Decimal::ZERO),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(account.insert(&self.db).await?)
    }

    /// Finds an account by code within a branch.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn find_by_code(
        &self,
        branch_id: BranchId,
        code: &str,
    ) -> Result<Option<ledger_accounts::Model>, RepositoryError> {
        Ok(ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::BranchId.eq(branch_id.into_inner()))
            .filter(ledger_accounts::Column::Code.eq(code))
            .one(&self.db)
            .await?)
    }

    /// Returns the account for `role`, creating it if the branch has none.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn get_or_create(
        &self,
        branch_id: BranchId,
        role: AccountRole,
    ) -> Result<ledger_accounts::Model, RepositoryError> {
        get_or_create(&self.db, &self.settings, branch_id, role).await
    }

    /// Resolves every role for a branch, applying document-level overrides.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when an override names an account outside the
    /// branch, or a database error.
    pub async fn resolve(
        &self,
        branch_id: BranchId,
        overrides: &GlAccountOverrides,
    ) -> Result<ResolvedAccounts, RepositoryError> {
        resolve_accounts(&self.db, &self.settings, branch_id, overrides).await
    }

    /// Deactivates an account. Later postings needing it fail with
    /// `ACCOUNT_INACTIVE`.
    ///
    /// # Errors
    ///
    /// `AccountNotFound`, or a database error.
    pub async fn deactivate(
        &self,
        account_id: AccountId,
    ) -> Result<ledger_accounts::Model, RepositoryError> {
        let account = ledger_accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::AccountNotFound(account_id.into_inner()))?;

        let mut active: ledger_accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        let account = active.update(&self.db).await?;
        info!(account_id = %account.id, code = %account.code, "Account deactivated");
        Ok(account)
    }

    /// Builds the trial balance of a branch from the running account totals.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn trial_balance(
        &self,
        branch_id: BranchId,
    ) -> Result<TrialBalance, RepositoryError> {
        let rows = ledger_accounts::Entity::find()
            .filter(ledger_accounts::Column::BranchId.eq(branch_id.into_inner()))
            .order_by_asc(ledger_accounts::Column::Code)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|account| AccountBalance {
                account_id: account.id.into(),
                code: account.code,
                name: account.name,
                account_type: account.account_type.into(),
                total_debits: account.total_debits,
                total_credits: account.total_credits,
            })
            .collect();
        Ok(TrialBalance::new(rows))
    }
}

/// Converts a row into the resolver's view of an account.
#[must_use]
pub fn to_resolved(account: &ledger_accounts::Model) -> ResolvedAccount {
    ResolvedAccount {
        id: account.id.into(),
        code: account.code.clone(),
        name: account.name.clone(),
        account_type: account.account_type.into(),
        is_active: account.is_active,
    }
}

pub(crate) fn code_for(settings: &LedgerSettings, role: AccountRole) -> &str {
    settings
        .account_code_override(role.key())
        .unwrap_or(role.default_code())
}

pub(crate) async fn get_or_create<C>(
    conn: &C,
    settings: &LedgerSettings,
    branch_id: BranchId,
    role: AccountRole,
) -> Result<ledger_accounts::Model, RepositoryError>
where
    C: ConnectionTrait,
{
    let code = code_for(settings, role);
    if let Some(account) = ledger_accounts::Entity::find()
        .filter(ledger_accounts::Column::BranchId.eq(branch_id.into_inner()))
        .filter(ledger_accounts::Column::Code.eq(code))
        .one(conn)
        .await?
    {
        return Ok(account);
    }
    create_default(conn, branch_id, role, code).await
}

/// Inserts the default account for `role` under `code`, tolerating a
/// concurrent insert of the same code.
async fn create_default<C>(
    conn: &C,
    branch_id: BranchId,
    role: AccountRole,
    code: &str,
) -> Result<ledger_accounts::Model, RepositoryError>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().into();
    let account = ledger_accounts::ActiveModel {
        id: Set(AccountId::new().into_inner()),
        branch_id: Set(branch_id.into_inner()),
        code: Set(code.to_owned()),
        name: Set(role.default_name().to_owned()),
        account_type: Set(role.account_type().into()),
        total_debits: Set(Decimal::ZERO),
        total_credits: Set(Decimal::ZERO),
        balance: Set(Decimal::ZERO),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = ledger_accounts::Entity::insert(account)
        .on_conflict(
            OnConflict::columns([
                ledger_accounts::Column::BranchId,
                ledger_accounts::Column::Code,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(conn)
        .await;
    match inserted {
        Ok(_) => info!(branch_id = %branch_id, role = role.key(), code, "Default account created"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    ledger_accounts::Entity::find()
        .filter(ledger_accounts::Column::BranchId.eq(branch_id.into_inner()))
        .filter(ledger_accounts::Column::Code.eq(code))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("account {code}")).into())
}

pub(crate) async fn resolve_accounts<C>(
    conn: &C,
    settings: &LedgerSettings,
    branch_id: BranchId,
    overrides: &GlAccountOverrides,
) -> Result<ResolvedAccounts, RepositoryError>
where
    C: ConnectionTrait,
{
    let codes: Vec<&str> = AccountRole::ALL
        .iter()
        .map(|role| code_for(settings, *role))
        .collect();
    let mut by_code: HashMap<String, ledger_accounts::Model> = ledger_accounts::Entity::find()
        .filter(ledger_accounts::Column::BranchId.eq(branch_id.into_inner()))
        .filter(ledger_accounts::Column::Code.is_in(codes))
        .all(conn)
        .await?
        .into_iter()
        .map(|account| (account.code.clone(), account))
        .collect();

    let mut accounts = ResolvedAccounts::new();
    for role in AccountRole::ALL {
        let code = code_for(settings, role);
        let account = match by_code.get(code) {
            Some(account) => account.clone(),
            None => {
                let created = create_default(conn, branch_id, role, code).await?;
                by_code.insert(code.to_owned(), created.clone());
                created
            }
        };
        accounts.insert(role, to_resolved(&account));
    }

    for (role, account_id) in overrides.bindings() {
        let account = ledger_accounts::Entity::find_by_id(account_id.into_inner())
            .filter(ledger_accounts::Column::BranchId.eq(branch_id.into_inner()))
            .one(conn)
            .await?
            .ok_or(RepositoryError::AccountNotFound(account_id.into_inner()))?;
        accounts.insert(role, to_resolved(&account));
    }
    Ok(accounts)
}

/// Balance of the allowance for credit losses, positive when it carries its
/// usual credit balance. The account row stays locked until `conn` commits.
pub(crate) async fn lock_allowance_balance<C>(
    conn: &C,
    settings: &LedgerSettings,
    branch_id: BranchId,
) -> Result<Decimal, RepositoryError>
where
    C: ConnectionTrait,
{
    let account =
        get_or_create(conn, settings, branch_id, AccountRole::AllowanceForCreditLoss).await?;
    let account = ledger_accounts::Entity::find_by_id(account.id)
        .lock_exclusive()
        .one(conn)
        .await?
        .unwrap_or(account);
    Ok(account.total_credits - account.total_debits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_code_override_wins_over_default() {
        let mut settings = LedgerSettings::default();
        settings
            .account_codes
            .insert("sales_revenue".into(), "4010".into());
        assert_eq!(code_for(&settings, AccountRole::SalesRevenue), "4010");
        assert_eq!(code_for(&settings, AccountRole::Cash), "1000");
    }

    #[test]
    fn test_to_resolved_keeps_activity() {
        let now = chrono::Utc::now().into();
        let row = ledger_accounts::Model {
            id: Uuid::now_v7(),
            branch_id: Uuid::now_v7(),
            code: "1000".into(),
            name: "Cash".into(),
            account_type: crate::entities::sea_orm_active_enums::AccountType::Asset,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            balance: Decimal::ZERO,
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        let resolved = to_resolved(&row);
        assert_eq!(resolved.account_type, AccountType::Asset);
        assert!(!resolved.is_active);
    }
}
