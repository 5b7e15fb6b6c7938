//! Account resolution port.
//!
//! The builder never looks accounts up itself. Callers resolve the roles a
//! posting needs (from the chart of accounts, applying per-document
//! overrides) and hand over an [`AccountResolver`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tijara_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{AccountRole, AccountType};

/// A concrete ledger account bound to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAccount {
    /// The account ID.
    pub id: AccountId,
    /// Account code, unique per branch.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

/// Resolves logical roles to concrete accounts.
pub trait AccountResolver {
    /// Returns the account bound to `role`, if any.
    fn account_for(&self, role: AccountRole) -> Option<&ResolvedAccount>;

    /// Returns the active account bound to `role`.
    ///
    /// # Errors
    ///
    /// `MissingAccount` when nothing is bound, `AccountInactive` when the
    /// bound account has been deactivated.
    fn require(&self, role: AccountRole) -> Result<&ResolvedAccount, LedgerError> {
        let account = self
            .account_for(role)
            .ok_or(LedgerError::MissingAccount(role))?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(account.id));
        }
        Ok(account)
    }
}

/// In-memory role map, the usual resolver handed to the builder.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAccounts {
    accounts: HashMap<AccountRole, ResolvedAccount>,
}

impl ResolvedAccounts {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `role` to `account`, replacing any previous binding.
    pub fn insert(&mut self, role: AccountRole, account: ResolvedAccount) {
        self.accounts.insert(role, account);
    }

    /// Builder-style variant of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, role: AccountRole, account: ResolvedAccount) -> Self {
        self.insert(role, account);
        self
    }

    /// Number of bound roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true when no role is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountResolver for ResolvedAccounts {
    fn account_for(&self, role: AccountRole) -> Option<&ResolvedAccount> {
        self.accounts.get(&role)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_require_missing_role() {
        let accounts = ResolvedAccounts::new();
        assert!(matches!(
            accounts.require(AccountRole::Cash),
            Err(LedgerError::MissingAccount(AccountRole::Cash))
        ));
    }

    #[test]
    fn test_require_inactive_account() {
        let mut inactive = account(AccountRole::Bank);
        inactive.is_active = false;
        let id = inactive.id;
        let accounts = ResolvedAccounts::new().with(AccountRole::Bank, inactive);
        assert!(matches!(
            accounts.require(AccountRole::Bank),
            Err(LedgerError::AccountInactive(found)) if found == id
        ));
    }

    #[test]
    fn test_full_chart_resolves_every_role() {
        let chart = full_chart();
        assert_eq!(chart.len(), AccountRole::ALL.len());
        for role in AccountRole::ALL {
            assert!(chart.require(role).is_ok());
        }
    }
}
