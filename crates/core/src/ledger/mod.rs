//! Double-entry bookkeeping logic.
//!
//! - Domain types (directions, account roles, transaction kinds)
//! - The account resolution port
//! - The entry builder and its validation rules
//! - Running totals and trial balance
//! - Largest-remainder allocation
//! - Credit limit checks

pub mod accounts;
pub mod allocation;
pub mod balance;
pub mod builder;
pub mod credit_limit;
pub mod entry;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod builder_props;

pub use accounts::{AccountResolver, ResolvedAccount, ResolvedAccounts};
pub use allocation::AllocationUtil;
pub use balance::{AccountBalance, BalanceDelta, TrialBalance, aggregate_deltas};
pub use builder::LedgerEntryBuilder;
pub use credit_limit::CreditPosition;
pub use entry::{DraftLine, DraftTransaction, SourceRef};
pub use error::LedgerError;
pub use types::{AccountRole, AccountType, Direction, LineOrigin, PaymentMode, TransactionKind};
pub use validation::{absorb_rounding_remainder, validate_lines};
