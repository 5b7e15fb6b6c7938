//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger schema
//! - Repositories that run the core engines inside database transactions
//! - The schema migration

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, AgingRepository, BranchRepository, CreditNoteRepository,
    DimensionRepository, LedgerRepository, PartyRepository, PostingRepository,
    ReconciliationRepository, RepositoryError, SourceDocumentRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
