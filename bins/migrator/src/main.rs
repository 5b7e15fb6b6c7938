//! Database migration runner for the Tijara ledger schema.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop the schema and re-run migrations
//!
//! The connection comes from `DATABASE_URL` (a `.env` file is honoured).

use sea_orm_migration::prelude::*;
use tijara_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own tracing subscriber
    cli::run_cli(Migrator).await;
}
