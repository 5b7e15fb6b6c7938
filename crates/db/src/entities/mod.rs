//! `SeaORM` entity definitions.

#![allow(missing_docs)]

pub mod branches;
pub mod credit_note_items;
pub mod credit_note_splits;
pub mod credit_notes;
pub mod dimension_assignments;
pub mod dimension_values;
pub mod dimensions;
pub mod ledger_accounts;
pub mod ledger_lines;
pub mod ledger_transactions;
pub mod parties;
pub mod refund_transactions;
pub mod sea_orm_active_enums;
pub mod source_document_lines;
pub mod source_documents;
pub mod stock_movements;
pub mod vat_payments;
pub mod vat_reconciliations;
