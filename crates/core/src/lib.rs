//! Core business logic for Tijara.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Engines take their inputs as plain values, resolve accounts and dimensions
//! through the [`ledger::AccountResolver`] and [`dimension::DimensionResolver`]
//! ports, and return balanced drafts for persistence to write.
//!
//! # Modules
//!
//! - `ledger` - Double-entry entry building, validation and balances
//! - `dimension` - Dimension catalog and assignment propagation
//! - `document` - Sales, invoices and purchases
//! - `workflow` - Posting, credit note and refund state machines
//! - `posting` - Posting of source documents
//! - `credit_note` - Credit notes, reversals and refunds
//! - `reconciliation` - Subledger vs GL reconciliation and VAT settlement
//! - `aging` - Aging buckets and expected-credit-loss provisions

pub mod aging;
pub mod credit_note;
pub mod dimension;
pub mod document;
pub mod ledger;
pub mod posting;
pub mod reconciliation;
pub mod workflow;
