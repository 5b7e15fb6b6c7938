//! Credit notes and refunds.
//!
//! A credit note reverses part or all of a posted sale or invoice. Approval
//! posts the reversal with the dimension values of the original sale and
//! emits stock movements; refunds then settle the liability it created.

pub mod calculation;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod calculation_props;

pub use calculation::CreditNoteCalculator;
pub use error::CreditNoteError;
pub use service::CreditNoteService;
pub use types::{
    CreateCreditNote, CreditNote, CreditNoteItem, CreditNoteTotals, ItemCondition,
    PreparedApproval, PriorCredits, RefundMethod, RefundPlan, RefundRequest, ReturnItem,
    StockMovement, StockMovementKind, settlement_role,
};
