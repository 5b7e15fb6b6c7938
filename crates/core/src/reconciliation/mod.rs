//! Subledger reconciliation and VAT settlement.

pub mod engine;
pub mod error;
pub mod types;
pub mod vat;

#[cfg(test)]
mod engine_props;

pub use engine::ReconciliationEngine;
pub use error::ReconciliationError;
pub use types::{
    DimensionVariance, GlLineRecord, Period, ReconciliationDomain, ReconciliationReport,
    SubledgerRecord, VatMovements, VatPaymentStatus, VatPosition,
};
pub use vat::VatService;
