//! Posting of sales, invoices and purchases.

pub mod error;
pub mod service;

pub use error::PostingError;
pub use service::{BatchPostingReport, PostOutcome, PostingService, PreparedPosting};
