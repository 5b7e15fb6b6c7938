//! Receivable and payable aging with expected-credit-loss provisioning.

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::AgingEngine;
pub use error::AgingError;
pub use types::{
    AgingBucket, AgingEntity, AgingOutcome, AgingReport, AgingRow, BucketSummary,
    OutstandingRecord, ProvisionPlan, SkipReason,
};
