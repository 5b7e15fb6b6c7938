//! Aging and expected-credit-loss provisioning.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tijara_shared::types::{BranchId, UserId, round_money};
use tijara_shared::{EclRates, LedgerSettings};
use tracing::debug;

use super::error::AgingError;
use super::types::{
    AgingBucket, AgingEntity, AgingOutcome, AgingReport, AgingRow, BucketSummary,
    OutstandingRecord, ProvisionPlan, SkipReason,
};
use crate::ledger::{AccountResolver, AccountRole, LedgerEntryBuilder, TransactionKind};

/// Scale of the reported provision rate.
const RATE_SCALE: u32 = 4;

/// Buckets open balances by age and prices the expected loss.
#[derive(Debug, Clone, Copy)]
pub struct AgingEngine {
    rates: EclRates,
}

impl AgingEngine {
    /// Creates an engine using the configured loss rates.
    #[must_use]
    pub const fn new(settings: &LedgerSettings) -> Self {
        Self {
            rates: settings.ecl_rates,
        }
    }

    /// Creates an engine with explicit rates.
    #[must_use]
    pub const fn with_rates(rates: EclRates) -> Self {
        Self { rates }
    }

    /// Classifies one record.
    #[must_use]
    pub fn classify(as_of: NaiveDate, record: &OutstandingRecord) -> AgingOutcome {
        if record.document_date > as_of {
            return AgingOutcome::Skipped(SkipReason::FutureDated);
        }
        if record.outstanding_amount <= Decimal::ZERO {
            return AgingOutcome::Skipped(SkipReason::NonPositiveOutstanding);
        }
        let age_days = (as_of - record.document_date).num_days();
        AgingOutcome::Included {
            bucket: AgingBucket::for_age(age_days),
            age_days,
        }
    }

    /// Ages `records` at `as_of`.
    ///
    /// Every record yields a row; skipped rows are reported but not
    /// bucketed.
    #[must_use]
    pub fn age(
        &self,
        as_of: NaiveDate,
        entity: AgingEntity,
        records: &[OutstandingRecord],
    ) -> AgingReport {
        let mut buckets: Vec<BucketSummary> = AgingBucket::ALL
            .into_iter()
            .map(|bucket| BucketSummary {
                bucket,
                count: 0,
                outstanding: Decimal::ZERO,
                loss_rate: bucket.loss_rate(&self.rates),
                provision: Decimal::ZERO,
            })
            .collect();

        let rows: Vec<AgingRow> = records
            .iter()
            .map(|record| {
                let outcome = Self::classify(as_of, record);
                match outcome {
                    AgingOutcome::Included { bucket, .. } => {
                        if let Some(summary) = buckets.iter_mut().find(|b| b.bucket == bucket) {
                            summary.count += 1;
                            summary.outstanding += record.outstanding_amount;
                        }
                    }
                    AgingOutcome::Skipped(reason) => {
                        debug!(
                            document_id = %record.document_id,
                            reason = reason.as_str(),
                            "Aging record skipped"
                        );
                    }
                }
                AgingRow {
                    document_id: record.document_id,
                    number: record.number.clone(),
                    outstanding_amount: record.outstanding_amount,
                    outcome,
                }
            })
            .collect();

        for summary in &mut buckets {
            summary.provision = round_money(summary.outstanding * summary.loss_rate);
        }
        let total_outstanding: Decimal = buckets.iter().map(|b| b.outstanding).sum();
        let total_provision: Decimal = buckets.iter().map(|b| b.provision).sum();
        let provision_rate = if total_outstanding.is_zero() {
            Decimal::ZERO
        } else {
            (total_provision / total_outstanding).round_dp(RATE_SCALE)
        };

        AgingReport {
            as_of,
            entity,
            buckets,
            rows,
            total_outstanding,
            total_provision,
            provision_rate,
        }
    }

    /// Plans the entry bringing the allowance for credit losses to the
    /// provision the report requires.
    ///
    /// A shortfall debits Bad Debt Expense and credits the allowance; an
    /// excess reverses the two. No entry is built when they already agree.
    ///
    /// # Errors
    ///
    /// `ProvisionNotApplicable` for payables, or any ledger error.
    pub fn plan_provision(
        report: &AgingReport,
        current_allowance: Decimal,
        accounts: &impl AccountResolver,
        branch_id: BranchId,
        created_by: UserId,
    ) -> Result<ProvisionPlan, AgingError> {
        if report.entity != AgingEntity::Receivables {
            return Err(AgingError::ProvisionNotApplicable(report.entity));
        }

        let required = report.total_provision;
        let delta = required - current_allowance;
        if delta.is_zero() {
            return Ok(ProvisionPlan {
                required,
                current_allowance,
                delta,
                draft: None,
            });
        }

        let expense = accounts.require(AccountRole::BadDebtExpense)?;
        let allowance = accounts.require(AccountRole::AllowanceForCreditLoss)?;
        let builder = LedgerEntryBuilder::new(
            TransactionKind::EclProvision,
            branch_id,
            report.as_of,
            created_by,
        )
        .particulars(format!("Expected credit loss provision as of {}", report.as_of));

        let amount = delta.abs();
        let draft = if delta > Decimal::ZERO {
            builder
                .debit(expense, amount, "Increase credit-loss provision")
                .credit(allowance, amount, "Allowance for credit losses")
        } else {
            builder
                .debit(allowance, amount, "Release credit-loss provision")
                .credit(expense, amount, "Bad debt expense reversal")
        }
        .build()?;

        Ok(ProvisionPlan {
            required,
            current_allowance,
            delta,
            draft: Some(draft),
        })
    }
}
