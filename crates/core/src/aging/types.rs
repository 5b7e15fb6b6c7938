//! Aging domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tijara_shared::EclRates;
use tijara_shared::types::{PartyId, SourceDocumentId};

use crate::ledger::DraftTransaction;

/// Age bucket with inclusive upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// 0 to 30 days.
    Current,
    /// 31 to 60 days.
    Days31To60,
    /// 61 to 90 days.
    Days61To90,
    /// 91 to 120 days.
    Days91To120,
    /// More than 120 days.
    Over120,
}

impl AgingBucket {
    /// All buckets, youngest first.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Days31To60,
        Self::Days61To90,
        Self::Days91To120,
        Self::Over120,
    ];

    /// Bucket for a non-negative age in days.
    #[must_use]
    pub const fn for_age(age_days: i64) -> Self {
        match age_days {
            i64::MIN..=30 => Self::Current,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            91..=120 => Self::Days91To120,
            _ => Self::Over120,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Days31To60 => "31-60",
            Self::Days61To90 => "61-90",
            Self::Days91To120 => "91-120",
            Self::Over120 => "120+",
        }
    }

    /// Expected loss rate for the bucket.
    #[must_use]
    pub const fn loss_rate(self, rates: &EclRates) -> Decimal {
        match self {
            Self::Current => rates.current,
            Self::Days31To60 => rates.days_31_60,
            Self::Days61To90 => rates.days_61_90,
            Self::Days91To120 => rates.days_91_120,
            Self::Over120 => rates.over_120,
        }
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which balances are aged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgingEntity {
    /// Customer invoices on account.
    Receivables,
    /// Supplier purchases on account.
    Payables,
}

impl AgingEntity {
    /// Returns the string representation of the entity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receivables => "receivables",
            Self::Payables => "payables",
        }
    }

    /// Parses an entity from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "receivables" => Some(Self::Receivables),
            "payables" => Some(Self::Payables),
            _ => None,
        }
    }
}

/// An open document to age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingRecord {
    /// Document ID.
    pub document_id: SourceDocumentId,
    /// Customer or supplier.
    pub party_id: Option<PartyId>,
    /// Document number.
    pub number: String,
    /// Document date.
    pub document_date: NaiveDate,
    /// Amount still open.
    pub outstanding_amount: Decimal,
}

/// Why a record was left out of the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Dated after the as-of date.
    FutureDated,
    /// Nothing outstanding.
    NonPositiveOutstanding,
}

impl SkipReason {
    /// Returns the string representation of the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FutureDated => "future_dated",
            Self::NonPositiveOutstanding => "non_positive_outstanding",
        }
    }
}

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgingOutcome {
    /// Counted in `bucket`.
    Included {
        /// Bucket.
        bucket: AgingBucket,
        /// Age at the as-of date.
        age_days: i64,
    },
    /// Left out.
    Skipped(SkipReason),
}

/// Outcome for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingRow {
    /// Document ID.
    pub document_id: SourceDocumentId,
    /// Document number.
    pub number: String,
    /// Amount open.
    pub outstanding_amount: Decimal,
    /// Included or skipped.
    pub outcome: AgingOutcome,
}

/// Totals for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    /// Bucket.
    pub bucket: AgingBucket,
    /// Number of documents.
    pub count: usize,
    /// Sum outstanding.
    pub outstanding: Decimal,
    /// Loss rate applied.
    pub loss_rate: Decimal,
    /// `outstanding × loss_rate`, rounded to ledger precision.
    pub provision: Decimal,
}

/// Aging of one entity at a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// As-of date.
    pub as_of: NaiveDate,
    /// Receivables or payables.
    pub entity: AgingEntity,
    /// One summary per bucket, youngest first.
    pub buckets: Vec<BucketSummary>,
    /// One row per input record.
    pub rows: Vec<AgingRow>,
    /// Sum outstanding across buckets.
    pub total_outstanding: Decimal,
    /// Sum of bucket provisions.
    pub total_provision: Decimal,
    /// `total_provision / total_outstanding`, zero when nothing is open.
    pub provision_rate: Decimal,
}

impl AgingReport {
    /// Summary for `bucket`.
    #[must_use]
    pub fn bucket(&self, bucket: AgingBucket) -> Option<&BucketSummary> {
        self.buckets.iter().find(|b| b.bucket == bucket)
    }

    /// Rows left out of the buckets.
    pub fn skipped(&self) -> impl Iterator<Item = &AgingRow> {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, AgingOutcome::Skipped(_)))
    }
}

/// Adjustment bringing the allowance to the required provision.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    /// Provision required by the aging.
    pub required: Decimal,
    /// Current allowance balance.
    pub current_allowance: Decimal,
    /// `required − current_allowance`.
    pub delta: Decimal,
    /// Adjustment transaction, absent when the delta is zero.
    pub draft: Option<DraftTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, AgingBucket::Current)]
    #[case(30, AgingBucket::Current)]
    #[case(31, AgingBucket::Days31To60)]
    #[case(60, AgingBucket::Days31To60)]
    #[case(61, AgingBucket::Days61To90)]
    #[case(90, AgingBucket::Days61To90)]
    #[case(91, AgingBucket::Days91To120)]
    #[case(120, AgingBucket::Days91To120)]
    #[case(121, AgingBucket::Over120)]
    #[case(5000, AgingBucket::Over120)]
    fn test_bucket_boundaries(#[case] age: i64, #[case] expected: AgingBucket) {
        assert_eq!(AgingBucket::for_age(age), expected);
    }

    #[test]
    fn test_default_loss_rates() {
        let rates = EclRates::default();
        let as_percent: Vec<String> = AgingBucket::ALL
            .iter()
            .map(|b| (b.loss_rate(&rates) * Decimal::ONE_HUNDRED).normalize().to_string())
            .collect();
        assert_eq!(as_percent, ["0.5", "2", "5", "15", "50"]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(AgingBucket::Over120.to_string(), "120+");
        assert_eq!(AgingEntity::parse("payables"), Some(AgingEntity::Payables));
    }
}
