//! Workflow domain types for document lifecycles.
//!
//! Three small state machines:
//! - Source documents: Draft → Posted (one way)
//! - Credit notes: Draft → Issued → Processed, Draft → Cancelled
//! - Refund transactions: Pending → Processed | Failed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tijara_shared::types::UserId;

/// Posting status of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    /// Not yet in the ledger.
    Draft,
    /// Posted to the ledger (immutable).
    Posted,
}

impl PostingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            _ => None,
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a credit note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditNoteStatus {
    /// Created, not yet approved.
    Draft,
    /// Approved; reversal entries posted.
    Issued,
    /// Fully refunded.
    Processed,
    /// Cancelled before approval.
    Cancelled,
}

impl CreditNoteStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Processed => "processed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "issued" => Some(Self::Issued),
            "processed" => Some(Self::Processed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true when the note counts against the refundable total.
    #[must_use]
    pub const fn counts_against_source(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for CreditNoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a refund transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    /// Created, ledger step not yet done.
    Pending,
    /// Settled in the ledger.
    Processed,
    /// Ledger step failed; kept for the audit trail.
    Failed,
}

impl RefundStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "processed" => Some(Self::Processed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated transition with its audit data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange<S> {
    /// Status before the transition.
    pub from: S,
    /// Status after the transition.
    pub to: S,
    /// Acting user.
    pub changed_by: UserId,
    /// When the transition was validated.
    pub changed_at: DateTime<Utc>,
}

impl<S: Copy> StatusChange<S> {
    /// Records a transition performed now by `changed_by`.
    #[must_use]
    pub fn now(from: S, to: S, changed_by: UserId) -> Self {
        Self {
            from,
            to,
            changed_by,
            changed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(PostingStatus::Draft.as_str(), "draft");
        assert_eq!(PostingStatus::Posted.as_str(), "posted");
        assert_eq!(CreditNoteStatus::Issued.as_str(), "issued");
        assert_eq!(CreditNoteStatus::Cancelled.as_str(), "cancelled");
        assert_eq!(RefundStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(PostingStatus::parse("POSTED"), Some(PostingStatus::Posted));
        assert_eq!(
            CreditNoteStatus::parse("Processed"),
            Some(CreditNoteStatus::Processed)
        );
        assert_eq!(RefundStatus::parse("pending"), Some(RefundStatus::Pending));
        assert_eq!(CreditNoteStatus::parse("voided"), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", PostingStatus::Draft), "draft");
        assert_eq!(format!("{}", CreditNoteStatus::Issued), "issued");
    }

    #[test]
    fn test_cancelled_notes_do_not_count() {
        assert!(CreditNoteStatus::Draft.counts_against_source());
        assert!(CreditNoteStatus::Issued.counts_against_source());
        assert!(CreditNoteStatus::Processed.counts_against_source());
        assert!(!CreditNoteStatus::Cancelled.counts_against_source());
    }
}
