//! Source document posting.
//!
//! `PostingService::prepare` runs every check that does not need the
//! database: the posting transition, the customer credit limit, the ledger
//! draft and the header dimensions. Persistence only has to write what it
//! returns, inside the transaction that holds the document lock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tijara_shared::types::{LedgerTransactionId, SourceDocumentId, UserId};

use super::error::PostingError;
use crate::dimension::{DimensionPropagator, DimensionResolver};
use crate::document::SourceDocument;
use crate::ledger::{AccountResolver, CreditPosition, DraftTransaction, LedgerEntryBuilder, PaymentMode};
use crate::workflow::{PostingStatus, StatusChange, WorkflowService};

/// Everything persistence needs to post one document.
#[derive(Debug, Clone)]
pub struct PreparedPosting {
    /// Balanced transaction with dimension assignments attached.
    pub draft: DraftTransaction,
    /// Draft → Posted transition.
    pub status_change: StatusChange<PostingStatus>,
    /// Amount to add to the party's outstanding balance (credit sales only).
    pub receivable_increase: Option<Decimal>,
}

/// Result of posting one document, as reported to callers that must not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostOutcome {
    /// Posted under this ledger transaction.
    Posted(LedgerTransactionId),
    /// Not posted; the document stays in draft for a later batch.
    Deferred {
        /// Machine-readable error code.
        code: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl PostOutcome {
    /// Returns true for `Posted`.
    #[must_use]
    pub const fn is_posted(&self) -> bool {
        matches!(self, Self::Posted(_))
    }
}

/// Per-document results of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPostingReport {
    /// One outcome per document attempted, in processing order.
    pub outcomes: Vec<(SourceDocumentId, PostOutcome)>,
}

impl BatchPostingReport {
    /// Records an outcome.
    pub fn record(&mut self, document_id: SourceDocumentId, outcome: PostOutcome) {
        self.outcomes.push((document_id, outcome));
    }

    /// Number of documents posted.
    #[must_use]
    pub fn posted_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_posted()).count()
    }

    /// Number of documents left in draft.
    #[must_use]
    pub fn deferred_count(&self) -> usize {
        self.outcomes.len() - self.posted_count()
    }
}

/// Stateless posting service.
pub struct PostingService;

impl PostingService {
    /// Prepares the posting of a source document.
    ///
    /// # Errors
    ///
    /// `AlreadyPosted`/`DocumentVoided` from the workflow,
    /// `InsufficientCreditLimit` for credit sales over the limit, and any
    /// builder or dimension error.
    pub fn prepare(
        document: &SourceDocument,
        accounts: &impl AccountResolver,
        dimensions: &impl DimensionResolver,
        credit: Option<&CreditPosition>,
        posted_by: UserId,
    ) -> Result<PreparedPosting, PostingError> {
        let status_change = WorkflowService::post(
            document.id,
            document.posting_status,
            document.status,
            posted_by,
        )?;

        let on_account =
            document.kind.is_sales_side() && document.payment_mode == PaymentMode::Credit;
        if on_account && let Some(position) = credit {
            position.ensure_headroom(document.total_amount)?;
        }

        let mut draft = LedgerEntryBuilder::for_source_document(document, accounts, posted_by)?;

        let overrides = dimensions.overrides_for(&document.dimensions)?;
        let outcome = DimensionPropagator::propagate(&[], &overrides, &[], dimensions)?;
        outcome.apply_to(&mut draft.lines);

        Ok(PreparedPosting {
            draft,
            status_change,
            receivable_increase: on_account.then_some(document.total_amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::DocumentDimensions;
    use crate::dimension::catalog::fixtures::standard;
    use crate::document::SourceKind;
    use crate::document::fixtures::cash_sale;
    use crate::ledger::LedgerError;
    use crate::ledger::accounts::fixtures::full_chart;
    use crate::workflow::WorkflowError;
    use rust_decimal_macros::dec;
    use tijara_shared::types::PartyId;

    #[test]
    fn test_prepare_cash_sale() {
        let f = standard();
        let prepared =
            PostingService::prepare(&cash_sale(), &full_chart(), &f.catalog, None, UserId::new())
                .unwrap();
        assert!(prepared.draft.is_balanced());
        assert_eq!(prepared.status_change.to, PostingStatus::Posted);
        assert!(prepared.receivable_increase.is_none());
    }

    #[test]
    fn test_second_post_rejected() {
        let f = standard();
        let mut doc = cash_sale();
        doc.posting_status = PostingStatus::Posted;
        let result = PostingService::prepare(&doc, &full_chart(), &f.catalog, None, UserId::new());
        assert!(matches!(
            result,
            Err(PostingError::Workflow(WorkflowError::AlreadyPosted(_)))
        ));
    }

    #[test]
    fn test_header_dimensions_attached_to_every_line() {
        let f = standard();
        let mut doc = cash_sale();
        doc.dimensions = DocumentDimensions {
            cost_center_id: Some(f.cc1),
            ..DocumentDimensions::default()
        };
        let prepared =
            PostingService::prepare(&doc, &full_chart(), &f.catalog, None, UserId::new()).unwrap();
        assert!(prepared.draft.lines.iter().all(|l| {
            l.assignments.len() == 1 && l.assignments[0].value_id == f.cc1
        }));
    }

    #[test]
    fn test_credit_limit_enforced_for_invoices_on_account() {
        let f = standard();
        let mut doc = cash_sale();
        doc.kind = SourceKind::Invoice;
        doc.payment_mode = PaymentMode::Credit;
        let position = CreditPosition {
            party_id: PartyId::new(),
            credit_limit: Some(dec!(1000)),
            outstanding: dec!(0),
        };
        let result =
            PostingService::prepare(&doc, &full_chart(), &f.catalog, Some(&position), UserId::new());
        assert!(matches!(
            result,
            Err(PostingError::Ledger(LedgerError::InsufficientCreditLimit { .. }))
        ));

        let roomy = CreditPosition {
            credit_limit: Some(dec!(5000)),
            ..position
        };
        let prepared =
            PostingService::prepare(&doc, &full_chart(), &f.catalog, Some(&roomy), UserId::new())
                .unwrap();
        assert_eq!(prepared.receivable_increase, Some(dec!(1140.00)));
    }

    #[test]
    fn test_credit_limit_ignored_for_purchases() {
        let f = standard();
        let mut doc = cash_sale();
        doc.kind = SourceKind::Purchase;
        doc.payment_mode = PaymentMode::Credit;
        let position = CreditPosition {
            party_id: PartyId::new(),
            credit_limit: Some(dec!(1)),
            outstanding: dec!(0),
        };
        assert!(
            PostingService::prepare(&doc, &full_chart(), &f.catalog, Some(&position), UserId::new())
                .is_ok()
        );
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchPostingReport::default();
        report.record(SourceDocumentId::new(), PostOutcome::Posted(LedgerTransactionId::new()));
        report.record(
            SourceDocumentId::new(),
            PostOutcome::Deferred {
                code: "MISSING_ACCOUNT".into(),
                reason: "no VAT account".into(),
            },
        );
        assert_eq!(report.posted_count(), 1);
        assert_eq!(report.deferred_count(), 1);
    }
}
