//! Workflow service for lifecycle transitions.
//!
//! Persistence locks the row, asks this service whether the transition is
//! allowed, and writes the new status in the same database transaction as
//! the ledger rows.

use tijara_shared::types::{CreditNoteId, SourceDocumentId, UserId};

use crate::document::DocumentStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{CreditNoteStatus, PostingStatus, RefundStatus, StatusChange};

/// Stateless service for validating status transitions.
///
/// All methods are associated functions returning the `StatusChange` to
/// persist, or the reason the transition is refused.
pub struct WorkflowService;

impl WorkflowService {
    /// Post a draft source document.
    ///
    /// # Errors
    /// * `AlreadyPosted` if the document is already posted
    /// * `DocumentVoided` if the document was voided
    pub fn post(
        document_id: SourceDocumentId,
        current: PostingStatus,
        document_status: DocumentStatus,
        posted_by: UserId,
    ) -> Result<StatusChange<PostingStatus>, WorkflowError> {
        if current == PostingStatus::Posted {
            return Err(WorkflowError::AlreadyPosted(document_id));
        }
        if document_status == DocumentStatus::Voided {
            return Err(WorkflowError::DocumentVoided(document_id));
        }
        Ok(StatusChange::now(current, PostingStatus::Posted, posted_by))
    }

    /// Approve a draft credit note, issuing it.
    ///
    /// # Errors
    /// `InvalidTransition` unless the note is in Draft.
    pub fn approve_credit_note(
        current: CreditNoteStatus,
        approved_by: UserId,
    ) -> Result<StatusChange<CreditNoteStatus>, WorkflowError> {
        match current {
            CreditNoteStatus::Draft => Ok(StatusChange::now(
                current,
                CreditNoteStatus::Issued,
                approved_by,
            )),
            _ => Err(credit_note_transition(current, CreditNoteStatus::Issued)),
        }
    }

    /// Cancel a draft credit note.
    ///
    /// # Errors
    /// * `CancelReasonRequired` if the reason is blank
    /// * `CancelRequiresReversal` if the note is already issued
    /// * `InvalidTransition` for processed or cancelled notes
    pub fn cancel_credit_note(
        credit_note_id: CreditNoteId,
        current: CreditNoteStatus,
        reason: &str,
        cancelled_by: UserId,
    ) -> Result<StatusChange<CreditNoteStatus>, WorkflowError> {
        if reason.trim().is_empty() {
            return Err(WorkflowError::CancelReasonRequired);
        }
        match current {
            CreditNoteStatus::Draft => Ok(StatusChange::now(
                current,
                CreditNoteStatus::Cancelled,
                cancelled_by,
            )),
            CreditNoteStatus::Issued => Err(WorkflowError::CancelRequiresReversal(credit_note_id)),
            _ => Err(credit_note_transition(current, CreditNoteStatus::Cancelled)),
        }
    }

    /// Refunds may only be processed against issued notes.
    ///
    /// # Errors
    /// `InvalidTransition` unless the note is Issued.
    pub fn ensure_refundable(current: CreditNoteStatus) -> Result<(), WorkflowError> {
        match current {
            CreditNoteStatus::Issued => Ok(()),
            _ => Err(credit_note_transition(current, CreditNoteStatus::Processed)),
        }
    }

    /// Moves an issued note to Processed once it is fully refunded.
    ///
    /// Returns `None` while part of the note is still unrefunded.
    ///
    /// # Errors
    /// `InvalidTransition` unless the note is Issued.
    pub fn settle_credit_note(
        current: CreditNoteStatus,
        fully_refunded: bool,
        settled_by: UserId,
    ) -> Result<Option<StatusChange<CreditNoteStatus>>, WorkflowError> {
        Self::ensure_refundable(current)?;
        Ok(fully_refunded.then(|| {
            StatusChange::now(current, CreditNoteStatus::Processed, settled_by)
        }))
    }

    /// Marks a pending refund as processed.
    ///
    /// # Errors
    /// `InvalidTransition` unless the refund is Pending.
    pub fn complete_refund(
        current: RefundStatus,
        processed_by: UserId,
    ) -> Result<StatusChange<RefundStatus>, WorkflowError> {
        Self::finish_refund(current, RefundStatus::Processed, processed_by)
    }

    /// Marks a pending refund as failed.
    ///
    /// # Errors
    /// `InvalidTransition` unless the refund is Pending.
    pub fn fail_refund(
        current: RefundStatus,
        processed_by: UserId,
    ) -> Result<StatusChange<RefundStatus>, WorkflowError> {
        Self::finish_refund(current, RefundStatus::Failed, processed_by)
    }

    fn finish_refund(
        current: RefundStatus,
        to: RefundStatus,
        actor: UserId,
    ) -> Result<StatusChange<RefundStatus>, WorkflowError> {
        match current {
            RefundStatus::Pending => Ok(StatusChange::now(current, to, actor)),
            _ => Err(WorkflowError::InvalidTransition {
                entity: "refund",
                from: current.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

fn credit_note_transition(from: CreditNoteStatus, to: CreditNoteStatus) -> WorkflowError {
    WorkflowError::InvalidTransition {
        entity: "credit note",
        from: from.to_string(),
        to: to.to_string(),
    }
}
