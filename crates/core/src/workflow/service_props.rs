//! Property-based tests for WorkflowService.

use proptest::prelude::*;
use tijara_shared::types::{CreditNoteId, SourceDocumentId, UserId};
use uuid::Uuid;

use crate::document::DocumentStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{CreditNoteStatus, PostingStatus, RefundStatus};

fn arb_credit_note_status() -> impl Strategy<Value = CreditNoteStatus> {
    prop_oneof![
        Just(CreditNoteStatus::Draft),
        Just(CreditNoteStatus::Issued),
        Just(CreditNoteStatus::Processed),
        Just(CreditNoteStatus::Cancelled),
    ]
}

fn arb_refund_status() -> impl Strategy<Value = RefundStatus> {
    prop_oneof![
        Just(RefundStatus::Pending),
        Just(RefundStatus::Processed),
        Just(RefundStatus::Failed),
    ]
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating non-empty strings (for reasons).
fn arb_non_empty_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,20}[a-zA-Z0-9 ]{0,60}".prop_map(|s| s.trim().to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Posting is one-way
    // =========================================================================

    /// A posted document can never be posted again, whoever asks.
    #[test]
    fn prop_second_post_always_rejected(user in arb_user(), voided in any::<bool>()) {
        let status = if voided { DocumentStatus::Voided } else { DocumentStatus::Active };
        let id = SourceDocumentId::new();
        let result = WorkflowService::post(id, PostingStatus::Posted, status, user);
        prop_assert!(matches!(result, Err(WorkflowError::AlreadyPosted(found)) if found == id));
    }

    /// Posting an active draft records the acting user.
    #[test]
    fn prop_post_records_actor(user in arb_user()) {
        let change = WorkflowService::post(
            SourceDocumentId::new(),
            PostingStatus::Draft,
            DocumentStatus::Active,
            user,
        );
        prop_assert!(change.is_ok());
        let change = change.map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(change.from, PostingStatus::Draft);
        prop_assert_eq!(change.to, PostingStatus::Posted);
        prop_assert_eq!(change.changed_by, user);
    }

    // =========================================================================
    // Credit note transitions
    // =========================================================================

    /// Only drafts can be approved.
    #[test]
    fn prop_approve_only_from_draft(status in arb_credit_note_status(), user in arb_user()) {
        let result = WorkflowService::approve_credit_note(status, user);
        if status == CreditNoteStatus::Draft {
            prop_assert_eq!(result.map(|c| c.to).ok(), Some(CreditNoteStatus::Issued));
        } else {
            let is_invalid_transition = matches!(result, Err(WorkflowError::InvalidTransition { .. }));
            prop_assert!(is_invalid_transition);
        }
    }

    /// Cancellation: drafts succeed, issued notes point to a reversal,
    /// terminal statuses are invalid transitions.
    #[test]
    fn prop_cancel_rules(
        status in arb_credit_note_status(),
        reason in arb_non_empty_string(),
        user in arb_user(),
    ) {
        prop_assume!(!reason.is_empty());
        let result = WorkflowService::cancel_credit_note(CreditNoteId::new(), status, &reason, user);
        match status {
            CreditNoteStatus::Draft => {
                prop_assert_eq!(result.map(|c| c.to).ok(), Some(CreditNoteStatus::Cancelled));
            }
            CreditNoteStatus::Issued => {
                let requires_reversal = matches!(result, Err(WorkflowError::CancelRequiresReversal(_)));
                prop_assert!(requires_reversal);
            }
            CreditNoteStatus::Processed | CreditNoteStatus::Cancelled => {
                let is_invalid_transition = matches!(result, Err(WorkflowError::InvalidTransition { .. }));
                prop_assert!(is_invalid_transition);
            }
        }
    }

    /// Refunds are only accepted against issued notes.
    #[test]
    fn prop_refundable_only_when_issued(status in arb_credit_note_status()) {
        prop_assert_eq!(
            WorkflowService::ensure_refundable(status).is_ok(),
            status == CreditNoteStatus::Issued
        );
    }

    // =========================================================================
    // Refund transitions
    // =========================================================================

    /// A refund leaves Pending exactly once.
    #[test]
    fn prop_refund_finishes_once(status in arb_refund_status(), user in arb_user(), fail in any::<bool>()) {
        let result = if fail {
            WorkflowService::fail_refund(status, user)
        } else {
            WorkflowService::complete_refund(status, user)
        };
        prop_assert_eq!(result.is_ok(), status == RefundStatus::Pending);
    }
}
