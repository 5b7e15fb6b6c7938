//! Credit note lifecycle: creation, approval, cancellation and refunds.
//!
//! Each operation validates against the locked rows the caller loaded and
//! returns what must be written. Nothing here touches the database.

use rust_decimal::Decimal;
use tijara_shared::types::{CreditNoteId, RefundId, UserId};
use tracing::info;

use super::calculation::CreditNoteCalculator;
use super::error::CreditNoteError;
use super::types::{
    CreateCreditNote, CreditNote, PreparedApproval, PriorCredits, RefundPlan, RefundRequest,
    StockMovement, settlement_role,
};
use crate::dimension::{DimensionPropagator, DimensionResolver, OriginLine};
use crate::document::SourceDocument;
use crate::ledger::{
    AccountResolver, AccountRole, LedgerEntryBuilder, LedgerError, PaymentMode, SourceRef,
    TransactionKind,
};
use crate::workflow::{
    CreditNoteStatus, PostingStatus, StatusChange, WorkflowError, WorkflowService,
};

/// Stateless credit note service.
pub struct CreditNoteService;

impl CreditNoteService {
    /// Builds a draft credit note against a sale or invoice.
    ///
    /// `prior` holds what the source's non-cancelled notes already credit,
    /// read with the source row locked.
    ///
    /// # Errors
    ///
    /// `UnsupportedSource` for purchases, `DocumentVoided` for voided
    /// sources, any item pricing error, an invalid split, `InvalidAmount` for
    /// a zero total, and `OverRefund` when the note would credit more than
    /// the source total.
    pub fn create(
        source: &SourceDocument,
        prior: &PriorCredits,
        request: CreateCreditNote,
    ) -> Result<CreditNote, CreditNoteError> {
        if !source.kind.is_sales_side() {
            return Err(CreditNoteError::UnsupportedSource(source.kind));
        }
        if !source.is_active() {
            return Err(WorkflowError::DocumentVoided(source.id).into());
        }

        for split in &request.splits {
            split.check_shares()?;
        }
        let items = CreditNoteCalculator::price_items(source, &request.items, prior)?;
        let totals = CreditNoteCalculator::totals(&items);
        if totals.total <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "credit note total {} must be positive",
                totals.total
            ))
            .into());
        }
        CreditNoteCalculator::ensure_within_refundable(
            source.total_amount,
            prior.total,
            totals.total,
        )?;

        Ok(CreditNote {
            id: CreditNoteId::new(),
            branch_id: source.branch_id,
            source_id: source.id,
            source_kind: source.kind,
            number: request.number,
            reason: request.reason,
            refund_method: request.refund_method,
            credit_date: request.credit_date,
            totals,
            status: CreditNoteStatus::Draft,
            approval_transaction_id: None,
            dimensions: request.dimensions,
            splits: request.splits,
            items,
        })
    }

    /// Prepares the approval of a draft note.
    ///
    /// Debits Sales Returns for the net amount and VAT Payable for the VAT,
    /// and credits the settlement liability for the total. The reversal
    /// carries the dimension values of the source's primary line unless the
    /// note overrides or splits them.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the note is a draft, `SourceNotPosted`,
    /// and any ledger or dimension error.
    pub fn approve(
        note: &CreditNote,
        source: &SourceDocument,
        origin: &[OriginLine],
        accounts: &impl AccountResolver,
        dimensions: &impl DimensionResolver,
        approved_by: UserId,
    ) -> Result<PreparedApproval, CreditNoteError> {
        let status_change = WorkflowService::approve_credit_note(note.status, approved_by)?;
        if source.posting_status != PostingStatus::Posted {
            return Err(CreditNoteError::SourceNotPosted(source.id));
        }

        let totals = note.totals;
        let returns = accounts.require(AccountRole::SalesReturns)?;
        let liability = accounts.require(settlement_role(source.payment_mode))?;
        let number = &note.number;

        let builder = LedgerEntryBuilder::new(
            TransactionKind::CreditNote,
            note.branch_id,
            note.credit_date,
            approved_by,
        )
        .particulars(format!("Credit note {number} for {}", source.number))
        .source(SourceRef::new(TransactionKind::CreditNote, note.id))
        .debit(returns, totals.subtotal, format!("Returns on {number}"));

        let builder = match source.ledger_transaction_id {
            Some(original) => builder.reverses(original),
            None => builder,
        };
        let builder = if totals.vat.is_zero() {
            builder
        } else {
            let vat = accounts.require(AccountRole::VatPayable)?;
            builder.debit(vat, totals.vat, format!("VAT reversal on {number}"))
        };
        let mut draft = builder
            .credit(liability, totals.total, format!("Amount due on {number}"))
            .build()?;

        let overrides = dimensions.overrides_for(&note.dimensions)?;
        let propagated =
            DimensionPropagator::propagate(origin, &overrides, &note.splits, dimensions)?;
        propagated.apply_to(&mut draft.lines);

        let stock_movements = note
            .items
            .iter()
            .map(|item| StockMovement {
                credit_note_item_id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                kind: item.condition.movement(),
            })
            .collect();

        info!(
            credit_note_id = %note.id,
            source_id = %source.id,
            total = %totals.total,
            overrides = propagated.overrides.len(),
            "Credit note approval prepared"
        );

        Ok(PreparedApproval {
            draft,
            status_change,
            stock_movements,
            receivable_reduction: (source.payment_mode == PaymentMode::Credit)
                .then_some(totals.total),
        })
    }

    /// Cancels a draft note.
    ///
    /// # Errors
    ///
    /// `CancelReasonRequired`, `CancelRequiresReversal` for issued notes, or
    /// `InvalidTransition`.
    pub fn cancel(
        note: &CreditNote,
        reason: &str,
        cancelled_by: UserId,
    ) -> Result<StatusChange<CreditNoteStatus>, CreditNoteError> {
        Ok(WorkflowService::cancel_credit_note(
            note.id,
            note.status,
            reason,
            cancelled_by,
        )?)
    }

    /// Plans a refund against an issued note.
    ///
    /// `already_refunded` is the sum of processed refunds. The amount
    /// defaults to the remaining balance and the method to the note's.
    /// The liability credited at approval is debited and the method account
    /// credited; when both resolve to the same account no transaction is
    /// built. The settlement lines carry the assignments of `origin`, the
    /// note's approval transaction.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the note is issued, `InvalidRefundAmount`,
    /// and any ledger error.
    #[allow(clippy::too_many_arguments)]
    pub fn plan_refund(
        note: &CreditNote,
        source_payment_mode: PaymentMode,
        already_refunded: Decimal,
        request: &RefundRequest,
        origin: &[OriginLine],
        accounts: &impl AccountResolver,
        dimensions: &impl DimensionResolver,
        processed_by: UserId,
    ) -> Result<RefundPlan, CreditNoteError> {
        WorkflowService::ensure_refundable(note.status)?;

        let remaining = note.totals.total - already_refunded;
        let amount = request.amount.unwrap_or(remaining);
        if amount <= Decimal::ZERO || amount > remaining {
            return Err(CreditNoteError::InvalidRefundAmount {
                requested: amount,
                remaining,
            });
        }

        let method = request.method.unwrap_or(note.refund_method);
        let refund_id = RefundId::new();
        let liability = accounts.require(settlement_role(source_payment_mode))?;
        let payout = accounts.require(method.account_role())?;

        let draft = if liability.id == payout.id {
            None
        } else {
            let mut draft = LedgerEntryBuilder::new(
                TransactionKind::Refund,
                note.branch_id,
                request.refund_date,
                processed_by,
            )
            .particulars(format!("Refund on credit note {}", note.number))
            .source(SourceRef::new(TransactionKind::Refund, refund_id))
            .debit(liability, amount, format!("Settle {}", note.number))
            .credit(payout, amount, format!("{method} refund"))
            .build()?;
            DimensionPropagator::propagate(origin, &[], &[], dimensions)?
                .apply_to(&mut draft.lines);
            Some(draft)
        };

        let settlement = WorkflowService::settle_credit_note(
            note.status,
            amount == remaining,
            processed_by,
        )?;

        Ok(RefundPlan {
            refund_id,
            amount,
            method,
            refund_date: request.refund_date,
            draft,
            settlement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credit_note::types::{ItemCondition, RefundMethod, ReturnItem, StockMovementKind};
    use crate::dimension::catalog::fixtures::standard;
    use crate::dimension::{DimensionAssignment, DimensionSplit, DocumentDimensions};
    use crate::document::fixtures::cash_sale;
    use crate::ledger::Direction;
    use crate::ledger::accounts::fixtures::full_chart;
    use rust_decimal_macros::dec;
    use tijara_shared::types::LedgerTransactionId;

    fn request(doc: &SourceDocument, quantity: Decimal, condition: ItemCondition) -> CreateCreditNote {
        CreateCreditNote {
            number: "CN-0001".into(),
            reason: "Customer return".into(),
            refund_method: RefundMethod::Cash,
            credit_date: doc.document_date,
            items: vec![ReturnItem {
                source_line_id: doc.lines[0].id,
                quantity,
                condition,
            }],
            dimensions: DocumentDimensions::default(),
            splits: Vec::new(),
        }
    }

    fn none() -> PriorCredits {
        PriorCredits::default()
    }

    fn refund(amount: Option<Decimal>, refund_date: chrono::NaiveDate) -> RefundRequest {
        RefundRequest {
            amount,
            method: None,
            refund_date,
        }
    }

    fn posted_sale() -> SourceDocument {
        let mut doc = cash_sale();
        doc.posting_status = PostingStatus::Posted;
        doc.ledger_transaction_id = Some(LedgerTransactionId::new());
        doc
    }

    fn issued(mut note: CreditNote) -> CreditNote {
        note.status = CreditNoteStatus::Issued;
        note
    }

    #[test]
    fn test_create_prices_items() {
        let doc = cash_sale();
        let note =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(2), ItemCondition::Good))
                .unwrap();
        assert_eq!(note.status, CreditNoteStatus::Draft);
        assert_eq!(note.totals.subtotal, dec!(200.00));
        assert_eq!(note.totals.vat, dec!(28.00));
        assert_eq!(note.totals.total, dec!(228.00));
    }

    #[test]
    fn test_over_refund_on_invoice() {
        let mut doc = cash_sale();
        doc.lines[0].vat_rate = dec!(0);
        doc.tax = dec!(0);
        doc.total_amount = dec!(1000.00);

        let first =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(7), ItemCondition::Good))
                .unwrap();
        assert_eq!(first.totals.total, dec!(700.00));

        let credited = PriorCredits {
            total: first.totals.total,
            ..PriorCredits::default()
        };
        let second =
            CreditNoteService::create(&doc, &credited, request(&doc, dec!(4), ItemCondition::Good));
        assert!(matches!(
            second,
            Err(CreditNoteError::OverRefund { max_refundable, .. }) if max_refundable == dec!(300.00)
        ));

        let third =
            CreditNoteService::create(&doc, &credited, request(&doc, dec!(3), ItemCondition::Good))
                .unwrap();
        assert_eq!(third.totals.total, dec!(300.00));
    }

    #[test]
    fn test_purchase_cannot_be_credited() {
        let mut doc = cash_sale();
        doc.kind = crate::document::SourceKind::Purchase;
        assert!(matches!(
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good)),
            Err(CreditNoteError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn test_approve_reverses_sale() {
        let f = standard();
        let accounts = full_chart();
        let doc = posted_sale();
        let note =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(2), ItemCondition::Damaged))
                .unwrap();

        let approval =
            CreditNoteService::approve(&note, &doc, &[], &accounts, &f.catalog, UserId::new())
                .unwrap();
        let draft = &approval.draft;
        assert!(draft.is_balanced());
        assert_eq!(draft.reverses, doc.ledger_transaction_id);
        assert_eq!(draft.journal, "Sales Returns Journal");

        let line_on = |role| {
            let id = accounts.require(role).unwrap().id;
            draft.lines_for(id).map(|l| (l.direction, l.amount)).next()
        };
        assert_eq!(line_on(AccountRole::SalesReturns), Some((Direction::Debit, dec!(200.00))));
        assert_eq!(line_on(AccountRole::VatPayable), Some((Direction::Debit, dec!(28.00))));
        assert_eq!(line_on(AccountRole::RefundPayable), Some((Direction::Credit, dec!(228.00))));

        assert_eq!(approval.status_change.to, CreditNoteStatus::Issued);
        assert_eq!(approval.stock_movements.len(), 1);
        assert_eq!(approval.stock_movements[0].kind, StockMovementKind::WriteOff);
        assert!(approval.receivable_reduction.is_none());
    }

    #[test]
    fn test_approve_credit_invoice_reduces_receivable() {
        let f = standard();
        let accounts = full_chart();
        let mut doc = posted_sale();
        doc.kind = crate::document::SourceKind::Invoice;
        doc.payment_mode = PaymentMode::Credit;
        let note =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap();
        let approval =
            CreditNoteService::approve(&note, &doc, &[], &accounts, &f.catalog, UserId::new())
                .unwrap();
        let ar = accounts.require(AccountRole::AccountsReceivable).unwrap().id;
        assert_eq!(approval.draft.lines_for(ar).count(), 1);
        assert_eq!(approval.receivable_reduction, Some(dec!(114.00)));
    }

    #[test]
    fn test_approve_requires_posted_source() {
        let f = standard();
        let doc = cash_sale();
        let note =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap();
        assert!(matches!(
            CreditNoteService::approve(&note, &doc, &[], &full_chart(), &f.catalog, UserId::new()),
            Err(CreditNoteError::SourceNotPosted(_))
        ));
    }

    #[test]
    fn test_approval_inherits_source_cost_center() {
        let f = standard();
        let doc = posted_sale();
        let note =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap();
        let origin = vec![OriginLine {
            account_name: "Sales Revenue".into(),
            direction: Direction::Credit,
            assignments: vec![DimensionAssignment::full(f.cost_center, f.cc1)],
        }];
        let approval =
            CreditNoteService::approve(&note, &doc, &origin, &full_chart(), &f.catalog, UserId::new())
                .unwrap();
        assert!(approval
            .draft
            .lines
            .iter()
            .all(|l| l.assignments == vec![DimensionAssignment::full(f.cost_center, f.cc1)]));
    }

    #[test]
    fn test_approval_with_override() {
        let f = standard();
        let doc = posted_sale();
        let mut req = request(&doc, dec!(1), ItemCondition::Good);
        req.dimensions.cost_center_id = Some(f.cc2);
        let note = CreditNoteService::create(&doc, &none(), req).unwrap();
        let origin = vec![OriginLine {
            account_name: "Sales Revenue".into(),
            direction: Direction::Credit,
            assignments: vec![DimensionAssignment::full(f.cost_center, f.cc1)],
        }];
        let approval =
            CreditNoteService::approve(&note, &doc, &origin, &full_chart(), &f.catalog, UserId::new())
                .unwrap();
        assert!(approval.draft.lines.iter().all(|l| l.assignments[0].value_id == f.cc2));
    }

    #[test]
    fn test_cancel_issued_note_rejected() {
        let doc = cash_sale();
        let note = issued(
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap(),
        );
        assert!(matches!(
            CreditNoteService::cancel(&note, "typo", UserId::new()),
            Err(CreditNoteError::Workflow(WorkflowError::CancelRequiresReversal(_)))
        ));
    }

    #[test]
    fn test_partial_then_full_refund() {
        let accounts = full_chart();
        let doc = cash_sale();
        let note = issued(
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(2), ItemCondition::Good))
                .unwrap(),
        );

        let partial = CreditNoteService::plan_refund(
            &note,
            doc.payment_mode,
            dec!(0),
            &refund(Some(dec!(100.00)), doc.document_date),
            &[],
            &accounts,
            &standard().catalog,
            UserId::new(),
        )
        .unwrap();
        assert!(partial.settlement.is_none());
        let draft = partial.draft.unwrap();
        assert!(draft.is_balanced());
        assert_eq!(draft.kind, TransactionKind::Refund);

        let rest = CreditNoteService::plan_refund(
            &note,
            doc.payment_mode,
            dec!(100.00),
            &refund(None, doc.document_date),
            &[],
            &accounts,
            &standard().catalog,
            UserId::new(),
        )
        .unwrap();
        assert_eq!(rest.amount, dec!(128.00));
        assert_eq!(rest.settlement.map(|c| c.to), Some(CreditNoteStatus::Processed));
    }

    #[test]
    fn test_refund_over_remaining_rejected() {
        let doc = cash_sale();
        let note = issued(
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap(),
        );
        let result = CreditNoteService::plan_refund(
            &note,
            doc.payment_mode,
            dec!(0),
            &refund(Some(dec!(500)), doc.document_date),
            &[],
            &full_chart(),
            &standard().catalog,
            UserId::new(),
        );
        assert!(matches!(
            result,
            Err(CreditNoteError::InvalidRefundAmount { remaining, .. }) if remaining == dec!(114.00)
        ));
    }

    #[test]
    fn test_credit_adjustment_on_credit_invoice_writes_nothing() {
        let mut doc = cash_sale();
        doc.kind = crate::document::SourceKind::Invoice;
        doc.payment_mode = PaymentMode::Credit;
        let mut note = issued(
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap(),
        );
        note.refund_method = RefundMethod::CreditAdjustment;
        let plan = CreditNoteService::plan_refund(
            &note,
            doc.payment_mode,
            dec!(0),
            &refund(None, doc.document_date),
            &[],
            &full_chart(),
            &standard().catalog,
            UserId::new(),
        )
        .unwrap();
        assert!(plan.draft.is_none());
        assert!(plan.settlement.is_some());
    }

    #[test]
    fn test_refund_requires_issued_note() {
        let doc = cash_sale();
        let note =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap();
        assert!(matches!(
            CreditNoteService::plan_refund(
                &note,
                doc.payment_mode,
                dec!(0),
                &refund(None, doc.document_date),
                &[],
                &full_chart(),
                &standard().catalog,
                UserId::new(),
            ),
            Err(CreditNoteError::Workflow(WorkflowError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn test_refund_lines_carry_approval_dimensions() {
        let f = standard();
        let accounts = full_chart();
        let doc = posted_sale();
        let note =
            CreditNoteService::create(&doc, &none(), request(&doc, dec!(1), ItemCondition::Good))
                .unwrap();
        let sale_lines = vec![OriginLine {
            account_name: "Sales Revenue".into(),
            direction: Direction::Credit,
            assignments: vec![DimensionAssignment::full(f.cost_center, f.cc1)],
        }];
        let approval =
            CreditNoteService::approve(&note, &doc, &sale_lines, &accounts, &f.catalog, UserId::new())
                .unwrap();
        let approval_lines: Vec<OriginLine> = approval
            .draft
            .lines
            .iter()
            .map(|l| OriginLine {
                account_name: String::new(),
                direction: l.direction,
                assignments: l.assignments.clone(),
            })
            .collect();

        let mut bank = refund(None, doc.document_date);
        bank.method = Some(RefundMethod::Bank);
        let plan = CreditNoteService::plan_refund(
            &issued(note),
            doc.payment_mode,
            dec!(0),
            &bank,
            &approval_lines,
            &accounts,
            &f.catalog,
            UserId::new(),
        )
        .unwrap();
        let draft = plan.draft.unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert!(draft
            .lines
            .iter()
            .all(|l| l.assignments == vec![DimensionAssignment::full(f.cost_center, f.cc1)]));
    }

    #[test]
    fn test_split_applied_to_reversal_lines() {
        let f = standard();
        let doc = posted_sale();
        let mut req = request(&doc, dec!(1), ItemCondition::Good);
        req.splits = vec![DimensionSplit {
            dimension_id: f.cost_center,
            shares: vec![(f.cc1, dec!(60)), (f.cc2, dec!(40))],
        }];
        let note = CreditNoteService::create(&doc, &none(), req).unwrap();
        assert_eq!(note.splits.len(), 1);

        let approval =
            CreditNoteService::approve(&note, &doc, &[], &full_chart(), &f.catalog, UserId::new())
                .unwrap();
        for line in &approval.draft.lines {
            let shares: Vec<_> = line.assignments.iter().map(|a| (a.value_id, a.percentage)).collect();
            assert_eq!(shares, vec![(f.cc1, dec!(60)), (f.cc2, dec!(40))]);
        }
    }

    #[test]
    fn test_split_over_one_hundred_rejected_at_creation() {
        let f = standard();
        let doc = posted_sale();
        let mut req = request(&doc, dec!(1), ItemCondition::Good);
        req.splits = vec![DimensionSplit {
            dimension_id: f.cost_center,
            shares: vec![(f.cc1, dec!(70)), (f.cc2, dec!(40))],
        }];
        assert!(matches!(
            CreditNoteService::create(&doc, &none(), req),
            Err(CreditNoteError::Ledger(LedgerError::AllocationExceeded { .. }))
        ));
    }

    #[test]
    fn test_earlier_notes_limit_returned_quantity() {
        let doc = cash_sale();
        let mut prior = none();
        prior.total = dec!(1140.00) - dec!(114.00);
        prior.returned.insert(doc.lines[0].id, dec!(10));
        assert!(matches!(
            CreditNoteService::create(&doc, &prior, request(&doc, dec!(1), ItemCondition::Good)),
            Err(CreditNoteError::InvalidQuantity { available, .. }) if available == dec!(0)
        ));
    }
}
