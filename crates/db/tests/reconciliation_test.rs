//! Integration tests for subledger reconciliation, VAT settlement and aging.

mod common;

use common::{Fixture, connect, date};
use rust_decimal_macros::dec;
use tijara_core::aging::{AgingBucket, AgingEntity};
use tijara_core::document::SourceKind;
use tijara_core::ledger::{AccountRole, PaymentMode};
use tijara_core::reconciliation::{Period, ReconciliationDomain, VatPaymentStatus};
use tijara_db::entities::sea_orm_active_enums::{PartyKind, VatPaymentStatus as DbVatStatus};
use tijara_db::repositories::{
    AccountRepository, AgingRepository, CreatePartyInput, PartyRepository, PostingRepository,
    ReconciliationRepository, SourceDocumentRepository, VatPaymentInput,
};

fn march() -> Period {
    Period::new(date(2026, 3, 1), date(2026, 3, 31)).expect("valid period")
}

#[tokio::test]
async fn test_unposted_sale_shows_as_variance() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let documents = SourceDocumentRepository::new(fx.db.clone(), fx.settings.clone());
    let posting = PostingRepository::new(fx.db.clone(), fx.settings.clone());
    let reconciliation = ReconciliationRepository::new(fx.db.clone(), fx.settings.clone());

    let posted = documents
        .create(fx.document(SourceKind::Sale, PaymentMode::Cash, None, dec!(10), dec!(100)))
        .await
        .expect("sale");
    posting.post(posted.id, fx.user_id).await.expect("post");
    documents
        .create(fx.document(SourceKind::Sale, PaymentMode::Cash, None, dec!(1), dec!(100)))
        .await
        .expect("unposted sale");

    let report = reconciliation
        .reconcile(fx.branch_id, march(), ReconciliationDomain::Sales)
        .await
        .expect("reconcile");
    assert_eq!(report.subledger_total, dec!(1254.00));
    assert_eq!(report.gl_total, dec!(1140.00));
    assert_eq!(report.variance, dec!(-114.00));
    assert!(!report.is_reconciled);
    assert_eq!(report.by_dimension.len(), 1);
    assert_eq!(report.by_dimension[0].value_id, fx.cost_center);
    assert_eq!(report.by_dimension[0].variance, dec!(-114.00));

    posting
        .post_pending(fx.branch_id, fx.user_id)
        .await
        .expect("batch");
    let report = reconciliation
        .reconcile(fx.branch_id, march(), ReconciliationDomain::Sales)
        .await
        .expect("reconcile again");
    assert!(report.is_reconciled);
    assert_eq!(report.variance, dec!(0));

    let purchases = reconciliation
        .reconcile(fx.branch_id, march(), ReconciliationDomain::Purchases)
        .await
        .expect("purchases");
    assert_eq!(purchases.subledger_total, dec!(0));
    assert!(purchases.is_reconciled);
}

#[tokio::test]
async fn test_vat_reconciliation_and_payments() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let documents = SourceDocumentRepository::new(fx.db.clone(), fx.settings.clone());
    let posting = PostingRepository::new(fx.db.clone(), fx.settings.clone());
    let reconciliation = ReconciliationRepository::new(fx.db.clone(), fx.settings.clone());

    documents
        .create(fx.document(SourceKind::Sale, PaymentMode::Cash, None, dec!(10), dec!(100)))
        .await
        .expect("sale");
    documents
        .create(fx.document(SourceKind::Purchase, PaymentMode::Bank, None, dec!(3), dec!(20)))
        .await
        .expect("purchase");
    posting
        .post_pending(fx.branch_id, fx.user_id)
        .await
        .expect("batch");

    let position = reconciliation
        .vat_position(fx.branch_id, march())
        .await
        .expect("position");
    assert_eq!(position.vat_collected, dec!(140.00));
    assert_eq!(position.vat_paid, dec!(8.40));
    assert_eq!(position.net_liability, dec!(131.60));
    assert_eq!(position.payment_status, VatPaymentStatus::Unpaid);

    let stored = reconciliation
        .reconcile_vat(fx.branch_id, march(), fx.user_id)
        .await
        .expect("store");
    let pay = |amount| VatPaymentInput {
        reconciliation_id: stored.id,
        amount,
        payment_date: date(2026, 4, 10),
        reference: Some("TAX-0326".to_string()),
    };

    let partial = reconciliation
        .record_vat_payment(pay(dec!(100.00)), fx.user_id)
        .await
        .expect("first payment");
    assert_eq!(partial.payment_status, DbVatStatus::PartiallyPaid);

    let err = reconciliation
        .record_vat_payment(pay(dec!(40.00)), fx.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VAT_OVERPAYMENT");

    let paid = reconciliation
        .record_vat_payment(pay(dec!(31.60)), fx.user_id)
        .await
        .expect("settle");
    assert_eq!(paid.payment_status, DbVatStatus::Paid);
    assert_eq!(paid.amount_settled, dec!(131.60));

    let err = reconciliation
        .record_vat_payment(pay(dec!(1.00)), fx.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOTHING_DUE");

    let recomputed = reconciliation
        .reconcile_vat(fx.branch_id, march(), fx.user_id)
        .await
        .expect("recompute");
    assert_eq!(recomputed.id, stored.id);
    assert_eq!(recomputed.amount_settled, dec!(131.60));
    assert_eq!(recomputed.payment_status, DbVatStatus::Paid);
    assert_eq!(
        reconciliation
            .vat_payments(stored.id)
            .await
            .expect("payments")
            .len(),
        2
    );
}

#[tokio::test]
async fn test_receivables_aging_and_provision() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let customer = fx.customer(None).await;
    let documents = SourceDocumentRepository::new(fx.db.clone(), fx.settings.clone());
    let posting = PostingRepository::new(fx.db.clone(), fx.settings.clone());
    let aging = AgingRepository::new(fx.db.clone(), fx.settings.clone());

    for (quantity, document_date) in [
        (dec!(10), date(2026, 3, 10)),
        (dec!(1), date(2025, 12, 1)),
        (dec!(1), date(2026, 4, 5)),
    ] {
        let mut invoice = fx.document(
            SourceKind::Invoice,
            PaymentMode::Credit,
            Some(customer),
            quantity,
            dec!(100),
        );
        invoice.document_date = document_date;
        let invoice = documents.create(invoice).await.expect("invoice");
        posting.post(invoice.id, fx.user_id).await.expect("post");
    }
    documents
        .create(fx.document(
            SourceKind::Invoice,
            PaymentMode::Credit,
            Some(customer),
            dec!(5),
            dec!(100),
        ))
        .await
        .expect("unposted invoice");

    let as_of = date(2026, 3, 31);
    let report = aging
        .age(fx.branch_id, as_of, AgingEntity::Receivables)
        .await
        .expect("aging");
    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.skipped().count(), 1);
    assert_eq!(report.total_outstanding, dec!(1254.00));
    let current = report.bucket(AgingBucket::Current).expect("current bucket");
    assert_eq!(current.count, 1);
    assert_eq!(current.provision, dec!(5.70));
    let old = report.bucket(AgingBucket::Days91To120).expect("91-120 bucket");
    assert_eq!(old.outstanding, dec!(114.00));
    assert_eq!(old.provision, dec!(17.10));
    assert_eq!(report.total_provision, dec!(22.80));

    let first = aging
        .post_provision(fx.branch_id, as_of, fx.user_id)
        .await
        .expect("provision");
    assert_eq!(first.plan.delta, dec!(22.80));
    assert!(first.transaction_id.is_some());

    let second = aging
        .post_provision(fx.branch_id, as_of, fx.user_id)
        .await
        .expect("provision again");
    assert_eq!(second.plan.current_allowance, dec!(22.80));
    assert_eq!(second.plan.delta, dec!(0));
    assert!(second.transaction_id.is_none());

    let accounts = AccountRepository::new(fx.db.clone(), fx.settings.clone());
    let expense = accounts
        .find_by_code(fx.branch_id, accounts.code_for(AccountRole::BadDebtExpense))
        .await
        .expect("lookup")
        .expect("bad debt expense");
    assert_eq!(expense.balance, dec!(22.80));
}

#[tokio::test]
async fn test_payables_aging_ignores_cash_purchases() {
    let Some(db) = connect().await else { return };
    let fx = Fixture::new(db).await;
    let supplier = PartyRepository::new(fx.db.clone())
        .create(CreatePartyInput {
            branch_id: fx.branch_id,
            kind: PartyKind::Supplier,
            name: "Nile Supplies".to_string(),
            credit_limit: None,
        })
        .await
        .expect("supplier");
    let documents = SourceDocumentRepository::new(fx.db.clone(), fx.settings.clone());
    let posting = PostingRepository::new(fx.db.clone(), fx.settings.clone());

    documents
        .create(fx.document(
            SourceKind::Purchase,
            PaymentMode::Credit,
            Some(supplier.id.into()),
            dec!(2),
            dec!(50),
        ))
        .await
        .expect("credit purchase");
    documents
        .create(fx.document(SourceKind::Purchase, PaymentMode::Cash, None, dec!(1), dec!(50)))
        .await
        .expect("cash purchase");
    posting
        .post_pending(fx.branch_id, fx.user_id)
        .await
        .expect("batch");

    let aging = AgingRepository::new(fx.db.clone(), fx.settings.clone());
    let report = aging
        .age(fx.branch_id, date(2026, 3, 31), AgingEntity::Payables)
        .await
        .expect("payables aging");
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.total_outstanding, dec!(114.00));
}
