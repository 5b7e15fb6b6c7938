//! Postgres enum types and their mapping to the core domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tijara_core::credit_note::{
    ItemCondition as CoreItemCondition, RefundMethod as CoreRefundMethod,
    StockMovementKind as CoreStockMovementKind,
};
use tijara_core::document::{DocumentStatus as CoreDocumentStatus, SourceKind as CoreSourceKind};
use tijara_core::ledger::{
    AccountType as CoreAccountType, Direction as CoreDirection, LineOrigin as CoreLineOrigin,
    PaymentMode as CorePaymentMode, TransactionKind as CoreTransactionKind,
};
use tijara_core::reconciliation::VatPaymentStatus as CoreVatPaymentStatus;
use tijara_core::workflow::{
    CreditNoteStatus as CoreCreditNoteStatus, PostingStatus as CorePostingStatus,
    RefundStatus as CoreRefundStatus,
};

/// Generates `From` conversions both ways between a db enum and the core
/// enum with the same variants.
macro_rules! core_mapping {
    ($db:ident <=> $core:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant),+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant),+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

core_mapping!(AccountType <=> CoreAccountType { Asset, Liability, Equity, Revenue, Expense });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
pub enum TransactionKind {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "credit_note")]
    CreditNote,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "ecl_provision")]
    EclProvision,
}

core_mapping!(TransactionKind <=> CoreTransactionKind {
    Sale,
    Invoice,
    Purchase,
    CreditNote,
    Refund,
    EclProvision,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "posting_status")]
pub enum PostingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
}

core_mapping!(PostingStatus <=> CorePostingStatus { Draft, Posted });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_direction")]
pub enum EntryDirection {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

core_mapping!(EntryDirection <=> CoreDirection { Debit, Credit });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "line_origin")]
pub enum LineOrigin {
    #[sea_orm(string_value = "POS_AUTO")]
    PosAuto,
    #[sea_orm(string_value = "INVOICE")]
    Invoice,
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
    #[sea_orm(string_value = "CREDIT_NOTE")]
    CreditNote,
    #[sea_orm(string_value = "REFUND")]
    Refund,
    #[sea_orm(string_value = "ECL_PROVISION")]
    EclProvision,
}

core_mapping!(LineOrigin <=> CoreLineOrigin {
    PosAuto,
    Invoice,
    Purchase,
    CreditNote,
    Refund,
    EclProvision,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "source_kind")]
pub enum SourceKind {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "purchase")]
    Purchase,
}

core_mapping!(SourceKind <=> CoreSourceKind { Sale, Invoice, Purchase });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_mode")]
pub enum PaymentMode {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "credit")]
    Credit,
}

core_mapping!(PaymentMode <=> CorePaymentMode { Cash, Bank, Credit });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_status")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "voided")]
    Voided,
}

core_mapping!(DocumentStatus <=> CoreDocumentStatus { Active, Voided });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_kind")]
pub enum PartyKind {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "supplier")]
    Supplier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_note_status")]
pub enum CreditNoteStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "issued")]
    Issued,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

core_mapping!(CreditNoteStatus <=> CoreCreditNoteStatus {
    Draft,
    Issued,
    Processed,
    Cancelled,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "refund_method")]
pub enum RefundMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "credit_adjustment")]
    CreditAdjustment,
    #[sea_orm(string_value = "store_credit")]
    StoreCredit,
}

core_mapping!(RefundMethod <=> CoreRefundMethod { Cash, Bank, CreditAdjustment, StoreCredit });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "item_condition")]
pub enum ItemCondition {
    #[sea_orm(string_value = "unopened")]
    Unopened,
    #[sea_orm(string_value = "good")]
    Good,
    #[sea_orm(string_value = "damaged")]
    Damaged,
    #[sea_orm(string_value = "faulty")]
    Faulty,
}

core_mapping!(ItemCondition <=> CoreItemCondition { Unopened, Good, Damaged, Faulty });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "refund_status")]
pub enum RefundStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

core_mapping!(RefundStatus <=> CoreRefundStatus { Pending, Processed, Failed });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "stock_movement_kind")]
pub enum StockMovementKind {
    #[sea_orm(string_value = "restock")]
    Restock,
    #[sea_orm(string_value = "write_off")]
    WriteOff,
}

core_mapping!(StockMovementKind <=> CoreStockMovementKind { Restock, WriteOff });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "vat_payment_status")]
pub enum VatPaymentStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "refundable")]
    Refundable,
}

core_mapping!(VatPaymentStatus <=> CoreVatPaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
    Refundable,
});

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_db_values_match_core_strings() {
        for kind in TransactionKind::iter() {
            let core: CoreTransactionKind = kind.into();
            assert_eq!(kind.to_value(), core.as_str());
        }
        for origin in LineOrigin::iter() {
            let core: CoreLineOrigin = origin.into();
            assert_eq!(origin.to_value(), core.as_str());
        }
        for method in RefundMethod::iter() {
            let core: CoreRefundMethod = method.into();
            assert_eq!(method.to_value(), core.as_str());
        }
        for status in VatPaymentStatus::iter() {
            let core: CoreVatPaymentStatus = status.into();
            assert_eq!(status.to_value(), core.as_str());
        }
    }
}
