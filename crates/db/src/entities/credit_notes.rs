//! `SeaORM` Entity for credit_notes table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CreditNoteStatus, RefundMethod, SourceKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub source_type: SourceKind,
    pub source_id: Uuid,
    pub number: String,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub refund_method: RefundMethod,
    pub credit_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub discount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub vat: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total: Decimal,
    pub status: CreditNoteStatus,
    pub approval_transaction_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credit_note_items::Entity")]
    CreditNoteItems,
    #[sea_orm(has_many = "super::credit_note_splits::Entity")]
    CreditNoteSplits,
    #[sea_orm(has_many = "super::refund_transactions::Entity")]
    RefundTransactions,
    #[sea_orm(
        belongs_to = "super::source_documents::Entity",
        from = "Column::SourceId",
        to = "super::source_documents::Column::Id"
    )]
    SourceDocuments,
}

impl Related<super::credit_note_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditNoteItems.def()
    }
}

impl Related<super::credit_note_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditNoteSplits.def()
    }
}

impl Related<super::refund_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefundTransactions.def()
    }
}

impl Related<super::source_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
