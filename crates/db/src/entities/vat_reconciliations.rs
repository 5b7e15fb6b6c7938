//! `SeaORM` Entity for vat_reconciliations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VatPaymentStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vat_reconciliations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub period_start: Date,
    pub period_end: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub vat_collected: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub vat_paid: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub net_liability: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount_settled: Decimal,
    pub payment_status: VatPaymentStatus,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vat_payments::Entity")]
    VatPayments,
}

impl Related<super::vat_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VatPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
