//! `SeaORM` Entity for vat_payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vat_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vat_reconciliation_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub payment_date: Date,
    pub reference: Option<String>,
    pub paid_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vat_reconciliations::Entity",
        from = "Column::VatReconciliationId",
        to = "super::vat_reconciliations::Column::Id"
    )]
    VatReconciliations,
}

impl Related<super::vat_reconciliations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VatReconciliations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
