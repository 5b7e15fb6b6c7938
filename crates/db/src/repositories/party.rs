//! Branch and party repositories.
//!
//! Branches scope every ledger row. Parties (customers and suppliers) carry
//! the credit limit and the outstanding balance checked when a credit sale
//! is posted.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use tijara_core::ledger::CreditPosition;
use tijara_shared::types::{BranchId, PartyId};
use uuid::Uuid;

use super::error::RepositoryError;
use crate::entities::sea_orm_active_enums::PartyKind;
use crate::entities::{branches, parties};

/// Branch repository.
#[derive(Debug, Clone)]
pub struct BranchRepository {
    db: DatabaseConnection,
}

impl BranchRepository {
    /// Creates a new branch repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a branch.
    ///
    /// # Errors
    ///
    /// `DuplicateCode` when the code is taken.
    pub async fn create(&self, code: &str, name: &str) -> Result<branches::Model, RepositoryError> {
        if self.find_by_code(code).await?.is_some() {
            return Err(RepositoryError::DuplicateCode(code.to_owned()));
        }
        let branch = branches::ActiveModel {
            id: Set(BranchId::new().into_inner()),
            code: Set(code.to_owned()),
            name: Set(name.to_owned()),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(branch.insert(&self.db).await?)
    }

    /// Finds a branch by code.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<branches::Model>, RepositoryError> {
        Ok(branches::Entity::find()
            .filter(branches::Column::Code.eq(code))
            .one(&self.db)
            .await?)
    }
}

/// Input for creating a party.
#[derive(Debug, Clone)]
pub struct CreatePartyInput {
    /// Owning branch.
    pub branch_id: BranchId,
    /// Customer or supplier.
    pub kind: PartyKind,
    /// Display name.
    pub name: String,
    /// Credit limit; `None` means unlimited.
    pub credit_limit: Option<Decimal>,
}

/// Party repository.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a party with nothing outstanding.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn create(
        &self,
        input: CreatePartyInput,
    ) -> Result<parties::Model, RepositoryError> {
        let now = chrono::Utc::now().into();
        let party = parties::ActiveModel {
            id: Set(PartyId::new().into_inner()),
            branch_id: Set(input.branch_id.into_inner()),
            kind: Set(input.kind),
            name: Set(input.name),
            credit_limit: Set(input.credit_limit),
            outstanding: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(party.insert(&self.db).await?)
    }

    /// Finds a party.
    ///
    /// # Errors
    ///
    /// `PartyNotFound`, or a database error.
    pub async fn find(&self, party_id: PartyId) -> Result<parties::Model, RepositoryError> {
        parties::Entity::find_by_id(party_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::PartyNotFound(party_id.into_inner()))
    }

    /// Sets or clears the credit limit.
    ///
    /// # Errors
    ///
    /// `PartyNotFound`, or a database error.
    pub async fn set_credit_limit(
        &self,
        party_id: PartyId,
        credit_limit: Option<Decimal>,
    ) -> Result<parties::Model, RepositoryError> {
        let party = self.find(party_id).await?;
        let mut active: parties::ActiveModel = party.into();
        active.credit_limit = Set(credit_limit);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }
}

/// Locks a party row and returns its credit position.
pub(crate) async fn lock_credit_position<C>(
    conn: &C,
    party_id: Uuid,
) -> Result<CreditPosition, RepositoryError>
where
    C: ConnectionTrait,
{
    let party = parties::Entity::find_by_id(party_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(RepositoryError::PartyNotFound(party_id))?;
    Ok(CreditPosition {
        party_id: party.id.into(),
        credit_limit: party.credit_limit,
        outstanding: party.outstanding,
    })
}

/// Adds `change` (negative to reduce) to a party's outstanding balance.
pub(crate) async fn adjust_outstanding<C>(
    conn: &C,
    party_id: Uuid,
    change: Decimal,
) -> Result<(), RepositoryError>
where
    C: ConnectionTrait,
{
    parties::Entity::update_many()
        .col_expr(
            parties::Column::Outstanding,
            sea_orm::sea_query::Expr::col(parties::Column::Outstanding).add(change),
        )
        .col_expr(
            parties::Column::UpdatedAt,
            sea_orm::sea_query::Expr::value(chrono::Utc::now()),
        )
        .filter(parties::Column::Id.eq(party_id))
        .exec(conn)
        .await?;
    Ok(())
}
