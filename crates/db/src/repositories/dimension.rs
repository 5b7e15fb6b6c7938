//! Dimension repository for dimensions and their values.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tijara_core::dimension::{Dimension, DimensionCatalog, DimensionValue, STANDARD_DIMENSIONS};
use tijara_shared::types::{BranchId, DimensionId, DimensionValueId};
use tracing::info;

use super::error::RepositoryError;
use crate::entities::{dimension_values, dimensions};

/// Input for creating a dimension value.
#[derive(Debug, Clone)]
pub struct CreateDimensionValueInput {
    /// Dimension the value belongs to.
    pub dimension_id: DimensionId,
    /// Value code (unique within the dimension).
    pub code: String,
    /// Value name.
    pub name: String,
}

/// Dimension repository.
#[derive(Debug, Clone)]
pub struct DimensionRepository {
    db: DatabaseConnection,
}

impl DimensionRepository {
    /// Creates a new dimension repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a dimension in a branch.
    ///
    /// # Errors
    ///
    /// `DuplicateCode` when the branch already has the code.
    pub async fn create_dimension(
        &self,
        branch_id: BranchId,
        code: &str,
        name: &str,
    ) -> Result<dimensions::Model, RepositoryError> {
        let existing = dimensions::Entity::find()
            .filter(dimensions::Column::BranchId.eq(branch_id.into_inner()))
            .filter(dimensions::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::DuplicateCode(code.to_owned()));
        }

        let dimension = dimensions::ActiveModel {
            id: Set(DimensionId::new().into_inner()),
            branch_id: Set(branch_id.into_inner()),
            code: Set(code.to_owned()),
            name: Set(name.to_owned()),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(dimension.insert(&self.db).await?)
    }

    /// Creates the cost center, project and department dimensions a branch
    /// is missing, and returns all three.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn ensure_standard(
        &self,
        branch_id: BranchId,
    ) -> Result<Vec<dimensions::Model>, RepositoryError> {
        let mut standard = Vec::with_capacity(STANDARD_DIMENSIONS.len());
        for (code, name) in STANDARD_DIMENSIONS {
            let existing = dimensions::Entity::find()
                .filter(dimensions::Column::BranchId.eq(branch_id.into_inner()))
                .filter(dimensions::Column::Code.eq(code))
                .one(&self.db)
                .await?;
            let dimension = match existing {
                Some(dimension) => dimension,
                None => {
                    info!(branch_id = %branch_id, code, "Creating standard dimension");
                    self.create_dimension(branch_id, code, name).await?
                }
            };
            standard.push(dimension);
        }
        Ok(standard)
    }

    /// Finds a dimension by code within a branch.
    ///
    /// # Errors
    ///
    /// `DimensionNotFound`, or a database error.
    pub async fn find_dimension(
        &self,
        branch_id: BranchId,
        code: &str,
    ) -> Result<dimensions::Model, RepositoryError> {
        dimensions::Entity::find()
            .filter(dimensions::Column::BranchId.eq(branch_id.into_inner()))
            .filter(dimensions::Column::Code.eq(code))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::DimensionNotFound(code.to_owned()))
    }

    /// Creates a value under a dimension.
    ///
    /// # Errors
    ///
    /// `DimensionNotFound`, `DuplicateCode` within the dimension, or a
    /// database error.
    pub async fn create_value(
        &self,
        input: CreateDimensionValueInput,
    ) -> Result<dimension_values::Model, RepositoryError> {
        let dimension_id = input.dimension_id.into_inner();
        if dimensions::Entity::find_by_id(dimension_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(RepositoryError::DimensionNotFound(dimension_id.to_string()));
        }

        let existing = dimension_values::Entity::find()
            .filter(dimension_values::Column::DimensionId.eq(dimension_id))
            .filter(dimension_values::Column::Code.eq(&input.code))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::DuplicateCode(input.code));
        }

        let now = chrono::Utc::now().into();
        let value = dimension_values::ActiveModel {
            id: Set(DimensionValueId::new().into_inner()),
            dimension_id: Set(dimension_id),
            code: Set(input.code),
            name: Set(input.name),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(value.insert(&self.db).await?)
    }

    /// Activates or deactivates a value. Inactive values are rejected when
    /// set on documents; existing assignments are untouched.
    ///
    /// # Errors
    ///
    /// `DimensionValueNotFound`, or a database error.
    pub async fn set_value_active(
        &self,
        value_id: DimensionValueId,
        is_active: bool,
    ) -> Result<dimension_values::Model, RepositoryError> {
        let value = dimension_values::Entity::find_by_id(value_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::DimensionValueNotFound(value_id.into_inner()))?;

        let mut active: dimension_values::ActiveModel = value.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Loads the dimension catalog of a branch.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn catalog(&self, branch_id: BranchId) -> Result<DimensionCatalog, RepositoryError> {
        load_catalog(&self.db, branch_id).await
    }
}

pub(crate) async fn load_catalog<C>(
    conn: &C,
    branch_id: BranchId,
) -> Result<DimensionCatalog, RepositoryError>
where
    C: ConnectionTrait,
{
    let rows = dimensions::Entity::find()
        .filter(dimensions::Column::BranchId.eq(branch_id.into_inner()))
        .order_by_asc(dimensions::Column::Code)
        .find_with_related(dimension_values::Entity)
        .all(conn)
        .await?;

    let mut catalog_dimensions = Vec::with_capacity(rows.len());
    let mut catalog_values = Vec::new();
    for (dimension, values) in rows {
        catalog_values.extend(values.into_iter().map(|value| DimensionValue {
            id: value.id.into(),
            dimension_id: value.dimension_id.into(),
            code: value.code,
            name: value.name,
            is_active: value.is_active,
        }));
        catalog_dimensions.push(Dimension {
            id: dimension.id.into(),
            code: dimension.code,
            name: dimension.name,
        });
    }
    Ok(DimensionCatalog::new(catalog_dimensions, catalog_values))
}
