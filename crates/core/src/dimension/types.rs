//! Dimension domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tijara_shared::types::{DimensionId, DimensionValueId};

use crate::ledger::LedgerError;

/// Code of the cost center dimension.
pub const COST_CENTER: &str = "cost_center";
/// Code of the project dimension.
pub const PROJECT: &str = "project";
/// Code of the department dimension.
pub const DEPARTMENT: &str = "department";

/// The dimensions every branch is seeded with.
pub const STANDARD_DIMENSIONS: [(&str, &str); 3] = [
    (COST_CENTER, "Cost Center"),
    (PROJECT, "Project"),
    (DEPARTMENT, "Department"),
];

/// A named dimension (cost center, project, department, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension ID.
    pub id: DimensionId,
    /// Stable code, e.g. `cost_center`.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// A value of a dimension, e.g. cost center `CC-01`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValue {
    /// Value ID.
    pub id: DimensionValueId,
    /// Owning dimension.
    pub dimension_id: DimensionId,
    /// Code, unique within the dimension.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Inactive values cannot be assigned.
    pub is_active: bool,
}

/// Attribution of a ledger line to a dimension value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionAssignment {
    /// The dimension.
    pub dimension_id: DimensionId,
    /// The value within that dimension.
    pub value_id: DimensionValueId,
    /// Share of the line, 0 < p <= 100.
    pub percentage: Decimal,
}

impl DimensionAssignment {
    /// A full (100%) assignment.
    #[must_use]
    pub fn full(dimension_id: DimensionId, value_id: DimensionValueId) -> Self {
        Self {
            dimension_id,
            value_id,
            percentage: Decimal::ONE_HUNDRED,
        }
    }
}

/// Optional dimension values carried by a document header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDimensions {
    /// Cost center value.
    pub cost_center_id: Option<DimensionValueId>,
    /// Project value.
    pub project_id: Option<DimensionValueId>,
    /// Department value.
    pub department_id: Option<DimensionValueId>,
}

impl DocumentDimensions {
    /// Returns the set values paired with their dimension code.
    #[must_use]
    pub fn values(&self) -> Vec<(&'static str, DimensionValueId)> {
        [
            (COST_CENTER, self.cost_center_id),
            (PROJECT, self.project_id),
            (DEPARTMENT, self.department_id),
        ]
        .into_iter()
        .filter_map(|(code, value)| value.map(|v| (code, v)))
        .collect()
    }

    /// Returns true when no dimension is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cost_center_id.is_none() && self.project_id.is_none() && self.department_id.is_none()
    }
}

/// Replacement of a propagated value for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionOverride {
    /// The dimension being overridden.
    pub dimension_id: DimensionId,
    /// The replacement value.
    pub value_id: DimensionValueId,
}

/// Explicit split of derived lines across several values of one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSplit {
    /// The dimension being split.
    pub dimension_id: DimensionId,
    /// `(value, percentage)` shares; must sum to at most 100.
    pub shares: Vec<(DimensionValueId, Decimal)>,
}

impl DimensionSplit {
    /// Sum of the share percentages.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.shares.iter().map(|(_, percentage)| *percentage).sum()
    }

    /// Checks the shares without looking the values up.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` for a share outside `(0, 100]` or a value listed
    /// twice; `AllocationExceeded` when the shares total more than 100.
    pub fn check_shares(&self) -> Result<(), LedgerError> {
        for (i, (value_id, percentage)) in self.shares.iter().enumerate() {
            if *percentage <= Decimal::ZERO || *percentage > Decimal::ONE_HUNDRED {
                return Err(LedgerError::InvalidDimension {
                    value_id: *value_id,
                    reason: format!("allocation {percentage}% must be within (0, 100]"),
                });
            }
            if self.shares[..i].iter().any(|(seen, _)| seen == value_id) {
                return Err(LedgerError::InvalidDimension {
                    value_id: *value_id,
                    reason: "value is split more than once".into(),
                });
            }
        }
        let total = self.total();
        if total > Decimal::ONE_HUNDRED {
            return Err(LedgerError::AllocationExceeded {
                dimension_id: self.dimension_id,
                total,
            });
        }
        Ok(())
    }
}

/// An override that replaced a propagated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// The dimension.
    pub dimension_id: DimensionId,
    /// Value found on the originating transaction.
    pub original_value_id: DimensionValueId,
    /// Value applied to the derived lines instead.
    pub override_value_id: DimensionValueId,
}
