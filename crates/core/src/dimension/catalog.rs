//! Dimension resolution port and the in-memory catalog snapshot.

use std::collections::HashMap;

use tijara_shared::types::{DimensionId, DimensionValueId};

use super::types::{Dimension, DimensionOverride, DimensionValue, DocumentDimensions};
use crate::ledger::LedgerError;

/// Looks up dimensions and their values.
pub trait DimensionResolver {
    /// Returns the value with `id`, active or not.
    fn value(&self, id: DimensionValueId) -> Option<&DimensionValue>;

    /// Returns the dimension with `code`.
    fn dimension_by_code(&self, code: &str) -> Option<&Dimension>;

    /// Returns the value if it exists and is active.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` when the value is unknown or inactive.
    fn require_active(&self, id: DimensionValueId) -> Result<&DimensionValue, LedgerError> {
        let value = self.value(id).ok_or_else(|| LedgerError::InvalidDimension {
            value_id: id,
            reason: "unknown dimension value".into(),
        })?;
        if !value.is_active {
            return Err(LedgerError::InvalidDimension {
                value_id: id,
                reason: format!("dimension value {} is inactive", value.code),
            });
        }
        Ok(value)
    }

    /// Turns header dimension fields into validated overrides.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` when a value is unknown, inactive, or does not
    /// belong to the dimension of the field it was set on.
    fn overrides_for(
        &self,
        dimensions: &DocumentDimensions,
    ) -> Result<Vec<DimensionOverride>, LedgerError> {
        dimensions
            .values()
            .into_iter()
            .map(|(code, value_id)| {
                let value = self.require_active(value_id)?;
                let dimension =
                    self.dimension_by_code(code)
                        .ok_or_else(|| LedgerError::InvalidDimension {
                            value_id,
                            reason: format!("dimension {code} is not configured"),
                        })?;
                if value.dimension_id != dimension.id {
                    return Err(LedgerError::InvalidDimension {
                        value_id,
                        reason: format!("value {} does not belong to {code}", value.code),
                    });
                }
                Ok(DimensionOverride {
                    dimension_id: dimension.id,
                    value_id,
                })
            })
            .collect()
    }
}

/// Snapshot of a branch's dimensions and values.
#[derive(Debug, Clone, Default)]
pub struct DimensionCatalog {
    dimensions: HashMap<DimensionId, Dimension>,
    values: HashMap<DimensionValueId, DimensionValue>,
}

impl DimensionCatalog {
    /// Builds a catalog from loaded rows.
    #[must_use]
    pub fn new(dimensions: Vec<Dimension>, values: Vec<DimensionValue>) -> Self {
        Self {
            dimensions: dimensions.into_iter().map(|d| (d.id, d)).collect(),
            values: values.into_iter().map(|v| (v.id, v)).collect(),
        }
    }

    /// Returns the dimension with `id`.
    #[must_use]
    pub fn dimension(&self, id: DimensionId) -> Option<&Dimension> {
        self.dimensions.get(&id)
    }

    /// Active values of a dimension, sorted by code.
    #[must_use]
    pub fn active_values(&self, dimension_id: DimensionId) -> Vec<&DimensionValue> {
        let mut values: Vec<&DimensionValue> = self
            .values
            .values()
            .filter(|v| v.dimension_id == dimension_id && v.is_active)
            .collect();
        values.sort_by(|a, b| a.code.cmp(&b.code));
        values
    }
}

impl DimensionResolver for DimensionCatalog {
    fn value(&self, id: DimensionValueId) -> Option<&DimensionValue> {
        self.values.get(&id)
    }

    fn dimension_by_code(&self, code: &str) -> Option<&Dimension> {
        self.dimensions.values().find(|d| d.code == code)
    }
}
