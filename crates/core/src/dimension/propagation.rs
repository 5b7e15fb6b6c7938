//! Dimensional assignment propagation.
//!
//! Derived transactions (credit notes, refunds) inherit the cost attribution
//! of the transaction they derive from. The values come from the primary
//! line of the originating transaction; callers may override a value per
//! dimension or split a dimension across several values.

use serde::{Deserialize, Serialize};
use tijara_shared::types::{DimensionId, DimensionValueId};
use tracing::warn;

use super::catalog::DimensionResolver;
use super::types::{DimensionAssignment, DimensionOverride, DimensionSplit, OverrideRecord};
use crate::ledger::{Direction, DraftLine, LedgerError};

/// A line of the originating transaction, as needed for propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginLine {
    /// Name of the account the line was posted to.
    pub account_name: String,
    /// Debit or credit.
    pub direction: Direction,
    /// Assignments recorded on the line.
    pub assignments: Vec<DimensionAssignment>,
}

/// Assignments to attach to every derived line, plus the overrides applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationOutcome {
    /// Assignments for each derived line.
    pub assignments: Vec<DimensionAssignment>,
    /// Propagated values that were replaced.
    pub overrides: Vec<OverrideRecord>,
}

impl PropagationOutcome {
    /// Returns true when nothing is to be attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Attaches the assignments to every line.
    pub fn apply_to(&self, lines: &mut [DraftLine]) {
        for line in lines {
            line.assignments.clone_from(&self.assignments);
        }
    }
}

/// Stateless propagation service.
pub struct DimensionPropagator;

impl DimensionPropagator {
    /// The line whose assignments are propagated: the first credit line
    /// posted to a sales or revenue account, else the first line.
    #[must_use]
    pub fn primary_line(lines: &[OriginLine]) -> Option<&OriginLine> {
        lines
            .iter()
            .find(|l| {
                let name = l.account_name.to_lowercase();
                l.direction == Direction::Credit
                    && (name.contains("sales") || name.contains("revenue"))
            })
            .or_else(|| lines.first())
    }

    /// Resolves the assignments for derived lines.
    ///
    /// With no originating assignment, no override and no split the outcome
    /// is empty.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` for an unknown, inactive or mismatched override or
    /// split value; `AllocationExceeded` when a split totals more than 100%.
    pub fn propagate(
        origin: &[OriginLine],
        overrides: &[DimensionOverride],
        splits: &[DimensionSplit],
        resolver: &impl DimensionResolver,
    ) -> Result<PropagationOutcome, LedgerError> {
        let mut assignments: Vec<DimensionAssignment> = Self::primary_line(origin)
            .map(|l| l.assignments.clone())
            .unwrap_or_default();
        let mut records = Vec::new();

        for ov in overrides {
            Self::validate_member(ov.dimension_id, ov.value_id, resolver)?;

            for original in assignments
                .iter()
                .filter(|a| a.dimension_id == ov.dimension_id && a.value_id != ov.value_id)
            {
                records.push(OverrideRecord {
                    dimension_id: ov.dimension_id,
                    original_value_id: original.value_id,
                    override_value_id: ov.value_id,
                });
            }

            assignments.retain(|a| a.dimension_id != ov.dimension_id);
            assignments.push(DimensionAssignment::full(ov.dimension_id, ov.value_id));
        }

        for split in splits {
            for (value_id, _) in &split.shares {
                Self::validate_member(split.dimension_id, *value_id, resolver)?;
            }
            split.check_shares()?;

            assignments.retain(|a| a.dimension_id != split.dimension_id);
            assignments.extend(split.shares.iter().map(|(value_id, percentage)| {
                DimensionAssignment {
                    dimension_id: split.dimension_id,
                    value_id: *value_id,
                    percentage: *percentage,
                }
            }));
        }

        for record in &records {
            warn!(
                dimension_id = %record.dimension_id,
                original_value_id = %record.original_value_id,
                override_value_id = %record.override_value_id,
                "Dimension override applied to derived lines"
            );
        }

        Ok(PropagationOutcome {
            assignments,
            overrides: records,
        })
    }

    fn validate_member(
        dimension_id: DimensionId,
        value_id: DimensionValueId,
        resolver: &impl DimensionResolver,
    ) -> Result<(), LedgerError> {
        let value = resolver.require_active(value_id)?;
        if value.dimension_id != dimension_id {
            return Err(LedgerError::InvalidDimension {
                value_id,
                reason: format!(
                    "value {} belongs to dimension {}, not {dimension_id}",
                    value.code, value.dimension_id
                ),
            });
        }
        Ok(())
    }
}
