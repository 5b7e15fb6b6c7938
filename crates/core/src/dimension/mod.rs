//! Dimensional cost attribution.
//!
//! - `types` - Dimensions, values, assignments, overrides and splits
//! - `catalog` - The `DimensionResolver` port and its in-memory snapshot
//! - `propagation` - Carrying assignments onto derived lines

pub mod catalog;
pub mod propagation;
pub mod types;

#[cfg(test)]
mod propagation_props;

pub use catalog::{DimensionCatalog, DimensionResolver};
pub use propagation::{DimensionPropagator, OriginLine, PropagationOutcome};
pub use types::{
    COST_CENTER, DEPARTMENT, Dimension, DimensionAssignment, DimensionOverride, DimensionSplit,
    DimensionValue, DocumentDimensions, OverrideRecord, PROJECT, STANDARD_DIMENSIONS,
};
