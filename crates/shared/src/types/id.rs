//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `CreditNoteId` where a
//! `SourceDocumentId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for the acting user.");
typed_id!(BranchId, "Unique identifier for a branch.");
typed_id!(PartyId, "Unique identifier for a customer or supplier.");
typed_id!(AccountId, "Unique identifier for a ledger account.");
typed_id!(
    LedgerTransactionId,
    "Unique identifier for a ledger transaction header."
);
typed_id!(LedgerLineId, "Unique identifier for a ledger line.");
typed_id!(DimensionId, "Unique identifier for a dimension.");
typed_id!(DimensionValueId, "Unique identifier for a dimension value.");
typed_id!(
    SourceDocumentId,
    "Unique identifier for a sale, invoice or purchase."
);
typed_id!(SourceLineId, "Unique identifier for a source document line.");
typed_id!(CreditNoteId, "Unique identifier for a credit note.");
typed_id!(CreditNoteItemId, "Unique identifier for a credit note item.");
typed_id!(RefundId, "Unique identifier for a refund transaction.");
typed_id!(
    VatReconciliationId,
    "Unique identifier for a VAT reconciliation."
);
