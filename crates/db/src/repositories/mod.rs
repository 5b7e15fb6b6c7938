//! Repository abstractions for data access.
//!
//! Repositories own the database transactions. They load state with the
//! rows locked, hand it to the pure engines in `tijara_core`, and write back
//! whatever the engine prepared before committing.

pub mod account;
pub mod aging;
pub mod credit_note;
pub mod dimension;
pub mod document;
pub mod error;
pub mod ledger;
pub mod party;
pub mod posting;
pub mod reconciliation;

pub use account::{AccountRepository, CreateAccountInput};
pub use aging::{AgingRepository, ProvisionOutcome};
pub use credit_note::{ApprovedCreditNote, CreditNoteRepository};
pub use dimension::{CreateDimensionValueInput, DimensionRepository};
pub use document::{NewDocumentLine, NewSourceDocument, SourceDocumentRepository};
pub use error::RepositoryError;
pub use ledger::{LedgerRepository, StoredLine, StoredTransaction};
pub use party::{BranchRepository, CreatePartyInput, PartyRepository};
pub use posting::PostingRepository;
pub use reconciliation::{ReconciliationRepository, VatPaymentInput};
