//! Contacts Core
//!
//! Deduplication and import reconciliation for owner-scoped contact books.
//!
//! # Architecture
//!
//! - **Types**: `Contact`, `ImportCandidate` and friends live in the `shared-types` crate
//! - **Store boundary**: [`ContactStore`] is implemented by the persistence layer; this crate
//!   never persists anything itself
//! - **Policy**: [`find_duplicate`], [`ImportReconciler`] and [`create_contact`]
//! - **Sources**: CSV, vCard and Google People pages mapped to candidates
//!
//! # Example
//!
//! ```rust,ignore
//! use contacts_core::{ImportReconciler, MemoryContactStore, sources::CsvContactParser};
//!
//! let store = MemoryContactStore::new();
//! let candidates = CsvContactParser::new().parse_candidates(bytes)?;
//! let summary = ImportReconciler::new(&store).reconcile("owner-1", candidates).await?;
//! ```

pub mod creation;
pub mod phone;
pub mod reconcile;
pub mod resolver;
pub mod sources;
pub mod store;

pub use creation::{create_contact, prepare_contact, CreateContactError};
pub use phone::normalize_phone;
pub use reconcile::{ImportOutcome, ImportReconciler, ReconcileError, MISSING_NAME_OR_PHONE};
pub use resolver::{find_duplicate, DuplicateResult, MatchPolicy};
pub use store::{ContactStore, MemoryContactStore, StoreError};
