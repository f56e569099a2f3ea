//! Store adapter abstraction
//!
//! The listing core consumes the notes collection only through the
//! [`NoteStore`] trait: a predicate ([`Filter`]), an ordering ([`SortKey`]s),
//! a skip/limit window and a count. Everything about connections and indexes
//! belongs to the adapter.
//!
//! # Features
//!
//! - **Predicate tree**: [`Filter`] with conjunction, disjunction, field
//!   comparisons, pattern matches and full-text search
//! - **Compound ordering**: any number of [`SortKey`]s, most significant first
//! - **Cancellation**: every read takes a `CancellationToken`
//! - **Reference adapter**: [`MemoryNoteStore`]

mod error;
mod filter;
mod memory;
mod traits;

pub use error::{StoreError, StoreErrorKind, StoreOperation};
pub use filter::{
    Filter, FilterCondition, FilterOperator, FilterValue, NoteField, OrderDirection, SortKey,
    StoreQuery,
};
pub use memory::MemoryNoteStore;
pub use traits::{NoteStore, StoreResult};
