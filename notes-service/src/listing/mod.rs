//! Hybrid pagination engine
//!
//! Lists one owner's notes under three mutually exclusive strategies that
//! share a single response shape:
//!
//! - **Cursor** paging forward or backward from an opaque position marker
//! - **Offset** paging by absolute position, with range checking
//! - **Anchor** windows centred on a given note
//!
//! All three order by `(sort field, id)`, so pages are stable even when many
//! notes share a title or timestamp.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use notes_service::listing::{ListParams, NoteLister};
//! use notes_service::notes::{NewNote, Note, OwnerId};
//! use notes_service::store::{MemoryNoteStore, NoteStore};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryNoteStore::new());
//! let owner = OwnerId::new("user-1");
//! store
//!     .insert(Note::create(owner.clone(), NewNote::default(), chrono::Utc::now()))
//!     .await
//!     .unwrap();
//!
//! let request = ListParams::new().with_limit(10).validate().unwrap();
//! let page = NoteLister::new(store)
//!     .list(&owner, &request, &CancellationToken::new())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(page.notes.len(), 1);
//! assert!(!page.has_more);
//! # }
//! ```

mod builder;
mod counting;
mod cursor;
mod error;
mod orchestrator;
mod request;
mod response;

pub use builder::{
    owned_note_filter, owner_filter, search_filter, Boundary, NoteQueryBuilder,
    TEXT_SEARCH_MIN_CHARS,
};
pub use counting::{count_totals, Totals};
pub use cursor::{encode_composite, encode_simple, Cursor, CursorError};
pub use error::{ListError, ListModeKind};
pub use orchestrator::NoteLister;
pub use request::{
    ListMode, ListParams, ListRequest, PageDirection, SortField, DEFAULT_LIMIT, DEFAULT_SPAN,
    MAX_LIMIT, MAX_OFFSET, MAX_QUERY_CHARS, MAX_SPAN, MIN_LIMIT,
};
pub use response::ListResponse;
