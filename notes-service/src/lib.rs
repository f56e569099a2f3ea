//! # notes-service
//!
//! Notes HTTP service whose list endpoint combines three pagination
//! strategies behind one response shape: cursor paging (forward and
//! backward), offset paging with range checks, and anchor windows centred on
//! a note.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use notes_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::new(config.clone(), Arc::new(MemoryNoteStore::new()));
//!
//!     Server::new(config).serve(router(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod listing;
pub mod middleware;
pub mod notes;
pub mod observability;
pub mod server;
pub mod state;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiOperation, Owner};
    pub use crate::health::{health, readiness};
    pub use crate::ids::NoteId;
    pub use crate::listing::{ListError, ListParams, ListRequest, ListResponse, NoteLister};
    pub use crate::notes::{NewNote, Note, NotePatch, OwnerId};
    pub use crate::observability::init_tracing;
    pub use crate::server::{router, Server};
    pub use crate::state::AppState;
    pub use crate::store::{MemoryNoteStore, NoteStore};
}
