//! Listing error taxonomy

use std::fmt;

use super::cursor::CursorError;
use super::request::{MAX_LIMIT, MIN_LIMIT};
use crate::store::StoreError;

/// Pagination strategy a request was dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListModeKind {
    /// Forward or backward paging from a position marker
    Cursor,
    /// Absolute skip/limit positioning
    Offset,
    /// Window centred on a note
    Anchor,
}

impl fmt::Display for ListModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cursor => write!(f, "cursor"),
            Self::Offset => write!(f, "offset"),
            Self::Anchor => write!(f, "anchor"),
        }
    }
}

/// Failure of a list request
///
/// Every variant except [`ListError::Store`] is detected from the request
/// alone or from a missing row, and never leaves side effects.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// A cursor or anchor could not be decoded
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// The page size is out of bounds
    #[error("limit must be between {min} and {max}, got {0}", min = MIN_LIMIT, max = MAX_LIMIT)]
    InvalidLimit(i64),

    /// Conflicting or malformed parameters
    #[error("{0}")]
    BadRequest(String),

    /// Offset paging past the end of the result set
    #[error("offset {offset} is beyond the {total} matching notes")]
    OffsetBeyondTotal { offset: u64, total: u64 },

    /// The referenced note does not exist for this caller or filter set
    #[error("{0}")]
    NotFound(String),

    /// The store failed while serving the request
    #[error("{mode} listing failed: {source}")]
    Store {
        mode: ListModeKind,
        #[source]
        source: StoreError,
    },
}

impl ListError {
    /// Shorthand for [`ListError::BadRequest`]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}
