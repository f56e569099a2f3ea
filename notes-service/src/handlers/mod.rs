//! HTTP handlers for the notes API
//!
//! - [`notes`]: list, get, create, update and delete endpoints
//! - [`Owner`]: caller identity extractor
//! - [`ApiError`]: structured errors with HTTP status mapping

mod error;
pub mod notes;
mod owner;

pub use error::{ApiError, ApiErrorKind, ApiErrorResponse, ApiOperation};
pub use owner::Owner;
