//! Caller identity extraction
//!
//! Authentication happens in the gateway in front of this service. The
//! gateway forwards the authenticated user id in the header named by
//! `auth.owner_header`; every note operation is scoped to that id.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::ApiError;
use crate::{notes::OwnerId, state::AppState, store::NoteStore};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub OwnerId);

impl<S: NoteStore> FromRequestParts<AppState<S>> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config().auth.owner_header.as_str();
        let value = parts
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized(format!("missing {} header", header)))?;

        Ok(Self(OwnerId::new(value)))
    }
}
