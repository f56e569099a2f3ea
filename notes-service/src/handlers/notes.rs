//! Note endpoints
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/api/v1/notes` | paginated list |
//! | POST | `/api/v1/notes` | create |
//! | GET | `/api/v1/notes/{id}` | fetch |
//! | PATCH | `/api/v1/notes/{id}` | partial update |
//! | DELETE | `/api/v1/notes/{id}` | delete |

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::error::{ApiError, ApiOperation};
use super::owner::Owner;
use crate::{
    ids::NoteId,
    listing::{owned_note_filter, ListError, ListParams, ListResponse},
    notes::{NewNote, Note, NotePatch},
    state::AppState,
    store::{NoteStore, StoreError, StoreOperation},
};

/// Routes for the notes collection
pub fn routes<S: NoteStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/v1/notes", get(list_notes::<S>).post(create_note::<S>))
        .route(
            "/api/v1/notes/{id}",
            get(get_note::<S>)
                .patch(update_note::<S>)
                .delete(delete_note::<S>),
        )
}

/// `GET /api/v1/notes`
///
/// The call is bounded by `listing.query_timeout_ms`. The store calls share
/// a cancellation token that fires on timeout or when the client goes away.
pub async fn list_notes<S: NoteStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(params) = query?;
    let request = params.validate()?;

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let deadline = state.config().listing.query_timeout();

    match tokio::time::timeout(deadline, state.lister().list(&owner, &request, &cancel)).await {
        Ok(result) => Ok(Json(result?)),
        Err(_) => {
            cancel.cancel();
            let mode = request.mode.kind();
            tracing::warn!(
                %mode,
                owner = %owner,
                timeout_ms = state.config().listing.query_timeout_ms,
                "List request exceeded its deadline"
            );
            Err(ListError::Store {
                mode,
                source: StoreError::timeout(StoreOperation::Find, "list deadline elapsed"),
            }
            .into())
        }
    }
}

/// `GET /api/v1/notes/{id}`
pub async fn get_note<S: NoteStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_id(&id, ApiOperation::Get)?;

    state
        .store()
        .find_one(owned_note_filter(&owner, id), &CancellationToken::new())
        .await
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Get))?
        .map(Json)
        .ok_or_else(|| note_not_found(id, ApiOperation::Get))
}

/// `POST /api/v1/notes`
pub async fn create_note<S: NoteStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    input: Result<Json<NewNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(input) = input?;
    input.validate()?;

    let note = state
        .store()
        .insert(Note::create(owner, input, Utc::now()))
        .await?;

    tracing::info!(id = %note.id, owner = %note.owner_id, "Created note");
    Ok((StatusCode::CREATED, Json(note)))
}

/// `PATCH /api/v1/notes/{id}`
pub async fn update_note<S: NoteStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    patch: Result<Json<NotePatch>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_id(&id, ApiOperation::Update)?;
    let Json(patch) = patch.map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    patch
        .validate()
        .map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    if patch.is_empty() {
        return Err(
            ApiError::bad_request("patch must set title, body or color")
                .with_operation(ApiOperation::Update),
        );
    }

    let note = state
        .store()
        .update(&owner, &id, patch)
        .await?
        .ok_or_else(|| note_not_found(id, ApiOperation::Update))?;

    tracing::debug!(id = %note.id, "Updated note");
    Ok(Json(note))
}

/// `DELETE /api/v1/notes/{id}`
pub async fn delete_note<S: NoteStore>(
    State(state): State<AppState<S>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, ApiOperation::Delete)?;

    if !state.store().delete(&owner, &id).await? {
        return Err(note_not_found(id, ApiOperation::Delete));
    }

    tracing::info!(id = %id, owner = %owner, "Deleted note");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str, operation: ApiOperation) -> Result<NoteId, ApiError> {
    raw.parse().map_err(|e| {
        ApiError::bad_request(format!("invalid note id: {}", e)).with_operation(operation)
    })
}

fn note_not_found(id: NoteId, operation: ApiOperation) -> ApiError {
    ApiError::not_found(format!("note {} not found", id)).with_operation(operation)
}
