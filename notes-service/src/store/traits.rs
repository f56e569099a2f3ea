//! Store adapter contract
//!
//! The listing core reaches the document collection only through
//! [`NoteStore`]. Methods use RPITIT (Return Position Impl Trait In Traits), so
//! adapters write plain `async fn` without `async_trait`.
//!
//! Read methods take a [`CancellationToken`]. Adapters must stop work and
//! return a [`StoreErrorKind::Cancelled`](super::StoreErrorKind::Cancelled)
//! error once the token fires.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::error::StoreError;
use super::filter::{Filter, StoreQuery};
use crate::ids::NoteId;
use crate::notes::{Note, NotePatch, OwnerId};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Query and write capability over the notes collection
///
/// # Example
///
/// ```rust,ignore
/// use notes_service::store::{Filter, NoteStore, StoreQuery};
///
/// let rows = store
///     .find(&StoreQuery::new(filter).sort_by(keys).limit(51), &cancel)
///     .await?;
/// let total = store.count(&filter, &cancel).await?;
/// ```
pub trait NoteStore: Send + Sync + 'static {
    /// Fetch the rows matching `query.filter`, ordered by `query.sort`,
    /// after skipping `query.skip` rows and returning at most `query.limit`.
    fn find(
        &self,
        query: &StoreQuery,
        cancel: &CancellationToken,
    ) -> impl Future<Output = StoreResult<Vec<Note>>> + Send;

    /// Count the rows matching `filter`
    fn count(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Fetch the first row matching `filter`, if any
    fn find_one(
        &self,
        filter: Filter,
        cancel: &CancellationToken,
    ) -> impl Future<Output = StoreResult<Option<Note>>> + Send {
        async move {
            let rows = self.find(&StoreQuery::new(filter).limit(1), cancel).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Persist a new note
    fn insert(&self, note: Note) -> impl Future<Output = StoreResult<Note>> + Send;

    /// Apply `patch` to the note `id` owned by `owner`
    ///
    /// Returns `Ok(None)` when no such note exists for this owner.
    fn update(
        &self,
        owner: &OwnerId,
        id: &NoteId,
        patch: NotePatch,
    ) -> impl Future<Output = StoreResult<Option<Note>>> + Send;

    /// Remove the note `id` owned by `owner`
    ///
    /// Returns `true` if a note was removed.
    fn delete(&self, owner: &OwnerId, id: &NoteId)
        -> impl Future<Output = StoreResult<bool>> + Send;
}
