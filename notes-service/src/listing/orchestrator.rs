//! Mode dispatch and page assembly
//!
//! [`NoteLister::list`] runs one validated [`ListRequest`] through exactly one
//! of the three pagination strategies:
//!
//! - **Cursor**: `limit + 1` rows past a boundary; the extra row only decides
//!   `has_more`. With [`PageDirection::Prev`] the rows before the boundary are
//!   read in reverse and flipped back into the requested order.
//! - **Offset**: count first, reject offsets past the end, then skip/limit.
//! - **Anchor**: up to `span` rows on each side of a note, plus the note.
//!
//! Independent store calls of one request run concurrently and share the
//! caller's cancellation token. Store failures are wrapped with the mode and
//! never retried.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::builder::{Boundary, NoteQueryBuilder};
use super::counting::count_totals;
use super::cursor::Cursor;
use super::error::{ListError, ListModeKind};
use super::request::{ListMode, ListRequest, PageDirection, SortField};
use super::response::ListResponse;
use crate::notes::{Note, OwnerId};
use crate::store::{
    FilterCondition, NoteField, NoteStore, StoreError, StoreOperation, StoreQuery, StoreResult,
};

/// Runs list requests against a [`NoteStore`]
#[derive(Debug)]
pub struct NoteLister<S> {
    store: Arc<S>,
}

impl<S> Clone for NoteLister<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: NoteStore> NoteLister<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// List `owner`'s notes.
    ///
    /// # Errors
    ///
    /// - [`ListError::NotFound`] when a cursor or anchor note no longer resolves
    /// - [`ListError::OffsetBeyondTotal`] when an offset is past the last row
    /// - [`ListError::Store`] when the store fails or `cancel` fires
    pub async fn list(
        &self,
        owner: &OwnerId,
        request: &ListRequest,
        cancel: &CancellationToken,
    ) -> Result<ListResponse, ListError> {
        let builder = NoteQueryBuilder::new(owner, request);
        let mode = request.mode.kind();

        let response = match &request.mode {
            ListMode::Cursor { cursor, direction } => {
                self.cursor_page(&builder, request.limit, cursor.as_ref(), *direction, cancel)
                    .await
            }
            ListMode::Offset { offset } => {
                self.offset_page(&builder, request.limit, *offset, cancel)
                    .await
            }
            ListMode::Anchor { anchor, span } => {
                self.anchor_window(&builder, anchor, *span, cancel).await
            }
        }?;

        tracing::debug!(
            %mode,
            sort = %request.sort,
            order = %request.order,
            limit = request.limit,
            returned = response.notes.len(),
            has_more = response.has_more,
            total = response.total_count,
            "Listed notes"
        );
        Ok(response)
    }

    async fn cursor_page(
        &self,
        builder: &NoteQueryBuilder<'_>,
        limit: u32,
        cursor: Option<&Cursor>,
        direction: PageDirection,
        cancel: &CancellationToken,
    ) -> Result<ListResponse, ListError> {
        let mode = ListModeKind::Cursor;
        let store = self.store.as_ref();
        let sort = builder.sort();

        let Some(cursor) = cursor else {
            let query = StoreQuery::new(builder.base_filter())
                .sort_by(builder.sort_keys(builder.order()))
                .limit(u64::from(limit) + 1);
            let (totals, rows) = tokio::try_join!(
                count_totals(store, builder, mode, cancel),
                guarded(mode, StoreOperation::Find, cancel, store.find(&query, cancel)),
            )?;

            let (rows, has_more) = split_extra(rows, limit);
            let next = has_more.then(|| encode_at(rows.last(), sort)).flatten();
            return Ok(ListResponse::new(rows, has_more, totals).with_cursors(None, next));
        };

        let (totals, boundary) = tokio::try_join!(
            count_totals(store, builder, mode, cancel),
            self.resolve_boundary(builder, cursor, cancel),
        )?;

        let read_order = match direction {
            PageDirection::Next => builder.order(),
            PageDirection::Prev => builder.order().reversed(),
        };
        let query = StoreQuery::new(
            builder
                .base_filter()
                .and(builder.after(&boundary, read_order)),
        )
        .sort_by(builder.sort_keys(read_order))
        .limit(u64::from(limit) + 1);

        let rows = guarded(mode, StoreOperation::Find, cancel, store.find(&query, cancel)).await?;
        let (mut rows, has_more) = split_extra(rows, limit);

        let (prev, next) = match direction {
            PageDirection::Next => (
                encode_at(rows.first(), sort),
                has_more.then(|| encode_at(rows.last(), sort)).flatten(),
            ),
            PageDirection::Prev => {
                rows.reverse();
                (
                    has_more.then(|| encode_at(rows.first(), sort)).flatten(),
                    encode_at(rows.last(), sort),
                )
            }
        };

        Ok(ListResponse::new(rows, has_more, totals).with_cursors(prev, next))
    }

    async fn offset_page(
        &self,
        builder: &NoteQueryBuilder<'_>,
        limit: u32,
        offset: u64,
        cancel: &CancellationToken,
    ) -> Result<ListResponse, ListError> {
        let mode = ListModeKind::Offset;
        let store = self.store.as_ref();

        let totals = count_totals(store, builder, mode, cancel).await?;
        if offset >= totals.total && (totals.total > 0 || offset > 0) {
            return Err(ListError::OffsetBeyondTotal {
                offset,
                total: totals.total,
            });
        }

        let query = StoreQuery::new(builder.base_filter())
            .sort_by(builder.sort_keys(builder.order()))
            .skip(offset)
            .limit(u64::from(limit));
        let rows = guarded(mode, StoreOperation::Find, cancel, store.find(&query, cancel)).await?;

        let has_more = offset + (rows.len() as u64) < totals.total;
        Ok(ListResponse::new(rows, has_more, totals).with_offset(offset))
    }

    async fn anchor_window(
        &self,
        builder: &NoteQueryBuilder<'_>,
        anchor: &Cursor,
        span: u32,
        cancel: &CancellationToken,
    ) -> Result<ListResponse, ListError> {
        let mode = ListModeKind::Anchor;
        let store = self.store.as_ref();
        let sort = builder.sort();
        let order = builder.order();

        // The anchor must still match the active filters, not just exist.
        let lookup = builder
            .base_filter()
            .and(FilterCondition::eq(NoteField::Id, anchor.id()).into());
        let anchor_row = guarded(
            mode,
            StoreOperation::FindOne,
            cancel,
            store.find_one(lookup, cancel),
        )
        .await?
        .ok_or_else(|| {
            ListError::NotFound(format!("anchor note {} not found", anchor.id()))
        })?;

        let boundary = Boundary::of(&anchor_row, sort);
        let before_filter = builder
            .base_filter()
            .and(builder.after(&boundary, order.reversed()));
        let after_filter = builder.base_filter().and(builder.after(&boundary, order));

        let side = u64::from(span) + 1;
        let before_query = StoreQuery::new(before_filter.clone())
            .sort_by(builder.sort_keys(order.reversed()))
            .limit(side);
        let after_query = StoreQuery::new(after_filter)
            .sort_by(builder.sort_keys(order))
            .limit(side);

        let (position, totals, before, after) = tokio::try_join!(
            guarded(mode, StoreOperation::Count, cancel, store.count(&before_filter, cancel)),
            count_totals(store, builder, mode, cancel),
            guarded(mode, StoreOperation::Find, cancel, store.find(&before_query, cancel)),
            guarded(mode, StoreOperation::Find, cancel, store.find(&after_query, cancel)),
        )?;

        let (mut before, has_before) = split_extra(before, span);
        before.reverse();
        let (after, has_after) = split_extra(after, span);

        let mut notes = before;
        notes.push(anchor_row);
        notes.extend(after);

        let prev = has_before.then(|| encode_at(notes.first(), sort)).flatten();
        let next = has_after.then(|| encode_at(notes.last(), sort)).flatten();

        Ok(ListResponse::new(notes, has_before || has_after, totals)
            .with_cursors(prev, next)
            .with_anchor_index(position))
    }

    /// Position a cursor points at. Composite cursors carry it; simple
    /// cursors are looked up among the owner's notes.
    async fn resolve_boundary(
        &self,
        builder: &NoteQueryBuilder<'_>,
        cursor: &Cursor,
        cancel: &CancellationToken,
    ) -> Result<Boundary, ListError> {
        if let Some(boundary) = Boundary::from_cursor(cursor) {
            return Ok(boundary);
        }

        let note = guarded(
            ListModeKind::Cursor,
            StoreOperation::FindOne,
            cancel,
            self.store.find_one(builder.owned_note(cursor.id()), cancel),
        )
        .await?
        .ok_or_else(|| ListError::NotFound(format!("cursor note {} not found", cursor.id())))?;

        Ok(Boundary::of(&note, builder.sort()))
    }
}

/// Await a store call unless `cancel` fires first, wrapping failures with
/// the listing mode.
pub(super) async fn guarded<T>(
    mode: ListModeKind,
    operation: StoreOperation,
    cancel: &CancellationToken,
    call: impl Future<Output = StoreResult<T>>,
) -> Result<T, ListError> {
    let result = tokio::select! {
        biased;

        () = cancel.cancelled() => Err(StoreError::cancelled(operation)),
        result = call => result,
    };

    result.map_err(|source| {
        tracing::error!(
            %mode,
            operation = %source.operation,
            kind = %source.kind,
            "Store call failed: {}", source.message
        );
        ListError::Store { mode, source }
    })
}

/// Drop the look-ahead row, reporting whether there was one
fn split_extra(mut rows: Vec<Note>, limit: u32) -> (Vec<Note>, bool) {
    let limit = limit as usize;
    let has_more = rows.len() > limit;
    rows.truncate(limit);
    (rows, has_more)
}

fn encode_at(note: Option<&Note>, sort: SortField) -> Option<String> {
    note.map(|n| Cursor::for_note(n, sort).encode())
}
