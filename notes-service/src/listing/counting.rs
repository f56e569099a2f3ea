//! Filtered and unfiltered totals

use tokio_util::sync::CancellationToken;

use super::builder::NoteQueryBuilder;
use super::error::{ListError, ListModeKind};
use super::orchestrator::guarded;
use crate::store::{NoteStore, StoreOperation};

/// Row counts reported with every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Rows matching ownership, color and search
    pub total: u64,
    /// Rows matching ownership only
    pub unfiltered: u64,
}

/// Count the rows behind a request.
///
/// The unfiltered count is a second query only when a color or search filter
/// is active; otherwise both totals come from one count.
pub async fn count_totals<S: NoteStore>(
    store: &S,
    builder: &NoteQueryBuilder<'_>,
    mode: ListModeKind,
    cancel: &CancellationToken,
) -> Result<Totals, ListError> {
    let base = builder.base_filter();
    let total = guarded(mode, StoreOperation::Count, cancel, store.count(&base, cancel));

    if !builder.has_filters() {
        let total = total.await?;
        return Ok(Totals {
            total,
            unfiltered: total,
        });
    }

    let owner = builder.owner_filter();
    let unfiltered = guarded(mode, StoreOperation::Count, cancel, store.count(&owner, cancel));
    let (total, unfiltered) = tokio::try_join!(total, unfiltered)?;
    Ok(Totals { total, unfiltered })
}
