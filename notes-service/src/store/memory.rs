//! In-process note store
//!
//! [`MemoryNoteStore`] evaluates the full predicate model against a vector of
//! notes held behind a tokio `RwLock`. It backs the binary when no external
//! document store is wired in, and every test in this crate.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::error::{StoreError, StoreOperation};
use super::filter::{
    Filter, FilterOperator, FilterValue, NoteField, OrderDirection, SortKey, StoreQuery,
};
use super::traits::{NoteStore, StoreResult};
use crate::ids::NoteId;
use crate::notes::{Note, NotePatch, OwnerId};

/// Reference [`NoteStore`] adapter backed by memory
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl MemoryNoteStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `notes`
    #[must_use]
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: RwLock::new(notes),
        }
    }

    /// Number of notes held, across all owners
    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    /// True when the store holds no notes
    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }
}

impl NoteStore for MemoryNoteStore {
    async fn find(&self, query: &StoreQuery, cancel: &CancellationToken) -> StoreResult<Vec<Note>> {
        let op = StoreOperation::Find;
        let predicate = Predicate::compile(&query.filter, op)?;

        let notes = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(StoreError::cancelled(op)),
            guard = self.notes.read() => guard,
        };

        let mut rows: Vec<&Note> = notes.iter().filter(|n| predicate.matches(n)).collect();
        rows.sort_by(|a, b| compare_by_keys(a, b, &query.sort));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        let page: Vec<Note> = rows.into_iter().skip(skip).take(limit).cloned().collect();
        tracing::trace!(returned = page.len(), skip = query.skip, "memory store find");
        Ok(page)
    }

    async fn count(&self, filter: &Filter, cancel: &CancellationToken) -> StoreResult<u64> {
        let op = StoreOperation::Count;
        let predicate = Predicate::compile(filter, op)?;

        let notes = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(StoreError::cancelled(op)),
            guard = self.notes.read() => guard,
        };

        Ok(notes.iter().filter(|n| predicate.matches(n)).count() as u64)
    }

    async fn insert(&self, note: Note) -> StoreResult<Note> {
        let mut notes = self.notes.write().await;
        if notes.iter().any(|n| n.id == note.id) {
            return Err(StoreError::query_failed(
                StoreOperation::Insert,
                format!("duplicate id {}", note.id),
            ));
        }
        notes.push(note.clone());
        Ok(note)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: &NoteId,
        patch: NotePatch,
    ) -> StoreResult<Option<Note>> {
        let mut notes = self.notes.write().await;
        let Some(note) = notes
            .iter_mut()
            .find(|n| n.id == *id && n.owner_id == *owner)
        else {
            return Ok(None);
        };
        note.apply(patch, Utc::now());
        Ok(Some(note.clone()))
    }

    async fn delete(&self, owner: &OwnerId, id: &NoteId) -> StoreResult<bool> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| !(n.id == *id && n.owner_id == *owner));
        Ok(notes.len() < before)
    }
}

/// A [`Filter`] with its patterns compiled once per query
enum Predicate {
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Compare {
        field: NoteField,
        operator: FilterOperator,
        value: FilterValue,
    },
    Pattern {
        field: NoteField,
        regex: Regex,
    },
    /// `None` when the search text holds no words; matches nothing
    Text(Option<Regex>),
}

impl Predicate {
    fn compile(filter: &Filter, op: StoreOperation) -> StoreResult<Self> {
        Ok(match filter {
            Filter::All(parts) => Self::All(
                parts
                    .iter()
                    .map(|p| Self::compile(p, op))
                    .collect::<StoreResult<_>>()?,
            ),
            Filter::Any(parts) => Self::Any(
                parts
                    .iter()
                    .map(|p| Self::compile(p, op))
                    .collect::<StoreResult<_>>()?,
            ),
            Filter::Condition(c) if c.operator == FilterOperator::Matches => {
                let FilterValue::String(pattern) = &c.value else {
                    return Err(StoreError::query_failed(
                        op,
                        format!("pattern match on {} requires a string value", c.field),
                    ));
                };
                Self::Pattern {
                    field: c.field,
                    regex: build_regex(pattern, op)?,
                }
            }
            Filter::Condition(c) => Self::Compare {
                field: c.field,
                operator: c.operator,
                value: c.value.clone(),
            },
            Filter::Text(text) => {
                let terms: Vec<String> = text
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| !t.is_empty())
                    .map(regex::escape)
                    .collect();
                if terms.is_empty() {
                    Self::Text(None)
                } else {
                    let pattern = format!(r"\b(?:{})\b", terms.join("|"));
                    Self::Text(Some(build_regex(&pattern, op)?))
                }
            }
        })
    }

    fn matches(&self, note: &Note) -> bool {
        match self {
            Self::All(parts) => parts.iter().all(|p| p.matches(note)),
            Self::Any(parts) => parts.iter().any(|p| p.matches(note)),
            Self::Compare {
                field,
                operator,
                value,
            } => {
                let Some(ordering) = field_value(note, *field).compare(value) else {
                    return false;
                };
                match operator {
                    FilterOperator::Equal => ordering == Ordering::Equal,
                    FilterOperator::GreaterThan => ordering == Ordering::Greater,
                    FilterOperator::LessThan => ordering == Ordering::Less,
                    FilterOperator::Matches => false,
                }
            }
            Self::Pattern { field, regex } => match field_value(note, *field) {
                FieldValue::Str(s) => regex.is_match(s),
                _ => false,
            },
            Self::Text(Some(regex)) => regex.is_match(&note.title) || regex.is_match(&note.body),
            Self::Text(None) => false,
        }
    }
}

fn build_regex(pattern: &str, op: StoreOperation) -> StoreResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| StoreError::query_failed(op, e.to_string()))
}

/// Borrowed view of one field of a note
#[derive(Clone, Copy)]
enum FieldValue<'a> {
    Str(&'a str),
    Time(DateTime<Utc>),
    Id(NoteId),
}

impl FieldValue<'_> {
    /// Ordering of the field relative to a predicate value; `None` on a type mismatch.
    fn compare(self, value: &FilterValue) -> Option<Ordering> {
        match (self, value) {
            (Self::Str(a), FilterValue::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Self::Time(a), FilterValue::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Id(a), FilterValue::Id(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn cmp_same(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::Time(a), Self::Time(b)) => a.cmp(&b),
            (Self::Id(a), Self::Id(b)) => a.cmp(&b),
            _ => Ordering::Equal,
        }
    }
}

fn field_value(note: &Note, field: NoteField) -> FieldValue<'_> {
    match field {
        NoteField::Id => FieldValue::Id(note.id),
        NoteField::Owner => FieldValue::Str(note.owner_id.as_str()),
        NoteField::Title => FieldValue::Str(&note.title),
        NoteField::Body => FieldValue::Str(&note.body),
        NoteField::Color => FieldValue::Str(&note.color),
        NoteField::CreatedAt => FieldValue::Time(note.created_at),
        NoteField::UpdatedAt => FieldValue::Time(note.updated_at),
    }
}

fn compare_by_keys(a: &Note, b: &Note, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = field_value(a, key.field).cmp_same(field_value(b, key.field));
        let ordering = match key.direction {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::filter::FilterCondition;
    use crate::store::StoreErrorKind;
    use chrono::TimeZone;

    fn note(owner: &str, n: u32, title: &str, body: &str, color: &str) -> Note {
        let ts = Utc.timestamp_opt(1_700_000_000 + i64::from(n), 0).unwrap();
        Note {
            id: NoteId::from_parts(1_700_000_000 + n, n),
            owner_id: OwnerId::new(owner),
            title: title.to_string(),
            body: body.to_string(),
            color: color.to_string(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn seeded() -> MemoryNoteStore {
        MemoryNoteStore::with_notes(vec![
            note("alice", 1, "Groceries", "milk and eggs", "yellow"),
            note("alice", 2, "Work", "quarterly report", "blue"),
            note("alice", 3, "groceries again", "bread", "yellow"),
            note("bob", 4, "Secret", "alice must not see this", "red"),
        ])
    }

    fn owner(name: &str) -> Filter {
        FilterCondition::eq(NoteField::Owner, name).into()
    }

    #[tokio::test]
    async fn test_count_by_owner_and_color() {
        let store = seeded();
        let cancel = CancellationToken::new();

        assert_eq!(store.count(&owner("alice"), &cancel).await.unwrap(), 3);
        let yellow = owner("alice").and(FilterCondition::eq(NoteField::Color, "yellow").into());
        assert_eq!(store.count(&yellow, &cancel).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_sorted_with_skip_and_limit() {
        let store = seeded();
        let query = StoreQuery::new(owner("alice"))
            .sort_by(vec![
                SortKey::new(NoteField::CreatedAt, OrderDirection::Descending),
                SortKey::new(NoteField::Id, OrderDirection::Descending),
            ])
            .skip(1)
            .limit(1);

        let rows = store.find(&query, &CancellationToken::new()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Work");
    }

    #[tokio::test]
    async fn test_title_order_is_bytewise() {
        let store = seeded();
        let query = StoreQuery::new(owner("alice")).sort_by(vec![SortKey::new(
            NoteField::Title,
            OrderDirection::Ascending,
        )]);
        let titles: Vec<String> = store
            .find(&query, &CancellationToken::new())
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        // Uppercase sorts before lowercase.
        assert_eq!(titles, vec!["Groceries", "Work", "groceries again"]);
    }

    #[tokio::test]
    async fn test_text_search_is_whole_word_and_case_insensitive() {
        let store = seeded();
        let cancel = CancellationToken::new();

        let hit = owner("alice").and(Filter::Text("GROCERIES".to_string()));
        assert_eq!(store.count(&hit, &cancel).await.unwrap(), 2);

        let partial = owner("alice").and(Filter::Text("grocer".to_string()));
        assert_eq!(store.count(&partial, &cancel).await.unwrap(), 0);

        let any_term = owner("alice").and(Filter::Text("bread report".to_string()));
        assert_eq!(store.count(&any_term, &cancel).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_pattern_match_is_substring() {
        let store = seeded();
        let filter = owner("alice").and(Filter::Any(vec![
            FilterCondition::matches(NoteField::Title, "or").into(),
            FilterCondition::matches(NoteField::Body, "or").into(),
        ]));
        assert_eq!(
            store.count(&filter, &CancellationToken::new()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_type_mismatch_never_matches() {
        let store = seeded();
        let filter: Filter = FilterCondition::gt(NoteField::CreatedAt, "2020").into();
        assert_eq!(
            store.count(&filter, &CancellationToken::new()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_cancelled_token_fails_call() {
        let store = seeded();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = store.count(&owner("alice"), &cancel).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Cancelled);
        assert_eq!(err.operation, StoreOperation::Count);
    }

    #[tokio::test]
    async fn test_update_and_delete_are_owner_scoped() {
        let store = seeded();
        let secret = NoteId::from_parts(1_700_000_004, 4);

        let patch = NotePatch {
            title: Some("mine now".to_string()),
            ..NotePatch::default()
        };
        assert!(store
            .update(&OwnerId::new("alice"), &secret, patch)
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(&OwnerId::new("alice"), &secret).await.unwrap());
        assert!(store.delete(&OwnerId::new("bob"), &secret).await.unwrap());
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = seeded();
        let dup = note("alice", 1, "dup", "", "");
        let err = store.insert(dup).await.unwrap_err();
        assert_eq!(err.operation, StoreOperation::Insert);
    }
}
