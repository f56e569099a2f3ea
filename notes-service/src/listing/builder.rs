//! Filter and ordering construction
//!
//! Turns the semantic parts of a [`ListRequest`] (owner, search, color, sort
//! and a position boundary) into store predicates and sort keys.
//!
//! Every ordering is `(sort field, id)` with both keys in the same direction,
//! which gives a strict total order even when many notes share a title or a
//! timestamp. Position boundaries are strict tuple comparisons over the same
//! pair:
//!
//! ```text
//! asc:  field > v  OR (field == v AND id > id0)
//! desc: field < v  OR (field == v AND id < id0)
//! ```

use super::cursor::Cursor;
use super::request::{ListRequest, SortField};
use crate::ids::NoteId;
use crate::notes::{Note, OwnerId};
use crate::store::{Filter, FilterCondition, FilterValue, NoteField, OrderDirection, SortKey};

/// Search texts at least this long use the indexed full-text capability
pub const TEXT_SEARCH_MIN_CHARS: usize = 3;

/// A position in the `(sort field, id)` order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub value: FilterValue,
    pub id: NoteId,
}

impl Boundary {
    /// The position of `note` under `sort`
    #[must_use]
    pub fn of(note: &Note, sort: SortField) -> Self {
        let value = match sort {
            SortField::CreatedAt => FilterValue::Timestamp(note.created_at),
            SortField::UpdatedAt => FilterValue::Timestamp(note.updated_at),
            SortField::Title => FilterValue::String(note.title.clone()),
        };
        Self { value, id: note.id }
    }

    /// The position a composite cursor carries by itself
    ///
    /// Returns `None` for simple cursors, whose value lives in the row.
    #[must_use]
    pub fn from_cursor(cursor: &Cursor) -> Option<Self> {
        match cursor {
            Cursor::Simple(_) => None,
            Cursor::Composite { title, id } => Some(Self {
                value: FilterValue::String(title.clone()),
                id: *id,
            }),
        }
    }
}

/// Builds predicates and orderings for one owner's list request
#[derive(Debug, Clone)]
pub struct NoteQueryBuilder<'a> {
    owner: &'a OwnerId,
    search: Option<&'a str>,
    color: Option<&'a str>,
    sort: SortField,
    order: OrderDirection,
}

impl<'a> NoteQueryBuilder<'a> {
    pub fn new(owner: &'a OwnerId, request: &'a ListRequest) -> Self {
        Self {
            owner,
            search: request.search.as_deref(),
            color: request.color.as_deref(),
            sort: request.sort,
            order: request.order,
        }
    }

    /// Requested sort field
    #[must_use]
    pub const fn sort(&self) -> SortField {
        self.sort
    }

    /// Requested order
    #[must_use]
    pub const fn order(&self) -> OrderDirection {
        self.order
    }

    /// True when a color or search filter narrows the owner's notes
    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.search.is_some() || self.color.is_some()
    }

    /// Ownership only
    #[must_use]
    pub fn owner_filter(&self) -> Filter {
        owner_filter(self.owner)
    }

    /// Ownership scoped to a single note
    #[must_use]
    pub fn owned_note(&self, id: NoteId) -> Filter {
        owned_note_filter(self.owner, id)
    }

    /// Ownership, color and search
    #[must_use]
    pub fn base_filter(&self) -> Filter {
        let mut filter = self.owner_filter();
        if let Some(color) = self.color {
            filter = filter.and(FilterCondition::eq(NoteField::Color, color).into());
        }
        if let Some(q) = self.search {
            filter = filter.and(search_filter(q));
        }
        filter
    }

    /// Rows strictly after `boundary` when reading in `order`
    #[must_use]
    pub fn after(&self, boundary: &Boundary, order: OrderDirection) -> Filter {
        let field = self.sort.field();
        let beyond = |field: NoteField, value: FilterValue| match order {
            OrderDirection::Ascending => FilterCondition::gt(field, value),
            OrderDirection::Descending => FilterCondition::lt(field, value),
        };

        Filter::Any(vec![
            beyond(field, boundary.value.clone()).into(),
            Filter::All(vec![
                FilterCondition::eq(field, boundary.value.clone()).into(),
                beyond(NoteField::Id, FilterValue::Id(boundary.id)).into(),
            ]),
        ])
    }

    /// `(sort field, id)` keys in `order`
    #[must_use]
    pub fn sort_keys(&self, order: OrderDirection) -> Vec<SortKey> {
        vec![
            SortKey::new(self.sort.field(), order),
            SortKey::new(NoteField::Id, order),
        ]
    }
}

/// Notes belonging to `owner`
#[must_use]
pub fn owner_filter(owner: &OwnerId) -> Filter {
    FilterCondition::eq(NoteField::Owner, owner.as_str()).into()
}

/// The note `id`, if it belongs to `owner`
#[must_use]
pub fn owned_note_filter(owner: &OwnerId, id: NoteId) -> Filter {
    owner_filter(owner).and(FilterCondition::eq(NoteField::Id, id).into())
}

/// Search predicate for `q`
///
/// Three or more characters use full-text search. Shorter text falls back to
/// an escaped, case-insensitive substring match on title or body.
#[must_use]
pub fn search_filter(q: &str) -> Filter {
    if q.chars().count() >= TEXT_SEARCH_MIN_CHARS {
        return Filter::Text(q.to_string());
    }
    let pattern = regex::escape(q);
    Filter::Any(vec![
        FilterCondition::matches(NoteField::Title, pattern.clone()).into(),
        FilterCondition::matches(NoteField::Body, pattern).into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::request::ListParams;
    use crate::store::FilterOperator;

    fn request(params: ListParams) -> ListRequest {
        params.validate().unwrap()
    }

    #[test]
    fn test_base_filter_without_filters_is_owner_only() {
        let owner = OwnerId::new("u1");
        let req = request(ListParams::new());
        let builder = NoteQueryBuilder::new(&owner, &req);

        assert!(!builder.has_filters());
        assert_eq!(builder.base_filter(), builder.owner_filter());
    }

    #[test]
    fn test_base_filter_adds_color_and_search() {
        let owner = OwnerId::new("u1");
        let req = request(ListParams::new().with_color("red").with_search("milk"));
        let builder = NoteQueryBuilder::new(&owner, &req);

        assert!(builder.has_filters());
        let Filter::All(parts) = builder.base_filter() else {
            panic!("expected conjunction");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[1],
            Filter::from(FilterCondition::eq(NoteField::Color, "red"))
        );
        assert_eq!(parts[2], Filter::Text("milk".to_string()));
    }

    #[test]
    fn test_short_search_is_escaped_substring() {
        let filter = search_filter("a.");
        let Filter::Any(parts) = filter else {
            panic!("expected disjunction");
        };
        assert_eq!(
            parts,
            vec![
                Filter::from(FilterCondition::matches(NoteField::Title, "a\\.")),
                Filter::from(FilterCondition::matches(NoteField::Body, "a\\.")),
            ]
        );
        assert_eq!(search_filter("abc"), Filter::Text("abc".to_string()));
    }

    #[test]
    fn test_sort_keys_share_direction() {
        let owner = OwnerId::new("u1");
        let req = request(ListParams::new().with_sort("title").with_order("asc"));
        let builder = NoteQueryBuilder::new(&owner, &req);

        let keys = builder.sort_keys(OrderDirection::Ascending);
        assert_eq!(
            keys,
            vec![
                SortKey::new(NoteField::Title, OrderDirection::Ascending),
                SortKey::new(NoteField::Id, OrderDirection::Ascending),
            ]
        );
        assert!(builder
            .sort_keys(OrderDirection::Descending)
            .iter()
            .all(|k| k.direction == OrderDirection::Descending));
    }

    #[test]
    fn test_boundary_operators_follow_order() {
        let owner = OwnerId::new("u1");
        let req = request(ListParams::new());
        let builder = NoteQueryBuilder::new(&owner, &req);
        let boundary = Boundary {
            value: FilterValue::String("m".to_string()),
            id: NoteId::from_parts(1, 1),
        };

        let operators = |filter: Filter| -> (FilterOperator, FilterOperator) {
            let Filter::Any(parts) = filter else {
                panic!("expected disjunction");
            };
            let Filter::Condition(primary) = &parts[0] else {
                panic!("expected condition");
            };
            let Filter::All(tie) = &parts[1] else {
                panic!("expected conjunction");
            };
            let Filter::Condition(id) = &tie[1] else {
                panic!("expected condition");
            };
            (primary.operator, id.operator)
        };

        assert_eq!(
            operators(builder.after(&boundary, OrderDirection::Ascending)),
            (FilterOperator::GreaterThan, FilterOperator::GreaterThan)
        );
        assert_eq!(
            operators(builder.after(&boundary, OrderDirection::Descending)),
            (FilterOperator::LessThan, FilterOperator::LessThan)
        );
    }

    #[test]
    fn test_boundary_from_cursor() {
        let id = NoteId::from_parts(1, 1);
        assert_eq!(Boundary::from_cursor(&Cursor::Simple(id)), None);
        assert_eq!(
            Boundary::from_cursor(&Cursor::composite("t", id)),
            Some(Boundary {
                value: FilterValue::String("t".to_string()),
                id,
            })
        );
    }
}
