//! Predicate, ordering and windowing types for store queries
//!
//! These types are the whole vocabulary the listing core uses to talk to a
//! store: a [`Filter`] tree, a list of [`SortKey`]s and a skip/limit window,
//! bundled as a [`StoreQuery`].
//!
//! ```rust
//! use notes_service::store::{
//!     Filter, FilterCondition, NoteField, OrderDirection, SortKey, StoreQuery,
//! };
//!
//! let filter = Filter::from(FilterCondition::eq(NoteField::Owner, "user-1"))
//!     .and(FilterCondition::eq(NoteField::Color, "yellow").into());
//!
//! let query = StoreQuery::new(filter)
//!     .sort_by(vec![
//!         SortKey::new(NoteField::CreatedAt, OrderDirection::Descending),
//!         SortKey::new(NoteField::Id, OrderDirection::Descending),
//!     ])
//!     .limit(51);
//!
//! assert_eq!(query.limit, Some(51));
//! assert_eq!(query.skip, 0);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};

use crate::ids::NoteId;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, oldest first)
    Ascending,
    /// Sort in descending order (Z-A, newest first)
    #[default]
    Descending,
}

impl OrderDirection {
    /// The opposite direction
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Stored note fields addressable by predicates and sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Id,
    Owner,
    Title,
    Body,
    Color,
    CreatedAt,
    UpdatedAt,
}

impl fmt::Display for NoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::Owner => write!(f, "owner_id"),
            Self::Title => write!(f, "title"),
            Self::Body => write!(f, "body"),
            Self::Color => write!(f, "color"),
            Self::CreatedAt => write!(f, "created_at"),
            Self::UpdatedAt => write!(f, "updated_at"),
        }
    }
}

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Equal,
    /// Strictly greater than
    GreaterThan,
    /// Strictly less than
    LessThan,
    /// Case-insensitive pattern match; the value is a ready-to-use pattern
    Matches,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::GreaterThan => write!(f, ">"),
            Self::LessThan => write!(f, "<"),
            Self::Matches => write!(f, "~*"),
        }
    }
}

/// A value that can be compared against a note field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Text value (owner, title, body, color, or a match pattern)
    String(String),
    /// Timestamp value
    Timestamp(DateTime<Utc>),
    /// Note identifier value
    Id(NoteId),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<NoteId> for FilterValue {
    fn from(id: NoteId) -> Self {
        Self::Id(id)
    }
}

/// A single comparison of one field against one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    /// The field to compare
    pub field: NoteField,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: NoteField, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    /// Equality (field = value)
    pub fn eq(field: NoteField, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value)
    }

    /// Strictly greater (field > value)
    pub fn gt(field: NoteField, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value)
    }

    /// Strictly less (field < value)
    pub fn lt(field: NoteField, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, value)
    }

    /// Case-insensitive pattern match. The caller escapes user text.
    pub fn matches(field: NoteField, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Matches, FilterValue::String(pattern.into()))
    }
}

/// Predicate tree evaluated by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every child must match (empty matches everything)
    All(Vec<Filter>),
    /// At least one child must match (empty matches nothing)
    Any(Vec<Filter>),
    /// A single field comparison
    Condition(FilterCondition),
    /// Indexed full-text search over title and body
    Text(String),
}

impl Filter {
    /// Conjunction of `self` and `other`, flattening nested `All` nodes.
    #[must_use]
    pub fn and(self, other: Filter) -> Filter {
        let mut parts = match self {
            Filter::All(parts) => parts,
            single => vec![single],
        };
        match other {
            Filter::All(more) => parts.extend(more),
            single => parts.push(single),
        }
        Filter::All(parts)
    }
}

impl From<FilterCondition> for Filter {
    fn from(condition: FilterCondition) -> Self {
        Filter::Condition(condition)
    }
}

/// One key of a compound ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: NoteField,
    pub direction: OrderDirection,
}

impl SortKey {
    /// Create a sort key
    #[must_use]
    pub const fn new(field: NoteField, direction: OrderDirection) -> Self {
        Self { field, direction }
    }
}

/// A complete windowed query: predicate, ordering, skip and limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    /// Rows must match this predicate
    pub filter: Filter,
    /// Ordering, most significant key first
    pub sort: Vec<SortKey>,
    /// Number of matching rows to skip
    pub skip: u64,
    /// Maximum number of rows to return
    pub limit: Option<u64>,
}

impl StoreQuery {
    /// Unordered, unbounded query over `filter`
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            sort: Vec::new(),
            skip: 0,
            limit: None,
        }
    }

    /// Set the ordering
    #[must_use]
    pub fn sort_by(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    /// Set the number of rows to skip
    #[must_use]
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Set the maximum number of rows
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_direction_display() {
        assert_eq!(format!("{}", OrderDirection::Ascending), "asc");
        assert_eq!(format!("{}", OrderDirection::Descending), "desc");
    }

    #[test]
    fn test_order_direction_reversed() {
        assert_eq!(
            OrderDirection::Ascending.reversed(),
            OrderDirection::Descending
        );
        assert_eq!(
            OrderDirection::Descending.reversed().reversed(),
            OrderDirection::Descending
        );
    }

    #[test]
    fn test_filter_operator_display() {
        assert_eq!(format!("{}", FilterOperator::Equal), "=");
        assert_eq!(format!("{}", FilterOperator::GreaterThan), ">");
        assert_eq!(format!("{}", FilterOperator::LessThan), "<");
        assert_eq!(format!("{}", FilterOperator::Matches), "~*");
    }

    #[test]
    fn test_filter_value_from() {
        let value: FilterValue = "red".into();
        assert_eq!(value, FilterValue::String("red".to_string()));

        let id = NoteId::from_parts(1, 1);
        assert_eq!(FilterValue::from(id), FilterValue::Id(id));
    }

    #[test]
    fn test_condition_constructors() {
        let gt = FilterCondition::gt(NoteField::Title, "m");
        assert_eq!(gt.operator, FilterOperator::GreaterThan);
        assert_eq!(gt.field, NoteField::Title);

        let pattern = FilterCondition::matches(NoteField::Body, "a\\.b");
        assert_eq!(pattern.operator, FilterOperator::Matches);
        assert_eq!(pattern.value, FilterValue::String("a\\.b".to_string()));
    }

    #[test]
    fn test_and_flattens() {
        let a = Filter::from(FilterCondition::eq(NoteField::Owner, "u"));
        let b = Filter::from(FilterCondition::eq(NoteField::Color, "red"));
        let c = Filter::Text("hello".to_string());

        let combined = a.clone().and(b.clone()).and(c.clone());
        assert_eq!(combined, Filter::All(vec![a, b, c]));
    }

    #[test]
    fn test_store_query_builder() {
        let query = StoreQuery::new(Filter::All(vec![]))
            .sort_by(vec![SortKey::new(NoteField::Id, OrderDirection::Ascending)])
            .skip(300)
            .limit(50);
        assert_eq!(query.skip, 300);
        assert_eq!(query.limit, Some(50));
        assert_eq!(query.sort.len(), 1);
    }
}
