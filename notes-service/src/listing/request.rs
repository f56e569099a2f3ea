//! List request parameters and their validation
//!
//! [`ListParams`] is the raw query string; [`ListParams::validate`] turns it
//! into a [`ListRequest`] whose [`ListMode`] is chosen once, up front.
//!
//! ```rust
//! use notes_service::listing::{ListMode, ListParams, SortField};
//! use notes_service::store::OrderDirection;
//!
//! let request = ListParams::new()
//!     .with_limit(20)
//!     .with_offset(40)
//!     .with_sort("title")
//!     .with_order("ASC")
//!     .validate()
//!     .unwrap();
//!
//! assert_eq!(request.limit, 20);
//! assert_eq!(request.sort, SortField::Title);
//! assert_eq!(request.order, OrderDirection::Ascending);
//! assert_eq!(request.mode, ListMode::Offset { offset: 40 });
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::cursor::Cursor;
use super::error::{ListError, ListModeKind};
use crate::store::{NoteField, OrderDirection};

/// Default page size
pub const DEFAULT_LIMIT: u32 = 50;

/// Smallest accepted page size
pub const MIN_LIMIT: u32 = 1;

/// Largest accepted page size
pub const MAX_LIMIT: u32 = 100;

/// Largest accepted offset
pub const MAX_OFFSET: u64 = 50_000;

/// Default anchor window radius
pub const DEFAULT_SPAN: u32 = 10;

/// Largest accepted anchor window radius
pub const MAX_SPAN: u32 = 50;

/// Longest accepted search text, in characters
pub const MAX_QUERY_CHARS: usize = 256;

/// Field a listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    /// Store field backing this sort
    #[must_use]
    pub const fn field(self) -> NoteField {
        match self {
            Self::CreatedAt => NoteField::CreatedAt,
            Self::UpdatedAt => NoteField::UpdatedAt,
            Self::Title => NoteField::Title,
        }
    }

    /// True when cursors for this sort must carry the boundary value
    #[must_use]
    pub const fn uses_composite_cursor(self) -> bool {
        matches!(self, Self::Title)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedAt => write!(f, "created_at"),
            Self::UpdatedAt => write!(f, "updated_at"),
            Self::Title => write!(f, "title"),
        }
    }
}

impl FromStr for SortField {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            other => Err(ListError::bad_request(format!(
                "sort must be one of created_at, updated_at, title; got '{other}'"
            ))),
        }
    }
}

/// Which side of the cursor a page is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageDirection {
    /// Rows after the cursor
    #[default]
    Next,
    /// Rows before the cursor, returned in the requested order
    Prev,
}

impl fmt::Display for PageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Prev => write!(f, "prev"),
        }
    }
}

/// Pagination strategy of a validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMode {
    /// First page when `cursor` is `None`
    Cursor {
        cursor: Option<Cursor>,
        direction: PageDirection,
    },
    Offset {
        offset: u64,
    },
    Anchor {
        anchor: Cursor,
        span: u32,
    },
}

impl ListMode {
    /// Kind tag for logging and error context
    #[must_use]
    pub const fn kind(&self) -> ListModeKind {
        match self {
            Self::Cursor { .. } => ListModeKind::Cursor,
            Self::Offset { .. } => ListModeKind::Offset,
            Self::Anchor { .. } => ListModeKind::Anchor,
        }
    }
}

/// A list request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub limit: u32,
    pub mode: ListMode,
    /// Trimmed, non-empty search text
    pub search: Option<String>,
    /// Exact color to match
    pub color: Option<String>,
    pub sort: SortField,
    pub order: OrderDirection,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            mode: ListMode::Cursor {
                cursor: None,
                direction: PageDirection::Next,
            },
            search: None,
            color: None,
            sort: SortField::default(),
            order: OrderDirection::Descending,
        }
    }
}

/// Raw list query parameters
///
/// Empty values are treated as absent. Numeric values that do not parse are
/// rejected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub span: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl ListParams {
    /// No parameters set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: i64) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Validate the parameters and select the pagination mode.
    ///
    /// No store access happens here, so every failure is deterministic.
    ///
    /// # Errors
    ///
    /// - [`ListError::InvalidLimit`] when `limit` is outside 1..=100
    /// - [`ListError::InvalidCursor`] when `cursor` or `anchor` does not decode
    /// - [`ListError::BadRequest`] for conflicting or out-of-range parameters
    pub fn validate(self) -> Result<ListRequest, ListError> {
        let limit = match self.limit {
            None => DEFAULT_LIMIT,
            Some(raw) => u32::try_from(raw)
                .ok()
                .filter(|l| (MIN_LIMIT..=MAX_LIMIT).contains(l))
                .ok_or(ListError::InvalidLimit(raw))?,
        };

        let sort = match self.sort.as_deref() {
            None => SortField::default(),
            Some(raw) => raw.parse()?,
        };

        let order = match self.order.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("desc") => OrderDirection::Descending,
            Some("asc") => OrderDirection::Ascending,
            Some(other) => {
                return Err(ListError::bad_request(format!(
                    "order must be asc or desc; got '{other}'"
                )))
            }
        };

        let positions = [
            self.cursor.is_some(),
            self.offset.is_some(),
            self.anchor.is_some(),
        ];
        if positions.iter().filter(|set| **set).count() > 1 {
            return Err(ListError::bad_request(
                "cursor, offset and anchor are mutually exclusive",
            ));
        }
        if self.span.is_some() && self.anchor.is_none() {
            return Err(ListError::bad_request("span requires anchor"));
        }
        if self.direction.is_some() && self.cursor.is_none() {
            return Err(ListError::bad_request("direction requires cursor"));
        }
        // Anchor windows are sized by span alone.
        if self.limit.is_some() && self.anchor.is_some() {
            return Err(ListError::bad_request(
                "limit cannot be combined with anchor; use span",
            ));
        }

        let mode = if let Some(raw) = self.offset {
            let offset = u64::try_from(raw)
                .ok()
                .filter(|o| *o <= MAX_OFFSET)
                .ok_or_else(|| {
                    ListError::bad_request(format!(
                        "offset must be between 0 and {MAX_OFFSET}, got {raw}"
                    ))
                })?;
            ListMode::Offset { offset }
        } else if let Some(raw) = self.anchor.as_deref() {
            let span = match self.span {
                None => DEFAULT_SPAN,
                Some(raw) => u32::try_from(raw)
                    .ok()
                    .filter(|s| (1..=MAX_SPAN).contains(s))
                    .ok_or_else(|| {
                        ListError::bad_request(format!(
                            "span must be between 1 and {MAX_SPAN}, got {raw}"
                        ))
                    })?,
            };
            ListMode::Anchor {
                anchor: Cursor::decode(raw, sort)?,
                span,
            }
        } else {
            let direction = match self
                .direction
                .as_deref()
                .map(str::to_ascii_lowercase)
                .as_deref()
            {
                None | Some("next") => PageDirection::Next,
                Some("prev") => PageDirection::Prev,
                Some(other) => {
                    return Err(ListError::bad_request(format!(
                        "direction must be next or prev; got '{other}'"
                    )))
                }
            };
            let cursor = self
                .cursor
                .as_deref()
                .map(|raw| Cursor::decode(raw, sort))
                .transpose()?;
            ListMode::Cursor { cursor, direction }
        };

        let search = match self.q.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(q) if q.chars().count() > MAX_QUERY_CHARS => {
                return Err(ListError::bad_request(format!(
                    "q must be at most {MAX_QUERY_CHARS} characters"
                )))
            }
            Some(q) => Some(q.to_string()),
        };

        Ok(ListRequest {
            limit,
            mode,
            search,
            color: self.color,
            sort,
            order,
        })
    }
}

impl TryFrom<ListParams> for ListRequest {
    type Error = ListError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        params.validate()
    }
}
