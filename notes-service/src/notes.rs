//! Note data model
//!
//! A [`Note`] is owned by exactly one caller. Its identifier and owner never
//! change; title, body and color are mutated in place through [`NotePatch`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::NoteId;

/// Maximum title length in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum body length in characters
pub const MAX_BODY_CHARS: usize = 100_000;

/// Maximum color label length in characters
pub const MAX_COLOR_CHARS: usize = 32;

/// Identifier of the user owning a note.
///
/// Issued by the external authentication layer; opaque to this service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap an owner identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: OwnerId,
    pub title: String,
    pub body: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a new note for `owner`, stamped with `now`.
    pub fn create(owner: OwnerId, input: NewNote, now: DateTime<Utc>) -> Self {
        Self {
            id: NoteId::new(),
            owner_id: owner,
            title: input.title,
            body: input.body,
            color: input.color,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, bumping `updated_at`.
    pub fn apply(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        self.updated_at = now;
    }
}

/// Input for creating a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub color: String,
}

impl NewNote {
    /// Check field lengths.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        check_len("title", &self.title, MAX_TITLE_CHARS)?;
        check_len("body", &self.body, MAX_BODY_CHARS)?;
        check_len("color", &self.color, MAX_COLOR_CHARS)
    }
}

/// Partial update of a note; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NotePatch {
    /// Check field lengths of the fields being set.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if let Some(title) = &self.title {
            check_len("title", title, MAX_TITLE_CHARS)?;
        }
        if let Some(body) = &self.body {
            check_len("body", body, MAX_BODY_CHARS)?;
        }
        if let Some(color) = &self.color {
            check_len("color", color, MAX_COLOR_CHARS)?;
        }
        Ok(())
    }

    /// True when the patch sets no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.color.is_none()
    }
}

/// A note field exceeded its length limit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be at most {max} characters")]
pub struct NoteValidationError {
    pub field: &'static str,
    pub max: usize,
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), NoteValidationError> {
    if value.chars().count() > max {
        return Err(NoteValidationError { field, max });
    }
    Ok(())
}
