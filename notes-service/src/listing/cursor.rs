//! Position-marker codec
//!
//! Two wire formats exist and the request's sort field decides which one a
//! cursor string is decoded as; the string is never sniffed.
//!
//! - **Simple**: the lowercase hex identifier of the boundary note. Used for
//!   timestamp sorts, where the boundary value is read back from the row.
//! - **Composite**: URL-safe base64 (unpadded) of the JSON object
//!   `{"title": ..., "id": ...}`. Used for title sort, where the tie-break
//!   value must travel inside the cursor.
//!
//! ```rust
//! use notes_service::ids::NoteId;
//! use notes_service::listing::{Cursor, SortField};
//!
//! let id = NoteId::from_parts(1_700_000_000, 7);
//! let raw = Cursor::composite("Shopping list", id).encode();
//!
//! let decoded = Cursor::decode(&raw, SortField::Title).unwrap();
//! assert_eq!(decoded.id(), id);
//! assert_eq!(decoded.title(), Some("Shopping list"));
//!
//! assert!(Cursor::decode(&raw, SortField::CreatedAt).is_err());
//! ```

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::request::SortField;
use crate::ids::{NoteId, NoteIdError};
use crate::notes::Note;

/// URL-safe alphabet, no padding on encode, padding tolerated on decode
const CURSOR_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded position marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Identifier only
    Simple(NoteId),
    /// Title plus identifier
    Composite { title: String, id: NoteId },
}

#[derive(Serialize, Deserialize)]
struct CompositePayload {
    title: String,
    id: NoteId,
}

impl Cursor {
    /// Composite cursor for a title boundary
    pub fn composite(title: impl Into<String>, id: NoteId) -> Self {
        Self::Composite {
            title: title.into(),
            id,
        }
    }

    /// The cursor marking `note` under `sort`
    #[must_use]
    pub fn for_note(note: &Note, sort: SortField) -> Self {
        if sort.uses_composite_cursor() {
            Self::composite(note.title.clone(), note.id)
        } else {
            Self::Simple(note.id)
        }
    }

    /// Boundary identifier
    #[must_use]
    pub fn id(&self) -> NoteId {
        match self {
            Self::Simple(id) | Self::Composite { id, .. } => *id,
        }
    }

    /// Boundary title, for composite cursors
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Simple(_) => None,
            Self::Composite { title, .. } => Some(title),
        }
    }

    /// Wire form
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Simple(id) => encode_simple(*id),
            Self::Composite { title, id } => encode_composite(title, *id),
        }
    }

    /// Decode `raw` in the format `sort` calls for.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError`] if `raw` is not a well-formed cursor of that format.
    pub fn decode(raw: &str, sort: SortField) -> Result<Self, CursorError> {
        if !sort.uses_composite_cursor() {
            return Ok(Self::Simple(raw.parse()?));
        }

        let bytes = CURSOR_ENGINE.decode(raw)?;
        let payload: CompositePayload = serde_json::from_slice(&bytes)?;
        Ok(Self::Composite {
            title: payload.title,
            id: payload.id,
        })
    }
}

/// Encode a simple cursor
#[must_use]
pub fn encode_simple(id: NoteId) -> String {
    id.to_hex()
}

/// Encode a composite cursor
#[must_use]
pub fn encode_composite(title: &str, id: NoteId) -> String {
    let payload = CompositePayload {
        title: title.to_string(),
        id,
    };
    // Serializing a struct of a string and a hex string cannot fail.
    let json = serde_json::to_vec(&payload).unwrap_or_default();
    CURSOR_ENGINE.encode(json)
}

/// Malformed position marker
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// Identifier part is not a valid note id
    #[error("{0}")]
    Id(#[from] NoteIdError),

    /// Composite cursor is not valid base64
    #[error("cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Composite cursor payload is not the expected JSON object
    #[error("cursor payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{NewNote, OwnerId};
    use chrono::Utc;

    #[test]
    fn test_simple_roundtrip() {
        let id = NoteId::from_parts(1_700_000_000, 1);
        let raw = encode_simple(id);
        assert_eq!(raw, id.to_hex());

        for sort in [SortField::CreatedAt, SortField::UpdatedAt] {
            assert_eq!(Cursor::decode(&raw, sort).unwrap(), Cursor::Simple(id));
        }
    }

    #[test]
    fn test_composite_roundtrip_with_awkward_title() {
        let id = NoteId::from_parts(1_700_000_000, 2);
        let title = "a/b+c=d \"quoted\" ✓";
        let raw = encode_composite(title, id);

        assert!(!raw.contains('='));
        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));

        let decoded = Cursor::decode(&raw, SortField::Title).unwrap();
        assert_eq!(decoded, Cursor::composite(title, id));
    }

    #[test]
    fn test_composite_payload_is_title_and_id() {
        let id = NoteId::from_parts(1, 1);
        let raw = encode_composite("x", id);
        let json = CURSOR_ENGINE.decode(raw).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["title"], "x");
        assert_eq!(value["id"], id.to_hex());
    }

    #[test]
    fn test_padded_composite_accepted() {
        let id = NoteId::from_parts(1, 1);
        let json = serde_json::to_vec(&CompositePayload {
            title: "t".to_string(),
            id,
        })
        .unwrap();
        let padded = base64::engine::general_purpose::URL_SAFE.encode(json);
        assert!(Cursor::decode(&padded, SortField::Title).is_ok());
    }

    #[test]
    fn test_malformed_cursors_fail() {
        assert!(matches!(
            Cursor::decode("not-hex", SortField::CreatedAt),
            Err(CursorError::Id(_))
        ));
        assert!(matches!(
            Cursor::decode("abcd", SortField::UpdatedAt),
            Err(CursorError::Id(_))
        ));
        assert!(matches!(
            Cursor::decode("!!!", SortField::Title),
            Err(CursorError::Encoding(_))
        ));

        let not_json = CURSOR_ENGINE.encode(b"{title:");
        assert!(matches!(
            Cursor::decode(&not_json, SortField::Title),
            Err(CursorError::Payload(_))
        ));

        let bad_id = CURSOR_ENGINE.encode(br#"{"title":"t","id":"zz"}"#);
        assert!(matches!(
            Cursor::decode(&bad_id, SortField::Title),
            Err(CursorError::Payload(_))
        ));
    }

    #[test]
    fn test_for_note_follows_sort_field() {
        let note = Note::create(
            OwnerId::new("u"),
            NewNote {
                title: "Plan".to_string(),
                ..NewNote::default()
            },
            Utc::now(),
        );

        assert_eq!(
            Cursor::for_note(&note, SortField::CreatedAt),
            Cursor::Simple(note.id)
        );
        let composite = Cursor::for_note(&note, SortField::Title);
        assert_eq!(composite.title(), Some("Plan"));
        assert_eq!(composite.id(), note.id);
    }
}
