//! List response body

use serde::{Deserialize, Serialize};

use super::counting::Totals;
use crate::notes::Note;

/// One page of notes with its position markers and totals
///
/// Mode-specific fields are omitted from the JSON body when unset: `offset`
/// and `window_size` appear only for offset paging, `anchor_index` only for
/// anchor windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_cursor: Option<String>,
    pub has_more: bool,
    pub total_count: u64,
    pub total_count_unfiltered: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_size: Option<u64>,
    /// Zero-based position of the anchor among all matching notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_index: Option<u64>,
}

impl ListResponse {
    /// Page without cursors or mode-specific metadata
    #[must_use]
    pub fn new(notes: Vec<Note>, has_more: bool, totals: Totals) -> Self {
        Self {
            notes,
            next_cursor: None,
            prev_cursor: None,
            has_more,
            total_count: totals.total,
            total_count_unfiltered: totals.unfiltered,
            offset: None,
            window_size: None,
            anchor_index: None,
        }
    }

    #[must_use]
    pub fn with_cursors(mut self, prev: Option<String>, next: Option<String>) -> Self {
        self.prev_cursor = prev;
        self.next_cursor = next;
        self
    }

    /// Offset-mode metadata; `window_size` is the number of notes returned
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self.window_size = Some(self.notes.len() as u64);
        self
    }

    #[must_use]
    pub fn with_anchor_index(mut self, index: u64) -> Self {
        self.anchor_index = Some(index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_page_omits_mode_fields() {
        let response = ListResponse::new(vec![], false, Totals::default());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "notes": [],
                "has_more": false,
                "total_count": 0,
                "total_count_unfiltered": 0,
            })
        );
    }

    #[test]
    fn test_offset_page_reports_window_size() {
        let response = ListResponse::new(vec![], false, Totals::default()).with_offset(0);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["offset"], 0);
        assert_eq!(value["window_size"], 0);
        assert!(value.get("next_cursor").is_none());
    }

    #[test]
    fn test_cursors_serialized_when_set() {
        let response = ListResponse::new(vec![], true, Totals { total: 5, unfiltered: 9 })
            .with_cursors(None, Some("abc".to_string()));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["next_cursor"], "abc");
        assert!(value.get("prev_cursor").is_none());
        assert_eq!(value["total_count_unfiltered"], 9);
    }
}
