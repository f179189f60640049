//! Bookmark domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pinmark_core::{AccountId, BookmarkId, DisplayKey, Ranked};

/// A stored bookmark.
///
/// Field names on the wire follow the JSON the web client expects
/// (`user_id`, `is_pinned`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    #[serde(rename = "user_id")]
    pub owner_id: AccountId,
    pub title: String,
    pub url: String,
    pub note: String,
    pub order: i64,
    #[serde(rename = "is_pinned")]
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ranked for Bookmark {
    fn display_key(&self) -> DisplayKey {
        DisplayKey {
            pinned: self.pinned,
            order: self.order,
            id: self.id,
        }
    }
}

/// Input for creating a bookmark.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBookmark {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let now = Utc::now();
        let bookmark = Bookmark {
            id: BookmarkId::new(5),
            owner_id: AccountId::new(2),
            title: "Rust".to_string(),
            url: "https://www.rust-lang.org".to_string(),
            note: String::new(),
            order: 3,
            pinned: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["user_id"], 2);
        assert_eq!(json["order"], 3);
        assert_eq!(json["is_pinned"], true);
        assert_eq!(json["note"], "");
        assert!(json.get("owner_id").is_none());
        assert!(json.get("pinned").is_none());
    }

    #[test]
    fn test_new_bookmark_note_is_optional() {
        let input: NewBookmark =
            serde_json::from_str(r#"{"title": "a", "url": "https://a.example"}"#).unwrap();
        assert_eq!(input.note, None);
    }
}
