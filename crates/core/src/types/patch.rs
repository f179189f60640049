//! Partial bookmark updates.
//!
//! A [`BookmarkPatch`] is what a client sends to edit a bookmark. Each field has
//! its own [`FieldPolicy`] deciding whether an empty or missing value means
//! "leave unchanged" or "overwrite".

use serde::Deserialize;

/// How a patch field is applied to the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Missing or empty input leaves the stored value unchanged.
    SkipIfEmpty,
    /// The stored value is always replaced; missing input becomes `""`.
    AlwaysOverwrite,
}

impl FieldPolicy {
    /// Resolve an input value to the value that should be written.
    ///
    /// `None` means the stored value must be left as is.
    #[must_use]
    pub fn apply(self, input: Option<String>) -> Option<String> {
        match self {
            Self::SkipIfEmpty => input.filter(|value| !value.is_empty()),
            Self::AlwaysOverwrite => Some(input.unwrap_or_default()),
        }
    }
}

/// Client-supplied edit of a bookmark.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Values to write after applying each field's policy.
///
/// A `None` field is left unchanged in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkChanges {
    pub title: Option<String>,
    pub url: Option<String>,
    pub note: Option<String>,
}

impl BookmarkPatch {
    pub const TITLE_POLICY: FieldPolicy = FieldPolicy::SkipIfEmpty;
    pub const URL_POLICY: FieldPolicy = FieldPolicy::SkipIfEmpty;
    pub const NOTE_POLICY: FieldPolicy = FieldPolicy::AlwaysOverwrite;

    /// Apply the per-field policies.
    #[must_use]
    pub fn into_changes(self) -> BookmarkChanges {
        BookmarkChanges {
            title: Self::TITLE_POLICY.apply(self.title),
            url: Self::URL_POLICY.apply(self.url),
            note: Self::NOTE_POLICY.apply(self.note),
        }
    }
}
