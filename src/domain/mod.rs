//! Domain types for the anime catalogue with strong typing.
//!
//! Identifiers are opaque strings generated by the store. The newtypes below
//! keep anime and comment ids from being mixed up at call sites.

pub mod video_list;

pub use video_list::VideoList;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an Anime entry.
///
/// # Examples
///
/// ```rust
/// use zyxnime::domain::AnimeId;
///
/// let id = AnimeId::new("3f0c");
/// assert_eq!(id.as_str(), "3f0c");
/// assert_eq!(id.to_string(), "3f0c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimeId(String);

impl AnimeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AnimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AnimeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AnimeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Unique identifier for a Comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current time as a fixed-width RFC 3339 string.
///
/// Fixed microsecond precision keeps lexicographic order equal to
/// chronological order, which the `created_at` sort relies on.
#[must_use]
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
