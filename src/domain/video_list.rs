//! Ordered list of episode video URLs stored in a single text column.
//!
//! The column holds a JSON array of strings. Decoding never fails: missing,
//! empty or malformed text reads back as an empty list so a corrupted row
//! shows "no episodes" instead of breaking the page.

use serde::{Deserialize, Serialize};

/// Text stored for an anime without episodes.
pub const EMPTY_LIST: &str = "[]";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoList(Vec<String>);

impl VideoList {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses the stored column value.
    #[must_use]
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Self::new();
        };

        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(videos) => Self(videos),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed video list, treating as empty");
                Self::new()
            }
        }
    }

    /// Serializes for storage. Always produces a JSON array, never an empty string.
    #[must_use]
    pub fn encode(&self) -> String {
        if self.0.is_empty() {
            return EMPTY_LIST.to_string();
        }
        serde_json::to_string(&self.0).unwrap_or_else(|_| EMPTY_LIST.to_string())
    }

    pub fn push(&mut self, url: impl Into<String>) {
        self.0.push(url.into());
    }

    /// Removes the episode at `index`. Out-of-range indices leave the list
    /// untouched and return `None`.
    pub fn remove_at(&mut self, index: i64) -> Option<String> {
        let index = usize::try_from(index).ok()?;
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for VideoList {
    fn from(videos: Vec<String>) -> Self {
        Self(videos)
    }
}

/// Encodes `videos` into column text.
#[must_use]
pub fn encode(videos: &[String]) -> String {
    VideoList(videos.to_vec()).encode()
}

/// Decodes column text into a list of URLs.
#[must_use]
pub fn decode(raw: Option<&str>) -> Vec<String> {
    VideoList::decode(raw).into_vec()
}

/// Appends `url` to the list stored in `raw`.
#[must_use]
pub fn append(raw: Option<&str>, url: &str) -> String {
    let mut list = VideoList::decode(raw);
    list.push(url);
    list.encode()
}

/// Removes the element at `index` from the list stored in `raw`.
#[must_use]
pub fn remove_at(raw: Option<&str>, index: i64) -> String {
    let mut list = VideoList::decode(raw);
    list.remove_at(index);
    list.encode()
}
