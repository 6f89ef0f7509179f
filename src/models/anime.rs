use crate::domain::{AnimeId, VideoList};
use crate::entities::anime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anime {
    pub id: AnimeId,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    /// Raw column text. Kept alongside the decoded list so updates can
    /// detect concurrent edits.
    pub video_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Anime {
    #[must_use]
    pub fn videos(&self) -> VideoList {
        VideoList::decode(self.video_url.as_deref())
    }
}

impl From<anime::Model> for Anime {
    fn from(model: anime::Model) -> Self {
        Self {
            id: AnimeId::new(model.id),
            title: model.title,
            description: model.description,
            thumbnail: model.thumbnail,
            video_url: model.video_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Validated input for a new anime row.
#[derive(Debug, Clone)]
pub struct NewAnime {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub videos: VideoList,
}

/// Metadata fields to overwrite. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AnimeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// New `video_url` text, written only if the column still holds `expected`.
#[derive(Debug, Clone)]
pub struct VideoListWrite {
    pub expected: Option<String>,
    pub new: String,
}
