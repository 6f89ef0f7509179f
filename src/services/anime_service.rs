//! Domain service for the anime catalogue.
//!
//! Handlers go through [`AnimeService`] instead of touching the store, so
//! validation and the video-list rules live in one place.

use crate::api::types::{AnimeDto, CommentDto};
use crate::domain::AnimeId;
use crate::models::anime::{Anime, AnimeChanges};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnimeError {
    #[error("Anime not found: {0}")]
    NotFound(AnimeId),

    #[error("{0}")]
    InvalidInput(String),

    /// The video list changed between read and write.
    #[error("Anime {0} was modified concurrently, reload and try again")]
    Conflict(AnimeId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for AnimeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AnimeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Unvalidated fields for a new anime.
#[derive(Debug, Clone, Default)]
pub struct CreateAnimeInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub videos: Option<Vec<String>>,
}

/// Partial update. Blank or missing metadata fields keep the stored value.
#[derive(Debug, Clone, Default)]
pub struct AnimeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    /// Episode URL to append.
    pub video_url: Option<String>,
    /// Episode position to remove. Takes precedence over `video_url`; an
    /// out-of-range index removes nothing and still suppresses the append.
    pub delete_video_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoMutation {
    Append(String),
    Remove(i64),
}

impl AnimeUpdate {
    /// At most one video mutation is applied per update.
    #[must_use]
    pub fn video_mutation(&self) -> Option<VideoMutation> {
        if let Some(index) = self.delete_video_index {
            return Some(VideoMutation::Remove(index));
        }
        non_blank(self.video_url.clone()).map(VideoMutation::Append)
    }

    #[must_use]
    pub fn metadata_changes(&self) -> AnimeChanges {
        AnimeChanges {
            title: non_blank(self.title.clone()),
            description: non_blank(self.description.clone()),
            thumbnail: non_blank(self.thumbnail.clone()),
        }
    }
}

#[async_trait::async_trait]
pub trait AnimeService: Send + Sync {
    /// Lists every anime, newest first, with decoded videos and comment counts.
    ///
    /// # Errors
    ///
    /// Returns [`AnimeError::Database`] on store failures.
    async fn list_anime(&self) -> Result<Vec<AnimeDto>, AnimeError>;

    /// Fetches one anime with its comments, newest first.
    ///
    /// # Errors
    ///
    /// - Returns [`AnimeError::NotFound`] if the anime does not exist
    /// - Returns [`AnimeError::Database`] on store failures
    async fn get_anime(&self, id: &AnimeId) -> Result<AnimeDto, AnimeError>;

    /// # Errors
    ///
    /// Returns [`AnimeError::InvalidInput`] if title or description is blank.
    async fn create_anime(&self, input: CreateAnimeInput) -> Result<AnimeDto, AnimeError>;

    /// # Errors
    ///
    /// - Returns [`AnimeError::NotFound`] if the anime does not exist
    /// - Returns [`AnimeError::Conflict`] if the video list changed concurrently
    async fn update_anime(&self, id: &AnimeId, update: AnimeUpdate)
    -> Result<AnimeDto, AnimeError>;

    /// Deletes an anime and its comments.
    ///
    /// # Errors
    ///
    /// Returns [`AnimeError::NotFound`] if the anime does not exist.
    async fn delete_anime(&self, id: &AnimeId) -> Result<(), AnimeError>;
}

/// Trims `value` and drops it when nothing is left.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn anime_to_dto(
    anime: Anime,
    comment_count: Option<i64>,
    comments: Option<Vec<CommentDto>>,
) -> AnimeDto {
    let videos = anime.videos().into_vec();
    AnimeDto {
        id: anime.id.into_inner(),
        title: anime.title,
        description: anime.description,
        thumbnail: anime.thumbnail,
        video_url: anime.video_url,
        videos,
        created_at: anime.created_at,
        updated_at: anime.updated_at,
        comment_count,
        comments,
    }
}
