//! Domain service for visitor comments.

use crate::api::types::CommentDto;
use crate::domain::{AnimeId, CommentId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Comment not found: {0}")]
    NotFound(CommentId),

    #[error("Anime not found: {0}")]
    AnimeNotFound(AnimeId),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for CommentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CommentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateCommentInput {
    pub name: Option<String>,
    pub content: Option<String>,
    pub anime_id: Option<String>,
}

#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    /// Comments for one anime, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::InvalidInput`] if `anime_id` is missing.
    async fn list_comments(&self, anime_id: Option<&str>) -> Result<Vec<CommentDto>, CommentError>;

    /// # Errors
    ///
    /// - Returns [`CommentError::InvalidInput`] if any field is blank
    /// - Returns [`CommentError::AnimeNotFound`] if the anime does not exist
    async fn create_comment(&self, input: CreateCommentInput) -> Result<CommentDto, CommentError>;

    /// Moderation delete.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::NotFound`] if the comment does not exist.
    async fn delete_comment(&self, id: &CommentId) -> Result<(), CommentError>;
}
