//! `SeaORM` implementation of the `CommentService` trait.

use crate::api::types::CommentDto;
use crate::db::Store;
use crate::domain::{AnimeId, CommentId};
use crate::services::anime_service::non_blank;
use crate::services::comment_service::{CommentError, CommentService, CreateCommentInput};

pub struct SeaOrmCommentService {
    store: Store,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl CommentService for SeaOrmCommentService {
    async fn list_comments(&self, anime_id: Option<&str>) -> Result<Vec<CommentDto>, CommentError> {
        let anime_id = non_blank(anime_id.map(ToString::to_string))
            .map(AnimeId::new)
            .ok_or_else(|| CommentError::InvalidInput("Anime ID is required".to_string()))?;

        let comments = self.store.list_comments(&anime_id).await?;
        Ok(comments.into_iter().map(CommentDto::from).collect())
    }

    async fn create_comment(&self, input: CreateCommentInput) -> Result<CommentDto, CommentError> {
        let (Some(name), Some(content), Some(anime_id)) = (
            non_blank(input.name),
            non_blank(input.content),
            non_blank(input.anime_id),
        ) else {
            return Err(CommentError::InvalidInput(
                "Missing required fields".to_string(),
            ));
        };

        let anime_id = AnimeId::new(anime_id);
        if !self.store.anime_exists(&anime_id).await? {
            return Err(CommentError::AnimeNotFound(anime_id));
        }

        let comment = self.store.add_comment(&anime_id, name, content).await?;
        Ok(CommentDto::from(comment))
    }

    async fn delete_comment(&self, id: &CommentId) -> Result<(), CommentError> {
        if self.store.remove_comment(id).await? {
            Ok(())
        } else {
            Err(CommentError::NotFound(id.clone()))
        }
    }
}
