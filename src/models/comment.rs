use crate::domain::{AnimeId, CommentId};
use crate::entities::comments;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub name: String,
    pub content: String,
    pub anime_id: AnimeId,
    pub created_at: String,
}

impl From<comments::Model> for Comment {
    fn from(model: comments::Model) -> Self {
        Self {
            id: CommentId::new(model.id),
            name: model.name,
            content: model.content,
            anime_id: AnimeId::new(model.anime_id),
            created_at: model.created_at,
        }
    }
}
