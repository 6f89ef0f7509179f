use crate::domain::{AnimeId, CommentId, timestamp_now};
use crate::entities::{comments, prelude::*};
use crate::models::comment::Comment;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        anime_id: &AnimeId,
        name: String,
        content: String,
    ) -> anyhow::Result<Comment> {
        let id = CommentId::generate();

        let model = comments::Model {
            id: id.as_str().to_string(),
            name,
            content,
            anime_id: anime_id.as_str().to_string(),
            created_at: timestamp_now(),
        };

        let active_model = comments::ActiveModel {
            id: Set(model.id.clone()),
            name: Set(model.name.clone()),
            content: Set(model.content.clone()),
            anime_id: Set(model.anime_id.clone()),
            created_at: Set(model.created_at.clone()),
        };

        Comments::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;

        info!(comment_id = %id, anime_id = %anime_id, "Added comment");
        Ok(model.into())
    }

    /// Comments for one anime, newest first.
    pub async fn list_for_anime(&self, anime_id: &AnimeId) -> anyhow::Result<Vec<Comment>> {
        let rows = Comments::find()
            .filter(comments::Column::AnimeId.eq(anime_id.as_str()))
            .order_by_desc(comments::Column::CreatedAt)
            .order_by_desc(comments::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn remove(&self, id: &CommentId) -> anyhow::Result<bool> {
        let result = Comments::delete_by_id(id.as_str())
            .exec(&self.conn)
            .await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(comment_id = %id, "Removed comment");
        }
        Ok(removed)
    }
}
