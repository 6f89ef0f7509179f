use crate::domain::{AnimeId, timestamp_now};
use crate::entities::{anime, comments};
use crate::models::anime::{Anime, AnimeChanges, NewAnime, VideoListWrite};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

pub struct AnimeRepository {
    conn: DatabaseConnection,
}

impl AnimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, new: NewAnime) -> anyhow::Result<Anime> {
        let id = AnimeId::generate();
        let now = timestamp_now();

        let model = anime::Model {
            id: id.as_str().to_string(),
            title: new.title,
            description: new.description,
            thumbnail: new.thumbnail,
            video_url: Some(new.videos.encode()),
            created_at: now.clone(),
            updated_at: now,
        };

        let active_model = anime::ActiveModel {
            id: Set(model.id.clone()),
            title: Set(model.title.clone()),
            description: Set(model.description.clone()),
            thumbnail: Set(model.thumbnail.clone()),
            video_url: Set(model.video_url.clone()),
            created_at: Set(model.created_at.clone()),
            updated_at: Set(model.updated_at.clone()),
        };

        anime::Entity::insert(active_model)
            .exec_without_returning(&self.conn)
            .await?;

        info!(anime_id = %id, title = %model.title, "Created anime");
        Ok(model.into())
    }

    pub async fn get(&self, id: &AnimeId) -> anyhow::Result<Option<Anime>> {
        let model = anime::Entity::find_by_id(id.as_str()).one(&self.conn).await?;
        Ok(model.map(Into::into))
    }

    pub async fn exists(&self, id: &AnimeId) -> anyhow::Result<bool> {
        let count = anime::Entity::find_by_id(id.as_str()).count(&self.conn).await?;
        Ok(count > 0)
    }

    /// All anime, newest first.
    pub async fn list_all(&self) -> anyhow::Result<Vec<Anime>> {
        let rows = anime::Entity::find()
            .order_by_desc(anime::Column::CreatedAt)
            .order_by_desc(anime::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn comment_counts(&self, ids: &[AnimeId]) -> anyhow::Result<HashMap<AnimeId, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw_ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let results: Vec<(String, i64)> = comments::Entity::find()
            .select_only()
            .column(comments::Column::AnimeId)
            .column_as(comments::Column::AnimeId.count(), "count")
            .filter(comments::Column::AnimeId.is_in(raw_ids))
            .group_by(comments::Column::AnimeId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(results
            .into_iter()
            .map(|(id, count)| (AnimeId::new(id), count))
            .collect())
    }

    /// Applies `changes` and, when given, swaps `video_url` from the expected
    /// value to the new one in a single statement.
    ///
    /// Returns `false` when no row matched: either the anime is gone or its
    /// video list no longer holds the expected text.
    pub async fn update(
        &self,
        id: &AnimeId,
        changes: AnimeChanges,
        videos: Option<VideoListWrite>,
    ) -> anyhow::Result<bool> {
        let mut query = anime::Entity::update_many()
            .col_expr(anime::Column::UpdatedAt, Expr::value(timestamp_now()))
            .filter(anime::Column::Id.eq(id.as_str()));

        if let Some(title) = changes.title {
            query = query.col_expr(anime::Column::Title, Expr::value(title));
        }
        if let Some(description) = changes.description {
            query = query.col_expr(anime::Column::Description, Expr::value(description));
        }
        if let Some(thumbnail) = changes.thumbnail {
            query = query.col_expr(anime::Column::Thumbnail, Expr::value(thumbnail));
        }

        if let Some(write) = videos {
            query = query.col_expr(anime::Column::VideoUrl, Expr::value(write.new));
            query = match write.expected {
                Some(expected) => query.filter(anime::Column::VideoUrl.eq(expected)),
                None => query.filter(anime::Column::VideoUrl.is_null()),
            };
        }

        let result = query.exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn remove(&self, id: &AnimeId) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await?;

        let deleted_comments = comments::Entity::delete_many()
            .filter(comments::Column::AnimeId.eq(id.as_str()))
            .exec(&txn)
            .await?;

        let result = anime::Entity::delete_by_id(id.as_str()).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(
                anime_id = %id,
                comments = deleted_comments.rows_affected,
                "Removed anime"
            );
        }
        Ok(removed)
    }
}
