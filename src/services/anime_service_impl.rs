//! `SeaORM` implementation of the `AnimeService` trait.

use crate::api::types::{AnimeDto, CommentDto};
use crate::db::Store;
use crate::domain::{AnimeId, VideoList};
use crate::models::anime::{NewAnime, VideoListWrite};
use crate::services::anime_service::{
    AnimeError, AnimeService, AnimeUpdate, CreateAnimeInput, VideoMutation, anime_to_dto,
    non_blank,
};
use tracing::{debug, info};

pub struct SeaOrmAnimeService {
    store: Store,
}

impl SeaOrmAnimeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn fetch(&self, id: &AnimeId) -> Result<AnimeDto, AnimeError> {
        let anime = self
            .store
            .get_anime(id)
            .await?
            .ok_or_else(|| AnimeError::NotFound(id.clone()))?;
        Ok(anime_to_dto(anime, None, None))
    }
}

#[async_trait::async_trait]
impl AnimeService for SeaOrmAnimeService {
    async fn list_anime(&self) -> Result<Vec<AnimeDto>, AnimeError> {
        let anime_list = self.store.list_all_anime().await?;

        let ids: Vec<AnimeId> = anime_list.iter().map(|a| a.id.clone()).collect();
        let counts = self.store.get_comment_counts_for_anime_ids(&ids).await?;

        Ok(anime_list
            .into_iter()
            .map(|anime| {
                let count = counts.get(&anime.id).copied().unwrap_or(0);
                anime_to_dto(anime, Some(count), None)
            })
            .collect())
    }

    async fn get_anime(&self, id: &AnimeId) -> Result<AnimeDto, AnimeError> {
        let (anime, comments) =
            tokio::join!(self.store.get_anime(id), self.store.list_comments(id));

        let anime = anime?.ok_or_else(|| AnimeError::NotFound(id.clone()))?;
        let comments: Vec<CommentDto> = comments?.into_iter().map(CommentDto::from).collect();
        let count = i64::try_from(comments.len()).unwrap_or(i64::MAX);

        Ok(anime_to_dto(anime, Some(count), Some(comments)))
    }

    async fn create_anime(&self, input: CreateAnimeInput) -> Result<AnimeDto, AnimeError> {
        let (Some(title), Some(description)) =
            (non_blank(input.title), non_blank(input.description))
        else {
            return Err(AnimeError::InvalidInput(
                "Title and description are required".to_string(),
            ));
        };

        let anime = self
            .store
            .add_anime(NewAnime {
                title,
                description,
                thumbnail: non_blank(input.thumbnail),
                videos: VideoList::from(input.videos.unwrap_or_default()),
            })
            .await?;

        Ok(anime_to_dto(anime, Some(0), None))
    }

    async fn update_anime(
        &self,
        id: &AnimeId,
        update: AnimeUpdate,
    ) -> Result<AnimeDto, AnimeError> {
        let anime = self
            .store
            .get_anime(id)
            .await?
            .ok_or_else(|| AnimeError::NotFound(id.clone()))?;

        let video_write = update.video_mutation().map(|mutation| {
            let mut videos = anime.videos();
            match mutation {
                VideoMutation::Append(url) => {
                    debug!(anime_id = %id, url = %url, "Appending episode");
                    videos.push(url);
                }
                VideoMutation::Remove(index) => {
                    if videos.remove_at(index).is_none() {
                        debug!(anime_id = %id, index, "Episode index out of range, list unchanged");
                    }
                }
            }
            VideoListWrite {
                expected: anime.video_url.clone(),
                new: videos.encode(),
            }
        });

        let updated = self
            .store
            .update_anime(id, update.metadata_changes(), video_write)
            .await?;

        if !updated {
            return if self.store.anime_exists(id).await? {
                Err(AnimeError::Conflict(id.clone()))
            } else {
                Err(AnimeError::NotFound(id.clone()))
            };
        }

        info!(anime_id = %id, "Updated anime");
        self.fetch(id).await
    }

    async fn delete_anime(&self, id: &AnimeId) -> Result<(), AnimeError> {
        if self.store.remove_anime(id).await? {
            Ok(())
        } else {
            Err(AnimeError::NotFound(id.clone()))
        }
    }
}
