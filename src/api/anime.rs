use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{
    AnimeDto, ApiError, ApiResponse, AppState, CreateAnimeRequest, MessageResponse,
    UpdateAnimeRequest,
};
use crate::api::validation::validate_record_id;
use crate::domain::AnimeId;
use crate::services::anime_service::{AnimeUpdate, CreateAnimeInput};

/// `GET /api/anime`
pub async fn list_anime(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AnimeDto>>>, ApiError> {
    let anime = state.anime_service().list_anime().await?;
    Ok(Json(ApiResponse::success(anime)))
}

/// `GET /api/anime/{id}`
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AnimeDto>>, ApiError> {
    let id = AnimeId::new(validate_record_id("Anime", &id)?);
    let anime = state.anime_service().get_anime(&id).await?;
    Ok(Json(ApiResponse::success(anime)))
}

/// `POST /api/anime`
pub async fn create_anime(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAnimeRequest>,
) -> Result<Json<ApiResponse<AnimeDto>>, ApiError> {
    let anime = state
        .anime_service()
        .create_anime(CreateAnimeInput {
            title: payload.title,
            description: payload.description,
            thumbnail: payload.thumbnail,
            videos: payload.videos,
        })
        .await?;

    Ok(Json(ApiResponse::success(anime)))
}

/// `PUT /api/anime/{id}`
///
/// Metadata fields left empty keep their stored value. `deleteVideoIndex`
/// removes one episode and suppresses `videoUrl` in the same request.
pub async fn update_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAnimeRequest>,
) -> Result<Json<ApiResponse<AnimeDto>>, ApiError> {
    let id = AnimeId::new(validate_record_id("Anime", &id)?);
    let update = AnimeUpdate {
        title: payload.title,
        description: payload.description,
        thumbnail: payload.thumbnail,
        video_url: payload.video_url,
        delete_video_index: payload.delete_video_index,
    };

    let anime = state.anime_service().update_anime(&id, update).await?;
    Ok(Json(ApiResponse::success(anime)))
}

/// `DELETE /api/anime/{id}`
pub async fn delete_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = AnimeId::new(validate_record_id("Anime", &id)?);
    state.anime_service().delete_anime(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Anime deleted successfully",
    ))))
}
