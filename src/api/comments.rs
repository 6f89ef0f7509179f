use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CommentDto, CommentsQuery, CreateCommentRequest,
    MessageResponse,
};
use crate::api::validation::validate_record_id;
use crate::domain::CommentId;
use crate::services::comment_service::CreateCommentInput;

/// `GET /api/comments?animeId=`
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<ApiResponse<Vec<CommentDto>>>, ApiError> {
    let comments = state
        .comment_service()
        .list_comments(query.anime_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(comments)))
}

/// `POST /api/comments`
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    let comment = state
        .comment_service()
        .create_comment(CreateCommentInput {
            name: payload.name,
            content: payload.content,
            anime_id: payload.anime_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(comment)))
}

/// `DELETE /api/comments/{id}` (admin)
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = CommentId::new(validate_record_id("Comment", &id)?);
    state.comment_service().delete_comment(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Comment deleted successfully",
    ))))
}
