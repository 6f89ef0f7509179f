use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, UploadQuery, UploadResultDto};
use crate::services::UploadKind;

/// `POST /api/upload?filename=&type=`
///
/// The request body is the raw file content.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<UploadResultDto>>, ApiError> {
    let kind = UploadKind::parse(query.kind.as_deref());
    let result = state
        .upload_service()
        .upload(query.filename.as_deref(), kind, body)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}
