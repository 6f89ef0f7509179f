use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::api::validation::validate_credentials;
use crate::services::{AdminInfo, LoginResult};

const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: String,
}

/// Username of the authenticated admin, inserted by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

// ============================================================================
// Middleware
// ============================================================================

/// Admin gate. Accepts, in order:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(Some(user)) = session.get::<String>(SESSION_USER_KEY).await {
        tracing::Span::current().record("user_id", user.as_str());
        request.extensions_mut().insert(AdminUser(user));
        return next.run(request).await;
    }

    if let Some(key) = extract_api_key(&headers) {
        match state.auth_service().verify_api_key(&key).await {
            Ok(Some(user)) => {
                tracing::Span::current().record("user_id", user.as_str());
                request.extensions_mut().insert(AdminUser(user));
                return next.run(request).await;
            }
            Ok(None) => tracing::debug!("Unknown API key presented"),
            Err(e) => tracing::warn!(error = %e, "API key lookup failed"),
        }
    }

    ApiError::unauthorized().into_response()
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
        && !key_str.trim().is_empty()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let (username, password) = validate_credentials(&payload.username, &payload.password)?;

    let result = state.auth_service().login(username, password).await?;

    session
        .insert(SESSION_USER_KEY, &result.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(result)))
}

/// `POST /api/auth/logout`
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session");
    }
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// `GET /api/auth/me`
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(AdminUser(username)): Extension<AdminUser>,
) -> Result<Json<ApiResponse<AdminInfo>>, ApiError> {
    let info = state.auth_service().admin_info(&username).await?;
    Ok(Json(ApiResponse::success(info)))
}

/// `PUT /api/auth/password`
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(AdminUser(username)): Extension<AdminUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(&username, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// `POST /api/auth/api-key/regenerate`
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    Extension(AdminUser(username)): Extension<AdminUser>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.auth_service().regenerate_api_key(&username).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}
