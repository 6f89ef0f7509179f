//! Admin authentication.
//!
//! The public site is anonymous. Only catalogue writes, comment moderation
//! and uploads need an admin, identified by session login or API key.

use serde::Serialize;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Admin account not found: {0}")]
    AdminNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfo {
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub username: String,
    pub api_key: String,
}

/// Checks a password change before any hashing happens.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] for a short or unchanged password.
pub fn validate_new_password(current: &str, new: &str) -> Result<(), AuthError> {
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if current == new {
        return Err(AuthError::Validation(
            "New password must be different from current password".to_string(),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or wrong password.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves an API key to the admin's username.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<String>, AuthError>;

    async fn admin_info(&self, username: &str) -> Result<AdminInfo, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the current password is wrong or
    /// the new one is rejected by [`validate_new_password`].
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Replaces the admin's API key. The old key stops working immediately.
    async fn regenerate_api_key(&self, username: &str) -> Result<String, AuthError>;
}
