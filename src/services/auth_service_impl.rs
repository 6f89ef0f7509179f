//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::services::auth_service::{
    AdminInfo, AuthError, AuthService, LoginResult, validate_new_password,
};
use async_trait::async_trait;
use tracing::{info, warn};

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        if !self.store.verify_user_password(username, password).await? {
            warn!(username = %username, "Rejected admin login");
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        info!(username = %user.username, "Admin logged in");
        Ok(LoginResult {
            username: user.username,
            api_key: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<String>, AuthError> {
        Ok(self
            .store
            .verify_api_key(api_key)
            .await?
            .map(|user| user.username))
    }

    async fn admin_info(&self, username: &str) -> Result<AdminInfo, AuthError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AuthError::AdminNotFound(username.to_string()))?;

        Ok(AdminInfo {
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_new_password(current_password, new_password)?;

        if !self
            .store
            .verify_user_password(username, current_password)
            .await?
        {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(username, new_password)
            .await?;
        info!(username = %username, "Admin password changed");
        Ok(())
    }

    async fn regenerate_api_key(&self, username: &str) -> Result<String, AuthError> {
        let key = self.store.regenerate_user_api_key(username).await?;
        info!(username = %username, "Admin API key regenerated");
        Ok(key)
    }
}
