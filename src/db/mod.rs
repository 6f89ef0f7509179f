use crate::config::SecurityConfig;
use crate::domain::{AnimeId, CommentId};
use crate::models::anime::{Anime, AnimeChanges, NewAnime, VideoListWrite};
use crate::models::comment::Comment;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: SecurityConfig,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1, SecurityConfig::default()).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        security: SecurityConfig,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, security })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn anime_repo(&self) -> repositories::anime::AnimeRepository {
        repositories::anime::AnimeRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone(), self.security.clone())
    }

    // Anime

    pub async fn add_anime(&self, anime: NewAnime) -> Result<Anime> {
        self.anime_repo().add(anime).await
    }

    pub async fn get_anime(&self, id: &AnimeId) -> Result<Option<Anime>> {
        self.anime_repo().get(id).await
    }

    pub async fn anime_exists(&self, id: &AnimeId) -> Result<bool> {
        self.anime_repo().exists(id).await
    }

    pub async fn list_all_anime(&self) -> Result<Vec<Anime>> {
        self.anime_repo().list_all().await
    }

    pub async fn get_comment_counts_for_anime_ids(
        &self,
        ids: &[AnimeId],
    ) -> Result<HashMap<AnimeId, i64>> {
        self.anime_repo().comment_counts(ids).await
    }

    pub async fn update_anime(
        &self,
        id: &AnimeId,
        changes: AnimeChanges,
        videos: Option<VideoListWrite>,
    ) -> Result<bool> {
        self.anime_repo().update(id, changes, videos).await
    }

    pub async fn remove_anime(&self, id: &AnimeId) -> Result<bool> {
        self.anime_repo().remove(id).await
    }

    // Comments

    pub async fn add_comment(
        &self,
        anime_id: &AnimeId,
        name: String,
        content: String,
    ) -> Result<Comment> {
        self.comment_repo().add(anime_id, name, content).await
    }

    pub async fn list_comments(&self, anime_id: &AnimeId) -> Result<Vec<Comment>> {
        self.comment_repo().list_for_anime(anime_id).await
    }

    pub async fn remove_comment(&self, id: &CommentId) -> Result<bool> {
        self.comment_repo().remove(id).await
    }

    // Users

    /// Creates the admin account when the users table is empty.
    /// Returns `true` if a user was created.
    pub async fn ensure_admin_user(&self, username: &str, password: &str) -> Result<bool> {
        let repo = self.user_repo();
        if repo.count().await? > 0 {
            return Ok(false);
        }

        repo.create(username, password).await?;
        info!(username = %username, "Bootstrapped admin user");
        Ok(true)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(&self, username: &str, new_password: &str) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn get_user_api_key(&self, username: &str) -> Result<Option<String>> {
        Ok(self
            .user_repo()
            .get_by_username(username)
            .await?
            .map(|u| u.api_key))
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}
