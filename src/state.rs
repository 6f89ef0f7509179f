use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnimeService, AuthService, CommentService, SeaOrmAnimeService, SeaOrmAuthService,
    SeaOrmCommentService, UploadService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub anime_service: Arc<dyn AnimeService>,

    pub comment_service: Arc<dyn CommentService>,

    pub auth_service: Arc<dyn AuthService>,

    pub upload_service: Arc<UploadService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
            config.security.clone(),
        )
        .await?;

        store
            .ensure_admin_user(&config.admin.username, &config.admin.password)
            .await?;

        let upload_service = UploadService::from_config(&config.storage)?;
        Ok(Self::with_upload_service(config, store, upload_service))
    }

    /// Wires services around an already-open store.
    #[must_use]
    pub fn with_upload_service(config: Config, store: Store, uploads: UploadService) -> Self {
        let anime_service =
            Arc::new(SeaOrmAnimeService::new(store.clone())) as Arc<dyn AnimeService>;
        let comment_service =
            Arc::new(SeaOrmCommentService::new(store.clone())) as Arc<dyn CommentService>;
        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone())) as Arc<dyn AuthService>;

        Self {
            config: Arc::new(config),
            store,
            anime_service,
            comment_service,
            auth_service,
            upload_service: Arc::new(uploads),
        }
    }
}
