pub mod anime_service;
pub use anime_service::{AnimeError, AnimeService};

pub mod anime_service_impl;
pub use anime_service_impl::SeaOrmAnimeService;

pub mod comment_service;
pub mod comment_service_impl;
pub use comment_service::{CommentError, CommentService};
pub use comment_service_impl::SeaOrmCommentService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AdminInfo, AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod storage;
pub use storage::{BlobStorage, LocalStorage, StorageBackend, StorageError, StoredObject};

pub mod upload_service;
pub use upload_service::{UploadError, UploadKind, UploadService};
