//! Destinations for uploaded files.
//!
//! [`BlobStorage`] talks to an HTTP object store and is used whenever a blob
//! token is configured. [`LocalStorage`] writes below a directory that the
//! router serves publicly.

use crate::config::StorageConfig;
use axum::body::Bytes;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Blob store rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),
}

/// Where a stored object can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub download_url: String,
}

#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stores `body` under `pathname` (a relative, `/`-separated key).
    async fn put(
        &self,
        pathname: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;
}

/// Builds the backend selected by `config`.
pub fn backend_from_config(config: &StorageConfig) -> anyhow::Result<Box<dyn StorageBackend>> {
    if config.uses_blob_store() {
        info!(api = %config.blob_api_url, "Uploads go to blob storage");
        Ok(Box::new(BlobStorage::new(config)?))
    } else {
        info!(dir = %config.upload_dir, "Uploads go to local disk");
        Ok(Box::new(LocalStorage::new(
            &config.upload_dir,
            &config.public_path,
        )))
    }
}

/// Rejects keys that could escape the storage root.
fn validate_pathname(pathname: &str) -> Result<(), StorageError> {
    let path = Path::new(pathname);
    let safe = !pathname.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if safe {
        Ok(())
    } else {
        Err(StorageError::InvalidPath(pathname.to_string()))
    }
}

pub struct LocalStorage {
    root: PathBuf,
    public_path: String,
}

impl LocalStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_path: &str) -> Self {
        Self {
            root: root.into(),
            public_path: public_path.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put(
        &self,
        pathname: &str,
        body: Bytes,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        validate_pathname(pathname)?;

        let file_path = self.root.join(pathname);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, &body).await?;

        info!(path = %file_path.display(), bytes = body.len(), "Stored upload on disk");

        let url = format!("{}/{}", self.public_path, pathname);
        Ok(StoredObject {
            download_url: url.clone(),
            url,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobPutResponse {
    url: String,
    download_url: Option<String>,
}

pub struct BlobStorage {
    client: reqwest::Client,
    api_url: url::Url,
    token: String,
    api_version: String,
}

impl BlobStorage {
    pub fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        let base = format!("{}/", config.blob_api_url.trim_end_matches('/'));
        let api_url = url::Url::parse(&base)
            .map_err(|e| anyhow::anyhow!("Invalid blob_api_url '{}': {e}", config.blob_api_url))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Zyxnime/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build blob HTTP client: {e}"))?;

        Ok(Self {
            client,
            api_url,
            token: config.blob_token.trim().to_string(),
            api_version: config.blob_api_version.clone(),
        })
    }

    fn endpoint(&self, pathname: &str) -> Result<url::Url, StorageError> {
        let encoded: Vec<String> = pathname
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        self.api_url
            .join(&encoded.join("/"))
            .map_err(|e| StorageError::InvalidPath(format!("{pathname}: {e}")))
    }
}

#[async_trait::async_trait]
impl StorageBackend for BlobStorage {
    fn name(&self) -> &'static str {
        "blob"
    }

    async fn put(
        &self,
        pathname: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        validate_pathname(pathname)?;
        let endpoint = self.endpoint(pathname)?;
        let size = body.len();

        let response = self
            .client
            .put(endpoint)
            .bearer_auth(&self.token)
            .header("x-api-version", &self.api_version)
            .header("x-content-type", content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let blob: BlobPutResponse = response.json().await?;
        info!(pathname = %pathname, bytes = size, url = %blob.url, "Stored upload in blob store");

        let download_url = blob.download_url.unwrap_or_else(|| {
            let separator = if blob.url.contains('?') { '&' } else { '?' };
            format!("{}{separator}download=1", blob.url)
        });

        Ok(StoredObject {
            url: blob.url,
            download_url,
        })
    }
}
