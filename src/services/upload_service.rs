//! Upload passthrough: validates the file kind, picks a content type and
//! hands the body to the configured [`StorageBackend`].

use crate::api::types::UploadResultDto;
use crate::config::StorageConfig;
use crate::services::storage::{StorageBackend, backend_from_config};
use axum::body::Bytes;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.\-]").expect("static regex"));

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Thumbnail,
    Video,
    Other,
}

impl UploadKind {
    /// Matching is exact. Unknown, missing or differently cased kinds are
    /// treated as [`UploadKind::Other`].
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("thumbnail") => Self::Thumbnail,
            Some("video") => Self::Video,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Video => "video",
            Self::Other => "other",
        }
    }

    fn validate_extension(self, ext: &str) -> Result<(), UploadError> {
        match self {
            Self::Thumbnail if !IMAGE_EXTENSIONS.contains(&ext) => Err(UploadError::InvalidInput(
                "Invalid image format. Use jpg, jpeg, png, webp, or gif".to_string(),
            )),
            Self::Video if !VIDEO_EXTENSIONS.contains(&ext) => Err(UploadError::InvalidInput(
                "Invalid video format. Use mp4, webm, or ogg".to_string(),
            )),
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn content_type(self, filename: &str) -> String {
        let ext = file_extension(filename);
        match self {
            Self::Thumbnail if ext == "jpg" => "image/jpeg".to_string(),
            Self::Thumbnail => format!("image/{ext}"),
            Self::Video => format!("video/{ext}"),
            Self::Other => mime_guess::from_path(filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased text after the last `.`, or empty if there is none.
#[must_use]
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(filename, "_").into_owned()
}

/// `<kind>/<unix-millis>-<sanitized filename>`
#[must_use]
pub fn storage_key(kind: UploadKind, filename: &str, unix_millis: i64) -> String {
    format!("{kind}/{unix_millis}-{}", sanitize_filename(filename))
}

#[derive(Clone)]
pub struct UploadService {
    backend: Arc<dyn StorageBackend>,
}

impl UploadService {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &StorageConfig) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::from(backend_from_config(config)?)))
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Stores one uploaded file.
    ///
    /// # Errors
    ///
    /// - Returns [`UploadError::InvalidInput`] for a missing filename, an
    ///   extension outside the kind's allow-list, or an empty body
    /// - Returns [`UploadError::UploadFailed`] if the backend rejects the write
    pub async fn upload(
        &self,
        filename: Option<&str>,
        kind: UploadKind,
        body: Bytes,
    ) -> Result<UploadResultDto, UploadError> {
        let filename = filename
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| UploadError::InvalidInput("Filename is required".to_string()))?;

        kind.validate_extension(&file_extension(filename))?;

        if body.is_empty() {
            return Err(UploadError::InvalidInput("File body is empty".to_string()));
        }

        let pathname = storage_key(kind, filename, chrono::Utc::now().timestamp_millis());
        let content_type = kind.content_type(filename);
        let size = body.len();
        let started = Instant::now();

        let stored = self
            .backend
            .put(&pathname, body, &content_type)
            .await
            .map_err(|e| {
                warn!(pathname = %pathname, backend = self.backend.name(), error = %e, "Upload failed");
                metrics::counter!("uploads_total", "kind" => kind.as_str(), "status" => "error")
                    .increment(1);
                UploadError::UploadFailed(e.to_string())
            })?;

        metrics::counter!("uploads_total", "kind" => kind.as_str(), "status" => "ok").increment(1);
        metrics::histogram!("upload_duration_seconds", "backend" => self.backend.name())
            .record(started.elapsed().as_secs_f64());

        info!(
            pathname = %pathname,
            kind = %kind,
            bytes = size,
            backend = self.backend.name(),
            "Upload stored"
        );

        Ok(UploadResultDto {
            url: stored.url,
            download_url: stored.download_url,
            pathname,
            content_type,
        })
    }
}
