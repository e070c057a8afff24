//! Blob store collaborator
//!
//! Uploads image bytes and hands back a publicly resolvable URL. Layout and
//! sequencing only ever see the URL.

use async_trait::async_trait;
use folio_model::{ArticleId, ImageUrl};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Blob store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    /// Backend rejected or dropped the upload
    #[error("upload of {path} failed: {reason}")]
    UploadFailed {
        /// Object path
        path: String,
        /// Backend message
        reason: String,
    },

    /// Nothing to upload
    #[error("file {0} is empty")]
    EmptyFile(String),
}

impl BlobError {
    /// Check if the upload could succeed when retried
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UploadFailed { .. })
    }
}

/// Asynchronous object storage for images
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `bucket/path` and return its public URL
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<ImageUrl, BlobError>;
}

/// Object path for an uploaded block image
///
/// `{prefix}/{article}/{millis}_{index}_{file_name}`; the timestamp and
/// index keep repeated uploads of the same file name apart.
#[must_use]
pub fn upload_path(
    prefix: &str,
    article: ArticleId,
    millis: i64,
    index: usize,
    file_name: &str,
) -> String {
    format!("{prefix}/{article}/{millis}_{index}_{file_name}")
}

/// In-process [`BlobStore`] serving `memory://` URLs
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes for a URL previously returned by `upload`
    #[must_use]
    pub fn get(&self, url: &ImageUrl) -> Option<Vec<u8>> {
        let key = url.as_str().strip_prefix("memory://")?;
        self.objects.lock().get(key).cloned()
    }

    /// Number of stored objects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Check if nothing was uploaded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<ImageUrl, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::EmptyFile(path.to_string()));
        }
        let key = format!("{bucket}/{path}");
        self.objects.lock().insert(key.clone(), bytes);
        Ok(ImageUrl::new(format!("memory://{key}")))
    }
}
