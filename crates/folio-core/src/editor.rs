//! Article editor
//!
//! The editor owns the whole add/edit/delete workflow for an article's
//! blocks:
//! - validate the draft
//! - upload any new image files
//! - hand the finished content to the [`SequenceManager`]
//!
//! Uploads run before any order is written, so a failed upload never leaves
//! a shifted gap behind. Inserts check their anchor before uploading.

use crate::blob::{upload_path, BlobStore, InMemoryBlobStore};
use crate::config::{FolioConfig, StorageConfig};
use crate::draft::{BlockDraft, ImageSource};
use crate::error::Result;
use chrono::Utc;
use folio_model::{ArticleId, Block, BlockContent, BlockId, ImageUrl, OrderKey};
use folio_sequence::{InMemoryRecordStore, RecordStore, SequenceManager};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a new block goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// After every existing block
    #[default]
    End,
    /// Immediately after the block at this order
    After(OrderKey),
}

/// Block editing workflow over a record store and a blob store
pub struct ArticleEditor<S: ?Sized, B: ?Sized> {
    sequence: SequenceManager<S>,
    blobs: Arc<B>,
    storage: StorageConfig,
}

impl<S: ?Sized, B: ?Sized> fmt::Debug for ArticleEditor<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleEditor")
            .field("sequence", &self.sequence)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl ArticleEditor<InMemoryRecordStore, InMemoryBlobStore> {
    /// Editor backed by fresh in-memory stores
    #[must_use]
    pub fn in_memory(config: &FolioConfig) -> Self {
        Self::new(
            SequenceManager::with_config(Arc::new(InMemoryRecordStore::new()), config.sequence),
            Arc::new(InMemoryBlobStore::new()),
            config.storage.clone(),
        )
    }
}

impl<S, B> ArticleEditor<S, B>
where
    S: RecordStore + ?Sized,
    B: BlobStore + ?Sized,
{
    /// Create editor
    #[inline]
    #[must_use]
    pub fn new(sequence: SequenceManager<S>, blobs: Arc<B>, storage: StorageConfig) -> Self {
        Self {
            sequence,
            blobs,
            storage,
        }
    }

    /// Sequence manager used for every order decision
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> &SequenceManager<S> {
        &self.sequence
    }

    /// Blob store receiving uploads
    #[inline]
    #[must_use]
    pub fn blobs(&self) -> &Arc<B> {
        &self.blobs
    }

    /// Validate, upload and place a new block
    ///
    /// # Errors
    /// - `FolioError::Invalid` if the draft is incomplete; nothing is written
    /// - `FolioError::Sequence` with `AnchorNotFound` if the insert anchor is
    ///   missing; nothing is uploaded
    /// - `FolioError::Blob` if an upload fails; no order is touched
    /// - `FolioError::Sequence` if placing the block fails
    pub async fn add_block(
        &self,
        article: ArticleId,
        draft: BlockDraft,
        placement: Placement,
    ) -> Result<Block> {
        draft.validate()?;
        if let Placement::After(order) = placement {
            self.sequence.ensure_anchor(article, order).await?;
        }
        let content = self.resolve(article, draft).await?;

        let block = match placement {
            Placement::End => self.sequence.append(article, content).await?,
            Placement::After(order) => {
                self.sequence
                    .insert_after(article, order, content)
                    .await?
            }
        };
        Ok(block)
    }

    /// Replace a block's content, uploading any new files
    ///
    /// The kind may change. Image fields may be left empty, in which case
    /// the block renders a placeholder.
    ///
    /// # Errors
    /// - `FolioError::Invalid` for blank text or an empty gallery
    /// - `FolioError::Blob` if an upload fails
    /// - `FolioError::Sequence` if the block is missing or the write fails
    pub async fn edit_block(&self, id: BlockId, draft: BlockDraft) -> Result<Block> {
        draft.validate_edit()?;

        let current = self.sequence.get(id).await?;
        let content = self.resolve(current.article_id, draft).await?;
        Ok(self.sequence.edit(id, content).await?)
    }

    /// Remove a block; siblings keep their orders
    ///
    /// # Errors
    /// Fails if the block is missing or the write fails.
    pub async fn delete_block(&self, id: BlockId) -> Result<()> {
        Ok(self.sequence.delete(id).await?)
    }

    /// Blocks of an article in render order
    ///
    /// # Errors
    /// Fails if the read fails.
    pub async fn blocks(&self, article: ArticleId) -> Result<Vec<Block>> {
        Ok(self.sequence.list(article).await?)
    }

    async fn resolve(&self, article: ArticleId, draft: BlockDraft) -> Result<BlockContent> {
        let uploads = draft.pending_uploads();
        if uploads > 0 {
            tracing::debug!("Uploading {} image(s) for article {}", uploads, article);
        }

        let millis = Utc::now().timestamp_millis();
        let mut index = 0;

        let content = match draft {
            BlockDraft::Text { text } => BlockContent::Text { text },
            BlockDraft::TextImage { text, image } => BlockContent::TextImage {
                text,
                image_url: self.resolve_optional(article, millis, &mut index, image).await?,
            },
            BlockDraft::Image { image } => BlockContent::Image {
                image_url: self.resolve_optional(article, millis, &mut index, image).await?,
            },
            BlockDraft::Patterned { images } => {
                let mut urls = Vec::with_capacity(images.len());
                for source in images {
                    urls.push(self.resolve_one(article, millis, &mut index, source).await?);
                }
                BlockContent::Patterned { images: urls }
            }
        };
        Ok(content)
    }

    async fn resolve_optional(
        &self,
        article: ArticleId,
        millis: i64,
        index: &mut usize,
        source: Option<ImageSource>,
    ) -> Result<Option<ImageUrl>> {
        match source {
            Some(source) => Ok(Some(self.resolve_one(article, millis, index, source).await?)),
            None => Ok(None),
        }
    }

    async fn resolve_one(
        &self,
        article: ArticleId,
        millis: i64,
        index: &mut usize,
        source: ImageSource,
    ) -> Result<ImageUrl> {
        match source {
            ImageSource::Existing(url) => Ok(url),
            ImageSource::Upload(file) => {
                let path = upload_path(&self.storage.path_prefix, article, millis, *index, &file.name);
                *index += 1;
                let url = self
                    .blobs
                    .upload(&self.storage.image_bucket, &path, file.bytes)
                    .await
                    .map_err(|e| {
                        tracing::error!("Upload of {} failed: {}", path, e);
                        e
                    })?;
                tracing::trace!("Uploaded {} as {}", path, url);
                Ok(url)
            }
        }
    }
}
