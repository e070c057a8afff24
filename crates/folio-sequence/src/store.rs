//! Record store collaborator contract
//!
//! The store persists blocks and answers filtered, ordered listings. Order
//! keys only reach it through [`NewBlock`] and [`BlockPatch`] values built by
//! the [`SequenceManager`](crate::SequenceManager).

use async_trait::async_trait;
use chrono::Utc;
use folio_model::{ArticleId, Block, BlockContent, BlockId, OrderKey};
use serde::{Deserialize, Serialize};

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Network or backend failure
    #[error("transport error: {0}")]
    Transport(String),

    /// No block with this ID
    #[error("block not found: {0}")]
    NotFound(BlockId),

    /// Another sibling already holds the order key
    #[error("order {order} already taken in article {article}")]
    OrderConflict {
        /// Article whose sequence was written
        article: ArticleId,
        /// Contested key
        order: OrderKey,
    },

    /// Optimistic commit lost the race
    #[error("version mismatch for article {article}: expected {expected}, found {found}")]
    VersionMismatch {
        /// Article whose sequence was written
        article: ArticleId,
        /// Version the writer read
        expected: u64,
        /// Version at commit time
        found: u64,
    },

    /// Record rejected by the backend
    #[error("validation failed: {0}")]
    Validation(String),

    /// The store does not implement this operation
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

impl StoreError {
    /// Check if a fresh attempt could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::VersionMismatch { .. })
    }
}

/// Listing direction on the order key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest order first (render order)
    #[default]
    Ascending,
    /// Largest order first
    Descending,
}

/// Filter and ordering for [`RecordStore::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockQuery {
    /// Owning article
    pub article_id: ArticleId,
    /// Only blocks with `order >= min_order`
    pub min_order: Option<OrderKey>,
    /// Sort on order key
    pub direction: SortDirection,
    /// Maximum rows returned
    pub limit: Option<usize>,
}

impl BlockQuery {
    /// All blocks of an article, ascending
    #[inline]
    #[must_use]
    pub fn article(article_id: ArticleId) -> Self {
        Self {
            article_id,
            min_order: None,
            direction: SortDirection::Ascending,
            limit: None,
        }
    }

    /// Sort descending
    #[inline]
    #[must_use]
    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Descending;
        self
    }

    /// Keep only `order >= min`
    #[inline]
    #[must_use]
    pub fn from_order(mut self, min: OrderKey) -> Self {
        self.min_order = Some(min);
        self
    }

    /// Limit row count
    #[inline]
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a block satisfies the filter part of the query
    #[inline]
    #[must_use]
    pub fn matches(&self, block: &Block) -> bool {
        block.article_id == self.article_id && self.min_order.map_or(true, |min| block.order >= min)
    }
}

/// A block about to be created, with its order already decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    article_id: ArticleId,
    content: BlockContent,
    order: OrderKey,
}

impl NewBlock {
    pub(crate) fn new(article_id: ArticleId, content: BlockContent, order: OrderKey) -> Self {
        Self {
            article_id,
            content,
            order,
        }
    }

    /// Owning article
    #[inline]
    #[must_use]
    pub fn article_id(&self) -> ArticleId {
        self.article_id
    }

    /// Payload
    #[inline]
    #[must_use]
    pub fn content(&self) -> &BlockContent {
        &self.content
    }

    /// Assigned order key
    #[inline]
    #[must_use]
    pub fn order(&self) -> OrderKey {
        self.order
    }

    /// Materialize as a stored block with a fresh ID and timestamps
    #[must_use]
    pub fn into_block(self) -> Block {
        Block::new(self.article_id, self.content, self.order)
    }
}

/// Partial update of a stored block
///
/// Content patches are public; order patches are only produced by the
/// sequence manager's shift step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockPatch {
    content: Option<BlockContent>,
    order: Option<OrderKey>,
}

impl BlockPatch {
    /// Replace the payload (the kind may change with it)
    #[inline]
    #[must_use]
    pub fn content(content: BlockContent) -> Self {
        Self {
            content: Some(content),
            order: None,
        }
    }

    pub(crate) fn reorder(order: OrderKey) -> Self {
        Self {
            content: None,
            order: Some(order),
        }
    }

    /// New payload, if any
    #[inline]
    #[must_use]
    pub fn new_content(&self) -> Option<&BlockContent> {
        self.content.as_ref()
    }

    /// New order key, if any
    #[inline]
    #[must_use]
    pub fn new_order(&self) -> Option<OrderKey> {
        self.order
    }

    /// Apply to a block, touching `updated_at`
    pub fn apply(self, block: &mut Block) {
        if let Some(content) = self.content {
            block.content = content;
        }
        if let Some(order) = self.order {
            block.order = order;
        }
        block.updated_at = Utc::now();
    }
}

/// One write inside an atomic [`RecordStore::commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockWrite {
    /// Patch an existing block
    Update {
        /// Target block
        id: BlockId,
        /// Patch to apply
        patch: BlockPatch,
    },
    /// Create a block
    Create(NewBlock),
}

/// Result of an atomic commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Article version after the commit
    pub version: u64,
    /// Blocks created by the commit, in write order
    pub created: Vec<Block>,
}

/// Asynchronous block record store
///
/// Every call is independent; the store is free to enforce per-write
/// uniqueness of `(article, order)`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a block
    async fn create(&self, block: NewBlock) -> Result<Block, StoreError>;

    /// Fetch one block
    async fn get(&self, id: BlockId) -> Result<Block, StoreError>;

    /// List blocks matching the query
    async fn list(&self, query: BlockQuery) -> Result<Vec<Block>, StoreError>;

    /// Patch one block
    async fn update(&self, id: BlockId, patch: BlockPatch) -> Result<Block, StoreError>;

    /// Remove one block
    async fn delete(&self, id: BlockId) -> Result<(), StoreError>;

    /// Current write version of an article's block set
    async fn version(&self, _article: ArticleId) -> Result<u64, StoreError> {
        Err(StoreError::Unsupported("version"))
    }

    /// Apply all writes atomically if the article is still at `expected`
    async fn commit(
        &self,
        _article: ArticleId,
        _expected: u64,
        _writes: Vec<BlockWrite>,
    ) -> Result<CommitOutcome, StoreError> {
        Err(StoreError::Unsupported("commit"))
    }
}
