//! Sequence manager
//!
//! Decides order keys for new blocks and keeps siblings' relative order
//! consistent with as few writes as possible:
//! - append: one read, no shifts
//! - insert-after: one read, one shift per later sibling, highest first
//! - delete: no renumbering, gaps are fine

use crate::error::SequenceError;
use crate::store::{BlockPatch, BlockQuery, BlockWrite, NewBlock, RecordStore, StoreError};
use folio_model::{ArticleId, Block, BlockContent, BlockId, OrderKey};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

/// How insert-after applies its shift writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InsertMode {
    /// Independent writes, highest order first; no rollback on failure
    #[default]
    BestEffort,
    /// One atomic commit guarded by the article version, retried on conflict
    Optimistic {
        /// Attempts before giving up
        max_attempts: u32,
    },
}

/// Sequencing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Insert-after strategy
    pub insert_mode: InsertMode,
}

impl SequenceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With insert mode
    #[inline]
    #[must_use]
    pub fn with_insert_mode(mut self, mode: InsertMode) -> Self {
        self.insert_mode = mode;
        self
    }
}

/// One planned order change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    /// Block to move
    pub id: BlockId,
    /// Current order
    pub from: OrderKey,
    /// Order after the shift
    pub to: OrderKey,
}

/// Plan the `+1` shifts that open a slot right after `after`
///
/// Every sibling with `order > after` moves up by one. Shifts are returned
/// highest order first: each target key has been vacated by the previous
/// write, so a store enforcing per-write uniqueness never sees a collision.
///
/// # Errors
/// Returns `SequenceError::OrderExhausted` if a sibling sits at the largest
/// representable key.
pub fn plan_shifts(siblings: &[Block], after: OrderKey) -> Result<Vec<Shift>, SequenceError> {
    let mut shifts = siblings
        .iter()
        .filter(|b| b.order > after)
        .map(|b| {
            b.order
                .next()
                .map(|to| Shift {
                    id: b.id,
                    from: b.order,
                    to,
                })
                .ok_or(SequenceError::OrderExhausted(b.order))
        })
        .collect::<Result<Vec<_>, _>>()?;

    shifts.sort_by_key(|s| Reverse(s.from));
    Ok(shifts)
}

/// Owner of block order within articles
///
/// All order writes go through [`append`](Self::append),
/// [`insert_after`](Self::insert_after) and [`delete`](Self::delete).
pub struct SequenceManager<S: ?Sized> {
    store: Arc<S>,
    config: SequenceConfig,
}

impl<S: ?Sized> fmt::Debug for SequenceManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: ?Sized> Clone for SequenceManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config,
        }
    }
}

impl<S: RecordStore + ?Sized> SequenceManager<S> {
    /// Create manager with default configuration
    #[inline]
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, SequenceConfig::default())
    }

    /// Create manager with configuration
    #[inline]
    #[must_use]
    pub fn with_config(store: Arc<S>, config: SequenceConfig) -> Self {
        Self { store, config }
    }

    /// Underlying record store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Order for a block appended at the end of the article
    ///
    /// `max + 1`, or `0` for an empty article.
    ///
    /// # Errors
    /// Fails if the sibling read fails, or with `SequenceError::OrderExhausted`
    /// if the last block holds the largest key; nothing is written either way.
    pub async fn next_order_for_append(&self, article: ArticleId) -> Result<OrderKey, SequenceError> {
        let last = self
            .store
            .list(BlockQuery::article(article).descending().limit(1))
            .await?;

        match last.first() {
            Some(block) => block
                .order
                .next()
                .ok_or(SequenceError::OrderExhausted(block.order)),
            None => Ok(OrderKey::ZERO),
        }
    }

    /// Check that some block of the article holds `after`
    ///
    /// A single one-row read; nothing is written. A concurrent delete may
    /// still remove the anchor before the insert itself runs.
    ///
    /// # Errors
    /// - `SequenceError::AnchorNotFound` if no sibling holds `after`
    /// - `SequenceError::Store` if the read fails
    pub async fn ensure_anchor(&self, article: ArticleId, after: OrderKey) -> Result<(), SequenceError> {
        let first = self
            .store
            .list(BlockQuery::article(article).from_order(after).limit(1))
            .await?;

        match first.first() {
            Some(block) if block.order == after => Ok(()),
            _ => Err(SequenceError::AnchorNotFound {
                article,
                anchor: after,
            }),
        }
    }

    /// Open a slot right after the block at `after` and return its order
    ///
    /// Shifts every later sibling by one, highest first, as independent
    /// writes. Inserting after the last block performs no shifts.
    ///
    /// # Errors
    /// - `SequenceError::AnchorNotFound` if no sibling holds `after`
    /// - `SequenceError::ShiftInterrupted` if a shift write fails; earlier
    ///   shifts stay applied
    pub async fn next_order_for_insert_after(
        &self,
        article: ArticleId,
        after: OrderKey,
    ) -> Result<OrderKey, SequenceError> {
        let siblings = self.anchored_siblings(article, after).await?;
        let shifts = plan_shifts(&siblings, after)?;
        let order = after.next().ok_or(SequenceError::OrderExhausted(after))?;

        let total = shifts.len();
        for (applied, shift) in shifts.iter().enumerate() {
            if let Err(source) = self
                .store
                .update(shift.id, BlockPatch::reorder(shift.to))
                .await
            {
                tracing::error!(
                    "Shift of block {} failed after {}/{} writes: {}",
                    shift.id,
                    applied,
                    total,
                    source
                );
                return Err(SequenceError::ShiftInterrupted {
                    applied,
                    total,
                    source,
                });
            }
            tracing::trace!("Shifted block {} from {} to {}", shift.id, shift.from, shift.to);
        }

        tracing::debug!("Opened order {} in article {} ({} shifts)", order, article, total);
        Ok(order)
    }

    /// Append a block at the end of the article
    ///
    /// # Errors
    /// - `SequenceError::InvalidContent` if the content is incomplete;
    ///   nothing is read or written
    /// - otherwise fails if the sibling read or the create fails
    pub async fn append(
        &self,
        article: ArticleId,
        content: BlockContent,
    ) -> Result<Block, SequenceError> {
        content.validate()?;
        let order = self.next_order_for_append(article).await?;
        let block = self
            .store
            .create(NewBlock::new(article, content, order))
            .await?;

        tracing::info!("Appended {} block {} at order {}", block.kind(), block.id, order);
        Ok(block)
    }

    /// Insert a block immediately after the block at `after`
    ///
    /// Uses the configured [`InsertMode`].
    ///
    /// # Errors
    /// See [`next_order_for_insert_after`](Self::next_order_for_insert_after);
    /// optimistic mode additionally returns `SequenceError::VersionConflict`.
    /// Incomplete content fails with `SequenceError::InvalidContent` before
    /// any shift.
    pub async fn insert_after(
        &self,
        article: ArticleId,
        after: OrderKey,
        content: BlockContent,
    ) -> Result<Block, SequenceError> {
        content.validate()?;
        match self.config.insert_mode {
            InsertMode::BestEffort => {
                let order = self.next_order_for_insert_after(article, after).await?;
                let block = self
                    .store
                    .create(NewBlock::new(article, content, order))
                    .await?;
                tracing::info!("Inserted {} block {} at order {}", block.kind(), block.id, order);
                Ok(block)
            }
            InsertMode::Optimistic { max_attempts } => {
                self.insert_optimistic(article, after, content, max_attempts)
                    .await
            }
        }
    }

    /// Replace a block's content; its order is untouched
    ///
    /// Image fields may be empty, blank text and empty galleries may not.
    ///
    /// # Errors
    /// Fails if the content is rejected, the block does not exist or the
    /// write fails.
    pub async fn edit(&self, id: BlockId, content: BlockContent) -> Result<Block, SequenceError> {
        content.validate_edit()?;
        let block = self.store.update(id, BlockPatch::content(content)).await?;
        tracing::info!("Edited block {} (now {})", id, block.kind());
        Ok(block)
    }

    /// Fetch one block
    ///
    /// # Errors
    /// Fails if the block does not exist or the read fails.
    pub async fn get(&self, id: BlockId) -> Result<Block, SequenceError> {
        Ok(self.store.get(id).await?)
    }

    /// Remove a block without renumbering its siblings
    ///
    /// # Errors
    /// Fails if the block does not exist or the write fails.
    pub async fn delete(&self, id: BlockId) -> Result<(), SequenceError> {
        self.store.delete(id).await?;
        tracing::info!("Deleted block {}", id);
        Ok(())
    }

    /// All blocks of an article in render order
    ///
    /// # Errors
    /// Fails if the read fails.
    pub async fn list(&self, article: ArticleId) -> Result<Vec<Block>, SequenceError> {
        Ok(self.store.list(BlockQuery::article(article)).await?)
    }

    async fn anchored_siblings(
        &self,
        article: ArticleId,
        after: OrderKey,
    ) -> Result<Vec<Block>, SequenceError> {
        let siblings = self
            .store
            .list(BlockQuery::article(article).from_order(after).descending())
            .await?;

        if siblings.iter().any(|b| b.order == after) {
            Ok(siblings)
        } else {
            Err(SequenceError::AnchorNotFound {
                article,
                anchor: after,
            })
        }
    }

    async fn insert_optimistic(
        &self,
        article: ArticleId,
        after: OrderKey,
        content: BlockContent,
        max_attempts: u32,
    ) -> Result<Block, SequenceError> {
        let attempts = max_attempts.max(1);

        for attempt in 1..=attempts {
            let version = self.store.version(article).await?;
            let siblings = self.anchored_siblings(article, after).await?;
            let shifts = plan_shifts(&siblings, after)?;
            let order = after.next().ok_or(SequenceError::OrderExhausted(after))?;

            let mut writes: Vec<BlockWrite> = shifts
                .iter()
                .map(|s| BlockWrite::Update {
                    id: s.id,
                    patch: BlockPatch::reorder(s.to),
                })
                .collect();
            writes.push(BlockWrite::Create(NewBlock::new(
                article,
                content.clone(),
                order,
            )));

            match self.store.commit(article, version, writes).await {
                Ok(outcome) => {
                    let block = outcome
                        .created
                        .into_iter()
                        .next()
                        .ok_or_else(|| StoreError::Validation("commit created no block".into()))?;
                    tracing::info!(
                        "Inserted {} block {} at order {} (version {}, attempt {})",
                        block.kind(),
                        block.id,
                        order,
                        outcome.version,
                        attempt
                    );
                    return Ok(block);
                }
                Err(StoreError::VersionMismatch { found, .. }) => {
                    tracing::warn!(
                        "Article {} moved from version {} to {} during insert (attempt {}/{})",
                        article,
                        version,
                        found,
                        attempt,
                        attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(SequenceError::VersionConflict { article, attempts })
    }
}
