//! Testing utilities for the Folio workspace
//!
//! Shared fixtures, a fault-injecting record store and a recording resize
//! observer.

#![allow(missing_docs)]

use async_trait::async_trait;
use folio_core::{FolioConfig, ImageFile};
use folio_masonry::{ElementKey, ResizeObserver};
use folio_model::{ArticleId, Block, BlockContent, BlockId, GalleryImage, ImageUrl, OrderKey};
use folio_sequence::{
    BlockPatch, BlockQuery, BlockWrite, CommitOutcome, InMemoryRecordStore, NewBlock, RecordStore,
    SequenceConfig, SequenceManager, StoreError,
};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

pub fn text_block(article: ArticleId, order: i64) -> Block {
    Block::new(article, BlockContent::text(format!("#{order}")), OrderKey::new(order))
}

pub fn seeded_store(article: ArticleId, orders: &[i64]) -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    store
        .seed(orders.iter().map(|&o| text_block(article, o)))
        .unwrap();
    store
}

pub fn seeded_manager(
    article: ArticleId,
    orders: &[i64],
    config: SequenceConfig,
) -> SequenceManager<InMemoryRecordStore> {
    SequenceManager::with_config(Arc::new(seeded_store(article, orders)), config)
}

/// Orders of an article's blocks, ascending
pub async fn orders_of<S: RecordStore + ?Sized>(store: &S, article: ArticleId) -> Vec<i64> {
    store
        .list(BlockQuery::article(article))
        .await
        .unwrap()
        .iter()
        .map(|b| b.order.value())
        .collect()
}

pub fn gallery(ratios: &[f32]) -> Vec<GalleryImage> {
    ratios
        .iter()
        .enumerate()
        .map(|(i, ratio)| {
            GalleryImage::new(format!("img-{i}"), ImageUrl::new(format!("https://cdn/img-{i}.png")))
                .with_aspect_ratio(*ratio)
        })
        .collect()
}

pub fn image_file(name: &str) -> ImageFile {
    ImageFile::new(name, vec![0x89, b'P', b'N', b'G'])
}

pub fn test_config() -> FolioConfig {
    FolioConfig::default()
}

/// Record store wrapper that injects failures and concurrent writers
#[derive(Debug)]
pub struct FaultyStore {
    inner: InMemoryRecordStore,
    fail_lists: AtomicBool,
    updates_before_failure: AtomicI64,
    contended_commits: AtomicU32,
    create_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: InMemoryRecordStore) -> Self {
        Self {
            inner,
            fail_lists: AtomicBool::new(false),
            updates_before_failure: AtomicI64::new(-1),
            contended_commits: AtomicU32::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &InMemoryRecordStore {
        &self.inner
    }

    /// Every list call fails with a transport error
    pub fn fail_lists(&self) {
        self.fail_lists.store(true, Ordering::SeqCst);
    }

    /// Let `n` updates through, then fail every later one
    pub fn fail_updates_after(&self, n: i64) {
        self.updates_before_failure.store(n, Ordering::SeqCst);
    }

    /// Have another writer touch the article right before each of the next
    /// `n` commits
    pub fn contend_next_commits(&self, n: u32) {
        self.contended_commits.store(n, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    async fn interfere(&self, article: ArticleId) -> Result<(), StoreError> {
        let blocks = self.inner.list(BlockQuery::article(article).limit(1)).await?;
        if let Some(block) = blocks.into_iter().next() {
            self.inner
                .update(block.id, BlockPatch::content(block.content))
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FaultyStore {
    async fn create(&self, block: NewBlock) -> Result<Block, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create(block).await
    }

    async fn get(&self, id: BlockId) -> Result<Block, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self, query: BlockQuery) -> Result<Vec<Block>, StoreError> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("list dropped".into()));
        }
        self.inner.list(query).await
    }

    async fn update(&self, id: BlockId, patch: BlockPatch) -> Result<Block, StoreError> {
        let remaining = self.updates_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(StoreError::Transport("update dropped".into()));
        }
        if remaining > 0 {
            self.updates_before_failure.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: BlockId) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    async fn version(&self, article: ArticleId) -> Result<u64, StoreError> {
        self.inner.version(article).await
    }

    async fn commit(
        &self,
        article: ArticleId,
        expected: u64,
        writes: Vec<BlockWrite>,
    ) -> Result<CommitOutcome, StoreError> {
        let contend = self
            .contended_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if contend {
            self.interfere(article).await?;
        }
        self.inner.commit(article, expected, writes).await
    }
}

/// Resize observer that records what it was asked to watch
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub observed: Vec<ElementKey>,
    pub disconnects: usize,
}

impl ResizeObserver for RecordingObserver {
    fn observe(&mut self, element: ElementKey) {
        self.observed.push(element);
    }

    fn disconnect(&mut self) {
        self.observed.clear();
        self.disconnects += 1;
    }
}
