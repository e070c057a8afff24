//! In-memory record store
//!
//! Mirrors the constraints of the hosted table: `(article, order)` is unique
//! on every individual write, and each write bumps the article's version.

use crate::store::{
    BlockPatch, BlockQuery, BlockWrite, CommitOutcome, NewBlock, RecordStore, SortDirection,
    StoreError,
};
use async_trait::async_trait;
use folio_model::{ArticleId, Block, BlockId, OrderKey};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct Tables {
    blocks: HashMap<BlockId, Block>,
    versions: HashMap<ArticleId, u64>,
    writes: u64,
}

impl Tables {
    fn order_taken(&self, article: ArticleId, order: OrderKey, except: Option<BlockId>) -> bool {
        self.blocks
            .values()
            .any(|b| b.article_id == article && b.order == order && Some(b.id) != except)
    }

    fn bump(&mut self, article: ArticleId) -> u64 {
        self.writes += 1;
        let version = self.versions.entry(article).or_insert(0);
        *version += 1;
        *version
    }

    fn create(&mut self, new: NewBlock) -> Result<Block, StoreError> {
        if self.order_taken(new.article_id(), new.order(), None) {
            return Err(StoreError::OrderConflict {
                article: new.article_id(),
                order: new.order(),
            });
        }
        let block = new.into_block();
        self.blocks.insert(block.id, block.clone());
        Ok(block)
    }

    fn update(&mut self, id: BlockId, patch: BlockPatch) -> Result<Block, StoreError> {
        let article = self
            .blocks
            .get(&id)
            .map(|b| b.article_id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(order) = patch.new_order() {
            if self.order_taken(article, order, Some(id)) {
                return Err(StoreError::OrderConflict { article, order });
            }
        }

        let block = self.blocks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply(block);
        Ok(block.clone())
    }
}

/// Thread-safe in-memory [`RecordStore`]
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load already-persisted blocks, keeping their order keys
    ///
    /// # Errors
    /// Returns `StoreError::OrderConflict` if two blocks of one article share
    /// an order; blocks before the conflicting one stay loaded.
    pub fn seed(&self, blocks: impl IntoIterator<Item = Block>) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        for block in blocks {
            if tables.order_taken(block.article_id, block.order, Some(block.id)) {
                return Err(StoreError::OrderConflict {
                    article: block.article_id,
                    order: block.order,
                });
            }
            tables.blocks.insert(block.id, block);
        }
        Ok(())
    }

    /// Number of blocks across all articles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.read().blocks.len()
    }

    /// Check if the store holds no blocks
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.read().blocks.is_empty()
    }

    /// Successful writes since creation (commits count once)
    #[inline]
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.tables.read().writes
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(&self, block: NewBlock) -> Result<Block, StoreError> {
        let mut tables = self.tables.write();
        let block = tables.create(block)?;
        tables.bump(block.article_id);
        Ok(block)
    }

    async fn get(&self, id: BlockId) -> Result<Block, StoreError> {
        self.tables
            .read()
            .blocks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, query: BlockQuery) -> Result<Vec<Block>, StoreError> {
        let tables = self.tables.read();
        let mut blocks: Vec<Block> = tables
            .blocks
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();

        match query.direction {
            SortDirection::Ascending => blocks.sort_by_key(|b| b.order),
            SortDirection::Descending => blocks.sort_by_key(|b| std::cmp::Reverse(b.order)),
        }
        if let Some(limit) = query.limit {
            blocks.truncate(limit);
        }
        Ok(blocks)
    }

    async fn update(&self, id: BlockId, patch: BlockPatch) -> Result<Block, StoreError> {
        let mut tables = self.tables.write();
        let block = tables.update(id, patch)?;
        tables.bump(block.article_id);
        Ok(block)
    }

    async fn delete(&self, id: BlockId) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let block = tables.blocks.remove(&id).ok_or(StoreError::NotFound(id))?;
        tables.bump(block.article_id);
        Ok(())
    }

    async fn version(&self, article: ArticleId) -> Result<u64, StoreError> {
        Ok(self
            .tables
            .read()
            .versions
            .get(&article)
            .copied()
            .unwrap_or(0))
    }

    async fn commit(
        &self,
        article: ArticleId,
        expected: u64,
        writes: Vec<BlockWrite>,
    ) -> Result<CommitOutcome, StoreError> {
        let mut tables = self.tables.write();
        let found = tables.versions.get(&article).copied().unwrap_or(0);
        if found != expected {
            return Err(StoreError::VersionMismatch {
                article,
                expected,
                found,
            });
        }

        // Writes are checked one at a time, as the table would, against a
        // scratch copy so a rejected batch leaves nothing behind.
        let mut scratch = tables.clone();
        let mut created = Vec::new();
        for write in writes {
            match write {
                BlockWrite::Update { id, patch } => {
                    scratch.update(id, patch)?;
                }
                BlockWrite::Create(new) => created.push(scratch.create(new)?),
            }
        }

        *tables = scratch;
        let version = tables.bump(article);
        Ok(CommitOutcome { version, created })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::BlockContent;

    fn new_block(article: ArticleId, order: i64) -> NewBlock {
        NewBlock::new(article, BlockContent::text("x"), OrderKey::new(order))
    }

    #[tokio::test]
    async fn create_rejects_duplicate_order() {
        let store = InMemoryRecordStore::new();
        let article = ArticleId::new();

        store.create(new_block(article, 0)).await.unwrap();
        let err = store.create(new_block(article, 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::OrderConflict { .. }));

        // Same order in another article is fine
        store.create(new_block(ArticleId::new(), 0)).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn list_sorts_filters_and_limits() {
        let store = InMemoryRecordStore::new();
        let article = ArticleId::new();
        for order in [5, 1, 3] {
            store.create(new_block(article, order)).await.unwrap();
        }

        let asc = store.list(BlockQuery::article(article)).await.unwrap();
        let orders: Vec<i64> = asc.iter().map(|b| b.order.value()).collect();
        assert_eq!(orders, vec![1, 3, 5]);

        let top = store
            .list(BlockQuery::article(article).descending().limit(1))
            .await
            .unwrap();
        assert_eq!(top[0].order, OrderKey::new(5));

        let tail = store
            .list(BlockQuery::article(article).from_order(OrderKey::new(3)))
            .await
            .unwrap();
        assert_eq!(tail.len(), 2);
    }

    #[tokio::test]
    async fn update_rejects_taken_order() {
        let store = InMemoryRecordStore::new();
        let article = ArticleId::new();
        let a = store.create(new_block(article, 0)).await.unwrap();
        store.create(new_block(article, 1)).await.unwrap();

        let err = store
            .update(a.id, BlockPatch::reorder(OrderKey::new(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OrderConflict { .. }));

        // Re-writing its own order is not a conflict
        store
            .update(a.id, BlockPatch::reorder(OrderKey::new(0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn every_write_bumps_version() {
        let store = InMemoryRecordStore::new();
        let article = ArticleId::new();
        assert_eq!(store.version(article).await.unwrap(), 0);

        let a = store.create(new_block(article, 0)).await.unwrap();
        store
            .update(a.id, BlockPatch::content(BlockContent::text("y")))
            .await
            .unwrap();
        store.delete(a.id).await.unwrap();

        assert_eq!(store.version(article).await.unwrap(), 3);
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn commit_is_all_or_nothing() {
        let store = InMemoryRecordStore::new();
        let article = ArticleId::new();
        let a = store.create(new_block(article, 0)).await.unwrap();
        store.create(new_block(article, 1)).await.unwrap();
        let version = store.version(article).await.unwrap();

        // Second write collides: first must not stick
        let writes = vec![
            BlockWrite::Create(new_block(article, 2)),
            BlockWrite::Update {
                id: a.id,
                patch: BlockPatch::reorder(OrderKey::new(1)),
            },
        ];
        let err = store.commit(article, version, writes).await.unwrap_err();
        assert!(matches!(err, StoreError::OrderConflict { .. }));
        assert_eq!(store.len(), 2);
        assert_eq!(store.version(article).await.unwrap(), version);
    }

    #[tokio::test]
    async fn commit_rejects_stale_version() {
        let store = InMemoryRecordStore::new();
        let article = ArticleId::new();
        store.create(new_block(article, 0)).await.unwrap();

        let err = store
            .commit(article, 0, vec![BlockWrite::Create(new_block(article, 1))])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionMismatch {
                article,
                expected: 0,
                found: 1,
            }
        );
    }
}
