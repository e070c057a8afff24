//! Folio block sequencing
//!
//! Keeps a strict, insertable total order over the blocks of one article
//! with minimal writes.
//!
//! # Core Concepts
//!
//! - [`SequenceManager`]: the only writer of block order keys
//! - [`RecordStore`]: asynchronous record store collaborator
//! - [`InMemoryRecordStore`]: store with per-write order uniqueness and
//!   per-article versioning
//! - [`InsertMode`]: best-effort sequential shifting or optimistic
//!   compare-and-swap commits
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_sequence::{InMemoryRecordStore, SequenceManager};
//! use folio_model::{ArticleId, BlockContent};
//! use std::sync::Arc;
//!
//! let manager = SequenceManager::new(Arc::new(InMemoryRecordStore::new()));
//! let article = ArticleId::new();
//!
//! let first = manager.append(article, BlockContent::text("intro")).await?;
//! let last = manager.append(article, BlockContent::text("outro")).await?;
//!
//! // Shifts `last` to order 2, lands at order 1
//! let middle = manager
//!     .insert_after(article, first.order, BlockContent::text("body"))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod manager;
mod memory;
mod store;

pub use error::SequenceError;
pub use manager::{plan_shifts, InsertMode, SequenceConfig, SequenceManager, Shift};
pub use memory::InMemoryRecordStore;
pub use store::{
    BlockPatch, BlockQuery, BlockWrite, CommitOutcome, NewBlock, RecordStore, SortDirection,
    StoreError,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
