//! Error types for block sequencing

use crate::store::StoreError;
use folio_model::{ArticleId, ModelError, OrderKey};

/// Sequencing errors
///
/// Failures are reported once, without rolling back shift writes that
/// already landed; callers re-fetch the article to show the actual state.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// Record store read or write failed
    #[error("record store failed: {0}")]
    Store(#[from] StoreError),

    /// Content rejected before anything was read or written
    #[error("invalid block content: {0}")]
    InvalidContent(#[from] ModelError),

    /// Insert-after target does not exist in the article
    #[error("no block at order {anchor} in article {article}")]
    AnchorNotFound {
        /// Article searched
        article: ArticleId,
        /// Requested anchor order
        anchor: OrderKey,
    },

    /// A shift write failed partway through an insert
    ///
    /// The first `applied` shifts are persisted; the order is still a valid
    /// total order but the new block was not created.
    #[error("shift interrupted after {applied} of {total} writes: {source}")]
    ShiftInterrupted {
        /// Shifts persisted before the failure
        applied: usize,
        /// Shifts planned
        total: usize,
        /// Failing write
        #[source]
        source: StoreError,
    },

    /// Optimistic insert kept losing to concurrent writers
    #[error("article {article} changed during insert, gave up after {attempts} attempts")]
    VersionConflict {
        /// Contended article
        article: ArticleId,
        /// Attempts made
        attempts: u32,
    },

    /// Order key space exhausted
    #[error("order key overflow after {0}")]
    OrderExhausted(OrderKey),
}

impl SequenceError {
    /// Check if re-invoking the operation could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) | Self::ShiftInterrupted { source: e, .. } => e.is_retryable(),
            Self::VersionConflict { .. } => true,
            Self::InvalidContent(_) | Self::AnchorNotFound { .. } | Self::OrderExhausted(_) => {
                false
            }
        }
    }
}
