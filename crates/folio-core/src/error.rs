//! Error types for Folio Core

use crate::blob::BlobError;
use folio_model::{ModelError, OrderKey};
use folio_sequence::SequenceError;

/// Result type for Folio operations
pub type Result<T> = std::result::Result<T, FolioError>;

/// Main error type for editor and configuration operations
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Draft rejected before any write
    #[error("invalid block: {0}")]
    Invalid(#[from] ModelError),

    /// Ordering or record store failure
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Image upload failure
    #[error("image upload failed: {0}")]
    Blob(#[from] BlobError),

    /// Scripted operation named an order no block holds
    #[error("no block at order {0}")]
    NoBlockAtOrder(OrderKey),
}

impl FolioError {
    /// Check if retrying the operation could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Sequence(e) => e.is_retryable(),
            Self::Blob(e) => e.is_retryable(),
            Self::Invalid(_) | Self::NoBlockAtOrder(_) => false,
        }
    }
}
