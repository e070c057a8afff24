//! Error types for the data model

use crate::block::BlockKind;

/// Content validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Text payload is empty or whitespace only
    #[error("{0} block requires non-empty text")]
    EmptyText(BlockKind),

    /// Image reference missing for a kind that needs one
    #[error("{0} block requires an image")]
    MissingImage(BlockKind),

    /// Gallery without images
    #[error("patterned block requires at least one image")]
    EmptyGallery,

    /// Unrecognised block kind name
    #[error("unknown block kind: {0}")]
    UnknownKind(String),
}
