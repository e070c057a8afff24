//! Transient gallery image view

use crate::ids::{BlockId, ImageId, ImageUrl};
use serde::{Deserialize, Serialize};

/// One image of a patterned block, as seen by a single render pass
///
/// Never persisted; rebuilt from the block's stored URLs on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Stable id used to correlate measurements across recomputations
    pub id: ImageId,
    /// Public URL
    pub url: ImageUrl,
    /// Measured width / height, when known
    pub aspect_ratio: Option<f32>,
}

impl GalleryImage {
    /// Create gallery image with unknown aspect ratio
    #[inline]
    pub fn new(id: impl Into<ImageId>, url: ImageUrl) -> Self {
        Self {
            id: id.into(),
            url,
            aspect_ratio: None,
        }
    }

    /// Image at `index` within the gallery of `block`
    #[inline]
    #[must_use]
    pub fn for_block(block: BlockId, index: usize, url: ImageUrl) -> Self {
        Self::new(ImageId(format!("{block}-{index}")), url)
    }

    /// With measured aspect ratio
    #[inline]
    #[must_use]
    pub fn with_aspect_ratio(mut self, ratio: f32) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }
}
