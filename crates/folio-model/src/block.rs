//! Blocks and their kind-specific payloads

use crate::error::ModelError;
use crate::gallery::GalleryImage;
use crate::ids::{ArticleId, BlockId, ImageUrl, OrderKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Full-width text
    Text,
    /// Text beside a single image
    TextImage,
    /// Single centered image
    Image,
    /// Multi-image masonry gallery
    Patterned,
}

impl BlockKind {
    /// All kinds, in menu order
    pub const ALL: [Self; 4] = [Self::Text, Self::TextImage, Self::Image, Self::Patterned];

    /// Storage name of the kind
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextImage => "text_image",
            Self::Image => "image",
            Self::Patterned => "patterned",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}

/// Kind-specific block payload
///
/// Image references are optional on the image-bearing kinds because an edit
/// may clear them; such blocks render a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "block_type", rename_all = "snake_case")]
pub enum BlockContent {
    /// Text only
    Text {
        /// Text body
        text: String,
    },
    /// Text with one image
    TextImage {
        /// Text body
        text: String,
        /// Image shown beside the text
        image_url: Option<ImageUrl>,
    },
    /// One image
    Image {
        /// The image
        image_url: Option<ImageUrl>,
    },
    /// Ordered gallery
    Patterned {
        /// Gallery images in display order
        images: Vec<ImageUrl>,
    },
}

impl BlockContent {
    /// Text payload
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text with image payload
    #[inline]
    pub fn text_image(text: impl Into<String>, image_url: ImageUrl) -> Self {
        Self::TextImage {
            text: text.into(),
            image_url: Some(image_url),
        }
    }

    /// Single image payload
    #[inline]
    #[must_use]
    pub fn image(image_url: ImageUrl) -> Self {
        Self::Image {
            image_url: Some(image_url),
        }
    }

    /// Gallery payload
    #[inline]
    #[must_use]
    pub fn patterned(images: Vec<ImageUrl>) -> Self {
        Self::Patterned { images }
    }

    /// Kind of this payload
    #[inline]
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text { .. } => BlockKind::Text,
            Self::TextImage { .. } => BlockKind::TextImage,
            Self::Image { .. } => BlockKind::Image,
            Self::Patterned { .. } => BlockKind::Patterned,
        }
    }

    /// Check the payload is complete enough to create a block
    ///
    /// # Errors
    /// - `ModelError::EmptyText` for blank text on text-bearing kinds
    /// - `ModelError::MissingImage` when a single image is required
    /// - `ModelError::EmptyGallery` for a gallery without images
    pub fn validate(&self) -> Result<(), ModelError> {
        self.validate_edit()?;
        match self {
            Self::TextImage {
                image_url: None, ..
            }
            | Self::Image { image_url: None } => Err(ModelError::MissingImage(self.kind())),
            _ => Ok(()),
        }
    }

    /// Check the payload can replace an existing block's content
    ///
    /// Image fields may be empty; such blocks render a placeholder.
    ///
    /// # Errors
    /// - `ModelError::EmptyText` for blank text on text-bearing kinds
    /// - `ModelError::EmptyGallery` for a gallery without images
    pub fn validate_edit(&self) -> Result<(), ModelError> {
        match self {
            Self::Text { text } | Self::TextImage { text, .. } if text.trim().is_empty() => {
                Err(ModelError::EmptyText(self.kind()))
            }
            Self::Patterned { images } if images.is_empty() => Err(ModelError::EmptyGallery),
            _ => Ok(()),
        }
    }
}

/// One unit of article content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block ID
    pub id: BlockId,
    /// Owning article
    pub article_id: ArticleId,
    /// Kind-specific payload
    #[serde(flatten)]
    pub content: BlockContent,
    /// Position among siblings
    pub order: OrderKey,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last content or order change
    pub updated_at: DateTime<Utc>,
}

impl Block {
    /// Create block with a fresh ID
    #[must_use]
    pub fn new(article_id: ArticleId, content: BlockContent, order: OrderKey) -> Self {
        let now = Utc::now();
        Self {
            id: BlockId::new(),
            article_id,
            content,
            order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Kind of this block
    #[inline]
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    /// Gallery images of a patterned block, empty for other kinds
    ///
    /// Image ids are `"{block_id}-{index}"` so measurements correlate across
    /// recomputations of the same block.
    #[must_use]
    pub fn gallery_images(&self) -> Vec<GalleryImage> {
        match &self.content {
            BlockContent::Patterned { images } => images
                .iter()
                .enumerate()
                .map(|(index, url)| GalleryImage::for_block(self.id, index, url.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }
}
