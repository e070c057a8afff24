//! Unsaved block input
//!
//! A draft carries either already-hosted image URLs or files still to be
//! uploaded. The editor resolves every file into a URL before any order is
//! touched.

use folio_model::{BlockContent, BlockKind, ImageUrl, ModelError};

/// Image file picked in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Create image file
    #[inline]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Where a draft image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Already hosted, keep as is
    Existing(ImageUrl),
    /// Upload before saving
    Upload(ImageFile),
}

impl ImageSource {
    fn outline_url(&self) -> ImageUrl {
        match self {
            Self::Existing(url) => url.clone(),
            Self::Upload(file) => ImageUrl::new(file.name.clone()),
        }
    }
}

impl From<ImageUrl> for ImageSource {
    fn from(url: ImageUrl) -> Self {
        Self::Existing(url)
    }
}

impl From<ImageFile> for ImageSource {
    fn from(file: ImageFile) -> Self {
        Self::Upload(file)
    }
}

/// Block content as entered in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockDraft {
    /// Text only
    Text {
        /// Text body
        text: String,
    },
    /// Text with one image
    TextImage {
        /// Text body
        text: String,
        /// Image to show beside the text
        image: Option<ImageSource>,
    },
    /// One image
    Image {
        /// The image
        image: Option<ImageSource>,
    },
    /// Gallery
    Patterned {
        /// Images in display order
        images: Vec<ImageSource>,
    },
}

impl BlockDraft {
    /// Text draft
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text with image draft
    #[inline]
    pub fn text_image(text: impl Into<String>, image: impl Into<ImageSource>) -> Self {
        Self::TextImage {
            text: text.into(),
            image: Some(image.into()),
        }
    }

    /// Single image draft
    #[inline]
    pub fn image(image: impl Into<ImageSource>) -> Self {
        Self::Image {
            image: Some(image.into()),
        }
    }

    /// Gallery draft
    #[inline]
    #[must_use]
    pub fn patterned(images: Vec<ImageSource>) -> Self {
        Self::Patterned { images }
    }

    /// Kind the saved block will have
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

    /// Number of files that need uploading
    #[must_use]
    pub fn pending_uploads(&self) -> usize {
        self.sources()
            .filter(|s| matches!(s, ImageSource::Upload(_)))
            .count()
    }

    /// Check the draft is complete enough to save as a new block
    ///
    /// # Errors
    /// Same rules as [`BlockContent::validate`].
    pub fn validate(&self) -> Result<(), ModelError> {
        self.outline().validate()
    }

    /// Check the draft can replace an existing block's content
    ///
    /// # Errors
    /// Same rules as [`BlockContent::validate_edit`].
    pub fn validate_edit(&self) -> Result<(), ModelError> {
        self.outline().validate_edit()
    }

    /// Content this draft saves as, with file names standing in for the
    /// URLs uploads will produce
    fn outline(&self) -> BlockContent {
        match self {
            Self::Text { text } => BlockContent::Text { text: text.clone() },
            Self::TextImage { text, image } => BlockContent::TextImage {
                text: text.clone(),
                image_url: image.as_ref().map(ImageSource::outline_url),
            },
            Self::Image { image } => BlockContent::Image {
                image_url: image.as_ref().map(ImageSource::outline_url),
            },
            Self::Patterned { images } => BlockContent::Patterned {
                images: images.iter().map(ImageSource::outline_url).collect(),
            },
        }
    }

    fn sources(&self) -> impl Iterator<Item = &ImageSource> {
        let (single, many): (Option<&ImageSource>, &[ImageSource]) = match self {
            Self::Text { .. } => (None, &[]),
            Self::TextImage { image, .. } | Self::Image { image } => (image.as_ref(), &[]),
            Self::Patterned { images } => (None, images.as_slice()),
        };
        single.into_iter().chain(many.iter())
    }
}
