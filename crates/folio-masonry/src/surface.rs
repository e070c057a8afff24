//! Rendering environment collaborators

use folio_model::ImageId;

/// Which element of a gallery item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementPart {
    /// The image itself; its size depends only on column width and the
    /// image's intrinsic ratio
    Content,
    /// The grid item wrapping the image; its height follows the span
    Wrapper,
}

/// Address of one element of a gallery item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementKey {
    /// Gallery image
    pub image: ImageId,
    /// Element within the item
    pub part: ElementPart,
}

impl ElementKey {
    /// The inner image element
    #[inline]
    #[must_use]
    pub fn content(image: ImageId) -> Self {
        Self {
            image,
            part: ElementPart::Content,
        }
    }

    /// The wrapper element
    #[inline]
    #[must_use]
    pub fn wrapper(image: ImageId) -> Self {
        Self {
            image,
            part: ElementPart::Wrapper,
        }
    }
}

/// Rendered box size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl BoxSize {
    /// Create box size
    #[inline]
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Reads rendered element sizes
pub trait MeasurementSurface {
    /// Current rendered box, `None` if the element is absent or not laid out
    fn measure(&self, element: &ElementKey) -> Option<BoxSize>;
}

/// Registers elements for resize notification
pub trait ResizeObserver {
    /// Start observing an element
    fn observe(&mut self, element: ElementKey);

    /// Stop observing everything
    fn disconnect(&mut self);
}
