//! Row span arithmetic

use folio_model::{GalleryImage, ImageId};
use indexmap::IndexMap;
use serde::Serialize;

/// Span of an image that has never been measured
pub const DEFAULT_SPAN: u32 = 1;

/// Rows an item of rendered `height` must span
///
/// `ceil((height + gap) / (row_unit + gap))`. Heights that are zero,
/// negative or not finite have no span; callers keep the previous one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn row_span(height: f32, row_unit: f32, gap: f32) -> Option<u32> {
    if !height.is_finite() || height <= 0.0 {
        return None;
    }
    let rows = ((height + gap) / (row_unit + gap)).ceil();
    if rows.is_finite() {
        Some((rows as u32).max(DEFAULT_SPAN))
    } else {
        None
    }
}

/// Computed spans keyed by image, in gallery order
///
/// Images without an entry render with [`DEFAULT_SPAN`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpanMap(IndexMap<ImageId, u32>);

impl SpanMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Span to render for an image
    #[inline]
    #[must_use]
    pub fn span(&self, id: &ImageId) -> u32 {
        self.0.get(id).copied().unwrap_or(DEFAULT_SPAN)
    }

    /// Computed span, `None` if never measured
    #[inline]
    #[must_use]
    pub fn computed(&self, id: &ImageId) -> Option<u32> {
        self.0.get(id).copied()
    }

    /// Record a computed span
    #[inline]
    pub fn insert(&mut self, id: ImageId, span: u32) {
        self.0.insert(id, span);
    }

    /// Number of computed spans
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing has been computed yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if any of `images` would render with a different span
    #[must_use]
    pub fn differs_from(&self, other: &Self, images: &[GalleryImage]) -> bool {
        images
            .iter()
            .any(|image| self.computed(&image.id) != other.computed(&image.id))
    }

    /// Iterate computed spans in gallery order
    pub fn iter(&self) -> impl Iterator<Item = (&ImageId, u32)> {
        self.0.iter().map(|(id, span)| (id, *span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::ImageUrl;

    #[test]
    fn reference_span() {
        assert_eq!(row_span(83.0, 8.0, 12.0), Some(5));
    }

    #[test]
    fn exact_multiple_does_not_round_up() {
        // 3 rows of 8 plus 2 gaps of 12
        assert_eq!(row_span(48.0, 8.0, 12.0), Some(3));
        assert_eq!(row_span(48.5, 8.0, 12.0), Some(4));
    }

    #[test]
    fn unmeasurable_heights_have_no_span() {
        assert_eq!(row_span(0.0, 8.0, 12.0), None);
        assert_eq!(row_span(-4.0, 8.0, 12.0), None);
        assert_eq!(row_span(f32::NAN, 8.0, 12.0), None);
        assert_eq!(row_span(f32::INFINITY, 8.0, 12.0), None);
    }

    #[test]
    fn tiny_height_spans_one_row() {
        assert_eq!(row_span(0.5, 8.0, 12.0), Some(1));
    }

    #[test]
    fn differs_only_on_listed_images() {
        let images = vec![GalleryImage::new("a", ImageUrl::from("a.png"))];
        let mut left = SpanMap::new();
        left.insert(ImageId::from("a"), 3);
        let mut right = left.clone();
        right.insert(ImageId::from("stale"), 9);

        assert!(!left.differs_from(&right, &images));
        right.insert(ImageId::from("a"), 4);
        assert!(left.differs_from(&right, &images));
    }

    #[test]
    fn default_span_for_unknown_image() {
        assert_eq!(SpanMap::new().span(&ImageId::from("x")), DEFAULT_SPAN);
    }
}
