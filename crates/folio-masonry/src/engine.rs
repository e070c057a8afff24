//! Masonry layout engine
//!
//! One engine per gallery block per render. The engine derives every span
//! from current measurements, so a recompute is always safe to run again
//! from scratch.

use crate::config::MasonryConfig;
use crate::span::{row_span, SpanMap};
use crate::surface::{ElementKey, MeasurementSurface, ResizeObserver};
use crate::template::ColumnTemplate;
use folio_model::{GalleryImage, ImageId};
use std::fmt;

/// Event that may change the layout
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutTrigger {
    /// An image finished loading
    ImageLoaded(ImageId),
    /// An image failed to load; it measures as zero height
    ImageFailed(ImageId),
    /// Viewport or container size changed, or an observed element resized
    Resized,
    /// The gallery's image set changed
    ImagesChanged(Vec<GalleryImage>),
}

type CommitListener = Box<dyn FnMut(&SpanMap) + Send>;

/// Row-span state for one gallery
pub struct MasonryLayoutEngine {
    config: MasonryConfig,
    images: Vec<GalleryImage>,
    spans: SpanMap,
    commits: u64,
    listeners: Vec<CommitListener>,
}

impl fmt::Debug for MasonryLayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasonryLayoutEngine")
            .field("config", &self.config)
            .field("images", &self.images.len())
            .field("spans", &self.spans)
            .field("commits", &self.commits)
            .finish_non_exhaustive()
    }
}

impl MasonryLayoutEngine {
    /// Create engine for a gallery; every image starts at the default span
    #[must_use]
    pub fn new(config: MasonryConfig, images: Vec<GalleryImage>) -> Self {
        Self {
            config,
            images,
            spans: SpanMap::new(),
            commits: 0,
            listeners: Vec::new(),
        }
    }

    /// Grid configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MasonryConfig {
        &self.config
    }

    /// Images in gallery order
    #[inline]
    #[must_use]
    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    /// Column template for the current image set
    #[inline]
    #[must_use]
    pub fn template(&self) -> ColumnTemplate {
        ColumnTemplate::for_item_count(self.images.len(), &self.config)
    }

    /// Committed span map
    #[inline]
    #[must_use]
    pub fn spans(&self) -> &SpanMap {
        &self.spans
    }

    /// Span to render for an image
    #[inline]
    #[must_use]
    pub fn span(&self, id: &ImageId) -> u32 {
        self.spans.span(id)
    }

    /// Number of committed span map changes
    #[inline]
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Register a callback run on every committed change
    pub fn on_commit<F>(&mut self, listener: F)
    where
        F: FnMut(&SpanMap) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Observe the inner image element of every item
    ///
    /// Wrappers are never observed: their height is set by the spans this
    /// engine commits.
    pub fn observe(&self, observer: &mut dyn ResizeObserver) {
        observer.disconnect();
        for image in &self.images {
            observer.observe(ElementKey::content(image.id.clone()));
        }
    }

    /// Replace the image set, discarding every memoized span
    ///
    /// Spans are rebuilt from current measurements only and committed once,
    /// if they differ from the map shown before the change. Returns `true`
    /// if a new span map was committed.
    pub fn set_images(&mut self, images: Vec<GalleryImage>, surface: &dyn MeasurementSurface) -> bool {
        let shown = std::mem::take(&mut self.spans);
        let previous = std::mem::replace(&mut self.images, images);
        tracing::debug!(
            "Gallery image set changed from {} to {} images",
            previous.len(),
            self.images.len()
        );

        let next = self.measure(surface);
        if next.differs_from(&shown, &self.images) {
            self.commit(next);
            true
        } else {
            self.spans = next;
            false
        }
    }

    /// Compute the span map current measurements call for
    ///
    /// Images that cannot be measured keep their committed span, or none.
    #[must_use]
    pub fn measure(&self, surface: &dyn MeasurementSurface) -> SpanMap {
        let mut next = SpanMap::new();
        for image in &self.images {
            let measured = surface
                .measure(&ElementKey::content(image.id.clone()))
                .and_then(|size| row_span(size.height, self.config.row_unit_px, self.config.gap_px));

            if let Some(span) = measured.or_else(|| self.spans.computed(&image.id)) {
                next.insert(image.id.clone(), span);
            }
        }
        next
    }

    /// Recompute spans and commit them if any image's span changed
    ///
    /// Returns `true` if a new span map was committed. Once the layout has
    /// converged this is a no-op, which is what ends observer-driven chains.
    pub fn recompute(&mut self, surface: &dyn MeasurementSurface) -> bool {
        let next = self.measure(surface);
        if !next.differs_from(&self.spans, &self.images) {
            tracing::trace!("Layout unchanged across {} images", self.images.len());
            return false;
        }
        self.commit(next);
        true
    }

    /// React to a layout trigger
    ///
    /// Returns `true` if a new span map was committed.
    pub fn handle(&mut self, trigger: LayoutTrigger, surface: &dyn MeasurementSurface) -> bool {
        match trigger {
            LayoutTrigger::ImageLoaded(id) => {
                tracing::trace!("Image {} loaded", id);
                self.recompute(surface)
            }
            LayoutTrigger::ImageFailed(id) => {
                tracing::debug!("Image {} failed to load, keeping its span", id);
                self.recompute(surface)
            }
            LayoutTrigger::Resized => self.recompute(surface),
            LayoutTrigger::ImagesChanged(images) => self.set_images(images, surface),
        }
    }

    fn commit(&mut self, spans: SpanMap) {
        self.spans = spans;
        self.commits += 1;
        tracing::debug!(
            "Committed span map #{} ({} of {} images measured)",
            self.commits,
            self.spans.len(),
            self.images.len()
        );
        for listener in &mut self.listeners {
            listener(&self.spans);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{BoxSize, ElementPart};
    use folio_model::ImageUrl;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Heights(HashMap<ImageId, f32>);

    impl Heights {
        fn set(&mut self, id: &str, height: f32) {
            self.0.insert(ImageId::from(id), height);
        }
    }

    impl MeasurementSurface for Heights {
        fn measure(&self, element: &ElementKey) -> Option<BoxSize> {
            assert_eq!(element.part, ElementPart::Content);
            self.0
                .get(&element.image)
                .map(|&height| BoxSize::new(100.0, height))
        }
    }

    fn images(ids: &[&str]) -> Vec<GalleryImage> {
        ids.iter()
            .map(|id| GalleryImage::new(*id, ImageUrl::new(format!("{id}.png"))))
            .collect()
    }

    #[test]
    fn recompute_commits_measured_spans() {
        let mut engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a", "b"]));
        let mut surface = Heights::default();
        surface.set("a", 83.0);

        assert!(engine.recompute(&surface));
        assert_eq!(engine.span(&ImageId::from("a")), 5);
        assert_eq!(engine.span(&ImageId::from("b")), 1);
    }

    #[test]
    fn converged_layout_does_not_commit_again() {
        let mut engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a"]));
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        engine.on_commit(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut surface = Heights::default();
        surface.set("a", 120.0);
        for _ in 0..10 {
            engine.handle(LayoutTrigger::Resized, &surface);
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(engine.commits(), 1);
    }

    #[test]
    fn zero_height_keeps_previous_span() {
        let mut engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a"]));
        let mut surface = Heights::default();
        surface.set("a", 83.0);
        engine.recompute(&surface);

        surface.set("a", 0.0);
        assert!(!engine.handle(LayoutTrigger::ImageFailed(ImageId::from("a")), &surface));
        assert_eq!(engine.span(&ImageId::from("a")), 5);
    }

    fn counted(engine: &mut MasonryLayoutEngine) -> Arc<AtomicUsize> {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        engine.on_commit(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        fired
    }

    #[test]
    fn image_set_change_resets_spans() {
        let mut engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a"]));
        let mut surface = Heights::default();
        surface.set("a", 83.0);
        engine.recompute(&surface);
        let fired = counted(&mut engine);

        // Stale measurement for "a" must not survive into the new set
        let empty = Heights::default();
        assert!(engine.handle(LayoutTrigger::ImagesChanged(images(&["a", "c"])), &empty));
        assert!(engine.spans().is_empty());
        assert_eq!(engine.span(&ImageId::from("a")), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn image_set_change_commits_the_remeasured_map_once() {
        let mut engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a"]));
        let mut surface = Heights::default();
        surface.set("a", 83.0);
        engine.recompute(&surface);
        let fired = counted(&mut engine);

        surface.set("b", 120.0);
        assert!(engine.handle(LayoutTrigger::ImagesChanged(images(&["a", "b"])), &surface));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(engine.span(&ImageId::from("a")), 5);
        assert_eq!(engine.span(&ImageId::from("b")), 7);
    }

    #[test]
    fn unchanged_image_set_does_not_commit() {
        let mut engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a"]));
        let mut surface = Heights::default();
        surface.set("a", 83.0);
        engine.recompute(&surface);
        let fired = counted(&mut engine);
        let commits = engine.commits();

        assert!(!engine.handle(LayoutTrigger::ImagesChanged(images(&["a"])), &surface));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(engine.commits(), commits);
        assert_eq!(engine.span(&ImageId::from("a")), 5);
    }

    #[test]
    fn reset_of_empty_map_is_not_a_change() {
        let mut engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a"]));
        assert!(!engine.set_images(images(&["b"]), &Heights::default()));
        assert_eq!(engine.commits(), 0);
    }

    #[derive(Default)]
    struct Recorder(Vec<ElementKey>);

    impl ResizeObserver for Recorder {
        fn observe(&mut self, element: ElementKey) {
            self.0.push(element);
        }

        fn disconnect(&mut self) {
            self.0.clear();
        }
    }

    #[test]
    fn observes_only_image_content() {
        let engine = MasonryLayoutEngine::new(MasonryConfig::default(), images(&["a", "b", "c"]));
        let mut recorder = Recorder::default();
        engine.observe(&mut recorder);

        assert_eq!(recorder.0.len(), 3);
        assert!(recorder.0.iter().all(|e| e.part == ElementPart::Content));
    }
}
