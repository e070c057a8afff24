//! Computed grid surface
//!
//! Lays a gallery out from known intrinsic aspect ratios instead of a live
//! rendering environment. Content boxes take the resolved column width and
//! their own ratio; wrapper boxes take the height of the rows they span. Size
//! changes of observed elements queue resize notifications, the way a host
//! resize observer would deliver them.

use crate::config::MasonryConfig;
use crate::engine::{LayoutTrigger, MasonryLayoutEngine};
use crate::span::{SpanMap, DEFAULT_SPAN};
use crate::surface::{BoxSize, ElementKey, ElementPart, MeasurementSurface, ResizeObserver};
use crate::template::ColumnTemplate;
use folio_model::{GalleryImage, ImageId};
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
enum LoadState {
    Pending,
    Loaded { aspect_ratio: f32 },
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct Item {
    load: LoadState,
    span: u32,
}

/// Measurement surface for a gallery with known image ratios
#[derive(Debug, Clone)]
pub struct GridSurface {
    config: MasonryConfig,
    viewport_px: f32,
    container_px: f32,
    items: IndexMap<ImageId, Item>,
    observed: HashSet<ElementKey>,
    pending: Vec<ElementKey>,
}

impl GridSurface {
    /// Create surface with every image still loading
    #[must_use]
    pub fn new(
        config: MasonryConfig,
        viewport_px: f32,
        container_px: f32,
        images: &[GalleryImage],
    ) -> Self {
        let items = images
            .iter()
            .map(|image| {
                (
                    image.id.clone(),
                    Item {
                        load: LoadState::Pending,
                        span: DEFAULT_SPAN,
                    },
                )
            })
            .collect();

        Self {
            config,
            viewport_px,
            container_px,
            items,
            observed: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Column template in effect
    #[inline]
    #[must_use]
    pub fn template(&self) -> ColumnTemplate {
        ColumnTemplate::for_item_count(self.items.len(), &self.config)
    }

    /// Resolved column count
    #[inline]
    #[must_use]
    pub fn columns(&self) -> usize {
        self.template().resolve_columns(
            self.viewport_px,
            self.container_px,
            self.items.len(),
            &self.config,
        )
    }

    /// Width of each column
    #[inline]
    #[must_use]
    pub fn column_width(&self) -> f32 {
        ColumnTemplate::column_width(self.container_px, self.columns(), self.config.gap_px)
    }

    /// Finish loading an image with its intrinsic width / height ratio
    ///
    /// Returns the trigger to hand to the engine, `None` for unknown images.
    pub fn load(&mut self, id: &ImageId, aspect_ratio: f32) -> Option<LayoutTrigger> {
        let item = self.items.get_mut(id)?;
        item.load = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            LoadState::Loaded { aspect_ratio }
        } else {
            LoadState::Failed
        };
        self.notify(ElementKey::content(id.clone()));
        Some(LayoutTrigger::ImageLoaded(id.clone()))
    }

    /// Load every image that carries a known aspect ratio
    pub fn load_known(&mut self, images: &[GalleryImage]) -> Vec<LayoutTrigger> {
        images
            .iter()
            .filter_map(|image| {
                image
                    .aspect_ratio
                    .and_then(|ratio| self.load(&image.id, ratio))
            })
            .collect()
    }

    /// Fail an image; it keeps measuring zero height
    pub fn fail(&mut self, id: &ImageId) -> Option<LayoutTrigger> {
        let item = self.items.get_mut(id)?;
        item.load = LoadState::Failed;
        Some(LayoutTrigger::ImageFailed(id.clone()))
    }

    /// Change viewport and container width
    pub fn resize(&mut self, viewport_px: f32, container_px: f32) -> LayoutTrigger {
        self.viewport_px = viewport_px;
        self.container_px = container_px;
        let loaded: Vec<ImageId> = self
            .items
            .iter()
            .filter(|(_, item)| matches!(item.load, LoadState::Loaded { .. }))
            .map(|(id, _)| id.clone())
            .collect();
        for id in loaded {
            self.notify(ElementKey::content(id));
        }
        LayoutTrigger::Resized
    }

    /// Render committed spans onto the wrappers
    pub fn apply(&mut self, spans: &SpanMap) {
        let changed: Vec<ImageId> = self
            .items
            .iter_mut()
            .filter_map(|(id, item)| {
                let span = spans.span(id);
                (item.span != span).then(|| {
                    item.span = span;
                    id.clone()
                })
            })
            .collect();
        for id in changed {
            self.notify(ElementKey::wrapper(id));
        }
    }

    /// Drain queued resize notifications
    pub fn take_notifications(&mut self) -> Vec<ElementKey> {
        std::mem::take(&mut self.pending)
    }

    /// Span currently rendered for an image
    #[inline]
    #[must_use]
    pub fn rendered_span(&self, id: &ImageId) -> Option<u32> {
        self.items.get(id).map(|item| item.span)
    }

    fn notify(&mut self, element: ElementKey) {
        if self.observed.contains(&element) {
            self.pending.push(element);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn wrapper_height(&self, span: u32) -> f32 {
        let span = span as f32;
        span * self.config.row_unit_px + (span - 1.0) * self.config.gap_px
    }
}

impl MeasurementSurface for GridSurface {
    fn measure(&self, element: &ElementKey) -> Option<BoxSize> {
        let item = self.items.get(&element.image)?;
        let width = self.column_width();
        match (element.part, item.load) {
            (ElementPart::Content, LoadState::Loaded { aspect_ratio }) => {
                Some(BoxSize::new(width, width / aspect_ratio))
            }
            (ElementPart::Content, LoadState::Pending | LoadState::Failed) => {
                Some(BoxSize::new(width, 0.0))
            }
            (ElementPart::Wrapper, _) => Some(BoxSize::new(width, self.wrapper_height(item.span))),
        }
    }
}

impl ResizeObserver for GridSurface {
    fn observe(&mut self, element: ElementKey) {
        self.observed.insert(element);
    }

    fn disconnect(&mut self) {
        self.observed.clear();
        self.pending.clear();
    }
}

/// Outcome of running the observer loop to quiescence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    /// Notification rounds processed
    pub rounds: usize,
    /// Span maps committed
    pub commits: u64,
    /// Whether the loop stopped because nothing was left to deliver
    pub converged: bool,
}

/// Deliver triggers, then resize notifications, until none are left
///
/// Each committed span map is applied back onto the surface, which may queue
/// more notifications for observed elements. Stops after `max_rounds`
/// notification rounds.
pub fn settle(
    engine: &mut MasonryLayoutEngine,
    surface: &mut GridSurface,
    triggers: impl IntoIterator<Item = LayoutTrigger>,
    max_rounds: usize,
) -> Settled {
    let before = engine.commits();

    for trigger in triggers {
        if engine.handle(trigger, &*surface) {
            surface.apply(engine.spans());
        }
    }

    let mut rounds = 0;
    while rounds < max_rounds {
        let notifications = surface.take_notifications();
        if notifications.is_empty() {
            return Settled {
                rounds,
                commits: engine.commits() - before,
                converged: true,
            };
        }
        rounds += 1;
        for _ in notifications {
            if engine.handle(LayoutTrigger::Resized, &*surface) {
                surface.apply(engine.spans());
            }
        }
    }

    Settled {
        rounds,
        commits: engine.commits() - before,
        converged: surface.pending.is_empty(),
    }
}
