//! Folio masonry layout
//!
//! Arranges images of heterogeneous aspect ratio into a gapless grid using
//! only row-span integers on a fixed row unit. Spans derive purely from the
//! measured heights of the images themselves.
//!
//! # Core Concepts
//!
//! - [`MasonryLayoutEngine`]: per-gallery span state with change-gated commits
//! - [`ColumnTemplate`]: column policy (pairs side by side, otherwise auto-fit)
//! - [`MeasurementSurface`] / [`ResizeObserver`]: the rendering environment
//! - [`GridSurface`]: a surface computed from known aspect ratios
//!
//! # Feedback loops
//!
//! Spans are applied to each image's wrapper, so the wrapper's height is an
//! output of the computation. The engine therefore only ever measures and
//! observes the inner image element, and only commits a span map that
//! differs from the previous one. Once the layout has converged, further
//! observer callbacks are no-ops.
//!
//! # Example
//!
//! ```rust
//! use folio_masonry::{row_span, MasonryConfig};
//!
//! let config = MasonryConfig::default();
//! assert_eq!(row_span(83.0, config.row_unit_px, config.gap_px), Some(5));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod engine;
mod grid;
mod span;
mod surface;
mod template;

pub use config::{MasonryConfig, MasonryConfigError};
pub use engine::{LayoutTrigger, MasonryLayoutEngine};
pub use grid::{settle, GridSurface, Settled};
pub use span::{row_span, SpanMap, DEFAULT_SPAN};
pub use surface::{BoxSize, ElementKey, ElementPart, MeasurementSurface, ResizeObserver};
pub use template::ColumnTemplate;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
