//! Column template policy

use crate::config::MasonryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid column template for one gallery
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTemplate {
    /// Fixed count of equal columns
    Fixed {
        /// Column count
        columns: usize,
    },
    /// As many columns as fit, each at least a clamped minimum width
    AutoFit {
        /// Lower clamp in pixels
        floor_px: f32,
        /// Preferred minimum in percent of the viewport width
        viewport_percent: f32,
        /// Upper clamp in pixels
        ceiling_px: f32,
    },
}

impl ColumnTemplate {
    /// Template for a gallery of `item_count` images
    ///
    /// Exactly two images sit side by side in two equal columns; every other
    /// count uses the auto-fit template.
    #[must_use]
    pub fn for_item_count(item_count: usize, config: &MasonryConfig) -> Self {
        if item_count == 2 {
            Self::Fixed { columns: 2 }
        } else {
            Self::AutoFit {
                floor_px: config.column_floor_px,
                viewport_percent: config.column_viewport_percent,
                ceiling_px: config.column_ceiling_px,
            }
        }
    }

    /// Minimum column width at a viewport width
    #[must_use]
    pub fn min_column_width(&self, viewport_px: f32) -> Option<f32> {
        match *self {
            Self::Fixed { .. } => None,
            Self::AutoFit {
                floor_px,
                viewport_percent,
                ceiling_px,
            } => Some((viewport_percent * viewport_px / 100.0).clamp(floor_px, ceiling_px.max(floor_px))),
        }
    }

    /// Number of columns the grid lays out
    ///
    /// Auto-fit fits as many tracks of the minimum width as the container
    /// holds, collapses tracks no item occupies, and keeps at least
    /// `min_columns` for galleries of two or more.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn resolve_columns(
        &self,
        viewport_px: f32,
        container_px: f32,
        item_count: usize,
        config: &MasonryConfig,
    ) -> usize {
        let min_width = match (self, self.min_column_width(viewport_px)) {
            (Self::Fixed { columns }, _) => return (*columns).max(1),
            (_, Some(width)) => width,
            (_, None) => return 1,
        };

        let gap = config.gap_px;
        let fitting = ((container_px.max(0.0) + gap) / (min_width + gap)).floor();
        let tracks = if fitting.is_finite() { (fitting as usize).max(1) } else { 1 };
        let occupied = tracks.min(item_count.max(1));

        if item_count >= 2 {
            occupied.max(config.min_columns.min(item_count))
        } else {
            occupied
        }
    }

    /// Width of one column
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn column_width(container_px: f32, columns: usize, gap_px: f32) -> f32 {
        let columns = columns.max(1) as f32;
        ((container_px - gap_px * (columns - 1.0)) / columns).max(0.0)
    }
}

impl fmt::Display for ColumnTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed { columns } => write!(f, "repeat({columns}, minmax(0, 1fr))"),
            Self::AutoFit {
                floor_px,
                viewport_percent,
                ceiling_px,
            } => write!(
                f,
                "repeat(auto-fit, minmax(clamp({floor_px}px, {viewport_percent}vw, {ceiling_px}px), 1fr))"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_images_use_two_columns() {
        let config = MasonryConfig::default();
        let template = ColumnTemplate::for_item_count(2, &config);
        assert_eq!(template.to_string(), "repeat(2, minmax(0, 1fr))");
        assert_eq!(template.resolve_columns(320.0, 288.0, 2, &config), 2);
        assert_eq!(template.resolve_columns(1920.0, 1200.0, 2, &config), 2);
    }

    #[test]
    fn other_counts_use_auto_fit() {
        let config = MasonryConfig::default();
        for count in [0, 1, 3, 5, 12] {
            let template = ColumnTemplate::for_item_count(count, &config);
            assert_eq!(
                template.to_string(),
                "repeat(auto-fit, minmax(clamp(96px, 30vw, 180px), 1fr))"
            );
        }
    }

    #[test]
    fn min_width_is_clamped() {
        let template = ColumnTemplate::for_item_count(5, &MasonryConfig::default());
        assert_eq!(template.min_column_width(200.0), Some(96.0));
        assert_eq!(template.min_column_width(500.0), Some(150.0));
        assert_eq!(template.min_column_width(2000.0), Some(180.0));
    }

    #[test]
    fn narrow_viewport_keeps_several_columns() {
        let config = MasonryConfig::default();
        let template = ColumnTemplate::for_item_count(5, &config);
        assert!(template.resolve_columns(320.0, 288.0, 5, &config) > 1);
        // Even a container narrower than two minimum columns
        assert!(template.resolve_columns(150.0, 120.0, 5, &config) > 1);
    }

    #[test]
    fn wide_container_fits_more_tracks() {
        let config = MasonryConfig::default();
        let template = ColumnTemplate::for_item_count(12, &config);
        // min width 180: (1200 + 12) / 192 = 6.3
        assert_eq!(template.resolve_columns(1920.0, 1200.0, 12, &config), 6);
    }

    #[test]
    fn empty_tracks_collapse() {
        let config = MasonryConfig::default();
        let template = ColumnTemplate::for_item_count(3, &config);
        assert_eq!(template.resolve_columns(1920.0, 1200.0, 3, &config), 3);
        let single = ColumnTemplate::for_item_count(1, &config);
        assert_eq!(single.resolve_columns(1920.0, 1200.0, 1, &config), 1);
    }

    #[test]
    fn column_width_subtracts_gaps() {
        assert_eq!(ColumnTemplate::column_width(312.0, 3, 12.0), 96.0);
        assert_eq!(ColumnTemplate::column_width(100.0, 0, 12.0), 100.0);
    }
}
