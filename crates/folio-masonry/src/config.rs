//! Masonry configuration

use serde::{Deserialize, Serialize};

/// Metrics that make row spans meaningless
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MasonryConfigError {
    /// A metric is NaN or infinite
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    /// Row unit is zero or negative
    #[error("row_unit_px must be positive, got {0}")]
    RowUnit(f32),

    /// Gap is negative
    #[error("gap_px must not be negative, got {0}")]
    NegativeGap(f32),

    /// Column clamp is inverted or not positive
    #[error("column clamp needs 0 < floor <= ceiling, got {floor}px..{ceiling}px")]
    ColumnClamp {
        /// Lower clamp
        floor: f32,
        /// Upper clamp
        ceiling: f32,
    },
}

/// Grid metrics and column policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasonryConfig {
    /// Height of one grid row (`R`)
    pub row_unit_px: f32,
    /// Row and column gap (`G`)
    pub gap_px: f32,
    /// Lower clamp of the auto-fit minimum column width
    pub column_floor_px: f32,
    /// Preferred minimum column width in percent of the viewport width
    pub column_viewport_percent: f32,
    /// Upper clamp of the auto-fit minimum column width
    pub column_ceiling_px: f32,
    /// Fewest columns for galleries of two or more images
    pub min_columns: usize,
}

impl MasonryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With row unit and gap
    #[inline]
    #[must_use]
    pub fn with_metrics(mut self, row_unit_px: f32, gap_px: f32) -> Self {
        self.row_unit_px = row_unit_px;
        self.gap_px = gap_px;
        self
    }

    /// With auto-fit column clamp
    #[inline]
    #[must_use]
    pub fn with_column_clamp(mut self, floor_px: f32, viewport_percent: f32, ceiling_px: f32) -> Self {
        self.column_floor_px = floor_px;
        self.column_viewport_percent = viewport_percent;
        self.column_ceiling_px = ceiling_px;
        self
    }

    /// Check the metrics can produce spans
    ///
    /// # Errors
    /// Returns the first metric that is non-finite or out of range.
    pub fn validate(&self) -> Result<(), MasonryConfigError> {
        let metrics = [
            ("row_unit_px", self.row_unit_px),
            ("gap_px", self.gap_px),
            ("column_floor_px", self.column_floor_px),
            ("column_viewport_percent", self.column_viewport_percent),
            ("column_ceiling_px", self.column_ceiling_px),
        ];
        if let Some(&(name, _)) = metrics.iter().find(|(_, value)| !value.is_finite()) {
            return Err(MasonryConfigError::NonFinite(name));
        }
        if self.row_unit_px <= 0.0 {
            return Err(MasonryConfigError::RowUnit(self.row_unit_px));
        }
        if self.gap_px < 0.0 {
            return Err(MasonryConfigError::NegativeGap(self.gap_px));
        }
        if self.column_floor_px <= 0.0 || self.column_floor_px > self.column_ceiling_px {
            return Err(MasonryConfigError::ColumnClamp {
                floor: self.column_floor_px,
                ceiling: self.column_ceiling_px,
            });
        }
        Ok(())
    }

    /// With minimum column count
    #[inline]
    #[must_use]
    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }
}

impl Default for MasonryConfig {
    fn default() -> Self {
        Self {
            row_unit_px: 8.0,
            gap_px: 12.0,
            column_floor_px: 96.0,
            column_viewport_percent: 30.0,
            column_ceiling_px: 180.0,
            min_columns: 2,
        }
    }
}
