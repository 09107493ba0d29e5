#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! [`FlexListConfig`] carries the handful of layout constants the engine
//! needs: the gap between rows, the template (minimum) row height, how many
//! rows to keep materialized beyond the visible region, and how the host
//! anchors a slot relative to its top edge.
//!
//! ```
//! use flexlist::FlexListConfig;
//!
//! let config = FlexListConfig::default()
//!     .with_row_padding(4.0)
//!     .with_min_item_height(18.0)
//!     .with_margin_rows(2);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{FlexListError, Result};

/// Default gap between consecutive rows.
pub const DEFAULT_ROW_PADDING: f32 = 15.0;

/// Default template height; measured heights never go below it.
pub const DEFAULT_MIN_ITEM_HEIGHT: f32 = 20.0;

/// Default number of extra rows materialized above and below the viewport.
pub const DEFAULT_MARGIN_ROWS: usize = 1;

/// Largest accepted `margin_rows`.
pub const MAX_MARGIN_ROWS: usize = 1 << 16;

/// Height changes at or below this magnitude are treated as noise.
pub const HEIGHT_EPSILON: f32 = 0.01;

/// Normalized anchor point of the item template, `(0, 0)` = top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pivot {
    /// Horizontal anchor in `[0, 1]`.
    pub x: f32,
    /// Vertical anchor in `[0, 1]`, measured upward as in the host's rect convention.
    pub y: f32,
}

impl Pivot {
    /// Centered pivot.
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
    /// Top-left pivot: placements land exactly on the row's top offset.
    pub const TOP_LEFT: Self = Self { x: 0.0, y: 1.0 };

    /// Create a pivot.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Pivot {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Layout configuration for [`RecyclingList`](crate::RecyclingList).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlexListConfig {
    /// Vertical gap between consecutive rows.
    pub row_padding: f32,
    /// Template row height. Sizes the slot pool and floors every measurement.
    pub min_item_height: f32,
    /// Rows kept materialized above and below the visible region.
    pub margin_rows: usize,
    /// Re-measured heights within this distance of the stored one are ignored.
    pub height_epsilon: f32,
    /// Template width, used for the horizontal anchor of placements.
    pub item_width: f32,
    /// Template pivot used to translate top offsets into anchored positions.
    pub pivot: Pivot,
}

impl Default for FlexListConfig {
    fn default() -> Self {
        Self {
            row_padding: DEFAULT_ROW_PADDING,
            min_item_height: DEFAULT_MIN_ITEM_HEIGHT,
            margin_rows: DEFAULT_MARGIN_ROWS,
            height_epsilon: HEIGHT_EPSILON,
            item_width: 0.0,
            pivot: Pivot::CENTER,
        }
    }
}

impl FlexListConfig {
    /// Set the gap between rows.
    #[must_use]
    pub fn with_row_padding(mut self, padding: f32) -> Self {
        self.row_padding = padding;
        self
    }

    /// Set the template (minimum) row height.
    #[must_use]
    pub fn with_min_item_height(mut self, height: f32) -> Self {
        self.min_item_height = height;
        self
    }

    /// Set how many rows are kept materialized beyond each viewport edge.
    #[must_use]
    pub fn with_margin_rows(mut self, rows: usize) -> Self {
        self.margin_rows = rows;
        self
    }

    /// Set the height-change threshold.
    #[must_use]
    pub fn with_height_epsilon(mut self, epsilon: f32) -> Self {
        self.height_epsilon = epsilon;
        self
    }

    /// Set the template width.
    #[must_use]
    pub fn with_item_width(mut self, width: f32) -> Self {
        self.item_width = width;
        self
    }

    /// Set the template pivot.
    #[must_use]
    pub fn with_pivot(mut self, pivot: Pivot) -> Self {
        self.pivot = pivot;
        self
    }

    /// Check every field, reporting the first one that is out of bounds.
    pub fn validate(&self) -> Result<()> {
        if !self.row_padding.is_finite() || self.row_padding < 0.0 {
            return Err(FlexListError::InvalidConfig {
                field: "row_padding",
                reason: "must be finite and >= 0",
            });
        }
        if !self.min_item_height.is_finite() || self.min_item_height <= 0.0 {
            return Err(FlexListError::InvalidConfig {
                field: "min_item_height",
                reason: "must be finite and > 0",
            });
        }
        if self.margin_rows > MAX_MARGIN_ROWS {
            return Err(FlexListError::InvalidConfig {
                field: "margin_rows",
                reason: "must be at most 65536",
            });
        }
        if !self.height_epsilon.is_finite() || self.height_epsilon < 0.0 {
            return Err(FlexListError::InvalidConfig {
                field: "height_epsilon",
                reason: "must be finite and >= 0",
            });
        }
        if !self.item_width.is_finite() {
            return Err(FlexListError::InvalidConfig {
                field: "item_width",
                reason: "must be finite",
            });
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.pivot.x) || !unit.contains(&self.pivot.y) {
            return Err(FlexListError::InvalidConfig {
                field: "pivot",
                reason: "components must lie in [0, 1]",
            });
        }
        Ok(())
    }
}
