#![forbid(unsafe_code)]

//! Per-row height and top-offset bookkeeping.
//!
//! [`HeightLedger`] keeps two dense, parallel arrays indexed by row: the
//! row's height and the distance from the top of the content area to the
//! row's top edge. Rows are renumbered implicitly: removing row `k` shifts
//! every later row down by one index.
//!
//! # Operations
//!
//! | Operation | Time |
//! |-----------|------|
//! | `push(h)` | O(1) amortised |
//! | `insert(i, h)` | O(n - i) |
//! | `remove(i)` | O(n - i) |
//! | `set_height(i, h)` | O(n - i) |
//! | `height(i)`, `top_offset(i)`, `content_height()` | O(1) |
//! | `first_visible_from(hint, offset)` | O(distance from hint) |
//! | `row_at_offset(offset)` | O(log n) |
//!
//! # Invariants
//!
//! 1. `top_offset(0) == 0`.
//! 2. `top_offset(i + 1) == top_offset(i) + height(i) + row_padding`.
//! 3. `content_height() == top_offset(n - 1) + height(n - 1)`, or `0` when empty.
//! 4. Bottom edges are non-decreasing, so offset searches are monotone.

use crate::config::HEIGHT_EPSILON;
use crate::error::{FlexListError, Result};

/// Height and top offset of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowMetrics {
    /// Distance from the top of the content area to the row's top edge.
    pub top: f32,
    /// Rendered height of the row.
    pub height: f32,
}

impl RowMetrics {
    /// Distance from the top of the content area to the row's bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Dense per-row height/offset ledger.
#[derive(Debug, Clone)]
pub struct HeightLedger {
    heights: Vec<f32>,
    tops: Vec<f32>,
    row_padding: f32,
    epsilon: f32,
}

impl Default for HeightLedger {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl HeightLedger {
    /// Create an empty ledger with the given gap between rows.
    #[must_use]
    pub fn new(row_padding: f32) -> Self {
        Self {
            heights: Vec::new(),
            tops: Vec::new(),
            row_padding,
            epsilon: HEIGHT_EPSILON,
        }
    }

    /// Override the threshold used by [`set_height`](Self::set_height).
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Gap between consecutive rows.
    #[inline]
    pub fn row_padding(&self) -> f32 {
        self.row_padding
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Whether the ledger holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Append a row and return its index.
    pub fn push(&mut self, height: f32) -> usize {
        let index = self.len();
        let top = if index == 0 {
            0.0
        } else {
            self.content_height() + self.row_padding
        };
        self.heights.push(height);
        self.tops.push(top);
        index
    }

    /// Insert a row at `index`, shifting every following row down by
    /// `height + row_padding`. `index == len()` appends.
    pub fn insert(&mut self, index: usize, height: f32) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(FlexListError::IndexOutOfRange { index, len });
        }
        if index == len {
            self.push(height);
            return Ok(());
        }
        let top = self.tops[index];
        let shift = height + self.row_padding;
        for t in &mut self.tops[index..] {
            *t += shift;
        }
        self.heights.insert(index, height);
        self.tops.insert(index, top);
        Ok(())
    }

    /// Remove the row at `index`, pulling every following row up by the
    /// removed `height + row_padding`. Returns the removed height.
    pub fn remove(&mut self, index: usize) -> Result<f32> {
        self.check(index)?;
        let height = self.heights.remove(index);
        self.tops.remove(index);
        let shift = height + self.row_padding;
        for t in &mut self.tops[index..] {
            *t -= shift;
        }
        Ok(height)
    }

    /// Change the height of `index`, shifting every later row by the delta.
    ///
    /// Returns `Some(delta)` when the change exceeded the epsilon and was
    /// applied, `None` when it was treated as noise.
    pub fn set_height(&mut self, index: usize, height: f32) -> Result<Option<f32>> {
        self.check(index)?;
        let current = self.heights[index];
        if (height - current).abs() <= self.epsilon {
            return Ok(None);
        }
        let delta = height - current;
        self.heights[index] = height;
        for t in &mut self.tops[index + 1..] {
            *t += delta;
        }
        Ok(Some(delta))
    }

    /// Height of row `index`.
    pub fn height(&self, index: usize) -> Result<f32> {
        self.check(index)?;
        Ok(self.heights[index])
    }

    /// Top offset of row `index`.
    pub fn top_offset(&self, index: usize) -> Result<f32> {
        self.check(index)?;
        Ok(self.tops[index])
    }

    /// Bottom edge of row `index` (`top + height`, padding excluded).
    pub fn bottom_offset(&self, index: usize) -> Result<f32> {
        self.check(index)?;
        Ok(self.tops[index] + self.heights[index])
    }

    /// Height and top offset of `index`, or `None` when out of range.
    #[inline]
    pub fn metrics(&self, index: usize) -> Option<RowMetrics> {
        Some(RowMetrics {
            top: *self.tops.get(index)?,
            height: *self.heights.get(index)?,
        })
    }

    /// Total extent of the content: every height plus the gaps between rows.
    pub fn content_height(&self) -> f32 {
        match (self.tops.last(), self.heights.last()) {
            (Some(top), Some(height)) => top + height,
            _ => 0.0,
        }
    }

    /// Drop every row.
    pub fn clear(&mut self) {
        self.heights.clear();
        self.tops.clear();
    }

    /// Iterate over all rows in index order.
    pub fn iter(&self) -> impl Iterator<Item = RowMetrics> + '_ {
        self.tops
            .iter()
            .zip(&self.heights)
            .map(|(&top, &height)| RowMetrics { top, height })
    }

    /// First row whose bottom edge lies below `offset`, found by walking from
    /// `hint`.
    ///
    /// Every row before the result is scrolled fully past `offset`; the result
    /// either contains `offset` or starts below it (when `offset` falls in
    /// the padding gap). Clamped to the last row. Returns `0` when empty.
    ///
    /// The walk costs one step per row between `hint` and the answer, so a
    /// hint from the previous frame makes ordinary scrolling O(1) while large
    /// jumps still converge.
    pub fn first_visible_from(&self, hint: usize, offset: f32) -> usize {
        let len = self.len();
        if len == 0 {
            return 0;
        }
        let bottom = |i: usize| self.tops[i] + self.heights[i];
        let mut row = hint.min(len - 1);
        while row + 1 < len && bottom(row) <= offset {
            row += 1;
        }
        while row > 0 && bottom(row - 1) > offset {
            row -= 1;
        }
        row
    }

    /// Binary-search counterpart of [`first_visible_from`](Self::first_visible_from).
    ///
    /// Returns `None` only when the ledger is empty.
    pub fn row_at_offset(&self, offset: f32) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let (mut lo, mut hi) = (0usize, len);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.tops[mid] + self.heights[mid] <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Some(lo.min(len - 1))
    }

    #[inline]
    fn check(&self, index: usize) -> Result<()> {
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(FlexListError::IndexOutOfRange { index, len })
        }
    }
}
