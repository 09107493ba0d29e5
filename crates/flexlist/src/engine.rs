#![forbid(unsafe_code)]

//! The recycling window engine.
//!
//! [`RecyclingList`] owns the [`HeightLedger`], the [`SlotPool`] and the
//! scroll container. Every public mutation updates the ledger, resizes the
//! content area and runs a reorganize pass that decides which row each slot
//! shows and where it goes.
//!
//! # Reorganize pass
//!
//! 1. A reset pass halts momentum and writes position `1` (top).
//! 2. The pool grows to cover the viewport; growth forces a full rebuild.
//! 3. The first visible row is found by walking the ledger from the previous
//!    one.
//! 4. The window start is that row minus the margin. A jump of at least the
//!    capacity, or any non-scroll pass, rebuilds every slot; otherwise only
//!    the `|diff|` slots that crossed the window edge are reassigned.
//!
//! # Re-entrancy
//!
//! Writes to the container's position or size happen with
//! `ignore_scroll_change` raised. A change notification fired by such a
//! write is routed to [`on_scroll_changed`](RecyclingList::on_scroll_changed),
//! which drops it and bumps [`EngineStats::suppressed_notifications`].

use std::ops::Range;

use crate::config::FlexListConfig;
use crate::error::{FlexListError, Result};
use crate::item::{FlexItem, ItemCallback, Placement};
use crate::ledger::HeightLedger;
use crate::mapper;
use crate::pool::{Slot, SlotId, SlotPool};
use crate::viewport::ScrollViewport;

// ============================================================================
// Window
// ============================================================================

/// Mapping from a contiguous run of rows onto the circular slot buffer.
///
/// Row `source_row_start + k` lives in slot `(buffer_start + k) % capacity`
/// for `k` in `0..capacity`. `source_row_start` may be negative near the top;
/// slots mapped to rows outside the data are hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    /// Lowest row represented in the pool.
    pub source_row_start: isize,
    /// Slot holding `source_row_start`.
    pub buffer_start: usize,
    /// Pool capacity when the window was last laid out.
    pub capacity: usize,
}

impl Window {
    /// Rows covered by the window, including ones outside the data.
    pub fn rows(&self) -> Range<isize> {
        self.source_row_start..self.source_row_start + self.capacity as isize
    }

    /// Slot that represents `row`, if the row falls inside the window.
    pub fn slot_for_row(&self, row: usize) -> Option<SlotId> {
        if self.capacity == 0 {
            return None;
        }
        let k = isize::try_from(row).ok()? - self.source_row_start;
        if k < 0 || k >= self.capacity as isize {
            return None;
        }
        Some(SlotId((self.buffer_start + k as usize) % self.capacity))
    }

    /// Row that `slot` represents under this window.
    pub fn row_for_slot(&self, slot: SlotId) -> Option<isize> {
        if slot.0 >= self.capacity {
            return None;
        }
        let k = (slot.0 + self.capacity - self.buffer_start % self.capacity) % self.capacity;
        Some(self.source_row_start + k as isize)
    }
}

// ============================================================================
// Reports and stats
// ============================================================================

/// Why a reorganize pass ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorganizeKind {
    /// Scroll position changed; slots shift where possible.
    Incremental,
    /// Row data changed; every slot is repopulated, position kept.
    Repopulate,
    /// Clear or refresh; momentum stops, position returns to top, every slot
    /// is repopulated.
    Reset,
}

impl ReorganizeKind {
    /// Short lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Repopulate => "repopulate",
            Self::Reset => "reset",
        }
    }
}

/// What a pass did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUpdate {
    /// Every slot was reassigned from `buffer_start = 0`.
    Rebuilt,
    /// Only the slots crossing the edge were reassigned.
    Shifted {
        /// Signed row distance the window moved.
        by: isize,
    },
    /// The window start did not move.
    Unchanged,
    /// Nothing to show: no rows or no viewport. Every slot is hidden.
    Blanked,
}

/// Summary of the most recent reorganize pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReorganizeReport {
    /// Why the pass ran.
    pub kind: ReorganizeKind,
    /// What happened to the window.
    pub update: WindowUpdate,
    /// Whether the pool grew during the pass.
    pub pool_grew: bool,
    /// First visible row after the pass.
    pub first_visible_row: usize,
    /// Window after the pass.
    pub window: Window,
    /// Slots handed to the populate callback.
    pub slots_populated: u64,
    /// Slots hidden.
    pub slots_deactivated: u64,
}

/// Running counters, available with or without the `tracing` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineStats {
    /// Reorganize passes run.
    pub reorganizes: u64,
    /// Passes that reassigned every slot.
    pub full_rebuilds: u64,
    /// Passes that shifted the window.
    pub incremental_shifts: u64,
    /// Slots handed to the populate callback.
    pub slots_populated: u64,
    /// Active slots hidden.
    pub slots_deactivated: u64,
    /// Slots skipped because no populate callback was installed.
    pub missing_collaborator: u64,
    /// Change notifications dropped by the re-entrancy guard.
    pub suppressed_notifications: u64,
    /// Passes that found no usable viewport height.
    pub degenerate_viewport: u64,
}

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// No rows.
    Empty,
    /// At least one row; the window is valid.
    Populated,
}

// ============================================================================
// RecyclingList
// ============================================================================

/// Virtualized list of variable-height rows backed by a recycled slot pool.
///
/// `V` is the host's item view; `S` the scroll container. Neither is
/// rendered here: the engine calls the populate callback, [`FlexItem::place`]
/// and [`FlexItem::set_visible`], and writes the container's content size
/// and position.
pub struct RecyclingList<V: FlexItem, S: ScrollViewport> {
    config: FlexListConfig,
    ledger: HeightLedger,
    pool: SlotPool<V>,
    viewport: S,
    factory: Box<dyn FnMut() -> V>,
    measurer: V,
    item_callback: Option<ItemCallback<V>>,
    window: Window,
    first_visible_row: usize,
    ignore_scroll_change: bool,
    organized: bool,
    stats: EngineStats,
    last_pass: Option<ReorganizeReport>,
}

impl<V: FlexItem, S: ScrollViewport> std::fmt::Debug for RecyclingList<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecyclingList")
            .field("rows", &self.ledger.len())
            .field("content_height", &self.ledger.content_height())
            .field("capacity", &self.pool.capacity())
            .field("window", &self.window)
            .field("first_visible_row", &self.first_visible_row)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<V: FlexItem, S: ScrollViewport> RecyclingList<V, S> {
    /// Create an empty list.
    ///
    /// `factory` builds every slot view plus one hidden instance used only
    /// to measure content. No slots are built until the first pass.
    pub fn new(
        config: FlexListConfig,
        viewport: S,
        mut factory: impl FnMut() -> V + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let mut measurer = factory();
        measurer.set_visible(false);
        Ok(Self {
            ledger: HeightLedger::new(config.row_padding).with_epsilon(config.height_epsilon),
            config,
            pool: SlotPool::new(),
            viewport,
            factory: Box::new(factory),
            measurer,
            item_callback: None,
            window: Window::default(),
            first_visible_row: 0,
            ignore_scroll_change: false,
            organized: false,
            stats: EngineStats::default(),
            last_pass: None,
        })
    }

    /// Install the populate callback (builder form).
    #[must_use]
    pub fn with_item_callback(mut self, callback: impl FnMut(&mut V, usize) + 'static) -> Self {
        self.set_item_callback(callback);
        self
    }

    /// Install or replace the populate callback.
    pub fn set_item_callback(&mut self, callback: impl FnMut(&mut V, usize) + 'static) {
        self.item_callback = Some(Box::new(callback));
    }

    /// Remove the populate callback.
    pub fn clear_item_callback(&mut self) {
        self.item_callback = None;
    }

    /// Whether a populate callback is installed.
    pub fn has_item_callback(&self) -> bool {
        self.item_callback.is_some()
    }

    // ------------------------------------------------------------------
    // Data mutations
    // ------------------------------------------------------------------

    /// Measure `content`, append it as a new row and return its index.
    ///
    /// The scroll position is kept; only [`clear`](Self::clear) and
    /// [`refresh`](Self::refresh) return to the top.
    pub fn add_item(&mut self, content: &V::Content) -> usize {
        let height = self.measure(content);
        let row = self.ledger.push(height);
        self.sync_content_height();
        self.reorganize(ReorganizeKind::Repopulate);
        row
    }

    /// Append several rows with a single pass. Returns the new row indices.
    pub fn add_items<'a, I>(&mut self, contents: I) -> Range<usize>
    where
        I: IntoIterator<Item = &'a V::Content>,
        V::Content: 'a,
    {
        let start = self.ledger.len();
        for content in contents {
            let height = self.measure(content);
            self.ledger.push(height);
        }
        let end = self.ledger.len();
        if end > start {
            self.sync_content_height();
            self.reorganize(ReorganizeKind::Repopulate);
        }
        start..end
    }

    /// Measure `content` and insert it at `row`, shifting later rows down.
    /// `row == row_count()` appends.
    pub fn insert_item(&mut self, row: usize, content: &V::Content) -> Result<()> {
        let len = self.ledger.len();
        if row > len {
            return Err(FlexListError::IndexOutOfRange { index: row, len });
        }
        let height = self.measure(content);
        self.ledger.insert(row, height)?;
        self.sync_content_height();
        self.reorganize(ReorganizeKind::Repopulate);
        Ok(())
    }

    /// Remove `row`; later rows move up one index.
    pub fn remove_at(&mut self, row: usize) -> Result<()> {
        self.ledger.remove(row)?;
        self.sync_content_height();
        self.reorganize(ReorganizeKind::Repopulate);
        Ok(())
    }

    /// Re-measure `row` with new content and propagate a height change.
    ///
    /// The window does not move. Materialized slots at or after `row` are
    /// re-placed against the new offsets. Returns whether the height
    /// changed by more than the configured epsilon.
    pub fn update_item(&mut self, row: usize, content: &V::Content) -> Result<bool> {
        self.ledger.height(row)?;
        let height = self.measure(content);
        let Some(_delta) = self.ledger.set_height(row, height)? else {
            return Ok(false);
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(row, delta = _delta, "row height changed");
        self.sync_content_height();

        let config = &self.config;
        let ledger = &self.ledger;
        for slot in self.pool.iter_mut() {
            let Some(r) = slot.row.filter(|&r| r >= row) else {
                continue;
            };
            if let Some(m) = ledger.metrics(r) {
                slot.view
                    .place(Placement::for_row(r, m.top, m.height, config));
            }
        }
        Ok(true)
    }

    /// Drop every row and return to the top.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.first_visible_row = 0;
        self.sync_content_height();
        self.reorganize(ReorganizeKind::Reset);
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Return to the top and repopulate every slot.
    pub fn refresh(&mut self) {
        self.reorganize(ReorganizeKind::Reset);
    }

    /// Repopulate the materialized rows in `start..start + count`, then run a
    /// full pass so offsets follow any height changes made beforehand.
    ///
    /// The range is validated before anything is touched.
    pub fn refresh_range(&mut self, start: usize, count: usize) -> Result<()> {
        let len = self.ledger.len();
        let end = start.checked_add(count).filter(|&end| count > 0 && end <= len);
        let Some(end) = end else {
            return Err(FlexListError::InvalidRange { start, count, len });
        };
        for row in start..end {
            if let Some(id) = self.window.slot_for_row(row) {
                self.assign_slot(id, row as isize);
            }
        }
        self.reorganize(ReorganizeKind::Repopulate);
        Ok(())
    }

    /// Repopulate a single slot with the row it currently represents.
    pub fn refresh_slot(&mut self, slot: SlotId) -> Result<()> {
        let capacity = self.pool.capacity();
        let Some(row) = self
            .window
            .row_for_slot(slot)
            .filter(|_| slot.0 < capacity)
        else {
            return Err(FlexListError::IndexOutOfRange {
                index: slot.0,
                len: capacity,
            });
        };
        if self.item_callback.is_none() {
            return Err(FlexListError::MissingCollaborator);
        }
        self.assign_slot(slot, row);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    /// Jump so the center of `row` is in view. Out-of-range rows clamp; an
    /// empty list is left alone.
    pub fn scroll_to_row(&mut self, row: usize) {
        if self.ledger.is_empty() {
            return;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("flexlist_scroll_to_row", row).entered();
        let position = self.row_scroll_position(row);
        self.write_normalized_position(position);
        self.reorganize(ReorganizeKind::Incremental);
    }

    /// Normalized position (`1` = top) that centers `row` in the viewport.
    pub fn row_scroll_position(&self, row: usize) -> f32 {
        mapper::normalized_position_for_row(
            row,
            &self.ledger,
            self.viewport.viewport_height(),
            self.ledger.content_height(),
        )
    }

    /// Change notification from the scroll container.
    ///
    /// Dropped while the engine itself is writing to the container, and
    /// ignored while the list is empty.
    pub fn on_scroll_changed(&mut self) {
        if self.ignore_scroll_change {
            self.stats.suppressed_notifications += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!("suppressed self-triggered scroll notification");
            return;
        }
        if self.ledger.is_empty() {
            return;
        }
        self.reorganize(ReorganizeKind::Incremental);
    }

    /// The viewport height changed. Grows the pool if needed and lays the
    /// window out again.
    pub fn on_viewport_resized(&mut self) {
        self.sync_content_height();
        self.reorganize(ReorganizeKind::Incremental);
    }

    /// Drive the scroll container directly, as user input would, and deliver
    /// the change notification when `f` reports one fired.
    pub fn scroll_with(&mut self, f: impl FnOnce(&mut S) -> bool) -> bool {
        let fired = f(&mut self.viewport);
        if fired {
            self.on_scroll_changed();
        }
        fired
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.ledger.len()
    }

    /// Total content extent.
    pub fn content_height(&self) -> f32 {
        self.ledger.content_height()
    }

    /// Ledger height of `row`.
    pub fn height_at(&self, row: usize) -> Result<f32> {
        self.ledger.height(row)
    }

    /// Slot currently showing `row`, or `None` when the row is outside the
    /// data or the materialized window.
    pub fn row_slot(&self, row: usize) -> Option<SlotId> {
        if row >= self.ledger.len() {
            return None;
        }
        let id = self.window.slot_for_row(row)?;
        let slot = self.pool.get(id)?;
        (slot.row == Some(row)).then_some(id)
    }

    /// Item view currently showing `row`.
    pub fn row_item(&self, row: usize) -> Option<&V> {
        let id = self.row_slot(row)?;
        self.pool.get(id).map(|s| &s.view)
    }

    /// Coarse state.
    pub fn state(&self) -> ListState {
        if self.ledger.is_empty() {
            ListState::Empty
        } else {
            ListState::Populated
        }
    }

    /// Current window.
    pub fn window(&self) -> Window {
        self.window
    }

    /// First row not fully scrolled past, as of the last pass.
    pub fn first_visible_row(&self) -> usize {
        self.first_visible_row
    }

    /// Active configuration.
    pub fn config(&self) -> &FlexListConfig {
        &self.config
    }

    /// Height ledger.
    pub fn ledger(&self) -> &HeightLedger {
        &self.ledger
    }

    /// Slot pool.
    pub fn pool(&self) -> &SlotPool<V> {
        &self.pool
    }

    /// Every slot with its id.
    pub fn slots(&self) -> impl Iterator<Item = (SlotId, &Slot<V>)> + '_ {
        self.pool.iter()
    }

    /// Scroll container.
    pub fn viewport(&self) -> &S {
        &self.viewport
    }

    /// Scroll container, mutably. Changes made here are not seen until
    /// [`on_scroll_changed`](Self::on_scroll_changed) or
    /// [`on_viewport_resized`](Self::on_viewport_resized) is called.
    pub fn viewport_mut(&mut self) -> &mut S {
        &mut self.viewport
    }

    /// Counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Summary of the most recent pass.
    pub fn last_reorganize(&self) -> Option<&ReorganizeReport> {
        self.last_pass.as_ref()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn measure(&mut self, content: &V::Content) -> f32 {
        let measured = self.measurer.measure_height(content);
        let min = self.config.min_item_height;
        if !measured.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::warn!(measured, "non-finite item height; using template height");
            return min;
        }
        measured.max(min)
    }

    fn sync_content_height(&mut self) {
        let height = self.ledger.content_height();
        self.ignore_scroll_change = true;
        if self.viewport.set_content_height(height) {
            self.on_scroll_changed();
        }
        self.ignore_scroll_change = false;
    }

    fn write_normalized_position(&mut self, position: f32) {
        self.ignore_scroll_change = true;
        if self.viewport.set_normalized_position(position) {
            self.on_scroll_changed();
        }
        self.ignore_scroll_change = false;
    }

    fn reorganize(&mut self, kind: ReorganizeKind) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "flexlist_reorganize",
            kind = kind.as_str(),
            rows = self.ledger.len(),
            capacity = self.pool.capacity()
        )
        .entered();

        self.stats.reorganizes += 1;
        let populated_before = self.stats.slots_populated;
        let deactivated_before = self.stats.slots_deactivated;

        if kind == ReorganizeKind::Reset {
            self.viewport.stop_movement();
            self.write_normalized_position(1.0);
        }

        let viewport_height = self.viewport.viewport_height();
        let usable = viewport_height.is_finite() && viewport_height > 0.0;
        let grew = usable
            && self.pool.ensure_capacity(
                viewport_height,
                self.config.min_item_height,
                self.config.margin_rows,
                || (self.factory)(),
            );
        #[cfg(feature = "tracing")]
        if grew {
            tracing::debug!(capacity = self.pool.capacity(), viewport_height, "slot pool grew");
        }
        let capacity = self.pool.capacity();

        let update = if !usable || capacity == 0 {
            self.stats.degenerate_viewport += 1;
            #[cfg(feature = "tracing")]
            {
                let error = FlexListError::DegenerateViewport {
                    height: viewport_height,
                };
                tracing::warn!(%error, "hiding all slots");
            }
            self.blank(capacity);
            self.organized = false;
            WindowUpdate::Blanked
        } else if self.ledger.is_empty() {
            self.blank(capacity);
            self.organized = true;
            WindowUpdate::Blanked
        } else {
            let update = self.layout(kind, grew, capacity);
            self.organized = true;
            update
        };

        match update {
            WindowUpdate::Rebuilt => self.stats.full_rebuilds += 1,
            WindowUpdate::Shifted { .. } => self.stats.incremental_shifts += 1,
            WindowUpdate::Unchanged | WindowUpdate::Blanked => {}
        }
        self.last_pass = Some(ReorganizeReport {
            kind,
            update,
            pool_grew: grew,
            first_visible_row: self.first_visible_row,
            window: self.window,
            slots_populated: self.stats.slots_populated - populated_before,
            slots_deactivated: self.stats.slots_deactivated - deactivated_before,
        });
    }

    fn blank(&mut self, capacity: usize) {
        for i in 0..capacity {
            self.deactivate(SlotId(i));
        }
        self.first_visible_row = 0;
        self.window = Window {
            source_row_start: 0,
            buffer_start: 0,
            capacity,
        };
    }

    fn layout(&mut self, kind: ReorganizeKind, grew: bool, capacity: usize) -> WindowUpdate {
        let offset = self.viewport.scroll_offset();
        let first = self.ledger.first_visible_from(self.first_visible_row, offset);
        self.first_visible_row = first;

        let new_start = first as isize - self.config.margin_rows as isize;
        let old = self.window;
        let diff = new_start - old.source_row_start;
        let populate_all = grew
            || !self.organized
            || kind != ReorganizeKind::Incremental
            || old.capacity != capacity;

        if populate_all || diff.unsigned_abs() >= capacity {
            #[cfg(feature = "tracing")]
            tracing::debug!(first, new_start, diff, "rebuilding window");
            self.window = Window {
                source_row_start: new_start,
                buffer_start: 0,
                capacity,
            };
            for i in 0..capacity {
                self.assign_slot(SlotId(i), new_start + i as isize);
            }
            return WindowUpdate::Rebuilt;
        }
        if diff == 0 {
            return WindowUpdate::Unchanged;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(first, new_start, diff, "shifting window");
        let buffer_start = old.buffer_start as isize;
        let cap = capacity as isize;
        if diff < 0 {
            for i in 1..=-diff {
                let slot = self.pool.wrap(buffer_start - i);
                self.assign_slot(SlotId(slot), old.source_row_start - i);
            }
        } else {
            let last_slot = buffer_start + cap - 1;
            let last_row = old.source_row_start + cap - 1;
            for i in 1..=diff {
                let slot = self.pool.wrap(last_slot + i);
                self.assign_slot(SlotId(slot), last_row + i);
            }
        }
        self.window = Window {
            source_row_start: new_start,
            buffer_start: self.pool.wrap(buffer_start + diff),
            capacity,
        };
        WindowUpdate::Shifted { by: diff }
    }

    fn assign_slot(&mut self, id: SlotId, row: isize) {
        let row = match usize::try_from(row) {
            Ok(row) if row < self.ledger.len() => row,
            _ => {
                self.deactivate(id);
                return;
            }
        };
        let Some(metrics) = self.ledger.metrics(row) else {
            self.deactivate(id);
            return;
        };
        let Some(callback) = self.item_callback.as_mut() else {
            self.stats.missing_collaborator += 1;
            #[cfg(feature = "tracing")]
            tracing::warn!(
                slot = id.0,
                row,
                "{}; slot left as is",
                FlexListError::MissingCollaborator
            );
            return;
        };
        let Some(slot) = self.pool.slot_mut(id) else {
            return;
        };
        callback(&mut slot.view, row);
        slot.view.place(Placement::for_row(
            row,
            metrics.top,
            metrics.height,
            &self.config,
        ));
        slot.row = Some(row);
        slot.view.set_visible(true);
        self.stats.slots_populated += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(slot = id.0, row, top = metrics.top, "slot populated");
    }

    fn deactivate(&mut self, id: SlotId) {
        let Some(slot) = self.pool.slot_mut(id) else {
            return;
        };
        slot.view.set_visible(false);
        if slot.row.take().is_some() {
            self.stats.slots_deactivated += 1;
        }
    }
}
