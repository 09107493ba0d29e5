#![forbid(unsafe_code)]

//! Fixed-capacity ring of reusable item slots.
//!
//! The pool is sized from the viewport height and the template row height,
//! so it always holds enough slots to cover the visible region at the
//! shortest possible row height plus a margin on each side. It only grows.

/// Index of a slot inside a [`SlotPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// A reusable item view together with the row it currently shows.
#[derive(Debug, Clone)]
pub struct Slot<V> {
    /// The host item.
    pub view: V,
    /// Row bound to this slot, or `None` while the slot is hidden.
    pub row: Option<usize>,
}

impl<V> Slot<V> {
    /// Whether the slot is currently showing a row.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.row.is_some()
    }
}

/// Ring of slots indexed modulo its capacity.
#[derive(Debug, Clone)]
pub struct SlotPool<V> {
    slots: Vec<Slot<V>>,
    built_for_height: f32,
}

impl<V> Default for SlotPool<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SlotPool<V> {
    /// Empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            built_for_height: 0.0,
        }
    }

    /// Slots needed for a viewport: `ceil(viewport / min_height) + 2 * margin`.
    ///
    /// Returns `0` for a non-finite or non-positive viewport or row height,
    /// and when the count does not fit in `usize`.
    pub fn required_capacity(
        viewport_height: f32,
        min_item_height: f32,
        margin_rows: usize,
    ) -> usize {
        if !viewport_height.is_finite()
            || !min_item_height.is_finite()
            || viewport_height <= 0.0
            || min_item_height <= 0.0
        {
            return 0;
        }
        let visible = (viewport_height / min_item_height).ceil();
        if visible >= usize::MAX as f32 {
            return 0;
        }
        margin_rows
            .checked_mul(2)
            .and_then(|margin| (visible as usize).checked_add(margin))
            .unwrap_or(0)
    }

    /// Grow the pool to cover `viewport_height`, building new views with
    /// `make`. Returns `true` when slots were added.
    ///
    /// The required capacity is only recomputed on first use or when the
    /// viewport got taller than the height the pool was last sized for;
    /// a shrinking viewport keeps the existing slots.
    pub fn ensure_capacity(
        &mut self,
        viewport_height: f32,
        min_item_height: f32,
        margin_rows: usize,
        mut make: impl FnMut() -> V,
    ) -> bool {
        if !self.slots.is_empty() && viewport_height <= self.built_for_height {
            return false;
        }
        let needed = Self::required_capacity(viewport_height, min_item_height, margin_rows);
        if needed == 0 {
            return false;
        }
        self.built_for_height = self.built_for_height.max(viewport_height);
        if needed <= self.slots.len() {
            return false;
        }
        let extra = needed - self.slots.len();
        self.slots.reserve(extra);
        for _ in 0..extra {
            self.slots.push(Slot {
                view: make(),
                row: None,
            });
        }
        true
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Viewport height the pool was last sized for.
    #[inline]
    pub fn built_for_height(&self) -> f32 {
        self.built_for_height
    }

    /// Map any signed buffer position onto `[0, capacity)`.
    #[inline]
    pub fn wrap(&self, index: isize) -> usize {
        let cap = self.slots.len();
        if cap == 0 {
            return 0;
        }
        index.rem_euclid(cap as isize) as usize
    }

    /// Slot at `id`.
    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&Slot<V>> {
        self.slots.get(id.0)
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot<V>> {
        self.slots.get_mut(id.0)
    }

    /// Iterate over every slot with its id.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Slot<V>)> + '_ {
        self.slots.iter().enumerate().map(|(i, s)| (SlotId(i), s))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slot<V>> + '_ {
        self.slots.iter_mut()
    }

    /// Number of slots currently bound to a row.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_formula() {
        assert_eq!(SlotPool::<()>::required_capacity(100.0, 20.0, 1), 7);
        assert_eq!(SlotPool::<()>::required_capacity(101.0, 20.0, 1), 8);
        assert_eq!(SlotPool::<()>::required_capacity(100.0, 20.0, 0), 5);
        assert_eq!(SlotPool::<()>::required_capacity(0.0, 20.0, 1), 0);
        assert_eq!(SlotPool::<()>::required_capacity(100.0, 0.0, 1), 0);
    }

    #[test]
    fn grows_only_when_viewport_grows() {
        let mut pool = SlotPool::new();
        let mut built = 0;
        assert!(pool.ensure_capacity(100.0, 20.0, 1, || {
            built += 1;
        }));
        assert_eq!(pool.capacity(), 7);
        assert_eq!(built, 7);

        // Same or smaller viewport: no rebuild.
        assert!(!pool.ensure_capacity(100.0, 20.0, 1, || built += 1));
        assert!(!pool.ensure_capacity(40.0, 20.0, 1, || built += 1));
        assert_eq!(pool.capacity(), 7);

        // Taller viewport adds only the missing slots.
        assert!(pool.ensure_capacity(200.0, 20.0, 1, || built += 1));
        assert_eq!(pool.capacity(), 12);
        assert_eq!(built, 12);
        assert_eq!(pool.built_for_height(), 200.0);
    }

    #[test]
    fn degenerate_viewport_builds_nothing() {
        let mut pool: SlotPool<u8> = SlotPool::new();
        assert!(!pool.ensure_capacity(0.0, 20.0, 1, || 0));
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.wrap(-3), 0);
    }

    #[test]
    fn unbounded_inputs_need_no_slots() {
        let capacity = SlotPool::<()>::required_capacity;
        assert_eq!(capacity(f32::INFINITY, 20.0, 1), 0);
        assert_eq!(capacity(f32::NAN, 20.0, 1), 0);
        assert_eq!(capacity(100.0, f32::INFINITY, 1), 0);
        assert_eq!(capacity(f32::MAX, 1e-30, 0), 0);
        assert_eq!(capacity(100.0, 20.0, usize::MAX / 2 + 1), 0);
        assert_eq!(capacity(100.0, 20.0, usize::MAX / 2), 0);
    }

    #[test]
    fn infinite_viewport_keeps_pool_sizing_intact() {
        let mut pool = SlotPool::new();
        pool.ensure_capacity(100.0, 20.0, 1, || ());
        assert!(!pool.ensure_capacity(f32::INFINITY, 20.0, 1, || ()));
        assert_eq!(pool.built_for_height(), 100.0);
        assert!(pool.ensure_capacity(200.0, 20.0, 1, || ()));
        assert_eq!(pool.capacity(), 12);
    }

    #[test]
    fn wrap_handles_negative_positions() {
        let mut pool = SlotPool::new();
        pool.ensure_capacity(100.0, 20.0, 1, || ());
        assert_eq!(pool.wrap(0), 0);
        assert_eq!(pool.wrap(7), 0);
        assert_eq!(pool.wrap(9), 2);
        assert_eq!(pool.wrap(-1), 6);
        assert_eq!(pool.wrap(-8), 6);
    }

    #[test]
    fn new_slots_start_inactive() {
        let mut pool = SlotPool::new();
        pool.ensure_capacity(60.0, 20.0, 0, || 'x');
        assert_eq!(pool.active_count(), 0);
        if let Some(slot) = pool.slot_mut(SlotId(1)) {
            slot.row = Some(4);
        }
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.get(SlotId(1)).and_then(|s| s.row), Some(4));
        assert!(pool.get(SlotId(3)).is_none());
    }
}
