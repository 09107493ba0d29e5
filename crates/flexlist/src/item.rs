#![forbid(unsafe_code)]

//! Item-side collaborator contract.
//!
//! The engine never renders. It asks a [`FlexItem`] how tall a piece of
//! content would be, hands slots to a populate callback, and reports where
//! each slot belongs through [`Placement`].

use crate::config::{FlexListConfig, Pivot};

// ============================================================================
// FlexItem
// ============================================================================

/// Capability interface for a poolable view item.
///
/// One instance doubles as the engine's height calculator: it is never shown,
/// only asked to measure content before a row is appended or updated.
pub trait FlexItem {
    /// Data the item knows how to measure.
    type Content: ?Sized;

    /// Height this item would need to display `content`.
    ///
    /// Called synchronously; long-running work here blocks the whole pass.
    fn measure_height(&mut self, content: &Self::Content) -> f32;

    /// Height of whatever the item currently shows.
    fn current_height(&self) -> f32;

    /// Move the item to its row's anchored position.
    fn place(&mut self, placement: Placement) {
        let _ = placement;
    }

    /// Show or hide the item.
    fn set_visible(&mut self, visible: bool) {
        let _ = visible;
    }
}

/// Populate callback: fill `view` with the content of `row`.
pub type ItemCallback<V> = Box<dyn FnMut(&mut V, usize)>;

// ============================================================================
// Placement
// ============================================================================

/// Where a populated slot belongs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Row shown by the slot.
    pub row: usize,
    /// Top offset of the row inside the content area.
    pub top: f32,
    /// Ledger height of the row.
    pub height: f32,
    /// Anchored x in the host's convention.
    pub x: f32,
    /// Anchored y in the host's convention (negative downward).
    pub y: f32,
}

impl Placement {
    /// Translate a row's top offset into an anchored position.
    ///
    /// The vertical anchor uses the template height, not the row's measured
    /// height, so a pivot other than top-left lands relative to the template.
    #[must_use]
    pub fn for_row(row: usize, top: f32, height: f32, config: &FlexListConfig) -> Self {
        let Pivot { x: px, y: py } = config.pivot;
        Self {
            row,
            top,
            height,
            x: px * config.item_width,
            y: -(top + (1.0 - py) * config.min_item_height),
        }
    }
}

// ============================================================================
// PresizedItem
// ============================================================================

/// A [`FlexItem`] whose content is its own height.
///
/// Suits hosts that know row heights up front. Records what the engine did
/// to it so the result can be inspected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresizedItem {
    /// Height of the current content.
    pub height: f32,
    /// Row last written by the populate callback.
    pub row: Option<usize>,
    /// Last placement received.
    pub placement: Option<Placement>,
    /// Visibility as last set by the engine.
    pub visible: bool,
}

impl PresizedItem {
    /// Hidden item with no content.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill with a row of the given height.
    pub fn show(&mut self, row: usize, height: f32) {
        self.row = Some(row);
        self.height = height;
    }
}

impl FlexItem for PresizedItem {
    type Content = f32;

    fn measure_height(&mut self, content: &f32) -> f32 {
        *content
    }

    fn current_height(&self) -> f32 {
        self.height
    }

    fn place(&mut self, placement: Placement) {
        self.placement = Some(placement);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
