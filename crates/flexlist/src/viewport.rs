#![forbid(unsafe_code)]

//! Scroll container contract and a headless implementation.
//!
//! Positions are normalized the way the host scroll container reports them:
//! `1.0` is scrolled to the top, `0.0` to the bottom.

use std::time::Duration;

use crate::mapper;

/// Velocity below which momentum stops.
const MIN_VELOCITY: f32 = 0.1;

/// Per-tick velocity multiplier while flinging.
const FRICTION: f32 = 0.95;

/// The scrollable viewport the engine drives.
///
/// Setters return whether the change fired the container's change
/// notification. The engine forwards a fired notification to its own
/// scroll handler while its re-entrancy guard is raised.
pub trait ScrollViewport {
    /// Visible height of the viewport.
    fn viewport_height(&self) -> f32;

    /// Current height of the content area.
    fn content_height(&self) -> f32;

    /// Resize the content area.
    fn set_content_height(&mut self, height: f32) -> bool;

    /// Current normalized position (`1` = top).
    fn normalized_position(&self) -> f32;

    /// Move to a normalized position (`1` = top).
    fn set_normalized_position(&mut self, position: f32) -> bool;

    /// Halt any in-flight momentum.
    fn stop_movement(&mut self) {}

    /// Pixel distance from the top of the content to the top of the viewport.
    fn scroll_offset(&self) -> f32 {
        mapper::offset_for_normalized(
            self.normalized_position(),
            self.viewport_height(),
            self.content_height(),
        )
    }
}

/// Headless scroll container.
///
/// Stores a pixel offset; the normalized position is derived from it. When
/// the content fits inside the viewport the position reads as `1` (top).
#[derive(Debug, Clone, PartialEq)]
pub struct SimViewport {
    viewport_height: f32,
    content_height: f32,
    offset: f32,
    velocity: f32,
    notifications: u64,
}

impl SimViewport {
    /// Viewport of the given visible height with empty content.
    #[must_use]
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            content_height: 0.0,
            offset: 0.0,
            velocity: 0.0,
            notifications: 0,
        }
    }

    /// Largest valid pixel offset.
    #[inline]
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Pixel offset from the top.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Current momentum velocity in pixels per second.
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Number of change notifications fired so far.
    #[inline]
    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    /// Change the visible height. The host must call
    /// [`RecyclingList::on_viewport_resized`](crate::RecyclingList::on_viewport_resized) afterwards.
    pub fn set_viewport_height(&mut self, height: f32) -> bool {
        self.viewport_height = height;
        self.move_to(self.offset)
    }

    /// Jump to a pixel offset, as a drag would. Returns whether the
    /// position changed.
    pub fn scroll_to_offset(&mut self, offset: f32) -> bool {
        self.move_to(offset)
    }

    /// Scroll by a pixel delta (positive = down).
    pub fn scroll_by(&mut self, delta: f32) -> bool {
        self.move_to(self.offset + delta)
    }

    /// Start momentum scroll.
    pub fn fling(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    /// Apply one momentum step. Returns whether the position changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.velocity.abs() <= MIN_VELOCITY {
            self.velocity = 0.0;
            return false;
        }
        let moved = self.scroll_by(self.velocity * dt.as_secs_f32());
        self.velocity *= FRICTION;
        if self.offset <= 0.0 || self.offset >= self.max_offset() {
            self.velocity = 0.0;
        }
        moved
    }

    fn move_to(&mut self, offset: f32) -> bool {
        let clamped = if offset.is_finite() {
            offset.clamp(0.0, self.max_offset())
        } else {
            self.offset.clamp(0.0, self.max_offset())
        };
        if (clamped - self.offset).abs() > f32::EPSILON {
            self.offset = clamped;
            self.notifications += 1;
            true
        } else {
            self.offset = clamped;
            false
        }
    }
}

impl ScrollViewport for SimViewport {
    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn content_height(&self) -> f32 {
        self.content_height
    }

    fn set_content_height(&mut self, height: f32) -> bool {
        self.content_height = height.max(0.0);
        self.move_to(self.offset)
    }

    fn normalized_position(&self) -> f32 {
        mapper::normalized_for_offset(self.offset, self.viewport_height, self.content_height)
    }

    fn set_normalized_position(&mut self, position: f32) -> bool {
        let offset =
            mapper::offset_for_normalized(position, self.viewport_height, self.content_height);
        self.move_to(offset)
    }

    fn stop_movement(&mut self) {
        self.velocity = 0.0;
    }

    fn scroll_offset(&self) -> f32 {
        self.offset
    }
}
