#![forbid(unsafe_code)]

//! Row index ↔ normalized scroll position.
//!
//! Normalized positions follow the host convention: `1` is the top of the
//! content, `0` the bottom. Whenever the content fits in the viewport there
//! is nothing to scroll and every row maps to `1`.

use crate::ledger::HeightLedger;

/// `(value - a) / (b - a)` clamped to `[0, 1]`; `0` when `a == b`.
#[inline]
fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Normalized position that brings the center of `row` into view.
///
/// The row index is clamped into range. The viewport top is placed so the
/// row's center sits mid-viewport, then pulled back so it never scrolls
/// above the content top or below the content bottom.
pub fn normalized_position_for_row(
    row: usize,
    ledger: &HeightLedger,
    viewport_height: f32,
    content_height: f32,
) -> f32 {
    if ledger.is_empty() || content_height <= viewport_height {
        return 1.0;
    }
    let row = row.min(ledger.len() - 1);
    let Some(metrics) = ledger.metrics(row) else {
        return 1.0;
    };
    let center = metrics.top + metrics.height / 2.0;
    let max_offset = content_height - viewport_height;
    let viewport_top = (center - viewport_height / 2.0).clamp(0.0, max_offset);
    inverse_lerp(max_offset, 0.0, viewport_top)
}

/// Pixel offset for a normalized position.
pub fn offset_for_normalized(position: f32, viewport_height: f32, content_height: f32) -> f32 {
    let max_offset = (content_height - viewport_height).max(0.0);
    (1.0 - position.clamp(0.0, 1.0)) * max_offset
}

/// Normalized position for a pixel offset.
pub fn normalized_for_offset(offset: f32, viewport_height: f32, content_height: f32) -> f32 {
    let max_offset = content_height - viewport_height;
    if max_offset.is_nan() || max_offset <= f32::EPSILON {
        return 1.0;
    }
    inverse_lerp(max_offset, 0.0, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating(rows: usize) -> HeightLedger {
        let mut ledger = HeightLedger::new(15.0);
        for i in 0..rows {
            ledger.push(if i % 2 == 0 { 20.0 } else { 30.0 });
        }
        ledger
    }

    #[test]
    fn empty_or_short_content_is_top() {
        let empty = HeightLedger::new(15.0);
        assert_eq!(normalized_position_for_row(3, &empty, 100.0, 0.0), 1.0);

        let short = alternating(2);
        let content = short.content_height();
        assert!(content <= 100.0);
        assert_eq!(normalized_position_for_row(1, &short, 100.0, content), 1.0);
    }

    #[test]
    fn first_row_is_top_last_row_is_bottom() {
        let ledger = alternating(50);
        let content = ledger.content_height();
        assert_eq!(normalized_position_for_row(0, &ledger, 100.0, content), 1.0);
        assert_eq!(normalized_position_for_row(49, &ledger, 100.0, content), 0.0);
        // Out-of-range rows clamp to the last one.
        assert_eq!(normalized_position_for_row(500, &ledger, 100.0, content), 0.0);
    }

    #[test]
    fn middle_row_is_centered() {
        let ledger = alternating(50);
        let content = ledger.content_height();
        let pos = normalized_position_for_row(20, &ledger, 100.0, content);
        let offset = offset_for_normalized(pos, 100.0, content);
        let m = ledger.metrics(20).unwrap();
        let center = m.top + m.height / 2.0;
        assert!((offset + 50.0 - center).abs() < 1e-2, "offset {offset}");
    }

    #[test]
    fn offset_and_position_agree() {
        assert_eq!(offset_for_normalized(1.0, 100.0, 300.0), 0.0);
        assert_eq!(offset_for_normalized(0.0, 100.0, 300.0), 200.0);
        assert_eq!(normalized_for_offset(200.0, 100.0, 300.0), 0.0);
        assert_eq!(normalized_for_offset(50.0, 100.0, 80.0), 1.0);
        assert!((normalized_for_offset(50.0, 100.0, 300.0) - 0.75).abs() < 1e-6);
    }
}
