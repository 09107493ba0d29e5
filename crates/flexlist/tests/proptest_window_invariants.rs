//! Property-based invariant tests for the recycling window engine.
//!
//! These tests verify invariants that must hold for any row heights, viewport
//! size and sequence of operations:
//!
//! 1. Offsets chain: `top(i + 1) = top(i) + height(i) + padding`, and the
//!    content height equals the bottom of the last row.
//! 2. Every active slot shows the row its window position implies, and every
//!    in-range row of the window has exactly one active slot.
//! 3. Incremental shifting ends in the same layout as a full rebuild at the
//!    same scroll offset.
//! 4. A height change of `Δ` on row `k` leaves rows `..=k` in place and moves
//!    every later row and the content height by exactly `Δ`.
//! 5. The incremental first-visible scan agrees with binary search for
//!    arbitrary jump distances.
//! 6. `scroll_to_row(r)` materializes `r` with its center in the viewport.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use flexlist::{
    FlexListConfig, HeightLedger, ListState, Placement, PresizedItem, RecyclingList,
    ScrollViewport, SimViewport,
};
use proptest::prelude::*;

type List = RecyclingList<PresizedItem, SimViewport>;

const PADDING: f32 = 15.0;
const EPS: f32 = 1e-2;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Whole-number heights keep offset sums exact in f32.
fn heights(max_rows: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec((20u16..=90).prop_map(f32::from), 1..max_rows)
}

fn viewport_height() -> impl Strategy<Value = f32> {
    (60u16..=400).prop_map(f32::from)
}

#[derive(Debug, Clone)]
enum Op {
    ScrollTo(f32),
    ScrollBy(f32),
    ScrollToRow(usize),
    Fling(f32),
    Add(f32),
    Insert(usize, f32),
    Remove(usize),
    Update(usize, f32),
    Resize(f32),
    RefreshRange(usize, usize),
    Refresh,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u16..=6000).prop_map(|o| Op::ScrollTo(f32::from(o))),
        4 => (-300i16..=300).prop_map(|d| Op::ScrollBy(f32::from(d))),
        2 => (0usize..150).prop_map(Op::ScrollToRow),
        1 => (-2000i16..=2000).prop_map(|v| Op::Fling(f32::from(v))),
        2 => (20u16..=90).prop_map(|h| Op::Add(f32::from(h))),
        1 => (0usize..150, 20u16..=90).prop_map(|(r, h)| Op::Insert(r, f32::from(h))),
        2 => (0usize..150).prop_map(Op::Remove),
        2 => (0usize..150, 20u16..=90).prop_map(|(r, h)| Op::Update(r, f32::from(h))),
        1 => viewport_height().prop_map(Op::Resize),
        1 => (0usize..150, 1usize..5).prop_map(|(s, c)| Op::RefreshRange(s, c)),
        1 => Just(Op::Refresh),
        1 => Just(Op::Clear),
    ]
}

fn build(rows: &[f32], viewport: f32) -> (List, Rc<RefCell<Vec<f32>>>) {
    let data = Rc::new(RefCell::new(rows.to_vec()));
    let source = Rc::clone(&data);
    let mut list = RecyclingList::new(
        FlexListConfig::default().with_row_padding(PADDING),
        SimViewport::new(viewport),
        PresizedItem::new,
    )
    .unwrap()
    .with_item_callback(move |item: &mut PresizedItem, row| {
        let h = source.borrow().get(row).copied().unwrap_or(0.0);
        item.show(row, h);
    });
    list.add_items(rows.iter());
    (list, data)
}

fn apply(list: &mut List, data: &Rc<RefCell<Vec<f32>>>, op: &Op) {
    let len = list.row_count();
    match *op {
        Op::ScrollTo(offset) => {
            list.scroll_with(|vp| vp.scroll_to_offset(offset));
        }
        Op::ScrollBy(delta) => {
            list.scroll_with(|vp| vp.scroll_by(delta));
        }
        Op::ScrollToRow(row) => list.scroll_to_row(row),
        Op::Fling(velocity) => {
            list.viewport_mut().fling(velocity);
            for _ in 0..8 {
                list.scroll_with(|vp| vp.tick(std::time::Duration::from_millis(16)));
            }
        }
        Op::Add(h) => {
            data.borrow_mut().push(h);
            list.add_item(&h);
        }
        Op::Insert(row, h) => {
            let row = row.min(len);
            data.borrow_mut().insert(row, h);
            list.insert_item(row, &h).unwrap();
        }
        Op::Remove(row) => {
            if row < len {
                data.borrow_mut().remove(row);
                list.remove_at(row).unwrap();
            } else {
                assert!(list.remove_at(row).is_err());
            }
        }
        Op::Update(row, h) => {
            if row < len {
                data.borrow_mut()[row] = h;
                list.update_item(row, &h).unwrap();
            } else {
                assert!(list.update_item(row, &h).is_err());
            }
        }
        Op::Resize(height) => {
            list.viewport_mut().set_viewport_height(height);
            list.on_viewport_resized();
        }
        Op::RefreshRange(start, count) => {
            let result = list.refresh_range(start, count);
            assert_eq!(result.is_ok(), start + count <= len);
        }
        Op::Refresh => list.refresh(),
        Op::Clear => {
            data.borrow_mut().clear();
            list.clear();
        }
    }
}

fn check_offsets(ledger: &HeightLedger) -> Result<(), TestCaseError> {
    let rows: Vec<_> = ledger.iter().collect();
    if let Some(first) = rows.first() {
        prop_assert!(first.top.abs() < EPS, "top(0) = {}", first.top);
    }
    for (i, pair) in rows.windows(2).enumerate() {
        let expected = pair[0].top + pair[0].height + ledger.row_padding();
        prop_assert!(
            (pair[1].top - expected).abs() < EPS,
            "top({}) = {} expected {}",
            i + 1,
            pair[1].top,
            expected
        );
    }
    let expected_content = rows.last().map_or(0.0, |m| m.top + m.height);
    prop_assert!((ledger.content_height() - expected_content).abs() < EPS);
    Ok(())
}

fn check_window(list: &List) -> Result<(), TestCaseError> {
    let window = list.window();
    let len = list.row_count();
    for (id, slot) in list.slots() {
        if let Some(row) = slot.row {
            prop_assert!(slot.view.visible, "active slot {id:?} is hidden");
            prop_assert_eq!(window.row_for_slot(id), Some(row as isize));
            prop_assert!(row < len);
        } else {
            prop_assert!(!slot.view.visible, "inactive slot {id:?} is shown");
        }
    }
    for row in window.rows() {
        let Ok(row) = usize::try_from(row) else { continue };
        if row >= len {
            continue;
        }
        let holders = list.slots().filter(|(_, s)| s.row == Some(row)).count();
        prop_assert_eq!(holders, 1, "row {} held by {} slots", row, holders);
        prop_assert!(list.row_slot(row).is_some());
    }
    if list.state() == ListState::Populated {
        let expected = list.first_visible_row() as isize - list.config().margin_rows as isize;
        prop_assert_eq!(window.source_row_start, expected);
    }
    Ok(())
}

/// Row → placement for every active slot.
fn layout(list: &List) -> BTreeMap<usize, Placement> {
    list.slots()
        .filter_map(|(_, s)| Some((s.row?, s.view.placement?)))
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Offsets chain through any mutation sequence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offsets_chain_after_mutations(
        rows in heights(80),
        vp in viewport_height(),
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let (mut list, data) = build(&rows, vp);
        check_offsets(list.ledger())?;
        for op in &ops {
            apply(&mut list, &data, op);
            check_offsets(list.ledger())?;
            prop_assert!(
                (list.viewport().content_height() - list.content_height()).abs() < EPS,
                "viewport content out of sync after {:?}", op
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Window correctness after any operation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn window_maps_every_slot_correctly(
        rows in heights(120),
        vp in viewport_height(),
        ops in prop::collection::vec(op(), 1..60),
    ) {
        let (mut list, data) = build(&rows, vp);
        check_window(&list)?;
        for op in &ops {
            apply(&mut list, &data, op);
            check_window(&list)?;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Incremental shifting ≡ full rebuild
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn incremental_matches_full_rebuild(
        rows in heights(150),
        vp in viewport_height(),
        moves in prop::collection::vec(-400i16..=400, 1..50),
    ) {
        let (mut incremental, _) = build(&rows, vp);
        for delta in &moves {
            incremental.scroll_with(|v| v.scroll_by(f32::from(*delta)));
        }
        let offset = incremental.viewport().offset();

        let (mut full, _) = build(&rows, vp);
        full.viewport_mut().scroll_to_offset(offset);
        full.refresh_range(0, 1).unwrap();

        prop_assert_eq!(incremental.first_visible_row(), full.first_visible_row());
        prop_assert_eq!(
            incremental.window().source_row_start,
            full.window().source_row_start
        );
        prop_assert_eq!(layout(&incremental), layout(&full));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Height-change propagation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn height_change_shifts_only_later_rows(
        rows in heights(100),
        vp in viewport_height(),
        pick in any::<prop::sample::Index>(),
        new_height in (20u16..=90).prop_map(f32::from),
    ) {
        let (mut list, _) = build(&rows, vp);
        let k = pick.index(rows.len());
        let before: Vec<f32> = list.ledger().iter().map(|m| m.top).collect();
        let content_before = list.content_height();
        let delta = new_height - list.height_at(k).unwrap();
        let window_before = list.window();

        let changed = list.update_item(k, &new_height).unwrap();
        prop_assert_eq!(changed, delta.abs() > 0.01);
        prop_assert_eq!(list.window(), window_before);

        let after: Vec<f32> = list.ledger().iter().map(|m| m.top).collect();
        for i in 0..=k {
            prop_assert!((after[i] - before[i]).abs() < EPS);
        }
        for i in k + 1..after.len() {
            prop_assert!((after[i] - before[i] - delta).abs() < EPS);
        }
        prop_assert!((list.content_height() - content_before - delta).abs() < EPS);

        // Materialized rows follow their new offsets.
        for (row, placement) in layout(&list) {
            prop_assert!((placement.top - after[row]).abs() < EPS);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Scan agrees with binary search for arbitrary jumps
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scan_agrees_with_binary_search(
        rows in heights(300),
        offsets in prop::collection::vec(-100i32..=30_000, 1..40),
    ) {
        let mut ledger = HeightLedger::new(PADDING);
        for h in &rows {
            ledger.push(*h);
        }
        let mut hint = 0;
        for offset in offsets {
            let offset = offset as f32;
            let scanned = ledger.first_visible_from(hint, offset);
            prop_assert_eq!(Some(scanned), ledger.row_at_offset(offset));
            // Every earlier row is fully scrolled past.
            if scanned > 0 {
                prop_assert!(ledger.bottom_offset(scanned - 1).unwrap() <= offset);
            }
            hint = scanned;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. scroll_to_row brings the row into view
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scroll_to_row_shows_row(
        rows in heights(150),
        vp in viewport_height(),
        start in 0u16..=5000,
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut list, _) = build(&rows, vp);
        list.scroll_with(|v| v.scroll_to_offset(f32::from(start)));
        let r = pick.index(rows.len());
        list.scroll_to_row(r);

        prop_assert!(list.row_slot(r).is_some(), "row {} not materialized", r);

        let m = list.ledger().metrics(r).unwrap();
        let center = m.top + m.height / 2.0;
        let offset = list.viewport().scroll_offset();
        prop_assert!(
            center >= offset - EPS && center <= offset + vp + EPS,
            "center {} outside [{}, {}]", center, offset, offset + vp
        );

        let position = list.viewport().normalized_position();
        prop_assert!((0.0..=1.0).contains(&position));
        check_window(&list)?;
    }
}
