#![forbid(unsafe_code)]

//! Headless panel: owns the row data, wires the populate callback and turns
//! script steps into list operations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use flexlist::{
    EngineStats, FlexItem, FlexListConfig, FlexListError, Pivot, RecyclingList, ScrollViewport,
    SimViewport, Window,
};
use serde::Serialize;

use crate::cli::Opts;
use crate::text_item::TextRow;

/// Height of one wrapped title line; also the template row height.
pub const LINE_HEIGHT: f32 = 20.0;

/// Momentum frame length.
const FRAME: Duration = Duration::from_millis(16);

/// Upper bound on momentum frames per fling.
const MAX_FLING_FRAMES: usize = 600;

/// Titles rows are drawn from.
pub const TITLES: [&str; 4] = [
    "Hello World ",
    "Lorem ipsum dolor sit amet, \nconsectetur adipiscing elit, ",
    "sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \nUt enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. \n",
    "Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. \nExcepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.\n",
];

// ============================================================================
// Data
// ============================================================================

/// One row of panel data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowData {
    /// Wrapped text that decides the row height.
    pub title: String,
    /// Short label, `Row N` at creation time.
    pub label: String,
    /// Random note.
    pub note: String,
}

/// Simple LCG PRNG for deterministic titles.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() >> 33) % bound
    }

    fn title(&mut self) -> &'static str {
        TITLES[self.next_below(TITLES.len() as u64) as usize]
    }
}

// ============================================================================
// Script steps
// ============================================================================

/// One scripted panel action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Append random rows.
    Add(usize),
    /// Remove the last row.
    Delete,
    /// Scroll a row into view.
    Jump(usize),
    /// New titles for a range of rows, then refresh it.
    Refresh {
        /// First row.
        start: usize,
        /// Number of rows.
        count: usize,
    },
    /// Back to the top, every slot repopulated.
    RefreshAll,
    /// Scroll by a pixel delta.
    Scroll(f32),
    /// Fling and let momentum settle.
    Fling(f32),
    /// Change the viewport height.
    Resize(f32),
    /// Remove every row.
    Clear,
}

fn step_arg<T: FromStr>(step: &str, arg: Option<&str>) -> Result<T, String> {
    let arg = arg.ok_or_else(|| format!("step `{step}` needs an argument"))?;
    arg.trim()
        .parse()
        .map_err(|_| format!("bad argument in step `{step}`: {arg}"))
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.splitn(3, ':');
        let name = parts.next().unwrap_or_default();
        let first = parts.next();
        let second = parts.next();
        match name {
            "add" => Ok(Self::Add(match first {
                Some(_) => step_arg(s, first)?,
                None => 1,
            })),
            "delete" => Ok(Self::Delete),
            "jump" => Ok(Self::Jump(step_arg(s, first)?)),
            "refresh" => Ok(Self::Refresh {
                start: step_arg(s, first)?,
                count: match second {
                    Some(_) => step_arg(s, second)?,
                    None => 1,
                },
            }),
            "refresh-all" => Ok(Self::RefreshAll),
            "scroll" => Ok(Self::Scroll(step_arg(s, first)?)),
            "fling" => Ok(Self::Fling(step_arg(s, first)?)),
            "resize" => Ok(Self::Resize(step_arg(s, first)?)),
            "clear" => Ok(Self::Clear),
            _ => Err(format!("unknown step `{s}`")),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(n) => write!(f, "add:{n}"),
            Self::Delete => write!(f, "delete"),
            Self::Jump(row) => write!(f, "jump:{row}"),
            Self::Refresh { start, count } => write!(f, "refresh:{start}:{count}"),
            Self::RefreshAll => write!(f, "refresh-all"),
            Self::Scroll(dy) => write!(f, "scroll:{dy}"),
            Self::Fling(v) => write!(f, "fling:{v}"),
            Self::Resize(h) => write!(f, "resize:{h}"),
            Self::Clear => write!(f, "clear"),
        }
    }
}

/// Split a comma- or semicolon-separated script into steps.
pub fn parse_script(script: &str) -> Result<Vec<Step>, String> {
    script
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Step::from_str)
        .collect()
}

// ============================================================================
// Snapshots
// ============================================================================

/// One materialized slot as shown in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    /// Slot index in the pool.
    pub slot: usize,
    /// Row shown.
    pub row: usize,
    /// Top offset of the row.
    pub top: f32,
    /// Row height.
    pub height: f32,
    /// Anchored y.
    pub y: f32,
    /// Wrapped title lines.
    pub lines: usize,
    /// Row label.
    pub label: String,
    /// First title line, shortened.
    pub preview: String,
}

/// Engine state after a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Step that produced this snapshot.
    pub step: String,
    /// Error reported by the step, if any.
    pub error: Option<String>,
    /// Row count.
    pub rows: usize,
    /// Content extent.
    pub content_height: f32,
    /// Viewport height.
    pub viewport_height: f32,
    /// Pixel offset from the top.
    pub offset: f32,
    /// Normalized position (`1` = top).
    pub position: f32,
    /// First visible row.
    pub first_visible_row: usize,
    /// Slot pool capacity.
    pub capacity: usize,
    /// Window after the step.
    pub window: Window,
    /// Active slots ordered by row.
    pub slots: Vec<SlotView>,
    /// Engine counters.
    pub stats: EngineStats,
}

const PREVIEW_CHARS: usize = 36;

fn preview(title: &str) -> String {
    let line = title.lines().next().unwrap_or_default().trim_end();
    let mut out: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}

impl Snapshot {
    /// Plain-text rendering: a summary line, then one line per slot.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "== {} ==  rows={} content={:.1} viewport={:.1} offset={:.1} pos={:.3} first={} window=[{}..{}) buffer={} cap={}\n",
            self.step,
            self.rows,
            self.content_height,
            self.viewport_height,
            self.offset,
            self.position,
            self.first_visible_row,
            self.window.source_row_start,
            self.window.rows().end,
            self.window.buffer_start,
            self.capacity,
        );
        if let Some(err) = &self.error {
            out.push_str(&format!("   error: {err}\n"));
        }
        for s in &self.slots {
            out.push_str(&format!(
                "   slot {:>2}  row {:>4}  top {:>8.1}  h {:>5.1}  {:<8} {}\n",
                s.slot, s.row, s.top, s.height, s.label, s.preview
            ));
        }
        out
    }
}

// ============================================================================
// Panel
// ============================================================================

/// Data set plus list, driven step by step.
pub struct FlexPanel {
    list: RecyclingList<TextRow, SimViewport>,
    data: Rc<RefCell<Vec<RowData>>>,
    rng: SeededRng,
}

impl FlexPanel {
    /// Build an empty panel from the demo options.
    pub fn new(opts: &Opts) -> flexlist::Result<Self> {
        let config = FlexListConfig::default()
            .with_row_padding(opts.padding)
            .with_min_item_height(LINE_HEIGHT)
            .with_item_width(opts.wrap as f32)
            .with_pivot(Pivot::TOP_LEFT);
        let wrap = opts.wrap;
        let data: Rc<RefCell<Vec<RowData>>> = Rc::new(RefCell::new(Vec::new()));
        let source = Rc::clone(&data);
        let min_height = config.min_item_height;

        let list = RecyclingList::new(config, SimViewport::new(opts.viewport), move || {
            TextRow::new(wrap, LINE_HEIGHT)
        })?
        .with_item_callback(move |item: &mut TextRow, row| {
            let data = source.borrow();
            let Some(d) = data.get(row) else {
                return;
            };
            let height = item.measure_height(&d.title).max(min_height);
            item.bind(row, &d.title, &d.label, &d.note, height);
        });

        Ok(Self {
            list,
            data,
            rng: SeededRng::new(opts.seed),
        })
    }

    /// Replace everything with `rows` random rows and return to the top.
    pub fn initialize(&mut self, rows: usize) {
        self.clear();
        self.add(rows);
        self.list.refresh();
    }

    fn random_row(&mut self, index: usize) -> RowData {
        RowData {
            title: self.rng.title().to_string(),
            label: format!("Row {index}"),
            note: self.rng.next_below(256).to_string(),
        }
    }

    /// Append `count` random rows in one batch.
    pub fn add(&mut self, count: usize) {
        let base = self.list.row_count();
        let rows: Vec<RowData> = (0..count).map(|i| self.random_row(base + i)).collect();
        self.data.borrow_mut().extend(rows.iter().cloned());
        self.list.add_items(rows.iter().map(|r| r.title.as_str()));
    }

    /// Remove the last row. Returns whether there was one.
    pub fn delete_last(&mut self) -> flexlist::Result<bool> {
        let Some(last) = self.list.row_count().checked_sub(1) else {
            return Ok(false);
        };
        self.list.remove_at(last)?;
        self.data.borrow_mut().truncate(last);
        Ok(true)
    }

    /// Scroll `row` into view.
    pub fn jump_to(&mut self, row: usize) {
        self.list.scroll_to_row(row);
    }

    /// Give `count` rows from `start` new random titles, re-measure them and
    /// refresh the range. Nothing changes when the range is invalid.
    pub fn refresh_rows(&mut self, start: usize, count: usize) -> flexlist::Result<()> {
        let len = self.list.row_count();
        if count == 0 || start.checked_add(count).is_none_or(|end| end > len) {
            return Err(FlexListError::InvalidRange { start, count, len });
        }
        for row in start..start + count {
            let title = self.rng.title();
            if let Some(d) = self.data.borrow_mut().get_mut(row) {
                d.title = title.to_string();
            }
            self.list.update_item(row, title)?;
        }
        self.list.refresh_range(start, count)
    }

    /// Return to the top and repopulate every slot.
    pub fn refresh_all(&mut self) {
        self.list.refresh();
    }

    /// Scroll by a pixel delta.
    pub fn scroll(&mut self, dy: f32) -> bool {
        self.list.scroll_with(|vp| vp.scroll_by(dy))
    }

    /// Fling and run momentum frames until it stops. Returns the frame count.
    pub fn fling(&mut self, velocity: f32) -> usize {
        self.list.viewport_mut().fling(velocity);
        let mut frames = 0;
        while frames < MAX_FLING_FRAMES && self.list.viewport().velocity() != 0.0 {
            self.list.scroll_with(|vp| vp.tick(FRAME));
            frames += 1;
        }
        frames
    }

    /// Change the viewport height.
    pub fn resize(&mut self, height: f32) {
        self.list.viewport_mut().set_viewport_height(height);
        self.list.on_viewport_resized();
    }

    /// Remove every row.
    pub fn clear(&mut self) {
        self.list.clear();
        self.data.borrow_mut().clear();
    }

    /// Apply one script step.
    pub fn apply(&mut self, step: &Step) -> flexlist::Result<()> {
        tracing::info!(%step, rows = self.list.row_count(), "applying step");
        match *step {
            Step::Add(n) => self.add(n),
            Step::Delete => {
                self.delete_last()?;
            }
            Step::Jump(row) => self.jump_to(row),
            Step::Refresh { start, count } => self.refresh_rows(start, count)?,
            Step::RefreshAll => self.refresh_all(),
            Step::Scroll(dy) => {
                self.scroll(dy);
            }
            Step::Fling(v) => {
                let frames = self.fling(v);
                tracing::debug!(frames, "fling settled");
            }
            Step::Resize(h) => self.resize(h),
            Step::Clear => self.clear(),
        }
        Ok(())
    }

    /// The list.
    pub fn list(&self) -> &RecyclingList<TextRow, SimViewport> {
        &self.list
    }

    /// Copy of the row data.
    pub fn rows(&self) -> Vec<RowData> {
        self.data.borrow().clone()
    }

    /// Capture the current state.
    pub fn snapshot(&self, step: &str, error: Option<String>) -> Snapshot {
        let list = &self.list;
        let mut slots: Vec<SlotView> = list
            .slots()
            .filter_map(|(id, slot)| {
                let row = slot.row?;
                let placement = slot.view.placement?;
                Some(SlotView {
                    slot: id.0,
                    row,
                    top: placement.top,
                    height: placement.height,
                    y: placement.y,
                    lines: slot.view.lines(),
                    label: slot.view.label.clone(),
                    preview: preview(&slot.view.title),
                })
            })
            .collect();
        slots.sort_by_key(|s| s.row);

        let viewport = list.viewport();
        Snapshot {
            step: step.to_string(),
            error,
            rows: list.row_count(),
            content_height: list.content_height(),
            viewport_height: viewport.viewport_height(),
            offset: viewport.offset(),
            position: viewport.normalized_position(),
            first_visible_row: list.first_visible_row(),
            capacity: list.pool().capacity(),
            window: list.window(),
            slots,
            stats: list.stats(),
        }
    }
}
