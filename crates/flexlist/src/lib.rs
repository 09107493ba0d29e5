#![forbid(unsafe_code)]

//! Recycling window engine for virtualized lists with variable row heights.
//!
//! A [`RecyclingList`] shows an arbitrarily long list through a small ring of
//! reusable item slots. It tracks every row's height and offset in a
//! [`HeightLedger`], keeps just enough slots to cover the viewport in a
//! [`SlotPool`], and on each scroll reassigns only the slots that crossed the
//! window edge.
//!
//! Rendering stays with the host: it implements [`FlexItem`] for its item
//! view and [`ScrollViewport`] for its scroll container, and installs a
//! populate callback that fills a slot with a row's content.
//!
//! ```
//! use flexlist::{FlexListConfig, PresizedItem, RecyclingList, SimViewport};
//!
//! let heights = vec![20.0_f32, 30.0, 20.0, 30.0];
//! let data = heights.clone();
//! let mut list = RecyclingList::new(
//!     FlexListConfig::default(),
//!     SimViewport::new(100.0),
//!     PresizedItem::new,
//! )
//! .unwrap()
//! .with_item_callback(move |item: &mut PresizedItem, row| item.show(row, data[row]));
//!
//! list.add_items(heights.iter());
//! assert_eq!(list.row_count(), 4);
//! assert_eq!(list.content_height(), 100.0 + 3.0 * 15.0);
//! assert!(list.row_item(0).is_some());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod item;
pub mod ledger;
pub mod mapper;
pub mod pool;
pub mod viewport;

pub use config::{FlexListConfig, Pivot};
pub use engine::{
    EngineStats, ListState, RecyclingList, ReorganizeKind, ReorganizeReport, Window, WindowUpdate,
};
pub use error::{FlexListError, Result};
pub use item::{FlexItem, ItemCallback, Placement, PresizedItem};
pub use ledger::{HeightLedger, RowMetrics};
pub use pool::{Slot, SlotId, SlotPool};
pub use viewport::{ScrollViewport, SimViewport};
