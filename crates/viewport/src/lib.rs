//! `tripane-viewport` — Synchronized viewport coordination.
//!
//! Pure coordination crate: receives scroll deltas, returns the direct
//! jumps that keep the header, label, and content panes aligned. No UI
//! toolkit dependencies.

pub mod geometry;
pub mod pane;
pub mod projection;
pub mod sync;

pub use geometry::PaneGeometry;
pub use pane::SyncedPane;
pub use projection::{Projection, Seat};
pub use sync::ViewportSync;
