//! Pane geometry shared by the three synchronized panes.
//!
//! Hosts may hand a partially specified theme JSON object to
//! `serde_json::from_str`; whatever a theme leaves out falls back to the
//! stock sizes.

use serde::{Deserialize, Serialize};

/// Stock size for the three pane dimensions, in logical pixels.
pub const DEFAULT_LENGTH: i32 = 56;
/// Stock width of the reserved band before real columns begin.
pub const RESERVED_BAND_WIDTH: i32 = 30;

/// Fixed sizes the panes agree on. Uniform cell width is what makes
/// horizontal re-projection pure arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneGeometry {
    /// Width of the left label pane.
    pub column_label_width: i32,
    /// Height of the top header pane.
    pub header_height: i32,
    /// Uniform width of one content cell.
    pub cell_width: i32,
    /// Width of the reserved corner/loading band.
    pub band_width: i32,
}

impl Default for PaneGeometry {
    fn default() -> Self {
        Self {
            column_label_width: DEFAULT_LENGTH,
            header_height: DEFAULT_LENGTH,
            cell_width: DEFAULT_LENGTH,
            band_width: RESERVED_BAND_WIDTH,
        }
    }
}
