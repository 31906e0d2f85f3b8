//! Scroll offset re-projection.
//!
//! Translates a cumulative pixel offset into the position a synchronized
//! pane must jump to. Two index spaces are involved: column space counts
//! content columns only, item space counts what a pane actually holds,
//! where the reserved band (when configured) sits in front as item 0.

/// Where a pane should jump: item index plus a pixel nudge.
///
/// `offset_px` is the offset handed to the pane verbatim; mid-cell
/// positions carry a negative value so the item's leading edge sits
/// left of (or above) the pane edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    pub index: usize,
    pub offset_px: i32,
}

/// A horizontal offset resolved into column space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// Content column under the pane edge. Truncating arithmetic, so a
    /// negative axis can land here as zero with a negative `sub_offset`.
    pub column: i32,
    /// Pixels scrolled into that column.
    pub sub_offset: i32,
    /// Whether the reserved band was consumed ahead of the columns.
    pub band_consumed: bool,
}

impl Projection {
    /// The item-space position a pane jumps to: the band, when consumed,
    /// occupies one leading item. Indices below zero clamp to the first
    /// item.
    pub fn seat(&self) -> Seat {
        let index = self.column + i32::from(self.band_consumed);
        Seat {
            index: index.max(0) as usize,
            offset_px: -self.sub_offset,
        }
    }
}

/// Resolve a cumulative horizontal offset against uniform columns.
///
/// The reserved band is consumed first once the offset reaches its width;
/// what remains splits into whole columns and a sub-cell remainder. A
/// non-positive `cell_width` is treated as one pixel wide.
pub fn project_horizontal(axis: i32, cell_width: i32, band_width: i32, has_band: bool) -> Projection {
    let width = cell_width.max(1);
    let mut remaining = axis;
    let band_consumed = has_band && remaining >= band_width;
    if band_consumed {
        remaining -= band_width;
    }
    Projection {
        column: remaining / width,
        sub_offset: remaining % width,
        band_consumed,
    }
}

/// Resolve a cumulative vertical offset: rows stack in one pane, so the
/// seat is always the first item nudged up by the whole offset.
pub fn project_vertical(axis: i32) -> Seat {
    Seat {
        index: 0,
        offset_px: -axis,
    }
}
