//! Keeping three panes in lock-step.
//!
//! `ViewportSync` owns the cumulative scroll offsets. Hosts feed it raw
//! scroll deltas from whichever pane the user dragged; it answers with the
//! jump to apply to the synchronized panes. Programmatic jumps echo back
//! through host scroll callbacks as zero deltas, and a zero delta returns
//! no update, so re-seating can never re-trigger accumulation and drift
//! the geometry.

use crate::geometry::PaneGeometry;
use crate::pane::SyncedPane;
use crate::projection::{project_horizontal, project_vertical, Seat};

/// Jump for the header pane and the content pane after a horizontal delta.
/// The host applies the same seat to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalUpdate {
    pub seat: Seat,
    /// Whether the separator between the fixed band and the scrollable
    /// content should be shown.
    pub divider_visible: bool,
}

impl HorizontalUpdate {
    /// Apply the jump to one horizontally synchronized pane.
    pub fn apply_to(&self, pane: &mut dyn SyncedPane) {
        self.seat.apply_to(pane);
    }
}

/// Jump for every visible nested row pane and the left label pane after a
/// vertical delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalUpdate {
    pub seat: Seat,
}

impl VerticalUpdate {
    /// Apply the jump to one vertically synchronized pane.
    pub fn apply_to(&self, pane: &mut dyn SyncedPane) {
        self.seat.apply_to(pane);
    }
}

/// Scroll state shared by the three panes.
#[derive(Debug, Clone)]
pub struct ViewportSync {
    geometry: PaneGeometry,
    has_band: bool,
    axis_x: i32,
    axis_y: i32,
    divider_height: i32,
    layout_probe_armed: bool,
}

impl ViewportSync {
    pub fn new(geometry: PaneGeometry) -> Self {
        Self {
            geometry,
            has_band: false,
            axis_x: 0,
            axis_y: 0,
            divider_height: 0,
            layout_probe_armed: true,
        }
    }

    /// Configure whether a reserved band precedes the content columns.
    pub fn set_has_band(&mut self, has_band: bool) {
        self.has_band = has_band;
    }

    pub fn has_band(&self) -> bool {
        self.has_band
    }

    pub fn geometry(&self) -> &PaneGeometry {
        &self.geometry
    }

    /// Cumulative horizontal offset.
    pub fn axis_x(&self) -> i32 {
        self.axis_x
    }

    /// Cumulative vertical offset.
    pub fn axis_y(&self) -> i32 {
        self.axis_y
    }

    /// A horizontal delta arrived from the content or header pane.
    ///
    /// Returns the jump for both horizontal panes, or `None` for the zero
    /// deltas echoed by programmatic jumps.
    pub fn on_content_scroll(&mut self, dx: i32) -> Option<HorizontalUpdate> {
        if dx == 0 {
            return None;
        }
        self.axis_x += dx;
        Some(HorizontalUpdate {
            seat: self.current_horizontal_seat(),
            divider_visible: self.divider_visible(),
        })
    }

    /// A vertical delta arrived from the left label pane or a nested row
    /// pane. Same zero-delta contract as the horizontal path.
    pub fn on_column_scroll(&mut self, dy: i32) -> Option<VerticalUpdate> {
        if dy == 0 {
            return None;
        }
        self.axis_y += dy;
        Some(VerticalUpdate {
            seat: self.current_vertical_seat(),
        })
    }

    /// Programmatic horizontal scroll, fed through the same path as a
    /// user drag.
    pub fn scroll_by(&mut self, dx: i32) -> Option<HorizontalUpdate> {
        self.on_content_scroll(dx)
    }

    /// Jump matching the current horizontal offset, for a pane that needs
    /// re-syncing outside a scroll callback.
    pub fn current_horizontal_seat(&self) -> Seat {
        project_horizontal(
            self.axis_x,
            self.geometry.cell_width,
            self.geometry.band_width,
            self.has_band,
        )
        .seat()
    }

    /// Jump matching the current vertical offset, for a row pane that
    /// becomes visible after the surface has already been scrolled.
    pub fn current_vertical_seat(&self) -> Seat {
        project_vertical(self.axis_y)
    }

    /// Divider rule: shown once the surface has scrolled past the band,
    /// or past zero when no band is configured.
    pub fn divider_visible(&self) -> bool {
        if self.has_band {
            self.axis_x > self.geometry.band_width
        } else {
            self.axis_x > 0
        }
    }

    /// Height the divider should take, fixed by the layout probe.
    pub fn divider_height(&self) -> i32 {
        self.divider_height
    }

    /// Layout probe: feed each measured container height until the probe
    /// disarms itself.
    ///
    /// Returns the height to apply to the divider, or `None` once
    /// disarmed. The probe stays armed while the measurement equals the
    /// stored height, so an initial zero measurement probes again on the
    /// next layout pass.
    pub fn on_layout(&mut self, measured_height: i32) -> Option<i32> {
        if !self.layout_probe_armed {
            return None;
        }
        if measured_height != self.divider_height {
            self.layout_probe_armed = false;
        }
        self.divider_height = measured_height;
        Some(measured_height)
    }
}

impl Default for ViewportSync {
    fn default() -> Self {
        Self::new(PaneGeometry::default())
    }
}
