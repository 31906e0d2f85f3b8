//! The pane seam.
//!
//! A synchronized pane only ever receives direct jumps. Animated scrolls
//! would echo back through the host's scroll callbacks and re-trigger
//! accumulation, so the contract is jump-only.

use crate::projection::Seat;

/// One scrollable pane under coordinator control.
pub trait SyncedPane {
    /// Jump straight to `index`, nudged by `offset_px`. Never animate.
    fn seat(&mut self, index: usize, offset_px: i32);
}

impl Seat {
    /// Apply this seat to a pane.
    pub fn apply_to(&self, pane: &mut dyn SyncedPane) {
        pane.seat(self.index, self.offset_px);
    }
}

/// Pane that records every jump it is told to make. Tests and headless
/// front ends use it where a real scrollable pane would sit.
#[derive(Debug, Default)]
pub struct RecordingPane {
    seats: Vec<Seat>,
}

impl RecordingPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jumps applied so far, oldest first.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// The most recent jump, if any.
    pub fn last_seat(&self) -> Option<Seat> {
        self.seats.last().copied()
    }
}

impl SyncedPane for RecordingPane {
    fn seat(&mut self, index: usize, offset_px: i32) {
        self.seats.push(Seat { index, offset_px });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_applies_to_pane() {
        let mut pane = RecordingPane::new();
        Seat {
            index: 3,
            offset_px: -12,
        }
        .apply_to(&mut pane);

        assert_eq!(
            pane.last_seat(),
            Some(Seat {
                index: 3,
                offset_px: -12
            })
        );
        assert_eq!(pane.seats().len(), 1);
    }
}
