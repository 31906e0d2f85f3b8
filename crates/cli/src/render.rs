//! Terminal rendering for sheet snapshots and scroll updates.

use tripane_engine::cell::Cell;
use tripane_engine::controller::SheetSnapshot;
use tripane_viewport::projection::Seat;
use tripane_viewport::sync::{HorizontalUpdate, VerticalUpdate};

/// Column width bounds in display characters.
const MIN_COL_WIDTH: usize = 3;
const MAX_COL_WIDTH: usize = 16;

/// Truncate a string to fit within `width` chars, adding ".." if truncated.
/// Handles UTF-8 safely by walking char boundaries.
fn truncate_display(s: &str, width: usize) -> String {
    if width < 3 {
        return s.chars().next().map(|c| c.to_string()).unwrap_or_default();
    }
    if s.chars().count() <= width {
        return s.to_string();
    }
    let truncated: String = s.chars().take(width - 2).collect();
    format!("{}..", truncated)
}

/// Pad or truncate a string to exactly `width` chars.
/// If shorter, right-pads with spaces. If longer, truncates with "..".
fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

/// Cell text with its selection marker. The selected cell renders in
/// brackets so `select` output is visible on a plain terminal.
fn cell_display(cell: &Cell) -> String {
    let text = cell.text.as_deref().unwrap_or("");
    if cell.selected {
        format!("[{}]", text)
    } else {
        text.to_string()
    }
}

/// Render a snapshot as an aligned table: header labels across the top,
/// row labels down the left edge, one column per grid column.
pub fn render_sheet(snapshot: &SheetSnapshot) -> String {
    let grid = &snapshot.grid;

    // Per-column width: widest of the header label and every cell below it,
    // clamped so one long entry cannot blow out the whole table.
    let col_widths: Vec<usize> = (0..grid.cols())
        .map(|c| {
            let header = snapshot
                .header_labels
                .get(c)
                .map_or(0, |label| label.chars().count());
            let widest_cell = (0..grid.rows())
                .filter_map(|r| grid.get(r, c))
                .map(|cell| cell_display(cell).chars().count())
                .max()
                .unwrap_or(0);
            header.max(widest_cell).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
        })
        .collect();

    let gutter = snapshot
        .row_labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(1);

    let mut out = String::new();

    // Header labels
    let mut line = " ".repeat(gutter);
    for (c, width) in col_widths.iter().enumerate() {
        let label = snapshot.header_labels.get(c).map_or("", String::as_str);
        line.push_str("  ");
        line.push_str(&pad_right(label, *width));
    }
    out.push_str(line.trim_end());
    out.push('\n');

    // Separator
    let total = gutter + col_widths.iter().map(|w| w + 2).sum::<usize>();
    out.push_str(&"\u{2500}".repeat(total));
    out.push('\n');

    // Rows
    for r in 0..grid.rows() {
        let label = snapshot.row_labels.get(r).map_or("", String::as_str);
        let mut line = format!("{:>gutter$}", label, gutter = gutter);
        for (c, width) in col_widths.iter().enumerate() {
            let display = grid.get(r, c).map(cell_display).unwrap_or_default();
            line.push_str("  ");
            line.push_str(&pad_right(&display, *width));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// One-line trace of a horizontal scroll update.
pub fn describe_horizontal(update: &HorizontalUpdate) -> String {
    format!(
        "seat item {} offset {}, divider {}",
        update.seat.index,
        update.seat.offset_px,
        if update.divider_visible {
            "shown"
        } else {
            "hidden"
        }
    )
}

/// One-line trace of a vertical scroll update.
pub fn describe_vertical(update: &VerticalUpdate) -> String {
    format!(
        "seat item {} offset {}",
        update.seat.index, update.seat.offset_px
    )
}

/// Where a pane ended up, for the scroll summary.
pub fn describe_seat(seat: Option<Seat>) -> String {
    match seat {
        Some(seat) => format!("item {} offset {}", seat.index, seat.offset_px),
        None => "item 0 offset 0 (never moved)".to_string(),
    }
}
