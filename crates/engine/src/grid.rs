//! Rectangular cell grid and its stored JSON form.
//!
//! The grid serializes transparently as a nested array of cell objects, so
//! the text held in the store slot is exactly `serde_json::to_string(&grid)`.
//! Selection is session state: `from_stored` drops any selection flags it
//! finds, so a hand-edited store cannot smuggle a selection back in.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;

/// Default grid height.
pub const NUM_ROWS: usize = 8;
/// Default grid width.
pub const NUM_COLS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Blank grid of the given dimensions.
    pub fn blank(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![vec![Cell::new(); cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Iterate cells row-major with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, cell)| (r, c, cell))
        })
    }

    /// Blank the text and selection of every cell in place.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            for cell in row {
                cell.clear();
            }
        }
    }

    /// Drop every selection flag.
    pub fn deselect_all(&mut self) {
        for row in &mut self.rows {
            for cell in row {
                cell.selected = false;
            }
        }
    }

    /// Coordinates of every selected cell, row-major.
    pub fn selected_coords(&self) -> Vec<(usize, usize)> {
        self.iter()
            .filter(|(_, _, cell)| cell.selected)
            .map(|(r, c, _)| (r, c))
            .collect()
    }

    /// Parse stored sheet text.
    ///
    /// Returns `None` when the text is empty, unparsable, or ragged; any of
    /// those means "no stored data" and the caller falls back to a blank grid.
    pub fn from_stored(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        let mut grid: Grid = match serde_json::from_str(text) {
            Ok(grid) => grid,
            Err(err) => {
                log::warn!("discarding unparsable stored sheet: {}", err);
                return None;
            }
        };
        if grid.rows.is_empty() {
            return None;
        }
        let width = grid.rows[0].len();
        if width == 0 || grid.rows.iter().any(|row| row.len() != width) {
            log::warn!("discarding ragged stored sheet");
            return None;
        }
        grid.deselect_all();
        Some(grid)
    }

    /// Serialize to the stored text form.
    pub fn to_stored(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_grid_dimensions() {
        let grid = Grid::blank(NUM_ROWS, NUM_COLS);
        assert_eq!(grid.rows(), 8);
        assert_eq!(grid.cols(), 8);
        assert!(!grid.is_empty());
        assert!(grid.iter().all(|(_, _, cell)| cell.is_blank() && !cell.selected));
    }

    #[test]
    fn test_contains_bounds() {
        let grid = Grid::blank(2, 3);
        assert!(grid.contains(0, 0));
        assert!(grid.contains(1, 2));
        assert!(!grid.contains(2, 0));
        assert!(!grid.contains(0, 3));
    }

    #[test]
    fn test_stored_round_trip() {
        let mut grid = Grid::blank(2, 2);
        grid.get_mut(0, 1).unwrap().text = Some("41".to_string());
        grid.get_mut(1, 0).unwrap().text = Some("42".to_string());

        let text = grid.to_stored();
        let back = Grid::from_stored(&text).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_stored_form_is_nested_arrays() {
        let mut grid = Grid::blank(1, 2);
        grid.get_mut(0, 0).unwrap().text = Some("x".to_string());
        assert_eq!(
            grid.to_stored(),
            r#"[[{"text":"x","selected":false},{"selected":false}]]"#
        );
    }

    #[test]
    fn test_from_stored_rejects_garbage() {
        assert_eq!(Grid::from_stored(""), None);
        assert_eq!(Grid::from_stored("   "), None);
        assert_eq!(Grid::from_stored("not json"), None);
        assert_eq!(Grid::from_stored("[]"), None);
        assert_eq!(Grid::from_stored("[[]]"), None);
        // Ragged rows
        assert_eq!(Grid::from_stored(r#"[[{}, {}], [{}]]"#), None);
    }

    #[test]
    fn test_from_stored_strips_selection() {
        let text = r#"[[{"text":"a","selected":true},{"selected":true}]]"#;
        let grid = Grid::from_stored(text).unwrap();
        assert!(grid.selected_coords().is_empty());
        assert_eq!(grid.get(0, 0).unwrap().text.as_deref(), Some("a"));
    }

    #[test]
    fn test_clear_blanks_everything() {
        let mut grid = Grid::blank(2, 2);
        grid.get_mut(0, 0).unwrap().text = Some("keep".to_string());
        grid.get_mut(1, 1).unwrap().selected = true;

        grid.clear();
        assert!(grid.iter().all(|(_, _, cell)| cell.is_blank() && !cell.selected));
    }

    #[test]
    fn test_selected_coords_row_major() {
        let mut grid = Grid::blank(3, 3);
        grid.get_mut(2, 0).unwrap().selected = true;
        grid.get_mut(0, 1).unwrap().selected = true;
        assert_eq!(grid.selected_coords(), vec![(0, 1), (2, 0)]);
    }
}
