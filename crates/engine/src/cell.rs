use serde::{Deserialize, Serialize};

/// A single editable grid slot.
///
/// The persisted form omits `text` when the cell is blank and carries
/// `selected` explicitly, matching the nested-array wire format the
/// store holds. Selection is session state: the controller strips it
/// before the grid is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Entered text; `None` for a blank cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Session-only selection highlight.
    #[serde(default)]
    pub selected: bool,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank the cell: no text, not selected.
    pub fn clear(&mut self) {
        self.text = None;
        self.selected = false;
    }

    /// Replace the cell text. Empty strings are kept as entered text;
    /// only `None` means blank.
    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    /// True when the cell holds no text.
    pub fn is_blank(&self) -> bool {
        self.text.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cell_is_blank_and_deselected() {
        let cell = Cell::new();
        assert!(cell.is_blank());
        assert!(!cell.selected);
    }

    #[test]
    fn test_blank_cell_serializes_without_text_field() {
        let cell = Cell::new();
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"selected":false}"#);
    }

    #[test]
    fn test_text_cell_serializes_with_text_field() {
        let cell = Cell {
            text: Some("42".to_string()),
            selected: false,
        };
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"text":"42","selected":false}"#);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let cell: Cell = serde_json::from_str("{}").unwrap();
        assert!(cell.is_blank());
        assert!(!cell.selected);
    }

    #[test]
    fn test_clear_resets_text_and_selection() {
        let mut cell = Cell {
            text: Some("hello".to_string()),
            selected: true,
        };
        cell.clear();
        assert!(cell.is_blank());
        assert!(!cell.selected);
    }

    #[test]
    fn test_empty_string_text_is_not_blank() {
        let mut cell = Cell::new();
        cell.set_text(Some(String::new()));
        assert!(!cell.is_blank());
    }
}
