//! Header and row label generation.
//!
//! Labels are display-only, independent of grid contents, and regenerated
//! on every full (re)load. Column headers use Excel-style letters, row
//! labels are zero-based numbers.

/// Convert column index to Excel-style letters (0=A, 25=Z, 26=AA, 27=AB, ...)
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Column header labels for `count` columns: A, B, C, ...
pub fn header_labels(count: usize) -> Vec<String> {
    (0..count).map(col_to_letter).collect()
}

/// Row labels for `count` rows: "0", "1", "2", ...
pub fn row_labels(count: usize) -> Vec<String> {
    (0..count).map(|i| i.to_string()).collect()
}
