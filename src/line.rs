//! Terminal line representation
//!
//! A line is a row of cells plus the `continued` flag that records
//! whether the row was produced by soft-wrapping. The flag drives
//! rewrap on resize.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellAttributes};

/// A single line in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Cells in this line
    cells: Vec<Cell>,
    /// Whether this line is the soft-wrapped continuation of the previous one
    pub continued: bool,
}

impl Line {
    /// Create a new blank line with the specified number of columns
    pub fn new(columns: usize) -> Self {
        Self {
            cells: vec![Cell::new(); columns],
            continued: false,
        }
    }

    /// Get the number of columns
    pub fn columns(&self) -> usize {
        self.cells.len()
    }

    /// Get a reference to a cell
    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get a mutable reference to a cell
    pub fn get_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Get cell at column, panics if out of bounds
    pub fn cell(&self, col: usize) -> &Cell {
        &self.cells[col]
    }

    /// Get mutable cell at column, panics if out of bounds
    pub fn cell_mut(&mut self, col: usize) -> &mut Cell {
        &mut self.cells[col]
    }

    /// Reset every cell and the continued flag
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
        self.continued = false;
    }

    /// Blank `n` cells starting at `col`, applying the given attributes
    pub fn erase(&mut self, col: usize, n: usize, attrs: CellAttributes) {
        let end = col.saturating_add(n).min(self.cells.len());
        for cell in &mut self.cells[col.min(end)..end] {
            cell.clear(attrs);
        }
    }

    /// Blank the text of `n` cells starting at `col`, leaving attributes alone
    pub fn erase_text(&mut self, col: usize, n: usize) {
        let end = col.saturating_add(n).min(self.cells.len());
        for cell in &mut self.cells[col.min(end)..end] {
            cell.clear_text();
        }
    }

    /// Overwrite every cell's text with `c`, leaving attributes alone
    pub fn fill_char(&mut self, c: char) {
        for cell in &mut self.cells {
            cell.set_char(c, 1);
        }
    }

    /// Shift cells right by `n` starting at `col`; cells falling off the
    /// right edge are discarded and the exposed cells are left stale for
    /// the caller to erase.
    pub fn right_shift(&mut self, col: usize, n: usize) {
        if col >= self.cells.len() || n == 0 {
            return;
        }
        let n = n.min(self.cells.len() - col);
        self.cells[col..].rotate_right(n);
    }

    /// Shift cells left by `n` starting at `col`; the vacated cells at the
    /// right end are left stale for the caller to erase.
    pub fn left_shift(&mut self, col: usize, n: usize) {
        if col >= self.cells.len() || n == 0 {
            return;
        }
        let n = n.min(self.cells.len() - col);
        self.cells[col..].rotate_left(n);
    }

    /// Number of cells up to and including the last one holding text.
    /// A trailing wide leader counts its continuation cell.
    pub fn occupied(&self) -> usize {
        for (i, cell) in self.cells.iter().enumerate().rev() {
            if !cell.content().is_empty() {
                if cell.width() == 2 {
                    return (i + 2).min(self.cells.len());
                }
                return i + 1;
            }
        }
        0
    }

    /// Get the text content of the line, trailing blanks trimmed
    pub fn text(&self) -> String {
        let mut result = String::new();
        for cell in &self.cells {
            if cell.is_continuation() {
                continue;
            }
            if cell.content().is_empty() {
                result.push(' ');
            } else {
                result.push_str(cell.content());
            }
        }
        result.trim_end().to_string()
    }

    /// Check if the line holds no text
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// All cells as a slice
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterator over cells
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn line_with(text: &str, columns: usize) -> Line {
        let mut line = Line::new(columns);
        for (i, c) in text.chars().enumerate() {
            line.cell_mut(i).set_char(c, 1);
        }
        line
    }

    #[test]
    fn test_line_new() {
        let line = Line::new(80);
        assert_eq!(line.columns(), 80);
        assert!(!line.continued);
        assert!(line.is_empty());
    }

    #[test]
    fn test_line_reset() {
        let mut line = line_with("AB", 10);
        line.continued = true;
        line.reset();
        assert!(line.is_empty());
        assert!(!line.continued);
    }

    #[test]
    fn test_line_erase_applies_attrs() {
        let mut line = line_with("ABCDE", 5);
        let mut attrs = CellAttributes::new();
        attrs.bg = Color::indexed(2);
        line.erase(1, 2, attrs);
        assert_eq!(line.text(), "A  DE");
        assert_eq!(line.cell(1).attrs.bg, Color::indexed(2));
        assert_eq!(line.cell(3).attrs.bg, Color::Default);
    }

    #[test]
    fn test_line_erase_text_keeps_attrs() {
        let mut line = line_with("ABCDE", 5);
        line.cell_mut(2).attrs.bold = true;
        line.erase_text(2, 1);
        assert_eq!(line.text(), "AB DE");
        assert!(line.cell(2).attrs.bold);
    }

    #[test]
    fn test_line_right_shift() {
        let mut line = line_with("ABCDE", 5);
        line.right_shift(1, 2);
        // Exposed cells hold rotated-around junk until erased
        line.erase(1, 2, CellAttributes::default());
        assert_eq!(line.text(), "A  BC");
    }

    #[test]
    fn test_line_left_shift() {
        let mut line = line_with("ABCDE", 5);
        line.left_shift(1, 2);
        line.erase(3, 2, CellAttributes::default());
        assert_eq!(line.text(), "ADE");
    }

    #[test]
    fn test_line_occupied() {
        let line = line_with("AB", 10);
        assert_eq!(line.occupied(), 2);
        assert_eq!(Line::new(10).occupied(), 0);
    }

    #[test]
    fn test_line_occupied_trailing_wide() {
        let mut line = Line::new(10);
        line.cell_mut(0).set_char('中', 2);
        line.cell_mut(1).set_continuation();
        assert_eq!(line.occupied(), 2);
    }

    #[test]
    fn test_line_text_skips_continuations() {
        let mut line = Line::new(4);
        line.cell_mut(0).set_char('中', 2);
        line.cell_mut(1).set_continuation();
        line.cell_mut(2).set_char('x', 1);
        assert_eq!(line.text(), "中x");
    }
}
