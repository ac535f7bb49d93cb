//! The visible grid
//!
//! A `LineBuf` holds the `lines x columns` cell matrix for one screen
//! buffer. Region scrolls are slice rotations, so lines move without
//! their cells being copied. `rewrap` rebuilds the grid at a new
//! column width using the per-line `continued` flags.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::Result;
use crate::history::HistoryBuf;
use crate::line::Line;

/// The visible screen grid (row 0 is the top)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBuf {
    lines: Vec<Line>,
    columns: usize,
}

impl LineBuf {
    /// Create a blank grid of the given size
    pub fn new(lines: usize, columns: usize) -> Self {
        Self {
            lines: (0..lines).map(|_| Line::new(columns)).collect(),
            columns,
        }
    }

    /// Number of rows
    pub fn lines(&self) -> usize {
        self.lines.len()
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Get a reference to a row, panics if out of bounds
    pub fn line(&self, y: usize) -> &Line {
        &self.lines[y]
    }

    /// Get a mutable reference to a row, panics if out of bounds
    pub fn line_mut(&mut self, y: usize) -> &mut Line {
        &mut self.lines[y]
    }

    /// Get a row, returning None if out of bounds
    pub fn get(&self, y: usize) -> Option<&Line> {
        self.lines.get(y)
    }

    /// Rotate rows `[top..=bottom]` up by one; the previous top row
    /// lands at `bottom` (callers archive and clear it).
    pub fn index(&mut self, top: usize, bottom: usize) {
        if top < bottom && bottom < self.lines.len() {
            self.lines[top..=bottom].rotate_left(1);
        }
    }

    /// Rotate rows `[top..=bottom]` down by one; the previous bottom
    /// row lands at `top`.
    pub fn reverse_index(&mut self, top: usize, bottom: usize) {
        if top < bottom && bottom < self.lines.len() {
            self.lines[top..=bottom].rotate_right(1);
        }
    }

    /// Insert `n` blank rows at `y`, shifting rows `[y..=bottom]` down.
    /// Rows pushed past `bottom` are lost.
    pub fn insert_lines(&mut self, n: usize, y: usize, bottom: usize) {
        if y > bottom || bottom >= self.lines.len() {
            return;
        }
        let n = n.min(bottom - y + 1);
        self.lines[y..=bottom].rotate_right(n);
        for i in y..y + n {
            self.lines[i].reset();
        }
    }

    /// Delete `n` rows at `y`, shifting rows up; blank rows appear at
    /// the bottom of the region.
    pub fn delete_lines(&mut self, n: usize, y: usize, bottom: usize) {
        if y > bottom || bottom >= self.lines.len() {
            return;
        }
        let n = n.min(bottom - y + 1);
        self.lines[y..=bottom].rotate_left(n);
        for i in bottom + 1 - n..=bottom {
            self.lines[i].reset();
        }
    }

    /// Blank a row and drop its continued flag
    pub fn clear_line(&mut self, y: usize) {
        if let Some(line) = self.lines.get_mut(y) {
            line.reset();
        }
    }

    /// Blank every row
    pub fn clear_all(&mut self) {
        for line in &mut self.lines {
            line.reset();
        }
    }

    /// Reflow the grid into a new geometry.
    ///
    /// Soft-wrapped runs are joined via `continued` and rebroken at the
    /// new width. Rows that overflow the top go into `history` when one
    /// is supplied (main buffer) and are dropped otherwise (alt buffer).
    /// Returns the new grid and the row the cursor's line landed on.
    pub fn rewrap(
        &self,
        new_lines: usize,
        new_columns: usize,
        cursor_y: usize,
        mut history: Option<&mut HistoryBuf>,
    ) -> Result<(LineBuf, usize)> {
        // Join rows into logical lines, tracking where the cursor row starts
        let mut logical: Vec<(bool, Vec<Cell>)> = Vec::new();
        let mut cursor_logical = 0;
        let mut cursor_offset = 0;
        for (y, line) in self.lines.iter().enumerate() {
            let next_is_continued = self
                .lines
                .get(y + 1)
                .map(|next| next.continued)
                .unwrap_or(false);
            let take = if next_is_continued {
                self.columns
            } else {
                line.occupied()
            };
            let cells = line.cells()[..take].to_vec();
            let last_index = logical.len().saturating_sub(1);
            match logical.last_mut() {
                Some((_, run)) if line.continued => {
                    if y == cursor_y {
                        cursor_logical = last_index;
                        cursor_offset = run.len();
                    }
                    run.extend(cells);
                }
                _ => {
                    if y == cursor_y {
                        cursor_logical = logical.len();
                        cursor_offset = 0;
                    }
                    logical.push((line.continued, cells));
                }
            }
        }

        // Rebreak each logical line at the new width
        let mut rows: Vec<Line> = Vec::new();
        rows.try_reserve(new_lines)?;
        let mut cursor_row = 0;
        for (li, (leading_continued, cells)) in logical.iter().enumerate() {
            let base = rows.len();
            for (start, line) in rebreak_cells(cells, new_columns) {
                if li == cursor_logical && start <= cursor_offset {
                    cursor_row = rows.len();
                }
                rows.push(line);
            }
            if *leading_continued {
                rows[base].continued = true;
            }
        }

        // Blank rows below the last content row (and below the cursor)
        // do not survive a reflow
        let content_end = rows
            .iter()
            .rposition(|row| !row.is_empty())
            .map(|i| i + 1)
            .unwrap_or(0)
            .max(cursor_row + 1);
        rows.truncate(content_end);

        // Fit the target height: overflow rolls off the top, shortfall
        // pads blank rows at the bottom
        if rows.len() > new_lines {
            let excess = rows.len() - new_lines;
            for row in rows.drain(..excess) {
                if let Some(h) = history.as_deref_mut() {
                    h.push(row);
                }
            }
            cursor_row = cursor_row.saturating_sub(excess);
        } else {
            while rows.len() < new_lines {
                rows.push(Line::new(new_columns));
            }
        }
        cursor_row = cursor_row.min(new_lines.saturating_sub(1));

        Ok((
            LineBuf {
                lines: rows,
                columns: new_columns,
            },
            cursor_row,
        ))
    }

    /// Iterator over rows
    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }
}

/// Split a logical line's cells into rows of `columns` cells, keeping a
/// wide leader and its continuation on the same row. Each row is paired
/// with its starting offset in `cells`; rows after the first come back
/// with `continued` set. Empty input yields one blank row.
pub(crate) fn rebreak_cells(cells: &[Cell], columns: usize) -> Vec<(usize, Line)> {
    let mut rows = Vec::new();
    if cells.is_empty() {
        rows.push((0, Line::new(columns)));
        return rows;
    }
    let mut offset = 0;
    while offset < cells.len() {
        let mut end = (offset + columns).min(cells.len());
        if end < cells.len() && end > offset + 1 && cells[end - 1].width() == 2 {
            end -= 1;
        }
        if end == offset {
            end = offset + 1;
        }
        let mut row = Line::new(columns);
        for (j, cell) in cells[offset..end].iter().enumerate() {
            *row.cell_mut(j) = cell.clone();
        }
        row.continued = offset > 0;
        rows.push((offset, row));
        offset = end;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf_with(rows: &[&str], columns: usize) -> LineBuf {
        let mut buf = LineBuf::new(rows.len(), columns);
        for (y, text) in rows.iter().enumerate() {
            for (x, c) in text.chars().enumerate() {
                buf.line_mut(y).cell_mut(x).set_char(c, 1);
            }
        }
        buf
    }

    fn texts(buf: &LineBuf) -> Vec<String> {
        buf.iter().map(|l| l.text()).collect()
    }

    #[test]
    fn test_index_rotates_region() {
        let mut buf = buf_with(&["A", "B", "C", "D", "E"], 5);
        buf.index(1, 3);
        assert_eq!(texts(&buf), vec!["A", "C", "D", "B", "E"]);
    }

    #[test]
    fn test_reverse_index_rotates_region() {
        let mut buf = buf_with(&["A", "B", "C", "D", "E"], 5);
        buf.reverse_index(1, 3);
        assert_eq!(texts(&buf), vec!["A", "D", "B", "C", "E"]);
    }

    #[test]
    fn test_insert_lines() {
        let mut buf = buf_with(&["A", "B", "C", "D", "E"], 5);
        buf.insert_lines(2, 1, 4);
        assert_eq!(texts(&buf), vec!["A", "", "", "B", "C"]);
    }

    #[test]
    fn test_insert_lines_clamps_count() {
        let mut buf = buf_with(&["A", "B", "C"], 5);
        buf.insert_lines(10, 1, 2);
        assert_eq!(texts(&buf), vec!["A", "", ""]);
    }

    #[test]
    fn test_delete_lines() {
        let mut buf = buf_with(&["A", "B", "C", "D", "E"], 5);
        buf.delete_lines(2, 1, 4);
        assert_eq!(texts(&buf), vec!["A", "D", "E", "", ""]);
    }

    #[test]
    fn test_clear_line_resets_continued() {
        let mut buf = buf_with(&["AB"], 5);
        buf.line_mut(0).continued = true;
        buf.clear_line(0);
        assert!(buf.line(0).is_empty());
        assert!(!buf.line(0).continued);
    }

    #[test]
    fn test_rewrap_grow_unwraps() {
        let mut buf = buf_with(&["ABCD", "EF", "", ""], 4);
        buf.line_mut(1).continued = true;
        let (wrapped, cursor_row) = buf.rewrap(4, 8, 1, None).unwrap();
        assert_eq!(texts(&wrapped), vec!["ABCDEF", "", "", ""]);
        assert!(!wrapped.line(0).continued);
        assert_eq!(cursor_row, 0);
    }

    #[test]
    fn test_rewrap_shrink_wraps_and_marks_continued() {
        let buf = buf_with(&["ABCDEF", "", ""], 6);
        let (wrapped, cursor_row) = buf.rewrap(3, 4, 0, None).unwrap();
        assert_eq!(texts(&wrapped), vec!["ABCD", "EF", ""]);
        assert!(wrapped.line(1).continued);
        assert!(!wrapped.line(2).continued);
        assert_eq!(cursor_row, 0);
    }

    #[test]
    fn test_rewrap_overflow_rolls_into_history() {
        let mut history = HistoryBuf::new(10);
        let buf = buf_with(&["ABCDEF", "XY"], 6);
        let (wrapped, cursor_row) = buf.rewrap(2, 3, 1, Some(&mut history)).unwrap();
        // ABCDEF becomes ABC/DEF, XY stays: three rows into two
        assert_eq!(texts(&wrapped), vec!["DEF", "XY"]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(0).unwrap().text(), "ABC");
        assert!(!history.get(0).unwrap().continued);
        assert!(wrapped.line(0).continued);
        assert_eq!(cursor_row, 1);
    }

    #[test]
    fn test_rewrap_overflow_without_history_drops() {
        let buf = buf_with(&["ABCDEF", "XY"], 6);
        let (wrapped, _) = buf.rewrap(2, 3, 0, None).unwrap();
        assert_eq!(texts(&wrapped), vec!["DEF", "XY"]);
    }

    #[test]
    fn test_rewrap_keeps_wide_leader_with_continuation() {
        let mut buf = LineBuf::new(1, 4);
        buf.line_mut(0).cell_mut(0).set_char('a', 1);
        buf.line_mut(0).cell_mut(1).set_char('中', 2);
        buf.line_mut(0).cell_mut(2).set_continuation();
        buf.line_mut(0).cell_mut(3).set_char('b', 1);
        let (wrapped, _) = buf.rewrap(3, 2, 0, None).unwrap();
        // The wide leader cannot straddle rows: "a" wraps alone
        assert_eq!(wrapped.line(0).text(), "a");
        assert_eq!(wrapped.line(1).text(), "中");
        assert!(wrapped.line(1).continued);
        assert_eq!(wrapped.line(2).text(), "b");
    }

    #[test]
    fn test_rewrap_roundtrip_preserves_text() {
        let mut buf = buf_with(&["hello world", "second line", ""], 11);
        buf.line_mut(1).continued = false;
        let (narrow, _) = buf.rewrap(6, 5, 0, None).unwrap();
        let (restored, _) = narrow.rewrap(3, 11, 0, None).unwrap();
        assert_eq!(texts(&restored), vec!["hello world", "second line", ""]);
    }
}
