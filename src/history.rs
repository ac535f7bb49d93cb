//! Scrollback history
//!
//! A fixed-capacity ring of lines evicted off the top of the main
//! screen. The newest line sits at the moving head; the oldest is
//! dropped once the ring is full. Only the main buffer feeds it.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::Result;
use crate::line::Line;
use crate::linebuf::rebreak_cells;

/// Scrollback ring buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryBuf {
    /// Ring storage, oldest at `start`
    lines: Vec<Line>,
    /// Maximum number of lines to retain
    capacity: usize,
    /// Index of the oldest line
    start: usize,
    /// Number of lines currently stored
    len: usize,
}

impl HistoryBuf {
    /// Create a new history buffer retaining at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Vec::new(),
            capacity,
            start: 0,
            len: 0,
        }
    }

    /// Maximum number of retained lines
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of stored lines
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a line as the newest entry, evicting the oldest when full
    pub fn push(&mut self, line: Line) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() < self.capacity {
            self.lines.push(line);
            self.len += 1;
        } else {
            let idx = (self.start + self.len) % self.capacity;
            self.lines[idx] = line;
            if self.len < self.capacity {
                self.len += 1;
            } else {
                self.start = (self.start + 1) % self.capacity;
            }
        }
    }

    /// Get a line by age (0 = oldest, `len - 1` = newest)
    pub fn get(&self, index: usize) -> Option<&Line> {
        if index >= self.len {
            return None;
        }
        self.lines.get((self.start + index) % self.lines.len())
    }

    /// Get a line counting back from the newest (0 = newest)
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        if index >= self.len {
            return None;
        }
        self.get(self.len - 1 - index)
    }

    /// Drop all stored lines
    pub fn clear(&mut self) {
        self.lines.clear();
        self.start = 0;
        self.len = 0;
    }

    /// Change the retention limit, dropping the oldest lines when shrinking
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity == self.capacity {
            return Ok(());
        }
        let keep = self.len.min(capacity);
        let mut rebuilt = Vec::new();
        rebuilt.try_reserve_exact(keep)?;
        for i in (self.len - keep)..self.len {
            if let Some(line) = self.get(i) {
                rebuilt.push(line.clone());
            }
        }
        self.lines = rebuilt;
        self.start = 0;
        self.len = keep;
        self.capacity = capacity;
        Ok(())
    }

    /// Reflow the stored lines to a new column width.
    ///
    /// Soft-wrapped runs are joined on the `continued` flag and rebroken
    /// at the new width; when the result exceeds capacity the oldest
    /// rows are dropped.
    pub fn rewrap(&mut self, new_columns: usize) -> Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        // Join logical lines, oldest first
        let mut logical: Vec<(bool, Vec<Cell>)> = Vec::new();
        for i in 0..self.len {
            let line = match self.get(i) {
                Some(line) => line,
                None => continue,
            };
            let next_is_continued = self
                .get(i + 1)
                .map(|next| next.continued)
                .unwrap_or(false);
            let take = if next_is_continued {
                line.columns()
            } else {
                line.occupied()
            };
            let cells = line.cells()[..take].to_vec();
            match logical.last_mut() {
                Some((_, run)) if line.continued => run.extend(cells),
                _ => logical.push((line.continued, cells)),
            }
        }

        let mut rows: Vec<Line> = Vec::new();
        rows.try_reserve(logical.len())?;
        for (leading_continued, cells) in &logical {
            let base = rows.len();
            for (_, line) in rebreak_cells(cells, new_columns) {
                rows.push(line);
            }
            if *leading_continued {
                rows[base].continued = true;
            }
        }

        // Keep the newest `capacity` rows
        let drop = rows.len().saturating_sub(self.capacity);
        self.lines = rows.split_off(drop);
        self.start = 0;
        self.len = self.lines.len();
        Ok(())
    }

    /// Iterator over lines from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        (0..self.len).filter_map(move |i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(text: &str, columns: usize) -> Line {
        let mut line = Line::new(columns);
        for (i, c) in text.chars().enumerate() {
            line.cell_mut(i).set_char(c, 1);
        }
        line
    }

    #[test]
    fn test_history_new() {
        let hb = HistoryBuf::new(100);
        assert_eq!(hb.capacity(), 100);
        assert!(hb.is_empty());
    }

    #[test]
    fn test_history_push_get() {
        let mut hb = HistoryBuf::new(100);
        hb.push(make_line("one", 10));
        hb.push(make_line("two", 10));
        assert_eq!(hb.len(), 2);
        assert_eq!(hb.get(0).unwrap().text(), "one");
        assert_eq!(hb.get(1).unwrap().text(), "two");
        assert_eq!(hb.get_from_end(0).unwrap().text(), "two");
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut hb = HistoryBuf::new(3);
        for text in ["one", "two", "three", "four"] {
            hb.push(make_line(text, 10));
        }
        assert_eq!(hb.len(), 3);
        assert_eq!(hb.get(0).unwrap().text(), "two");
        assert_eq!(hb.get(2).unwrap().text(), "four");
    }

    #[test]
    fn test_history_zero_capacity() {
        let mut hb = HistoryBuf::new(0);
        hb.push(make_line("one", 10));
        assert!(hb.is_empty());
    }

    #[test]
    fn test_history_set_capacity_shrink() {
        let mut hb = HistoryBuf::new(10);
        for i in 0..6 {
            hb.push(make_line(&format!("line{}", i), 10));
        }
        hb.set_capacity(3).unwrap();
        assert_eq!(hb.len(), 3);
        assert_eq!(hb.get(0).unwrap().text(), "line3");
        assert_eq!(hb.get(2).unwrap().text(), "line5");
    }

    #[test]
    fn test_history_rewrap_joins_and_rebreaks() {
        let mut hb = HistoryBuf::new(10);
        let mut second = make_line("EF", 4);
        second.continued = true;
        hb.push(make_line("ABCD", 4));
        hb.push(second);
        hb.rewrap(6).unwrap();
        assert_eq!(hb.len(), 1);
        assert_eq!(hb.get(0).unwrap().text(), "ABCDEF");
    }

    #[test]
    fn test_history_rewrap_shrink_marks_continued() {
        let mut hb = HistoryBuf::new(10);
        hb.push(make_line("ABCDEF", 6));
        hb.rewrap(4).unwrap();
        assert_eq!(hb.len(), 2);
        assert_eq!(hb.get(0).unwrap().text(), "ABCD");
        assert!(!hb.get(0).unwrap().continued);
        assert_eq!(hb.get(1).unwrap().text(), "EF");
        assert!(hb.get(1).unwrap().continued);
    }

    #[test]
    fn test_history_iter_order() {
        let mut hb = HistoryBuf::new(2);
        for text in ["one", "two", "three"] {
            hb.push(make_line(text, 10));
        }
        let texts: Vec<_> = hb.iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }
}
