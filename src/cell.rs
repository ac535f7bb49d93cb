//! Terminal cell representation
//!
//! Each cell in the grid contains:
//! - A base codepoint plus a bounded number of combining marks
//! - Display attributes (colors, bold, italic, etc.)
//! - A width class (1 normal, 2 wide leader, 0 continuation)

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Maximum combining codepoints stored per cell; further marks are dropped.
pub const MAX_COMBINING: usize = 2;

/// Underline/decoration variants (SGR 4 and 4:3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Decoration {
    #[default]
    None,
    /// Straight underline (SGR 4)
    Straight,
    /// Curly underline (SGR 4:3)
    Curly,
}

/// Attributes that affect how a cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Underline/decoration color (SGR 58)
    pub decoration_fg: Color,
    /// Bold text (SGR 1)
    pub bold: bool,
    /// Italic text (SGR 3)
    pub italic: bool,
    /// Inverse/reverse video (SGR 7)
    pub reverse: bool,
    /// Strikethrough text (SGR 9)
    pub strikethrough: bool,
    /// Underline decoration (SGR 4 / 4:3)
    pub decoration: Decoration,
}

impl CellAttributes {
    /// Create new default attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all attributes to default
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The text stored in this cell: one base codepoint optionally
    /// followed by combining marks. Empty means a blank cell.
    content: String,
    /// Display attributes
    pub attrs: CellAttributes,
    /// Width class: 1 normal, 2 wide leader, 0 continuation of a wide leader
    width: u8,
}

impl Cell {
    /// Create a new empty cell
    pub fn new() -> Self {
        Self {
            content: String::new(),
            attrs: CellAttributes::default(),
            width: 1,
        }
    }

    /// Create a cell holding a character
    pub fn with_char(c: char) -> Self {
        let mut cell = Self::new();
        cell.set_char(c, char_display_width(c));
        cell
    }

    /// Set the base character and width class, discarding combining marks
    pub fn set_char(&mut self, c: char, width: u8) {
        self.content.clear();
        self.content.push(c);
        self.width = width;
    }

    /// Attach a combining mark to this cell's content.
    /// Marks beyond [`MAX_COMBINING`] are dropped.
    pub fn push_combining(&mut self, c: char) {
        if self.content.is_empty() {
            return;
        }
        if self.content.chars().count() <= MAX_COMBINING {
            self.content.push(c);
        }
    }

    /// Get the cell text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the base character (space if empty)
    pub fn display_char(&self) -> char {
        self.content.chars().next().unwrap_or(' ')
    }

    /// Check if cell is blank (no content or a bare space)
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.content == " "
    }

    /// Get the width class of this cell
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Turn this cell into a wide-character continuation (width 0, no text)
    pub fn set_continuation(&mut self) {
        self.content.clear();
        self.width = 0;
    }

    /// Check if this is a continuation cell
    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Blank the cell, applying the given attributes
    pub fn clear(&mut self, attrs: CellAttributes) {
        self.content.clear();
        self.attrs = attrs;
        self.width = 1;
    }

    /// Blank only the text, leaving attributes untouched
    pub fn clear_text(&mut self) {
        self.content.clear();
        self.width = 1;
    }

    /// Reset cell to default state
    pub fn reset(&mut self) {
        self.content.clear();
        self.attrs = CellAttributes::default();
        self.width = 1;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

/// Display width of a character, clamped to 0..=2.
/// Combining marks are 0, CJK and similar are 2, unknowns count as 1.
pub fn char_display_width(c: char) -> u8 {
    use unicode_width::UnicodeWidthChar;
    match c.width() {
        Some(w) => w.min(2) as u8,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_new() {
        let cell = Cell::new();
        assert!(cell.is_empty());
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_with_char() {
        let cell = Cell::with_char('A');
        assert_eq!(cell.display_char(), 'A');
        assert_eq!(cell.width(), 1);
        assert!(!cell.is_empty());
    }

    #[test]
    fn test_cell_wide_char() {
        let cell = Cell::with_char('中');
        assert_eq!(cell.display_char(), '中');
        assert_eq!(cell.width(), 2);
    }

    #[test]
    fn test_cell_combining_cap() {
        let mut cell = Cell::with_char('e');
        cell.push_combining('\u{0301}');
        cell.push_combining('\u{0308}');
        cell.push_combining('\u{0323}'); // dropped
        assert_eq!(cell.content().chars().count(), 1 + MAX_COMBINING);
    }

    #[test]
    fn test_combining_on_empty_cell_is_dropped() {
        let mut cell = Cell::new();
        cell.push_combining('\u{0301}');
        assert!(cell.is_empty());
    }

    #[test]
    fn test_cell_clear_keeps_attrs() {
        let mut cell = Cell::with_char('X');
        let mut attrs = CellAttributes::new();
        attrs.bg = Color::indexed(4);
        cell.clear(attrs);
        assert!(cell.is_empty());
        assert_eq!(cell.attrs.bg, Color::indexed(4));
    }

    #[test]
    fn test_cell_clear_text_preserves_attrs() {
        let mut cell = Cell::with_char('X');
        cell.attrs.bold = true;
        cell.clear_text();
        assert!(cell.is_empty());
        assert!(cell.attrs.bold);
    }

    #[test]
    fn test_char_display_width() {
        assert_eq!(char_display_width('A'), 1);
        assert_eq!(char_display_width('中'), 2);
        assert_eq!(char_display_width('\u{0301}'), 0);
    }
}
