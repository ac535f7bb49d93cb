//! Cursor state and savepoints
//!
//! The cursor carries its position plus the graphic rendition applied
//! to newly written cells. DECSC/DECRC snapshots go onto a small
//! per-buffer ring (`SavepointStack`); overflow drops the oldest entry.

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;
use crate::charset::CharsetState;

/// Depth of each savepoint ring
pub const SAVEPOINT_DEPTH: usize = 10;

/// Cursor visual shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// Host default, nothing requested via DECSCUSR
    #[default]
    Unspecified,
    /// Filled rectangle
    Block,
    /// Underline cursor
    Underline,
    /// Vertical bar cursor
    Beam,
}

/// Cursor state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub x: usize,
    /// Row position (0-indexed)
    pub y: usize,
    /// Visual shape
    pub shape: CursorShape,
    /// Whether the cursor blinks
    pub blink: bool,
    /// Rendition applied to newly drawn cells
    pub attrs: CellAttributes,
}

impl Cursor {
    /// Create a cursor at the origin with default rendition
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset position, shape and rendition
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reset only the graphic rendition (SGR 0)
    pub fn reset_display_attrs(&mut self) {
        self.attrs.reset();
    }
}

/// Snapshot taken by DECSC: cursor plus the modes and charset state
/// that DECRC restores.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Savepoint {
    pub cursor: Cursor,
    pub decom: bool,
    pub decawm: bool,
    pub decscnm: bool,
    pub charset: CharsetState,
}

/// Fixed-depth savepoint ring; pushing onto a full ring overwrites the
/// oldest snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavepointStack {
    buf: Vec<Savepoint>,
    start: usize,
    count: usize,
}

impl SavepointStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored savepoints
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Push a savepoint, overwriting the oldest when the ring is full
    pub fn push(&mut self, sp: Savepoint) {
        if self.buf.len() < SAVEPOINT_DEPTH {
            self.buf.push(sp);
            self.count += 1;
            return;
        }
        let idx = (self.start + self.count) % SAVEPOINT_DEPTH;
        self.buf[idx] = sp;
        if self.count == SAVEPOINT_DEPTH {
            log::debug!("savepoint stack full, dropping oldest entry");
            self.start = (self.start + 1) % SAVEPOINT_DEPTH;
        } else {
            self.count += 1;
        }
    }

    /// Pop the most recent savepoint
    pub fn pop(&mut self) -> Option<Savepoint> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        let idx = (self.start + self.count) % self.buf.len();
        Some(self.buf[idx].clone())
    }

    /// Drop all savepoints
    pub fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn savepoint_at(x: usize) -> Savepoint {
        Savepoint {
            cursor: Cursor {
                x,
                ..Cursor::new()
            },
            ..Savepoint::default()
        }
    }

    #[test]
    fn test_cursor_new() {
        let cursor = Cursor::new();
        assert_eq!((cursor.x, cursor.y), (0, 0));
        assert_eq!(cursor.shape, CursorShape::Unspecified);
        assert!(!cursor.blink);
    }

    #[test]
    fn test_cursor_reset_display_attrs() {
        let mut cursor = Cursor::new();
        cursor.attrs.bold = true;
        cursor.x = 5;
        cursor.reset_display_attrs();
        assert!(!cursor.attrs.bold);
        assert_eq!(cursor.x, 5);
    }

    #[test]
    fn test_savepoints_lifo() {
        let mut stack = SavepointStack::new();
        stack.push(savepoint_at(1));
        stack.push(savepoint_at(2));
        assert_eq!(stack.pop().unwrap().cursor.x, 2);
        assert_eq!(stack.pop().unwrap().cursor.x, 1);
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_savepoints_overflow_drops_oldest() {
        let mut stack = SavepointStack::new();
        for i in 0..SAVEPOINT_DEPTH + 3 {
            stack.push(savepoint_at(i));
        }
        assert_eq!(stack.len(), SAVEPOINT_DEPTH);
        // Newest first on the way out
        for i in (3..SAVEPOINT_DEPTH + 3).rev() {
            assert_eq!(stack.pop().unwrap().cursor.x, i);
        }
        assert!(stack.pop().is_none());
    }
}
