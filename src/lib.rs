//! VT screen model - the in-memory state of a terminal display
//!
//! This crate provides the data structures and state machine behind a
//! VT-series compatible terminal emulator:
//! - A grid of cells with colors, styles, wide glyphs and combining marks
//! - Dual main/alternate buffers with a scrollback ring on the main one
//! - Cursor state with graphic rendition and DECSC/DECRC savepoints
//! - The DEC/ANSI mode set and the commands an escape-sequence parser
//!   drives (drawing, editing, scrolling, margins, reports)
//!
//! The crate is deterministic: given the same sequence of operations it
//! always produces the same screen state. Byte parsing, rendering and
//! PTY I/O are collaborators; the screen receives typed commands and
//! emits notifications through [`EventSink`].

mod cell;
mod charset;
mod color;
mod cursor;
mod error;
mod event;
mod history;
mod line;
mod linebuf;
pub mod modes;
mod screen;

pub use cell::{Cell, CellAttributes, Decoration, MAX_COMBINING};
pub use charset::{parse_charset_designation, Charset, CharsetSlot, CharsetState};
pub use color::Color;
pub use cursor::{Cursor, CursorShape, Savepoint, SavepointStack, SAVEPOINT_DEPTH};
pub use error::{Result, ScreenError};
pub use event::{EventSink, NoopSink};
pub use history::HistoryBuf;
pub use line::Line;
pub use linebuf::LineBuf;
pub use modes::{ModeSet, MouseTrackingMode, MouseTrackingProtocol};
pub use screen::{
    Screen, DECORATION_FG_CODE, PRIMARY_VERSION, SECONDARY_VERSION, UNDERCURL_CODE,
};
