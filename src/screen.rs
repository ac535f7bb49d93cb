//! The screen aggregate
//!
//! `Screen` ties the grids, history, cursor, modes, charsets and
//! savepoints together and exposes the command surface the escape
//! sequence parser drives. All operations are straight-line memory
//! transformations; the caller serializes access.

use std::fmt;
use std::sync::Mutex;

use crate::cell::{char_display_width, Decoration};
use crate::charset::{parse_charset_designation, CharsetSlot, CharsetState};
use crate::color::Color;
use crate::cursor::{Cursor, CursorShape, Savepoint, SavepointStack};
use crate::error::{Result, ScreenError};
use crate::event::EventSink;
use crate::history::HistoryBuf;
use crate::line::Line;
use crate::linebuf::LineBuf;
use crate::modes::{
    self, ModeSet, MouseTrackingMode, MouseTrackingProtocol, PRIVATE_MODE_SHIFT,
};

/// Default tab stop interval
const DEFAULT_TAB_WIDTH: usize = 8;

/// Reported in the secondary device attributes response
pub const PRIMARY_VERSION: u32 = 4;
/// Reported in the secondary device attributes response
pub const SECONDARY_VERSION: u32 = 0;

/// Extended decoration color introducer (SGR 58)
pub const DECORATION_FG_CODE: u32 = 58;
/// Curly underline (SGR 4:3, flattened by the parser)
pub const UNDERCURL_CODE: u32 = 403;

/// The complete terminal screen state
pub struct Screen {
    /// Primary grid; the only one that feeds the scrollback
    main_linebuf: LineBuf,
    /// Alternate grid for full-screen applications
    alt_linebuf: LineBuf,
    /// Whether the alternate grid is active
    using_alt: bool,
    /// Scrollback history (main buffer only)
    historybuf: HistoryBuf,
    /// Tab stops for the main buffer
    main_tabstops: Vec<bool>,
    /// Tab stops for the alternate buffer
    alt_tabstops: Vec<bool>,
    /// Cursor position and rendition
    cursor: Cursor,
    /// Active DEC/ANSI modes
    modes: ModeSet,
    /// DECSC savepoints for the main buffer
    main_savepoints: SavepointStack,
    /// DECSC savepoints for the alternate buffer
    alt_savepoints: SavepointStack,
    /// Charset translation state
    charset: CharsetState,
    /// Scroll region top (0-based, inclusive)
    margin_top: usize,
    /// Scroll region bottom (0-based, inclusive)
    margin_bottom: usize,
    /// Number of rows
    lines: usize,
    /// Number of columns
    columns: usize,
    /// Cell contents changed since the last reset_dirty
    is_dirty: bool,
    /// Cursor position/appearance changed since the last reset_dirty
    cursor_changed: bool,
    /// Lines pushed into history since the last reset_dirty
    history_line_added_count: usize,
    /// Byte queue filled by the PTY reader
    read_buf: Mutex<Vec<u8>>,
    /// Byte queue drained by the PTY writer
    write_buf: Mutex<Vec<u8>>,
    /// Outward notifications
    sink: Box<dyn EventSink>,
}

impl Screen {
    /// Create a screen of `lines` x `columns` with a scrollback of at
    /// least `lines` rows and the given callback sink.
    pub fn new(lines: usize, columns: usize, scrollback: usize, sink: Box<dyn EventSink>) -> Self {
        let lines = lines.max(1);
        let columns = columns.max(1);
        Self {
            main_linebuf: LineBuf::new(lines, columns),
            alt_linebuf: LineBuf::new(lines, columns),
            using_alt: false,
            historybuf: HistoryBuf::new(scrollback.max(lines)),
            main_tabstops: default_tabstops(columns),
            alt_tabstops: default_tabstops(columns),
            cursor: Cursor::new(),
            modes: ModeSet::new(),
            main_savepoints: SavepointStack::new(),
            alt_savepoints: SavepointStack::new(),
            charset: CharsetState::new(),
            margin_top: 0,
            margin_bottom: lines - 1,
            lines,
            columns,
            is_dirty: true,
            cursor_changed: true,
            history_line_added_count: 0,
            read_buf: Mutex::new(Vec::new()),
            write_buf: Mutex::new(Vec::new()),
            sink,
        }
    }

    // Accessors

    /// Number of rows
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Cursor state
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Active mode flags
    pub fn modes(&self) -> &ModeSet {
        &self.modes
    }

    /// Scroll region as (top, bottom), 0-based inclusive
    pub fn margins(&self) -> (usize, usize) {
        (self.margin_top, self.margin_bottom)
    }

    /// Scrollback history
    pub fn history(&self) -> &HistoryBuf {
        &self.historybuf
    }

    /// Charset translation state
    pub fn charset(&self) -> &CharsetState {
        &self.charset
    }

    /// Whether the main buffer is active
    pub fn is_main_linebuf(&self) -> bool {
        !self.using_alt
    }

    /// Cell contents changed since the last [`reset_dirty`](Self::reset_dirty)
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Cursor changed since the last [`reset_dirty`](Self::reset_dirty)
    pub fn cursor_changed(&self) -> bool {
        self.cursor_changed
    }

    /// Lines archived into history since the last
    /// [`reset_dirty`](Self::reset_dirty)
    pub fn history_line_added_count(&self) -> usize {
        self.history_line_added_count
    }

    /// Clear the dirty flags and the history-added counter
    pub fn reset_dirty(&mut self) {
        self.is_dirty = false;
        self.cursor_changed = false;
        self.history_line_added_count = 0;
    }

    /// Force a full redraw on the next frame
    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    /// A visible row; errors when `y` is outside the grid
    pub fn line(&self, y: usize) -> Result<&Line> {
        self.active().get(y).ok_or(ScreenError::OutOfBounds {
            row: y,
            lines: self.lines,
        })
    }

    /// Text of a visible row, trailing blanks trimmed
    pub fn line_text(&self, y: usize) -> Result<String> {
        Ok(self.line(y)?.text())
    }

    /// Width of the character under the cursor
    pub fn current_char_width(&self) -> usize {
        if self.cursor.x < self.columns && self.cursor.y < self.lines {
            self.active().line(self.cursor.y).cell(self.cursor.x).width() as usize
        } else {
            1
        }
    }

    /// Run `f` against the PTY read queue while holding its lock
    pub fn with_read_buf<R>(&self, f: impl FnOnce(&mut Vec<u8>) -> R) -> R {
        let mut buf = self.read_buf.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut buf)
    }

    /// Run `f` against the PTY write queue while holding its lock
    pub fn with_write_buf<R>(&self, f: impl FnOnce(&mut Vec<u8>) -> R) -> R {
        let mut buf = self.write_buf.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut buf)
    }

    fn active(&self) -> &LineBuf {
        if self.using_alt {
            &self.alt_linebuf
        } else {
            &self.main_linebuf
        }
    }

    fn active_mut(&mut self) -> &mut LineBuf {
        if self.using_alt {
            &mut self.alt_linebuf
        } else {
            &mut self.main_linebuf
        }
    }

    fn tabstops(&self) -> &[bool] {
        if self.using_alt {
            &self.alt_tabstops
        } else {
            &self.main_tabstops
        }
    }

    fn tabstops_mut(&mut self) -> &mut [bool] {
        if self.using_alt {
            &mut self.alt_tabstops
        } else {
            &mut self.main_tabstops
        }
    }

    // Drawing

    /// Draw one codepoint at the cursor and advance it
    pub fn draw(&mut self, ch: char) {
        if is_ignored_char(ch) {
            return;
        }
        let ch = self.charset.translate(ch);
        let (x0, y0) = (self.cursor.x, self.cursor.y);
        let width = char_display_width(ch) as usize;

        if width > 0 && self.columns - self.cursor.x < width {
            if self.modes.decawm {
                self.carriage_return();
                self.linefeed();
                let y = self.cursor.y;
                self.active_mut().line_mut(y).continued = true;
            } else {
                self.cursor.x = self.columns.saturating_sub(width);
            }
        }

        if width > 0 {
            let (x, y) = (self.cursor.x, self.cursor.y);
            let attrs = self.cursor.attrs;
            let irm = self.modes.irm;
            let columns = self.columns;
            let line = self.active_mut().line_mut(y);
            if irm {
                line.right_shift(x, width);
            }
            line.cell_mut(x).set_char(ch, width as u8);
            line.cell_mut(x).attrs = attrs;
            if width == 2 && x + 1 < columns {
                let cont = line.cell_mut(x + 1);
                cont.set_continuation();
                cont.attrs = attrs;
            }
            self.cursor.x = if self.modes.decawm {
                x + width
            } else {
                (x + width).min(columns.saturating_sub(width))
            };
            self.is_dirty = true;
        } else if self.cursor.x > 0 {
            let (x, y) = (self.cursor.x, self.cursor.y);
            self.active_mut().line_mut(y).cell_mut(x - 1).push_combining(ch);
            self.is_dirty = true;
        } else if self.cursor.y > 0 {
            let y = self.cursor.y;
            let col = self.columns - 1;
            self.active_mut().line_mut(y - 1).cell_mut(col).push_combining(ch);
            self.is_dirty = true;
        }

        if (x0, y0) != (self.cursor.x, self.cursor.y) {
            self.cursor_changed = true;
        }
    }

    /// Draw every character of `text`
    pub fn draw_text(&mut self, text: &str) {
        for c in text.chars() {
            self.draw(c);
        }
    }

    // Cursor

    /// Clamp the cursor into the addressable area. Margins constrain
    /// the row when forced or when origin mode is active.
    pub fn ensure_bounds(&mut self, force_margins: bool) {
        let (top, bottom) = if force_margins || self.modes.decom {
            (self.margin_top, self.margin_bottom)
        } else {
            (0, self.lines - 1)
        };
        self.cursor.x = self.cursor.x.min(self.columns - 1);
        self.cursor.y = self.cursor.y.clamp(top, bottom);
    }

    /// Absolute cursor addressing, 1-based (CUP). Origin mode offsets
    /// and confines the row to the scroll region.
    pub fn cursor_position(&mut self, line: usize, column: usize) {
        let mut line = line.max(1) - 1;
        let column = column.max(1) - 1;
        if self.modes.decom {
            line = (line + self.margin_top).clamp(self.margin_top, self.margin_bottom);
        }
        let (x0, y0) = (self.cursor.x, self.cursor.y);
        self.cursor.x = column;
        self.cursor.y = line;
        self.ensure_bounds(false);
        if (x0, y0) != (self.cursor.x, self.cursor.y) {
            self.cursor_changed = true;
        }
    }

    /// Move the cursor left (CUB)
    pub fn cursor_back(&mut self, count: usize) {
        let x0 = self.cursor.x;
        self.cursor.x = self.cursor.x.saturating_sub(count.max(1));
        self.ensure_bounds(false);
        if x0 != self.cursor.x {
            self.cursor_changed = true;
        }
    }

    /// Move the cursor right (CUF)
    pub fn cursor_forward(&mut self, count: usize) {
        let x0 = self.cursor.x;
        self.cursor.x += count.max(1);
        self.ensure_bounds(false);
        if x0 != self.cursor.x {
            self.cursor_changed = true;
        }
    }

    fn cursor_vertical(&mut self, count: usize, down: bool, do_carriage_return: bool) {
        let count = count.max(1);
        let (x0, y0) = (self.cursor.x, self.cursor.y);
        self.cursor.y = if down {
            self.cursor.y + count
        } else {
            self.cursor.y.saturating_sub(count)
        };
        self.ensure_bounds(true);
        if do_carriage_return {
            self.cursor.x = 0;
        }
        if (x0, y0) != (self.cursor.x, self.cursor.y) {
            self.cursor_changed = true;
        }
    }

    /// Move the cursor up (CUU)
    pub fn cursor_up(&mut self, count: usize) {
        self.cursor_vertical(count, false, false);
    }

    /// Move the cursor up and to column 0 (CPL)
    pub fn cursor_up1(&mut self, count: usize) {
        self.cursor_vertical(count, false, true);
    }

    /// Move the cursor down (CUD)
    pub fn cursor_down(&mut self, count: usize) {
        self.cursor_vertical(count, true, false);
    }

    /// Move the cursor down and to column 0 (CNL)
    pub fn cursor_down1(&mut self, count: usize) {
        self.cursor_vertical(count, true, true);
    }

    /// Move the cursor to a 1-based column (CHA)
    pub fn cursor_to_column(&mut self, column: usize) {
        let x = column.max(1) - 1;
        if x != self.cursor.x {
            self.cursor.x = x;
            self.ensure_bounds(false);
            self.cursor_changed = true;
        }
    }

    /// Move the cursor to a 1-based line (VPA)
    pub fn cursor_to_line(&mut self, line: usize) {
        self.cursor_position(line, self.cursor.x + 1);
    }

    /// Move the cursor left one column (BS)
    pub fn backspace(&mut self) {
        self.cursor_back(1);
    }

    // Tabs

    /// Advance to the next tab stop, or the last column (HT)
    pub fn tab(&mut self) {
        let mut found = None;
        for i in self.cursor.x + 1..self.columns {
            if self.tabstops()[i] {
                found = Some(i);
                break;
            }
        }
        let target = found.unwrap_or(self.columns - 1);
        if target != self.cursor.x {
            self.cursor.x = target;
            self.cursor_changed = true;
        }
    }

    /// Move back `count` tab stops, stopping at column 0 (CBT)
    pub fn backtab(&mut self, count: usize) {
        let count = count.max(1);
        let before = self.cursor.x;
        for _ in 0..count {
            if self.cursor.x == 0 {
                break;
            }
            let mut target = 0;
            for i in (0..self.cursor.x).rev() {
                if self.tabstops()[i] {
                    target = i;
                    break;
                }
            }
            self.cursor.x = target;
        }
        if before != self.cursor.x {
            self.cursor_changed = true;
        }
    }

    /// Set a tab stop at the cursor column (HTS)
    pub fn set_tab_stop(&mut self) {
        let x = self.cursor.x;
        if x < self.columns {
            self.tabstops_mut()[x] = true;
        }
    }

    /// Clear tab stops (TBC): 0 at the cursor, 3 all, 2 no-op
    pub fn clear_tab_stop(&mut self, how: u32) {
        match how {
            0 => {
                let x = self.cursor.x;
                if x < self.columns {
                    self.tabstops_mut()[x] = false;
                }
            }
            2 => {} // no-op
            3 => self.tabstops_mut().fill(false),
            _ => log::warn!("unsupported clear tab stop mode: {}", how),
        }
    }

    // Scrolling

    fn index_up(&mut self) {
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        self.active_mut().index(top, bottom);
        if !self.using_alt && bottom == self.lines - 1 {
            // Only archive when no bottom margin has been set
            let line = self.main_linebuf.line(bottom).clone();
            self.historybuf.push(line);
            self.history_line_added_count += 1;
        }
        self.active_mut().clear_line(bottom);
        self.is_dirty = true;
    }

    /// Move the cursor down one line, scrolling at the bottom margin (IND)
    pub fn index(&mut self) {
        if self.cursor.y == self.margin_bottom {
            self.index_up();
        } else {
            self.cursor_down(1);
        }
    }

    /// Scroll the region up `count` lines without moving the cursor (SU)
    pub fn scroll(&mut self, count: usize) {
        for _ in 0..count.min(self.lines) {
            self.index_up();
        }
    }

    fn index_down(&mut self) {
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        self.active_mut().reverse_index(top, bottom);
        self.active_mut().clear_line(top);
        self.is_dirty = true;
    }

    /// Move the cursor up one line, scrolling at the top margin (RI)
    pub fn reverse_index(&mut self) {
        if self.cursor.y == self.margin_top {
            self.index_down();
        } else {
            self.cursor_up(1);
        }
    }

    /// Scroll the region down `count` lines without moving the cursor (SD)
    pub fn reverse_scroll(&mut self, count: usize) {
        for _ in 0..count.min(self.lines) {
            self.index_down();
        }
    }

    /// Move the cursor to column 0 (CR)
    pub fn carriage_return(&mut self) {
        if self.cursor.x != 0 {
            self.cursor.x = 0;
            self.cursor_changed = true;
        }
    }

    /// Line feed (LF/VT/FF); also returns the carriage in LNM
    pub fn linefeed(&mut self) {
        self.index();
        if self.modes.lnm {
            self.carriage_return();
        }
        self.ensure_bounds(false);
    }

    // Alt screen and savepoints

    /// Switch between the main and alternate buffers. Entering the alt
    /// buffer clears it and saves the cursor; leaving restores it.
    pub fn toggle_alt_screen(&mut self) {
        if !self.using_alt {
            self.alt_linebuf.clear_all();
            self.save_cursor();
            self.using_alt = true;
            self.cursor_position(1, 1);
            self.cursor.reset();
        } else {
            self.using_alt = false;
            self.restore_cursor();
        }
        let is_main = !self.using_alt;
        self.sink.buf_toggled(is_main);
        self.is_dirty = true;
    }

    /// Push a savepoint onto the active buffer's stack (DECSC)
    pub fn save_cursor(&mut self) {
        let sp = Savepoint {
            cursor: self.cursor.clone(),
            decom: self.modes.decom,
            decawm: self.modes.decawm,
            decscnm: self.modes.decscnm,
            charset: self.charset,
        };
        if self.using_alt {
            self.alt_savepoints.push(sp);
        } else {
            self.main_savepoints.push(sp);
        }
    }

    /// Pop the active buffer's newest savepoint (DECRC). An empty stack
    /// homes the cursor and resets DECOM, DECSCNM and the charsets.
    pub fn restore_cursor(&mut self) {
        let sp = if self.using_alt {
            self.alt_savepoints.pop()
        } else {
            self.main_savepoints.pop()
        };
        match sp {
            None => {
                self.cursor_position(1, 1);
                self.cursor_changed = true;
                self.set_mode_value(modes::DECOM, false);
                self.charset.reset();
                self.set_mode_value(modes::DECSCNM, false);
            }
            Some(sp) => {
                self.charset = sp.charset;
                self.set_mode_value(modes::DECOM, sp.decom);
                self.set_mode_value(modes::DECAWM, sp.decawm);
                self.set_mode_value(modes::DECSCNM, sp.decscnm);
                self.cursor = sp.cursor;
                self.ensure_bounds(false);
                self.cursor_changed = true;
            }
        }
    }

    // Editing

    /// Insert blank lines at the cursor row (IL)
    pub fn insert_lines(&mut self, count: usize) {
        let count = count.max(1);
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        if (top..=bottom).contains(&self.cursor.y) {
            let y = self.cursor.y;
            self.active_mut().insert_lines(count, y, bottom);
            self.is_dirty = true;
            self.carriage_return();
        }
    }

    /// Delete lines at the cursor row (DL)
    pub fn delete_lines(&mut self, count: usize) {
        let count = count.max(1);
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        if (top..=bottom).contains(&self.cursor.y) {
            let y = self.cursor.y;
            self.active_mut().delete_lines(count, y, bottom);
            self.is_dirty = true;
            self.carriage_return();
        }
    }

    /// Insert blank cells at the cursor, shifting the rest right (ICH)
    pub fn insert_characters(&mut self, count: usize) {
        let count = count.max(1);
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        if (top..=bottom).contains(&self.cursor.y) {
            let (x, y) = (self.cursor.x, self.cursor.y);
            let num = (self.columns - x).min(count);
            let attrs = self.cursor.attrs;
            let line = self.active_mut().line_mut(y);
            line.right_shift(x, num);
            line.erase(x, num, attrs);
            self.is_dirty = true;
        }
    }

    /// Delete cells at the cursor, shifting the rest left (DCH)
    pub fn delete_characters(&mut self, count: usize) {
        let count = count.max(1);
        let (top, bottom) = (self.margin_top, self.margin_bottom);
        if (top..=bottom).contains(&self.cursor.y) {
            let (x, y) = (self.cursor.x, self.cursor.y);
            let num = (self.columns - x).min(count);
            let attrs = self.cursor.attrs;
            let columns = self.columns;
            let line = self.active_mut().line_mut(y);
            line.left_shift(x, num);
            line.erase(columns - num, num, attrs);
            self.is_dirty = true;
        }
    }

    /// Blank cells at the cursor without shifting (ECH)
    pub fn erase_characters(&mut self, count: usize) {
        let count = count.max(1);
        let (x, y) = (self.cursor.x, self.cursor.y);
        let num = (self.columns - x).min(count);
        let attrs = self.cursor.attrs;
        self.active_mut().line_mut(y).erase(x, num, attrs);
        self.is_dirty = true;
    }

    /// Erase within the cursor row (EL). `private` keeps attributes.
    pub fn erase_in_line(&mut self, how: u32, private: bool) {
        let (start, n) = match how {
            0 => (self.cursor.x, self.columns - self.cursor.x),
            1 => (0, self.cursor.x + 1),
            2 => (0, self.columns),
            _ => return,
        };
        if n == 0 {
            return;
        }
        let y = self.cursor.y;
        let attrs = self.cursor.attrs;
        let line = self.active_mut().line_mut(y);
        if private {
            line.erase_text(start, n);
        } else {
            line.erase(start, n, attrs);
        }
        self.is_dirty = true;
    }

    /// Erase whole rows of the display (ED). `private` keeps attributes.
    pub fn erase_in_display(&mut self, how: u32, private: bool) {
        let (a, b) = match how {
            0 => (self.cursor.y + 1, self.lines),
            1 => (0, self.cursor.y),
            2 => (0, self.lines),
            _ => return,
        };
        if b > a {
            let columns = self.columns;
            let attrs = self.cursor.attrs;
            for y in a..b {
                let line = self.active_mut().line_mut(y);
                if private {
                    line.erase_text(0, columns);
                } else {
                    line.erase(0, columns, attrs);
                }
            }
            self.is_dirty = true;
        }
        if how != 2 {
            self.erase_in_line(how, private);
        }
    }

    /// DECALN: fill the screen with 'E', reset margins, home the cursor
    pub fn alignment_display(&mut self) {
        self.margin_top = 0;
        self.margin_bottom = self.lines - 1;
        self.cursor_position(1, 1);
        for y in 0..self.lines {
            self.active_mut().line_mut(y).fill_char('E');
        }
        self.is_dirty = true;
    }

    // SGR

    /// Apply a select-graphic-rendition parameter list to the cursor
    pub fn select_graphic_rendition(&mut self, params: &[u32]) {
        const RESET: &[u32] = &[0];
        let params = if params.is_empty() { RESET } else { params };
        let mut i = 0;
        while i < params.len() {
            let attr = params[i];
            i += 1;
            match attr {
                0 => self.cursor.reset_display_attrs(),
                1 => self.cursor.attrs.bold = true,
                3 => self.cursor.attrs.italic = true,
                4 => self.cursor.attrs.decoration = Decoration::Straight,
                UNDERCURL_CODE => self.cursor.attrs.decoration = Decoration::Curly,
                7 => self.cursor.attrs.reverse = true,
                9 => self.cursor.attrs.strikethrough = true,
                22 => self.cursor.attrs.bold = false,
                23 => self.cursor.attrs.italic = false,
                24 => self.cursor.attrs.decoration = Decoration::None,
                27 => self.cursor.attrs.reverse = false,
                29 => self.cursor.attrs.strikethrough = false,
                30..=37 => self.cursor.attrs.fg = Color::Indexed((attr - 30) as u8),
                38 => {
                    let (color, used) = parse_extended_color(&params[i..]);
                    if let Some(color) = color {
                        self.cursor.attrs.fg = color;
                    }
                    i += used;
                }
                39 => self.cursor.attrs.fg = Color::Default,
                40..=47 => self.cursor.attrs.bg = Color::Indexed((attr - 40) as u8),
                48 => {
                    let (color, used) = parse_extended_color(&params[i..]);
                    if let Some(color) = color {
                        self.cursor.attrs.bg = color;
                    }
                    i += used;
                }
                49 => self.cursor.attrs.bg = Color::Default,
                90..=97 => self.cursor.attrs.fg = Color::Indexed((attr - 90 + 8) as u8),
                100..=107 => self.cursor.attrs.bg = Color::Indexed((attr - 100 + 8) as u8),
                DECORATION_FG_CODE => {
                    let (color, used) = parse_extended_color(&params[i..]);
                    if let Some(color) = color {
                        self.cursor.attrs.decoration_fg = color;
                    }
                    i += used;
                }
                59 => self.cursor.attrs.decoration_fg = Color::Default,
                _ => {} // unknown SGR codes are ignored
            }
        }
    }

    // Modes

    /// Set a mode. Private codes are shifted into their own space
    /// before dispatch.
    pub fn set_mode(&mut self, code: u32, private: bool) {
        self.set_mode_value(route_mode(code, private), true);
    }

    /// Reset a mode
    pub fn reset_mode(&mut self, code: u32, private: bool) {
        self.set_mode_value(route_mode(code, private), false);
    }

    fn set_mode_value(&mut self, mode: u32, val: bool) {
        match mode {
            modes::LNM => self.modes.lnm = val,
            modes::IRM => self.modes.irm = val,
            modes::DECARM => self.modes.decarm = val,
            modes::DECCKM => self.modes.decckm = val,
            modes::DECAWM => self.modes.decawm = val,
            modes::BRACKETED_PASTE => self.modes.bracketed_paste = val,
            modes::EXTENDED_KEYBOARD => self.modes.extended_keyboard = val,
            modes::FOCUS_TRACKING => self.modes.focus_tracking = val,
            modes::MOUSE_BUTTON_TRACKING => {
                self.modes.mouse_tracking_mode = if val {
                    MouseTrackingMode::Button
                } else {
                    MouseTrackingMode::Off
                };
            }
            modes::MOUSE_MOTION_TRACKING => {
                self.modes.mouse_tracking_mode = if val {
                    MouseTrackingMode::Motion
                } else {
                    MouseTrackingMode::Off
                };
            }
            modes::MOUSE_MOVE_TRACKING => {
                self.modes.mouse_tracking_mode = if val {
                    MouseTrackingMode::Any
                } else {
                    MouseTrackingMode::Off
                };
            }
            modes::MOUSE_UTF8_MODE => {
                self.modes.mouse_tracking_protocol = if val {
                    MouseTrackingProtocol::Utf8
                } else {
                    MouseTrackingProtocol::Normal
                };
            }
            modes::MOUSE_SGR_MODE => {
                self.modes.mouse_tracking_protocol = if val {
                    MouseTrackingProtocol::Sgr
                } else {
                    MouseTrackingProtocol::Normal
                };
            }
            modes::MOUSE_URXVT_MODE => {
                self.modes.mouse_tracking_protocol = if val {
                    MouseTrackingProtocol::Urxvt
                } else {
                    MouseTrackingProtocol::Normal
                };
            }
            modes::DECSCLM | modes::DECNRCM => {} // accepted, ignored
            modes::DECTCEM => {
                self.modes.dectcem = val;
                self.cursor_changed = true;
            }
            modes::DECSCNM => {
                if self.modes.decscnm != val {
                    self.modes.decscnm = val;
                    self.is_dirty = true;
                }
            }
            modes::DECOM => {
                self.modes.decom = val;
                // DECOM also homes the cursor, per vttest
                self.cursor_position(1, 1);
            }
            modes::DECCOLM => {
                self.modes.deccolm = val;
                self.erase_in_display(2, false);
                self.cursor_position(1, 1);
            }
            modes::CONTROL_CURSOR_BLINK => {
                self.cursor.blink = val;
                self.cursor_changed = true;
            }
            modes::ALTERNATE_SCREEN => {
                if val != self.using_alt {
                    self.toggle_alt_screen();
                }
            }
            _ => {
                let private = mode >= 1 << PRIVATE_MODE_SHIFT;
                let code = if private { mode >> PRIVATE_MODE_SHIFT } else { mode };
                log::warn!(
                    "unsupported screen mode: {}{}",
                    code,
                    if private { " (private)" } else { "" }
                );
            }
        }
    }

    // Reports

    fn write_to_child(&mut self, data: &[u8]) {
        self.sink.write_to_child(data);
    }

    /// Answer a device attributes query (DA)
    pub fn report_device_attributes(&mut self, mode: u32, start_modifier: Option<char>) {
        if mode != 0 {
            return;
        }
        match start_modifier {
            None => self.write_to_child(b"\x1b[?62;c"), // VT-220, no extra info
            Some('>') => {
                let report = format!("\x1b[>1;{};{}c", PRIMARY_VERSION, SECONDARY_VERSION);
                self.write_to_child(report.as_bytes());
            }
            Some(_) => {}
        }
    }

    /// Answer a device status query (DSR): 5 is status, 6 is the
    /// cursor position report
    pub fn report_device_status(&mut self, which: u32, private: bool) {
        match which {
            5 => self.write_to_child(b"\x1b[0n"),
            6 => {
                let (mut x, mut y) = (self.cursor.x, self.cursor.y);
                if x >= self.columns {
                    if y < self.lines - 1 {
                        x = 0;
                        y += 1;
                    } else {
                        x -= 1;
                    }
                }
                if self.modes.decom {
                    y = y.saturating_sub(self.margin_top);
                }
                let report = format!(
                    "\x1b[{}{};{}R",
                    if private { "?" } else { "" },
                    y + 1,
                    x + 1
                );
                self.write_to_child(report.as_bytes());
            }
            _ => {}
        }
    }

    /// Answer a mode status query (DECRQM) with DECRPM:
    /// 1 set, 2 reset, 3 permanently set, 0 unrecognized
    pub fn report_mode_status(&mut self, which: u32, private: bool) {
        let mode = route_mode(which, private);
        let status = match mode {
            modes::LNM => known_mode(self.modes.lnm),
            modes::IRM => known_mode(self.modes.irm),
            modes::DECTCEM => known_mode(self.modes.dectcem),
            modes::DECSCNM => known_mode(self.modes.decscnm),
            modes::DECOM => known_mode(self.modes.decom),
            modes::DECAWM => known_mode(self.modes.decawm),
            modes::DECCOLM => known_mode(self.modes.deccolm),
            modes::DECARM => known_mode(self.modes.decarm),
            modes::DECCKM => known_mode(self.modes.decckm),
            modes::BRACKETED_PASTE => known_mode(self.modes.bracketed_paste),
            modes::EXTENDED_KEYBOARD => known_mode(self.modes.extended_keyboard),
            modes::FOCUS_TRACKING => known_mode(self.modes.focus_tracking),
            modes::STYLED_UNDERLINES => 3,
            _ => 0,
        };
        let report = format!(
            "\x1b[{}{};{}$y",
            if private { "?" } else { "" },
            which,
            status
        );
        self.write_to_child(report.as_bytes());
    }

    // Margins

    /// Set the scroll region (DECSTBM), 1-based; zero selects the
    /// screen edge. Regions of fewer than two rows are ignored.
    pub fn set_margins(&mut self, top: usize, bottom: usize) {
        let top = if top == 0 { 1 } else { top }.min(self.lines);
        let bottom = if bottom == 0 { self.lines } else { bottom }.min(self.lines);
        let (top, bottom) = (top - 1, bottom - 1);
        if bottom > top {
            self.margin_top = top;
            self.margin_bottom = bottom;
            // The cursor homes when the scrolling region changes
            self.cursor_position(1, 1);
        }
    }

    // Charsets

    /// Bind a charset to G0 or G1 from its designation final byte
    pub fn designate_charset(&mut self, slot: u32, code: char) {
        let charset = parse_charset_designation(code);
        match slot {
            0 => self.charset.designate(CharsetSlot::G0, charset),
            1 => self.charset.designate(CharsetSlot::G1, charset),
            _ => {}
        }
    }

    /// Select the active G slot
    pub fn change_charset(&mut self, which: u32) {
        match which {
            0 => self.charset.set_active(CharsetSlot::G0),
            1 => self.charset.set_active(CharsetSlot::G1),
            _ => {}
        }
    }

    /// Shift In (SI): G0 becomes active
    pub fn shift_in(&mut self) {
        self.change_charset(0);
    }

    /// Shift Out (SO): G1 becomes active
    pub fn shift_out(&mut self) {
        self.change_charset(1);
    }

    /// Toggle the latin-1 input override and reset the decoder
    pub fn use_latin1(&mut self, on: bool) {
        self.charset.use_latin1 = on;
        self.charset.reset_decoder();
        self.sink.use_utf8(!on);
    }

    // Device control pass-throughs

    /// BEL
    pub fn bell(&mut self) {
        self.sink.bell();
    }

    /// OSC 0/2 title change
    pub fn set_title(&mut self, title: &str) {
        self.sink.title_changed(title);
    }

    /// OSC 0/1 icon change
    pub fn set_icon(&mut self, icon: &str) {
        self.sink.icon_changed(icon);
    }

    /// OSC 10-19 dynamic color; empty value resets
    pub fn set_dynamic_color(&mut self, code: u32, value: &str) {
        self.sink.set_dynamic_color(code, value);
    }

    /// OSC 4/104 color table entry; empty value resets
    pub fn set_color_table_color(&mut self, code: u32, value: &str) {
        self.sink.set_color_table_color(code, value);
    }

    /// XTGETTCAP pass-through
    pub fn request_capabilities(&mut self, query: &str) {
        self.sink.request_capabilities(query);
    }

    /// DECSCUSR and friends; `secondary` is the intermediate byte
    pub fn set_cursor(&mut self, mode: u32, secondary: u8) {
        match secondary {
            0 | b'"' => {} // DECLL / DECSCA
            b' ' => {
                let (shape, blink) = if mode == 0 {
                    (CursorShape::Unspecified, false)
                } else {
                    let shape = match mode {
                        1..=2 => CursorShape::Block,
                        3..=4 => CursorShape::Underline,
                        5..=6 => CursorShape::Beam,
                        _ => CursorShape::Unspecified,
                    };
                    (shape, mode % 2 == 1)
                };
                if shape != self.cursor.shape || blink != self.cursor.blink {
                    self.cursor.shape = shape;
                    self.cursor.blink = blink;
                    self.cursor_changed = true;
                }
            }
            _ => {}
        }
    }

    // Lifecycle

    /// Full reset (RIS): back to the main buffer with default modes,
    /// charsets, margins and tab stops. Capacity and sink are kept.
    pub fn reset(&mut self) {
        if self.using_alt {
            self.toggle_alt_screen();
        }
        self.main_linebuf.clear_all();
        self.modes.reset();
        self.charset.reset();
        self.margin_top = 0;
        self.margin_bottom = self.lines - 1;
        self.main_tabstops = default_tabstops(self.columns);
        self.alt_tabstops = default_tabstops(self.columns);
        self.cursor.reset();
        self.is_dirty = true;
        self.cursor_changed = true;
        self.cursor_position(1, 1);
        self.sink.set_dynamic_color(110, "");
        self.sink.set_dynamic_color(111, "");
        self.sink.set_color_table_color(104, "");
    }

    /// Resize the screen, reflowing both buffers and the history.
    /// On allocation failure the pre-call state is left untouched.
    pub fn resize(&mut self, lines: usize, columns: usize) -> Result<()> {
        let lines = lines.max(1);
        let columns = columns.max(1);
        let is_main = !self.using_alt;
        let is_x_shrink = columns < self.columns;

        let mut new_history = self.historybuf.clone();
        new_history.rewrap(columns)?;
        let (new_main, main_cursor_y) = self.main_linebuf.rewrap(
            lines,
            columns,
            if is_main { self.cursor.y } else { 0 },
            Some(&mut new_history),
        )?;
        let (new_alt, alt_cursor_y) = self.alt_linebuf.rewrap(
            lines,
            columns,
            if is_main { 0 } else { self.cursor.y },
            None,
        )?;

        self.historybuf = new_history;
        self.main_linebuf = new_main;
        self.alt_linebuf = new_alt;

        let mut index_after_resize = false;
        if is_main {
            self.cursor.y = main_cursor_y;
            let line = self.main_linebuf.line(self.cursor.y.min(lines - 1));
            if is_x_shrink && (line.continued || line.occupied() > columns) {
                // The client will redraw the cursor line; give it a
                // fresh row so it does not overprint wrapped text
                index_after_resize = true;
            }
        } else {
            self.cursor.y = alt_cursor_y;
        }
        if self.cursor.x >= columns {
            self.cursor.x = columns - 1;
        }

        self.lines = lines;
        self.columns = columns;
        self.margin_top = 0;
        self.margin_bottom = lines - 1;
        self.main_tabstops = default_tabstops(columns);
        self.alt_tabstops = default_tabstops(columns);
        self.is_dirty = true;
        self.cursor_changed = true;
        if index_after_resize {
            self.index();
        }
        Ok(())
    }

    /// Change the scrollback retention, floored at the screen height
    pub fn change_scrollback_size(&mut self, capacity: usize) -> Result<()> {
        self.historybuf.set_capacity(capacity.max(self.lines))
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("lines", &self.lines)
            .field("columns", &self.columns)
            .field("cursor", &self.cursor)
            .field("using_alt", &self.using_alt)
            .field("modes", &self.modes)
            .finish_non_exhaustive()
    }
}

fn default_tabstops(columns: usize) -> Vec<bool> {
    let mut stops = vec![false; columns];
    for i in (DEFAULT_TAB_WIDTH..columns).step_by(DEFAULT_TAB_WIDTH) {
        stops[i] = true;
    }
    stops
}

fn route_mode(code: u32, private: bool) -> u32 {
    if private {
        code << PRIVATE_MODE_SHIFT
    } else {
        code
    }
}

fn known_mode(set: bool) -> u32 {
    if set {
        1
    } else {
        2
    }
}

/// Characters the screen swallows: C0/C1 controls the parser did not
/// route, DEL and the BOM. ZWJ/ZWNJ pass through as zero-width draws.
fn is_ignored_char(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}' | '\u{feff}')
}

/// Parse the tail of an SGR 38/48/58 extended color: `5;idx` or
/// `2;r;g;b`. Returns the color and how many parameters were consumed.
fn parse_extended_color(params: &[u32]) -> (Option<Color>, usize) {
    match params.first() {
        Some(5) => match params.get(1) {
            Some(&idx) => (Some(Color::Indexed((idx & 0xFF) as u8)), 2),
            None => (None, 1),
        },
        Some(2) if params.len() >= 4 => {
            let color = Color::rgb(
                (params[1] & 0xFF) as u8,
                (params[2] & 0xFF) as u8,
                (params[3] & 0xFF) as u8,
            );
            (Some(color), 4)
        }
        Some(_) => (None, 1),
        None => (None, 0),
    }
}
