//! Character set handling
//!
//! Supports the DEC Special Graphics (line drawing) and UK national
//! sets on the G0/G1 slots, plus the latin-1 override used by legacy
//! applications. The UTF-8 decoder fields belong to the byte decoder
//! collaborator; they live here so cursor save/restore can snapshot
//! the complete translation state.

use serde::{Deserialize, Serialize};

/// Character set designations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    /// ASCII (US) - default
    #[default]
    Ascii,
    /// DEC Special Graphics (line drawing characters)
    DecSpecialGraphics,
    /// UK character set
    Uk,
}

/// G-slot selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharsetSlot {
    #[default]
    G0,
    G1,
}

/// Full translation state: G0/G1 bindings, the active slot, the UTF-8
/// decoder registers and the latin-1 override flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharsetState {
    /// G0 character set
    pub g0: Charset,
    /// G1 character set
    pub g1: Charset,
    /// Currently active slot
    pub active: CharsetSlot,
    /// UTF-8 decoder state register
    pub utf8_state: u32,
    /// UTF-8 decoder partial codepoint
    pub utf8_codepoint: u32,
    /// Decode input as latin-1 instead of UTF-8
    pub use_latin1: bool,
}

impl CharsetState {
    /// Create the default state: ASCII in both slots, G0 active, UTF-8
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the default state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The charset bound to the active slot
    pub fn current(&self) -> Charset {
        match self.active {
            CharsetSlot::G0 => self.g0,
            CharsetSlot::G1 => self.g1,
        }
    }

    /// Rebind a slot. The active pointer follows the slot it was on.
    pub fn designate(&mut self, slot: CharsetSlot, charset: Charset) {
        match slot {
            CharsetSlot::G0 => self.g0 = charset,
            CharsetSlot::G1 => self.g1 = charset,
        }
    }

    /// Select the active slot
    pub fn set_active(&mut self, slot: CharsetSlot) {
        self.active = slot;
    }

    /// Clear the UTF-8 decoder registers
    pub fn reset_decoder(&mut self) {
        self.utf8_state = 0;
        self.utf8_codepoint = 0;
    }

    /// Translate a codepoint through the active charset. Only the
    /// single-byte range is subject to translation.
    pub fn translate(&self, c: char) -> char {
        if (c as u32) >= 256 {
            return c;
        }
        translate_char(c, self.current())
    }
}

/// Translate a character through a specific charset
pub fn translate_char(c: char, charset: Charset) -> char {
    match charset {
        Charset::Ascii => c,
        Charset::DecSpecialGraphics => translate_dec_special_graphics(c),
        Charset::Uk => translate_uk(c),
    }
}

/// Translate DEC Special Graphics characters
/// Maps ASCII 0x5F-0x7E to line drawing and other special characters
fn translate_dec_special_graphics(c: char) -> char {
    match c {
        '`' => '◆', // Diamond
        'a' => '▒', // Checkerboard
        'b' => '␉', // HT symbol
        'c' => '␌', // FF symbol
        'd' => '␍', // CR symbol
        'e' => '␊', // LF symbol
        'f' => '°',  // Degree symbol
        'g' => '±',  // Plus/minus
        'h' => '␤', // NL symbol
        'i' => '␋', // VT symbol
        'j' => '┘', // Lower right corner
        'k' => '┐', // Upper right corner
        'l' => '┌', // Upper left corner
        'm' => '└', // Lower left corner
        'n' => '┼', // Crossing lines
        'o' => '⎺', // Scan line 1
        'p' => '⎻', // Scan line 3
        'q' => '─', // Horizontal line (scan line 5)
        'r' => '⎼', // Scan line 7
        's' => '⎽', // Scan line 9
        't' => '├', // Left tee
        'u' => '┤', // Right tee
        'v' => '┴', // Bottom tee
        'w' => '┬', // Top tee
        'x' => '│', // Vertical line
        'y' => '≤', // Less than or equal
        'z' => '≥', // Greater than or equal
        '{' => 'π',  // Pi
        '|' => '≠', // Not equal
        '}' => '£',  // Pound sterling
        '~' => '·',  // Centered dot / bullet
        _ => c,      // Pass through unchanged
    }
}

/// Translate UK character set (only # differs)
fn translate_uk(c: char) -> char {
    match c {
        '#' => '£', // Pound sterling
        _ => c,
    }
}

/// Parse a charset designation final character
pub fn parse_charset_designation(c: char) -> Charset {
    match c {
        'B' | '@' => Charset::Ascii,
        '0' | '2' => Charset::DecSpecialGraphics,
        'A' => Charset::Uk,
        _ => Charset::Ascii, // Default to ASCII for unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_default() {
        let state = CharsetState::new();
        assert_eq!(state.g0, Charset::Ascii);
        assert_eq!(state.active, CharsetSlot::G0);
        assert!(!state.use_latin1);
    }

    #[test]
    fn test_dec_special_graphics() {
        assert_eq!(translate_dec_special_graphics('j'), '┘');
        assert_eq!(translate_dec_special_graphics('l'), '┌');
        assert_eq!(translate_dec_special_graphics('q'), '─');
        assert_eq!(translate_dec_special_graphics('x'), '│');
        assert_eq!(translate_dec_special_graphics('n'), '┼');
    }

    #[test]
    fn test_active_slot_translation() {
        let mut state = CharsetState::new();
        state.designate(CharsetSlot::G1, Charset::DecSpecialGraphics);
        assert_eq!(state.translate('q'), 'q');

        state.set_active(CharsetSlot::G1);
        assert_eq!(state.translate('q'), '─');
        assert_eq!(state.translate('A'), 'A');
    }

    #[test]
    fn test_translate_skips_high_codepoints() {
        let mut state = CharsetState::new();
        state.designate(CharsetSlot::G0, Charset::DecSpecialGraphics);
        assert_eq!(state.translate('語'), '語');
    }

    #[test]
    fn test_parse_designation() {
        assert_eq!(parse_charset_designation('B'), Charset::Ascii);
        assert_eq!(parse_charset_designation('0'), Charset::DecSpecialGraphics);
        assert_eq!(parse_charset_designation('A'), Charset::Uk);
        assert_eq!(parse_charset_designation('Z'), Charset::Ascii);
    }
}
