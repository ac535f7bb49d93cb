//! Terminal mode state
//!
//! `ModeSet` holds the active DEC/ANSI modes. Mode code constants
//! mirror the parser routing convention: ANSI codes are used as-is,
//! DEC private codes are shifted left by five bits so the two spaces
//! cannot collide in one dispatch table.

use serde::{Deserialize, Serialize};

/// Shift applied to private mode codes before dispatch
pub const PRIVATE_MODE_SHIFT: u32 = 5;

// ANSI modes
pub const IRM: u32 = 4;
pub const LNM: u32 = 20;

// DEC private modes (pre-shifted)
pub const DECCKM: u32 = 1 << PRIVATE_MODE_SHIFT;
pub const DECCOLM: u32 = 3 << PRIVATE_MODE_SHIFT;
pub const DECSCLM: u32 = 4 << PRIVATE_MODE_SHIFT;
pub const DECSCNM: u32 = 5 << PRIVATE_MODE_SHIFT;
pub const DECOM: u32 = 6 << PRIVATE_MODE_SHIFT;
pub const DECAWM: u32 = 7 << PRIVATE_MODE_SHIFT;
pub const DECARM: u32 = 8 << PRIVATE_MODE_SHIFT;
pub const CONTROL_CURSOR_BLINK: u32 = 12 << PRIVATE_MODE_SHIFT;
pub const DECTCEM: u32 = 25 << PRIVATE_MODE_SHIFT;
pub const DECNRCM: u32 = 42 << PRIVATE_MODE_SHIFT;
pub const MOUSE_BUTTON_TRACKING: u32 = 1000 << PRIVATE_MODE_SHIFT;
pub const MOUSE_MOTION_TRACKING: u32 = 1002 << PRIVATE_MODE_SHIFT;
pub const MOUSE_MOVE_TRACKING: u32 = 1003 << PRIVATE_MODE_SHIFT;
pub const FOCUS_TRACKING: u32 = 1004 << PRIVATE_MODE_SHIFT;
pub const MOUSE_UTF8_MODE: u32 = 1005 << PRIVATE_MODE_SHIFT;
pub const MOUSE_SGR_MODE: u32 = 1006 << PRIVATE_MODE_SHIFT;
pub const MOUSE_URXVT_MODE: u32 = 1015 << PRIVATE_MODE_SHIFT;
pub const ALTERNATE_SCREEN: u32 = 1049 << PRIVATE_MODE_SHIFT;
pub const BRACKETED_PASTE: u32 = 2004 << PRIVATE_MODE_SHIFT;
pub const STYLED_UNDERLINES: u32 = 2016 << PRIVATE_MODE_SHIFT;
pub const EXTENDED_KEYBOARD: u32 = 2017 << PRIVATE_MODE_SHIFT;

/// Mouse tracking granularity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseTrackingMode {
    #[default]
    Off,
    /// Button press/release only
    Button,
    /// Motion while a button is held
    Motion,
    /// All motion
    Any,
}

/// Mouse coordinate encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseTrackingProtocol {
    #[default]
    Normal,
    Utf8,
    Sgr,
    Urxvt,
}

/// The active DEC/ANSI mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSet {
    /// LNM - linefeed implies carriage return
    pub lnm: bool,
    /// IRM - insert mode, writes shift cells right
    pub irm: bool,
    /// DECAWM - auto-wrap at the right margin
    pub decawm: bool,
    /// DECTCEM - cursor visible
    pub dectcem: bool,
    /// DECARM - auto-repeat keys
    pub decarm: bool,
    /// DECOM - cursor addressing relative to the scroll region
    pub decom: bool,
    /// DECSCNM - reverse video
    pub decscnm: bool,
    /// DECCKM - application cursor keys
    pub decckm: bool,
    /// DECCOLM - 132 column mode
    pub deccolm: bool,
    /// Bracketed paste
    pub bracketed_paste: bool,
    /// Extended keyboard reporting
    pub extended_keyboard: bool,
    /// Focus in/out reporting
    pub focus_tracking: bool,
    /// Mouse tracking granularity
    pub mouse_tracking_mode: MouseTrackingMode,
    /// Mouse coordinate encoding
    pub mouse_tracking_protocol: MouseTrackingProtocol,
}

impl ModeSet {
    /// Create a fresh mode set with power-on defaults
    pub fn new() -> Self {
        Self {
            lnm: false,
            irm: false,
            decawm: true,
            dectcem: true,
            decarm: true,
            decom: false,
            decscnm: false,
            decckm: false,
            deccolm: false,
            bracketed_paste: false,
            extended_keyboard: false,
            focus_tracking: false,
            mouse_tracking_mode: MouseTrackingMode::Off,
            mouse_tracking_protocol: MouseTrackingProtocol::Normal,
        }
    }

    /// Reset all modes to defaults
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ModeSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_defaults() {
        let modes = ModeSet::new();
        assert!(modes.decawm);
        assert!(modes.dectcem);
        assert!(modes.decarm);
        assert!(!modes.lnm);
        assert!(!modes.irm);
        assert!(!modes.decom);
        assert_eq!(modes.mouse_tracking_mode, MouseTrackingMode::Off);
    }

    #[test]
    fn test_modes_reset() {
        let mut modes = ModeSet::new();
        modes.decom = true;
        modes.dectcem = false;
        modes.reset();
        assert!(!modes.decom);
        assert!(modes.dectcem);
    }

    #[test]
    fn test_private_codes_do_not_collide_with_ansi() {
        assert_ne!(DECSCLM, IRM);
        assert_ne!(DECOM, LNM);
        assert_eq!(DECOM >> PRIVATE_MODE_SHIFT, 6);
    }
}
