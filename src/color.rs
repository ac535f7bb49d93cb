//! Color representation for terminal cells
//!
//! Supports:
//! - Default foreground/background
//! - 256-color palette (0-255)
//! - 24-bit true color (RGB)
//!
//! Cells and SGR exchange colors in a packed 32-bit form whose low
//! byte tags the variant: 0 = default, 1 = palette index, 2 = RGB.

use serde::{Deserialize, Serialize};

/// Color representation supporting all terminal color modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// Indexed color (0-255)
    /// 0-7: standard colors
    /// 8-15: bright colors
    /// 16-231: 6x6x6 color cube
    /// 232-255: grayscale
    Indexed(u8),
    /// 24-bit RGB color
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Standard ANSI color indices
    pub const BLACK: u8 = 0;
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const YELLOW: u8 = 3;
    pub const BLUE: u8 = 4;
    pub const MAGENTA: u8 = 5;
    pub const CYAN: u8 = 6;
    pub const WHITE: u8 = 7;

    /// Create a new indexed color
    pub fn indexed(index: u8) -> Self {
        Color::Indexed(index)
    }

    /// Create a new RGB color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Pack into the 32-bit wire encoding.
    ///
    /// `Default` is 0; a palette index is `(idx << 8) | 1`; direct RGB
    /// is `(r << 24) | (g << 16) | (b << 8) | 2`.
    pub fn to_bits(self) -> u32 {
        match self {
            Color::Default => 0,
            Color::Indexed(idx) => ((idx as u32) << 8) | 1,
            Color::Rgb { r, g, b } => ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | 2,
        }
    }

    /// Unpack from the 32-bit wire encoding. Unknown tags decode as
    /// `Default`.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0xFF {
            1 => Color::Indexed(((bits >> 8) & 0xFF) as u8),
            2 => Color::Rgb {
                r: ((bits >> 24) & 0xFF) as u8,
                g: ((bits >> 16) & 0xFF) as u8,
                b: ((bits >> 8) & 0xFF) as u8,
            },
            _ => Color::Default,
        }
    }

    /// Convert to RGB using the standard xterm palette
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Default => (255, 255, 255), // Default to white for foreground
            Color::Indexed(idx) => index_to_rgb(*idx),
            Color::Rgb { r, g, b } => (*r, *g, *b),
        }
    }
}

/// Convert a 256-color index to RGB values using xterm palette
fn index_to_rgb(index: u8) -> (u8, u8, u8) {
    match index {
        // Standard colors (0-7)
        0 => (0, 0, 0),       // Black
        1 => (205, 0, 0),     // Red
        2 => (0, 205, 0),     // Green
        3 => (205, 205, 0),   // Yellow
        4 => (0, 0, 238),     // Blue
        5 => (205, 0, 205),   // Magenta
        6 => (0, 205, 205),   // Cyan
        7 => (229, 229, 229), // White

        // Bright colors (8-15)
        8 => (127, 127, 127),  // Bright Black (Gray)
        9 => (255, 0, 0),      // Bright Red
        10 => (0, 255, 0),     // Bright Green
        11 => (255, 255, 0),   // Bright Yellow
        12 => (92, 92, 255),   // Bright Blue
        13 => (255, 0, 255),   // Bright Magenta
        14 => (0, 255, 255),   // Bright Cyan
        15 => (255, 255, 255), // Bright White

        // 6x6x6 color cube (16-231)
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (to_val(r), to_val(g), to_val(b))
        }

        // Grayscale (232-255)
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            (gray, gray, gray)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default(), Color::Default);
        assert_eq!(Color::Default.to_bits(), 0);
    }

    #[test]
    fn test_indexed_bits() {
        let color = Color::indexed(3);
        assert_eq!(color.to_bits(), (3 << 8) | 1);
        assert_eq!(Color::from_bits((3 << 8) | 1), color);
    }

    #[test]
    fn test_rgb_bits() {
        let color = Color::rgb(10, 20, 30);
        assert_eq!(color.to_bits(), (10 << 24) | (20 << 16) | (30 << 8) | 2);
        assert_eq!(Color::from_bits(color.to_bits()), color);
    }

    #[test]
    fn test_from_bits_unknown_tag() {
        assert_eq!(Color::from_bits(0xFF07), Color::Default);
    }

    #[test]
    fn test_standard_colors_to_rgb() {
        assert_eq!(Color::Indexed(0).to_rgb(), (0, 0, 0));
        assert_eq!(Color::Indexed(1).to_rgb(), (205, 0, 0));
        assert_eq!(Color::Indexed(7).to_rgb(), (229, 229, 229));
    }

    #[test]
    fn test_color_cube_to_rgb() {
        assert_eq!(Color::Indexed(16).to_rgb(), (0, 0, 0));
        assert_eq!(Color::Indexed(196).to_rgb(), (255, 0, 0));
    }

    #[test]
    fn test_grayscale_to_rgb() {
        assert_eq!(Color::Indexed(232).to_rgb(), (8, 8, 8));
        assert_eq!(Color::Indexed(255).to_rgb(), (238, 238, 238));
    }
}
