//! Caption Cell
//!
//! Represents a single cell in a caption memory grid, containing an
//! optional glyph and its styling attributes. Every cell always carries
//! a concrete style so that emitted runs never have undefined styling.

use serde::{Deserialize, Serialize};

/// Caption color as defined by CEA-608 preamble and mid-row codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptionColor {
    White,
    Green,
    Blue,
    Cyan,
    Red,
    Yellow,
    Magenta,
    Black,
    /// Transparent background (extended attribute code)
    Transparent,
}

impl CaptionColor {
    /// Map the 3-bit color field shared by PAC, mid-row and background
    /// attribute codes. Value 7 is "white italics" for PAC/mid-row, so
    /// it maps to white here; the italic flag is handled separately.
    pub fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0 => CaptionColor::White,
            1 => CaptionColor::Green,
            2 => CaptionColor::Blue,
            3 => CaptionColor::Cyan,
            4 => CaptionColor::Red,
            5 => CaptionColor::Yellow,
            6 => CaptionColor::Magenta,
            _ => CaptionColor::White,
        }
    }
}

/// Text style attributes for a caption cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptionStyle {
    /// Text color
    pub color: CaptionColor,
    /// Background color
    pub background: CaptionColor,
    pub underline: bool,
    pub italic: bool,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            color: CaptionColor::White,
            background: CaptionColor::Black,
            underline: false,
            italic: false,
        }
    }
}

impl CaptionStyle {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A single cell in the caption grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The glyph in this cell, or `None` if nothing has been written
    pub glyph: Option<char>,
    /// Style attributes; defaulted (white on black) until written
    pub style: CaptionStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: None,
            style: CaptionStyle::default(),
        }
    }
}

impl Cell {
    /// Create a cell with a glyph and style
    pub fn new(glyph: char, style: CaptionStyle) -> Self {
        Self {
            glyph: Some(glyph),
            style,
        }
    }

    /// Check if this cell is empty (never written or erased)
    pub fn is_empty(&self) -> bool {
        self.glyph.is_none()
    }

    /// Clear the cell back to the default state
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The character this cell contributes to emitted text (space if empty)
    pub fn display_char(&self) -> char {
        self.glyph.unwrap_or(' ')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.style, CaptionStyle::default());
        assert_eq!(cell.display_char(), ' ');
    }

    #[test]
    fn test_cell_clear() {
        let style = CaptionStyle {
            color: CaptionColor::Red,
            underline: true,
            ..Default::default()
        };
        let mut cell = Cell::new('A', style);
        assert!(!cell.is_empty());
        cell.clear();
        assert!(cell.is_empty());
        assert_eq!(cell.style, CaptionStyle::default());
    }

    #[test]
    fn test_color_from_code() {
        assert_eq!(CaptionColor::from_code(0), CaptionColor::White);
        assert_eq!(CaptionColor::from_code(1), CaptionColor::Green);
        assert_eq!(CaptionColor::from_code(6), CaptionColor::Magenta);
        // 7 is the italics slot; color stays white
        assert_eq!(CaptionColor::from_code(7), CaptionColor::White);
    }

    #[test]
    fn test_default_style_is_white_on_black() {
        let style = CaptionStyle::default();
        assert_eq!(style.color, CaptionColor::White);
        assert_eq!(style.background, CaptionColor::Black);
        assert!(!style.underline);
        assert!(!style.italic);
    }
}
