// src/vga_buffer/color.rs

//! VGA color definitions and the packed display cell

/// VGA color codes (4-bit color palette)
#[allow(dead_code)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VgaColor {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// Color code combining foreground and background colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCode(u8);

impl ColorCode {
    /// Create a new color code from foreground and background colors
    pub const fn new(fg: VgaColor, bg: VgaColor) -> Self {
        Self((bg as u8) << 4 | (fg as u8))
    }

    /// Get the raw byte value
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// The console's only attribute: white on black
    pub const fn console() -> Self {
        Self::new(VgaColor::White, VgaColor::Black)
    }
}

/// One (attribute, character) unit of the text grid.
///
/// Laid out the way the hardware reads it: character in the low byte,
/// attribute in the high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Cell(u16);

impl Cell {
    /// Pack a character with the console attribute
    pub const fn new(ch: u8) -> Self {
        Self::with_color(ch, ColorCode::console())
    }

    pub const fn with_color(ch: u8, color: ColorCode) -> Self {
        Self((color.as_u8() as u16) << 8 | ch as u16)
    }

    /// Attribute-preserved space
    pub const fn blank() -> Self {
        Self::new(b' ')
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn character(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub const fn attribute(self) -> u8 {
        (self.0 >> 8) as u8
    }
}
