// src/vga_buffer/constants.rs

//! Constants for VGA text buffer operations

/// VGA text buffer physical memory address
pub const VGA_BUFFER_ADDR: usize = 0xb8000;

/// Size of the text-mode memory window (0xB8000..0xC0000)
pub const VGA_WINDOW_BYTES: usize = 0x8000;

/// Default screen dimensions (BIOS mode 0x03)
pub const VGA_WIDTH: usize = 80;
pub const VGA_HEIGHT: usize = 25;

/// Bytes per character (1 byte ASCII + 1 byte color attribute)
pub const BYTES_PER_CHAR: usize = 2;

/// Number of cells addressable through the text-mode window
pub const CELL_CAPACITY: usize = VGA_WINDOW_BYTES / BYTES_PER_CHAR;

/// Control bytes interpreted by the console
pub const BACKSPACE: u8 = 0x08;
pub const NEWLINE: u8 = b'\n';
pub const CARRIAGE_RETURN: u8 = b'\r';
