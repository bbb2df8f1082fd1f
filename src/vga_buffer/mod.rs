// src/vga_buffer/mod.rs

//! VGA text mode console
//!
//! This module provides the character-cell backend of the display:
//! - Packed (attribute, character) cells with one fixed attribute
//! - Backends for the legacy text memory and for plain slices
//! - Cursor tracking with backspace, newline and carriage return
//! - Line wrap and single-row scrolling (no scroll-back)
//!
//! The kernel-wide console instance and the `print!` macros live in
//! [`crate::display`].

mod backend;
mod color;
mod constants;
mod writer;

pub use backend::{CellBuffer, SliceBuffer, TextModeBuffer};
pub use color::{Cell, ColorCode, VgaColor};
pub use constants::{CELL_CAPACITY, VGA_BUFFER_ADDR, VGA_HEIGHT, VGA_WIDTH};
pub use writer::TextConsole;
