// src/vga_buffer/writer.rs

//! Text console: cursor tracking, control characters, wrap and scroll.

use super::backend::CellBuffer;
use super::color::Cell;
use super::constants::{BACKSPACE, CARRIAGE_RETURN, NEWLINE, VGA_HEIGHT, VGA_WIDTH};
use core::fmt;

/// Character-cell console over a [`CellBuffer`].
///
/// The cursor always satisfies `x < width` and `y < height` between calls.
/// Inside a call `x` may reach `width` and `y` may reach `height` until the
/// next wrap check folds them back (scrolling if needed).
#[derive(Debug)]
pub struct TextConsole<B: CellBuffer> {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    buffer: B,
}

impl<B: CellBuffer> TextConsole<B> {
    /// Create a console with the default 80x25 geometry.
    pub fn new(buffer: B) -> Self {
        let mut console = Self {
            x: 0,
            y: 0,
            width: VGA_WIDTH,
            height: VGA_HEIGHT,
            buffer,
        };
        console.init(VGA_HEIGHT, VGA_WIDTH);
        console
    }

    /// Reset the cursor and set the grid geometry.
    ///
    /// Does not touch the cells; call [`clear`](Self::clear) for a blank
    /// screen. Each dimension is at least 1, and the height is reduced if
    /// `height * width` would exceed the backend capacity.
    pub fn init(&mut self, height: usize, width: usize) {
        let capacity = self.buffer.capacity().max(1);
        self.width = width.clamp(1, capacity);
        self.height = height.clamp(1, capacity / self.width);
        self.x = 0;
        self.y = 0;
    }

    /// Write every byte of `s` (see [`write_bytes`](Self::write_bytes)).
    pub fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Write raw 8-bit character codes.
    ///
    /// `\x08` steps back one cell and blanks it (nothing at column 0),
    /// `\n` starts the next line, `\r` returns to column 0. Every other code
    /// is stored verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.check();

        for &byte in bytes {
            match byte {
                BACKSPACE => {
                    if self.x > 0 {
                        self.x -= 1;
                        self.put(self.x, self.y, Cell::blank());
                    }
                }
                NEWLINE => {
                    self.y += 1;
                    self.x = 0;
                    self.check();
                }
                CARRIAGE_RETURN => self.x = 0,
                _ => {
                    self.check();
                    self.put(self.x, self.y, Cell::new(byte));
                    self.x += 1;
                }
            }
        }

        self.check();
    }

    /// Wrap and scroll check
    fn check(&mut self) {
        if self.x >= self.width {
            self.x = 0;
            self.y += 1;
        }
        if self.y >= self.height {
            self.y = self.height - 1;
            self.scroll();
        }
    }

    /// Move every row up by one and blank the last row.
    ///
    /// The top row is discarded; there is no scroll-back.
    pub fn scroll(&mut self) {
        let row = self.width;
        self.buffer.copy_within(row, 0, row * (self.height - 1));
        self.buffer.fill(row * (self.height - 1), row, Cell::blank());
    }

    /// Blank every cell and home the cursor.
    pub fn clear(&mut self) {
        self.x = 0;
        self.y = 0;
        self.buffer.fill(0, self.width * self.height, Cell::blank());
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, cell: Cell) {
        self.buffer.write(y * self.width + x, cell);
    }

    /// Cursor as `(x, y)`
    pub fn cursor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Geometry as `(height, width)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Cell {
        if row >= self.height || col >= self.width {
            return Cell::blank();
        }
        self.buffer.read(row * self.width + col)
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }
}

impl<B: CellBuffer> fmt::Write for TextConsole<B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vga_buffer::backend::SliceBuffer;

    fn row_text<B: CellBuffer>(console: &TextConsole<B>, row: usize) -> Vec<u8> {
        let (_, width) = console.dimensions();
        (0..width).map(|col| console.cell_at(row, col).character()).collect()
    }

    #[test]
    fn test_init_resets_cursor() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.write_string("abc");
        console.init(25, 80);
        assert_eq!(console.cursor(), (0, 0));
    }

    #[test]
    fn test_init_clamps_to_capacity() {
        let mut cells = [0u16; 40];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.init(25, 10);
        assert_eq!(console.dimensions(), (4, 10));

        console.init(0, 0);
        assert_eq!(console.dimensions(), (1, 1));
    }

    #[test]
    fn test_plain_text_advances_cursor() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.write_string("Hi");
        assert_eq!(console.cursor(), (2, 0));
        assert_eq!(console.cell_at(0, 0), Cell::new(b'H'));
        assert_eq!(console.cell_at(0, 1).raw(), 0x0F69);
    }

    #[test]
    fn test_backspace_blanks_previous_cell() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.write_string("ab\x08");
        assert_eq!(console.cursor(), (1, 0));
        assert_eq!(console.cell_at(0, 1), Cell::blank());
        assert_eq!(console.cell_at(0, 0), Cell::new(b'a'));
    }

    #[test]
    fn test_backspace_at_column_zero_is_noop() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.clear();
        console.write_string("x\n\x08");
        assert_eq!(console.cursor(), (0, 1));
        assert_eq!(console.cell_at(0, 0), Cell::new(b'x'));
        assert_eq!(console.cell_at(0, 79), Cell::blank());
    }

    #[test]
    fn test_carriage_return_overwrites_line() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.write_string("abc\rX");
        assert_eq!(console.cursor(), (1, 0));
        assert_eq!(&row_text(&console, 0)[..3], b"Xbc");
    }

    #[test]
    fn test_non_ascii_bytes_stored_verbatim() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.write_bytes(&[0xDB, 0x01]);
        assert_eq!(console.cell_at(0, 0).character(), 0xDB);
        assert_eq!(console.cell_at(0, 1).character(), 0x01);
    }

    #[test]
    fn test_wrap_after_full_row() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.clear();
        console.write_string(&"A".repeat(80));
        console.write_string("B");
        assert_eq!(console.cursor(), (1, 1));
        assert!(row_text(&console, 0).iter().all(|&c| c == b'A'));
        assert_eq!(console.cell_at(1, 0), Cell::new(b'B'));
    }

    #[test]
    fn test_newline_on_last_row_scrolls() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.clear();
        for _ in 0..24 {
            console.write_string("\n");
        }
        console.write_string("last");
        assert_eq!(console.cursor(), (4, 24));

        console.write_string("\n");
        assert_eq!(console.cursor(), (0, 24));
        assert_eq!(&row_text(&console, 23)[..4], b"last");
        assert!(row_text(&console, 24).iter().all(|&c| c == b' '));
    }

    #[test]
    fn test_scroll_shifts_rows() {
        let mut cells = [0u16; 4 * 3];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.init(3, 4);
        console.write_string("aaaa");
        console.write_string("bbbb");
        console.write_string("cc");
        console.scroll();
        assert_eq!(row_text(&console, 0), b"bbbb");
        assert_eq!(&row_text(&console, 1)[..2], b"cc");
        assert_eq!(row_text(&console, 2), b"    ");
    }

    #[test]
    fn test_clear_blanks_everything() {
        let mut cells = [0u16; 80 * 25];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.write_string("some text\nmore");
        console.clear();
        assert_eq!(console.cursor(), (0, 0));
        assert!(console.buffer().as_slice().iter().all(|&raw| raw == 0x0F20));
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut cells = [0u16; 7 * 5];
        let mut console = TextConsole::new(SliceBuffer::new(&mut cells));
        console.init(5, 7);
        let alphabet = [b'a', b'b', b'\n', b'\r', BACKSPACE, b'z', b' '];
        let mut seed: u32 = 0x1234_5678;
        for _ in 0..500 {
            let mut chunk = [0u8; 13];
            for byte in chunk.iter_mut() {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                *byte = alphabet[(seed >> 16) as usize % alphabet.len()];
            }
            console.write_bytes(&chunk);
            let (x, y) = console.cursor();
            assert!(x < 7 && y < 5, "cursor ({}, {}) escaped", x, y);
        }
    }
}
