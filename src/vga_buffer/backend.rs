// src/vga_buffer/backend.rs

//! Low-level cell buffer access abstractions.
//!
//! [`CellBuffer`] lets the text console target any backing store: the
//! classic text-mode memory at `0xB8000`, the same memory remapped at an
//! offset, or a plain slice for tests and off-screen consoles.
//!
//! Indices are linear (`row * width + col`). Out-of-range accesses are
//! ignored rather than reported; the console validates its geometry against
//! [`CellBuffer::capacity`] once at init.

use super::color::Cell;
use super::constants::{CELL_CAPACITY, VGA_BUFFER_ADDR};
use core::ptr::NonNull;

/// Abstraction over character cell memory.
pub trait CellBuffer {
    /// Total number of addressable cells.
    fn capacity(&self) -> usize;

    /// Read the cell at `index`; out-of-range reads yield a blank cell.
    fn read(&self, index: usize) -> Cell;

    /// Write `cell` at `index`; out-of-range writes are dropped.
    fn write(&mut self, index: usize, cell: Cell);

    /// Copy `count` cells from `src` to `dst`. Ranges may overlap.
    fn copy_within(&mut self, src: usize, dst: usize, count: usize);

    /// Fill `count` cells starting at `start` with `cell`.
    fn fill(&mut self, start: usize, count: usize, cell: Cell) {
        let end = start.saturating_add(count).min(self.capacity());
        for index in start..end {
            self.write(index, cell);
        }
    }
}

#[inline]
fn range_fits(start: usize, count: usize, capacity: usize) -> bool {
    start.checked_add(count).is_some_and(|end| end <= capacity)
}

/// Concrete backend that talks to the legacy text-mode memory.
#[derive(Debug, Clone, Copy)]
pub struct TextModeBuffer {
    ptr: NonNull<u16>,
}

// SAFETY: the text window is plain memory-mapped RAM; the console that owns
// the buffer is kept behind a mutex.
unsafe impl Send for TextModeBuffer {}

impl TextModeBuffer {
    /// Construct a backend over the identity-mapped window at 0xB8000.
    ///
    /// # Safety
    ///
    /// Physical 0xB8000..0xC0000 must be mapped writable at the same
    /// virtual address and not be used by anything else.
    #[must_use]
    pub const unsafe fn new() -> Self {
        // SAFETY: VGA_BUFFER_ADDR is non-zero and 2-byte aligned.
        unsafe { Self::at(VGA_BUFFER_ADDR) }
    }

    /// Construct a backend at a remapped virtual address.
    ///
    /// # Safety
    ///
    /// `addr` must be non-zero, 2-byte aligned and map the 32 KiB text
    /// window writable for the lifetime of the buffer.
    #[must_use]
    pub const unsafe fn at(addr: usize) -> Self {
        Self {
            // SAFETY: caller guarantees addr is non-zero.
            ptr: unsafe { NonNull::new_unchecked(addr as *mut u16) },
        }
    }
}

impl CellBuffer for TextModeBuffer {
    fn capacity(&self) -> usize {
        CELL_CAPACITY
    }

    fn read(&self, index: usize) -> Cell {
        if index >= CELL_CAPACITY {
            return Cell::blank();
        }
        // SAFETY: index is inside the text window guaranteed by `at`.
        Cell::from_raw(unsafe { core::ptr::read_volatile(self.ptr.as_ptr().add(index)) })
    }

    fn write(&mut self, index: usize, cell: Cell) {
        if index >= CELL_CAPACITY {
            return;
        }
        // SAFETY: index is inside the text window guaranteed by `at`.
        unsafe {
            core::ptr::write_volatile(self.ptr.as_ptr().add(index), cell.raw());
        }
    }

    fn copy_within(&mut self, src: usize, dst: usize, count: usize) {
        if count == 0
            || !range_fits(src, count, CELL_CAPACITY)
            || !range_fits(dst, count, CELL_CAPACITY)
        {
            return;
        }
        // SAFETY: both ranges were checked against the window; ptr::copy
        // handles the overlap of a one-row scroll.
        unsafe {
            core::ptr::copy(
                self.ptr.as_ptr().add(src),
                self.ptr.as_ptr().add(dst),
                count,
            );
        }
    }
}

/// Backend over caller-owned memory.
#[derive(Debug)]
pub struct SliceBuffer<'a> {
    cells: &'a mut [u16],
}

impl<'a> SliceBuffer<'a> {
    pub fn new(cells: &'a mut [u16]) -> Self {
        Self { cells }
    }

    /// Raw cell values, row-major
    pub fn as_slice(&self) -> &[u16] {
        self.cells
    }
}

impl CellBuffer for SliceBuffer<'_> {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, index: usize) -> Cell {
        self.cells
            .get(index)
            .copied()
            .map_or(Cell::blank(), Cell::from_raw)
    }

    fn write(&mut self, index: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell.raw();
        }
    }

    fn copy_within(&mut self, src: usize, dst: usize, count: usize) {
        let capacity = self.cells.len();
        if !range_fits(src, count, capacity) || !range_fits(dst, count, capacity) {
            return;
        }
        self.cells.copy_within(src..src + count, dst);
    }

    fn fill(&mut self, start: usize, count: usize, cell: Cell) {
        let end = start.saturating_add(count).min(self.cells.len());
        if start < end {
            self.cells[start..end].fill(cell.raw());
        }
    }
}
