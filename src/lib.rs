// src/lib.rs
//! Tiny Display - text console and linear framebuffer subsystem
//!
//! Owns the two mutually exclusive display backends of the kernel: the
//! legacy VGA character-cell console and a VBE linear framebuffer driven
//! through a shadow back buffer. The mode selector decides once, at boot,
//! which of them is live.
//!
//! # Layout
//!
//! - [`vga_buffer`] - cell buffer backends and the text console
//! - [`framebuffer`] - mode descriptor, mode selector, drawing, refresh loop
//! - [`display`] - session object, kernel globals and `print!` macros
//! - [`memory`] - `x86_64` page mapper and boot frame allocator
//! - [`task`] - cooperative executor the refresh loop runs on

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_debug_implementations)]

extern crate alloc;

pub mod constants;
pub mod display;
pub mod errors;
pub mod framebuffer;
pub mod logging;
pub mod memory;
pub mod serial;
pub mod sync;
pub mod task;
pub mod vga_buffer;

pub use display::{is_text_mode, DisplaySession};
pub use errors::{DisplayError, DrawError, ErrorContext, MapError, ModeError};
pub use framebuffer::{
    init_graphics, Canvas, Compositor, FontTable, ModeDescriptor, ModeSelection, RefreshLoop,
    SurfaceDescriptor,
};
pub use vga_buffer::{Cell, CellBuffer, SliceBuffer, TextConsole, TextModeBuffer};

use linked_list_allocator::LockedHeap;

#[cfg_attr(target_os = "none", global_allocator)]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Heap initialization error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// Already initialized
    AlreadyInitialized,
    /// Null start or zero size
    InvalidRegion,
}

/// Hand `size` bytes at `start` to the kernel heap.
///
/// # Errors
///
/// `InvalidRegion` for a null or empty region, `AlreadyInitialized` on a
/// second call.
///
/// # Safety
///
/// The region must be writable, unused and valid for the rest of the run.
pub unsafe fn init_heap(start: *mut u8, size: usize) -> Result<(), HeapError> {
    if start.is_null() || size == 0 {
        return Err(HeapError::InvalidRegion);
    }
    let mut heap = ALLOCATOR.lock();
    if heap.size() != 0 {
        return Err(HeapError::AlreadyInitialized);
    }
    // SAFETY: guaranteed by the caller.
    unsafe { heap.init(start, size) };
    Ok(())
}

/// Heap usage as `(used, total)` bytes
pub fn heap_stats() -> (usize, usize) {
    let heap = ALLOCATOR.lock();
    (heap.used(), heap.size())
}

/// Halt loop
#[inline]
pub fn hlt_loop() -> ! {
    loop {
        #[cfg(target_os = "none")]
        x86_64::instructions::hlt();
        #[cfg(not(target_os = "none"))]
        core::hint::spin_loop();
    }
}
