// src/constants.rs

//! Display subsystem constants and configuration values
//!
//! Centralizes the firmware thresholds, glyph metrics and kernel sizing
//! used across the text and graphics backends. Text-buffer geometry lives
//! in [`crate::vga_buffer`] next to the hardware it describes.

/// Size of one page mapped for the framebuffer (4 KiB pages only)
pub const PAGE_SIZE: u64 = 4096;

/// Lowest VBE controller version with linear framebuffer support (2.0)
pub const VBE_MIN_VERSION: u16 = 0x0200;

/// Version reported for framebuffers handed over by `bootloader_api`
pub const VBE_BOOT_VERSION: u16 = 0x0300;

/// Legacy BIOS text mode forced on graphics fallback (80x25, 16 colors)
pub const TEXT_MODE_NUMBER: u8 = 0x03;

/// Resolution of [`TEXT_MODE_NUMBER`]; a mode already at this size needs no switch
pub const TEXT_MODE_RESOLUTION: (u16, u16) = (80, 25);

/// Glyph bitmaps are 8 rows of 8 bits, MSB leftmost
pub const GLYPH_SIZE: usize = 8;

/// Horizontal pen advance per character in graphics text, in pixels
pub const GLYPH_ADVANCE: i32 = 9;

/// Vertical pen advance per line in graphics text, in pixels
pub const LINE_ADVANCE: i32 = 9;

/// Color used for graphics-mode glyphs (0xRRGGBB)
pub const GLYPH_COLOR: u32 = 0x00_0000;

/// Kernel heap backing the task executor
pub const HEAP_SIZE: usize = 256 * 1024;

/// Pixel depths the graphics primitives know how to address
pub const SUPPORTED_DEPTHS: &[u8] = &[24, 32];
