// src/framebuffer/mod.rs

//! Linear framebuffer backend
//!
//! The graphics half of the display subsystem. A boot-time
//! [`ModeDescriptor`] is checked by the mode selector; when the mode is
//! usable the front buffer is identity mapped, a shadow back buffer is
//! backed by fresh frames right after it, and a [`RefreshLoop`] republishes
//! the back buffer every frame.
//!
//! # Features
//!
//! - VBE 2.0+ controller/mode tables and `bootloader_api` framebuffers
//! - 24 and 32 bpp with pitch-based addressing
//! - Clipped pixel, rectangle, glyph and string primitives
//! - Explicit text-mode fallback result instead of a silent switch

pub mod draw;
pub mod font;
pub mod mode;
pub mod refresh;
pub mod select;
pub mod surface;

pub use draw::RectFill;
pub use font::{FontTable, Glyph, Vga8x8};
pub use mode::{ModeAttributes, ModeDescriptor, VbeControllerInfo, VbeModeInfo};
pub use refresh::{Compositor, FrameClock, RefreshLoop};
pub use select::{
    init_graphics, probe, LegacyBios, ModeSelection, TextFallback, Unsupported, WindowSystem,
};
pub use surface::{Canvas, FrontBuffer, SurfaceDescriptor};
