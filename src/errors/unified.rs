// src/errors/unified.rs

//! Unified error types for the display subsystem
//!
//! Graphics-mode fallback is not an error: an unsupported mode is reported
//! as a [`crate::framebuffer::ModeSelection::Text`] outcome. The types here
//! cover what the caller cannot recover from by staying in text mode.

use core::fmt;

/// Top-level display error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// Mode selection error
    Mode(ModeError),
    /// Page mapping error
    Map(MapError),
    /// Drawing error
    Draw(DrawError),
    /// Graphics mode is not active
    NoSurface,
    /// Text console has not been initialized
    NoConsole,
    /// The front buffer already belongs to a refresh loop
    FrontBufferTaken,
    /// The back buffer is locked by a frame being painted
    CanvasBusy,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Mode(e) => write!(f, "mode error: {}", e),
            DisplayError::Map(e) => write!(f, "mapping error: {}", e),
            DisplayError::Draw(e) => write!(f, "draw error: {}", e),
            DisplayError::NoSurface => f.write_str("graphics mode not active"),
            DisplayError::NoConsole => f.write_str("text console not initialized"),
            DisplayError::FrontBufferTaken => f.write_str("front buffer already in use"),
            DisplayError::CanvasBusy => f.write_str("back buffer busy"),
        }
    }
}

/// Errors reported by a [`crate::memory::PageMapper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// No physical frame was available for a fresh mapping
    FrameAllocationFailed,
    /// The page is already mapped to a different frame
    AlreadyMapped,
    /// A parent table entry is a huge page
    HugePageConflict,
    /// The address is not page aligned or not canonical
    InvalidAddress,
}

impl MapError {
    /// Convert the error into a human-readable static message.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FrameAllocationFailed => "frame allocation failed",
            Self::AlreadyMapped => "page already mapped",
            Self::HugePageConflict => "parent entry is a huge page",
            Self::InvalidAddress => "invalid address",
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MapError> for DisplayError {
    fn from(err: MapError) -> Self {
        DisplayError::Map(err)
    }
}

/// Mode selection errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeError {
    /// A surface already exists; mode selection runs once per boot
    AlreadyInitialized,
    /// Mapping the framebuffer failed at `page` (byte offset into the buffer)
    MappingFailed {
        /// Offset of the page that could not be mapped
        page: u64,
        /// Mapper failure
        source: MapError,
    },
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeError::AlreadyInitialized => f.write_str("graphics mode already initialized"),
            ModeError::MappingFailed { page, source } => {
                write!(f, "framebuffer mapping failed at offset {:#x}: {}", page, source)
            }
        }
    }
}

impl From<ModeError> for DisplayError {
    fn from(err: ModeError) -> Self {
        DisplayError::Mode(err)
    }
}

/// Drawing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    /// Rectangle origin lies outside the surface; nothing was drawn
    OriginOutOfBounds,
    /// Width or height is zero or negative; nothing was drawn
    EmptyRect,
}

impl DrawError {
    /// Convert the error into a human-readable static message.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OriginOutOfBounds => "origin out of bounds",
            Self::EmptyRect => "empty rectangle",
        }
    }
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DrawError> for DisplayError {
    fn from(err: DrawError) -> Self {
        DisplayError::Draw(err)
    }
}

/// Result type alias for display operations
pub type Result<T> = core::result::Result<T, DisplayError>;

/// Helper trait for error context
pub trait ErrorContext {
    /// Get a detailed description of the error
    fn context(&self) -> &'static str;
}

impl ErrorContext for DisplayError {
    fn context(&self) -> &'static str {
        match self {
            DisplayError::Mode(e) => e.context(),
            DisplayError::Map(e) => e.context(),
            DisplayError::Draw(e) => e.context(),
            DisplayError::NoSurface => "Graphics operations require a successful mode selection",
            DisplayError::NoConsole => "Text output requires init_console during boot",
            DisplayError::FrontBufferTaken => "Only one refresh loop may publish frames",
            DisplayError::CanvasBusy => "Compositors draw on the canvas passed to paint_desktop",
        }
    }
}

impl ErrorContext for MapError {
    fn context(&self) -> &'static str {
        match self {
            MapError::FrameAllocationFailed => "Physical memory exhausted while backing the back buffer",
            MapError::AlreadyMapped => "Virtual range collides with an existing mapping",
            MapError::HugePageConflict => "Framebuffer range overlaps a huge page mapping",
            MapError::InvalidAddress => "Framebuffer address is not a valid page address",
        }
    }
}

impl ErrorContext for ModeError {
    fn context(&self) -> &'static str {
        match self {
            ModeError::AlreadyInitialized => "Mode selection cannot run twice",
            ModeError::MappingFailed { .. } => {
                "Framebuffer could not be mapped; text mode was forced instead"
            }
        }
    }
}

impl ErrorContext for DrawError {
    fn context(&self) -> &'static str {
        match self {
            DrawError::OriginOutOfBounds => "Rectangle must start inside the surface",
            DrawError::EmptyRect => "Rectangle must have positive width and height",
        }
    }
}
