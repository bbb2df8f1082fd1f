// src/display.rs

//! Display session and kernel-global display state.
//!
//! [`DisplaySession`] owns the outcome of mode selection for code that
//! passes state explicitly (and for tests). The kernel itself uses the
//! globals below: a text console behind a mutex, the surface in a
//! [`spin::Once`] and the back buffer canvas shared by drawing calls and
//! the refresh loop.

use crate::errors::{self, DisplayError, ModeError};
use crate::framebuffer::{
    self, Canvas, Compositor, FrameClock, FrontBuffer, LegacyBios, ModeDescriptor, ModeSelection,
    RefreshLoop, SurfaceDescriptor, Vga8x8, WindowSystem,
};
use crate::memory::PageMapper;
use crate::sync::without_interrupts;
use crate::vga_buffer::{TextConsole, TextModeBuffer};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use spin::{Mutex, Once};

/// Mode selection state for one display
#[derive(Debug, Default)]
pub struct DisplaySession {
    surface: Option<SurfaceDescriptor>,
}

impl DisplaySession {
    pub const fn new() -> Self {
        Self { surface: None }
    }

    /// Run mode selection once.
    ///
    /// # Errors
    ///
    /// `AlreadyInitialized` when a surface exists, otherwise whatever
    /// [`framebuffer::init_graphics`] reports.
    pub fn init_graphics<P, B, W>(
        &mut self,
        mode: &ModeDescriptor,
        mapper: &mut P,
        bios: &mut B,
        windows: &mut W,
    ) -> Result<ModeSelection, ModeError>
    where
        P: PageMapper + ?Sized,
        B: LegacyBios + ?Sized,
        W: WindowSystem + ?Sized,
    {
        if self.surface.is_some() {
            return Err(ModeError::AlreadyInitialized);
        }
        let selection = framebuffer::init_graphics(mode, mapper, bios, windows)?;
        self.surface = selection.surface().copied();
        Ok(selection)
    }

    pub fn surface(&self) -> Option<&SurfaceDescriptor> {
        self.surface.as_ref()
    }

    /// True iff no graphics surface exists
    pub fn is_text_mode(&self) -> bool {
        self.surface.is_none()
    }
}

static CONSOLE: Mutex<Option<TextConsole<TextModeBuffer>>> = Mutex::new(None);
static SESSION: Mutex<DisplaySession> = Mutex::new(DisplaySession::new());
static SURFACE: Once<SurfaceDescriptor> = Once::new();
static BACK_BUFFER: Once<Mutex<Canvas<'static>>> = Once::new();
static FRONT_TAKEN: AtomicBool = AtomicBool::new(false);
static FRAME_CLOCK: FrameClock = FrameClock::new();

/// Install the global text console, clearing the screen.
pub fn init_console(buffer: TextModeBuffer, height: usize, width: usize) {
    let mut console = TextConsole::new(buffer);
    console.init(height, width);
    console.clear();
    without_interrupts(|| *CONSOLE.lock() = Some(console));
}

/// Run `f` on the global console.
///
/// # Errors
///
/// `NoConsole` before [`init_console`].
pub fn with_console<R>(
    f: impl FnOnce(&mut TextConsole<TextModeBuffer>) -> R,
) -> errors::Result<R> {
    without_interrupts(|| CONSOLE.lock().as_mut().map(f).ok_or(DisplayError::NoConsole))
}

/// Global mode selection.
///
/// On success in graphics mode the surface is published and the back
/// buffer becomes available to [`with_canvas`].
///
/// # Errors
///
/// See [`DisplaySession::init_graphics`].
///
/// # Safety
///
/// `mapper` must modify the active page tables, so that on success both
/// buffers of the returned surface are mapped writable and nothing else
/// references them.
pub unsafe fn init_graphics<P, B, W>(
    mode: &ModeDescriptor,
    mapper: &mut P,
    bios: &mut B,
    windows: &mut W,
) -> Result<ModeSelection, ModeError>
where
    P: PageMapper + ?Sized,
    B: LegacyBios + ?Sized,
    W: WindowSystem + ?Sized,
{
    let selection = SESSION.lock().init_graphics(mode, mapper, bios, windows)?;
    if let ModeSelection::Graphics(surface) = selection {
        let surface = *SURFACE.call_once(|| surface);
        BACK_BUFFER.call_once(|| {
            // SAFETY: mapped by the selector, sole alias per the contract.
            Mutex::new(Canvas::new(surface, unsafe { surface.back_buffer() }))
        });
    }
    Ok(selection)
}

/// True iff graphics mode was never established
pub fn is_text_mode() -> bool {
    SURFACE.get().is_none()
}

pub fn surface() -> Option<SurfaceDescriptor> {
    SURFACE.get().copied()
}

/// Frames published by the global refresh loop
pub fn frame_generation() -> u64 {
    FRAME_CLOCK.generation()
}

/// Run `f` on the back buffer, excluded from the refresh loop's publish.
///
/// # Errors
///
/// `NoSurface` in text mode, `CanvasBusy` when called while a frame is
/// being painted (from inside [`Compositor::paint_desktop`]).
pub fn with_canvas<R>(f: impl FnOnce(&mut Canvas<'static>) -> R) -> errors::Result<R> {
    let back = BACK_BUFFER.get().ok_or(DisplayError::NoSurface)?;
    with_locked(back, f)
}

// Interrupts are masked, so a held lock can only belong to this context.
fn with_locked<'b, R>(
    back: &Mutex<Canvas<'b>>,
    f: impl FnOnce(&mut Canvas<'b>) -> R,
) -> errors::Result<R> {
    without_interrupts(|| {
        let mut canvas = back.try_lock().ok_or(DisplayError::CanvasBusy)?;
        Ok(f(&mut canvas))
    })
}

/// Draw `text` with the built-in font; returns the final pen position.
///
/// # Errors
///
/// `NoSurface` in text mode.
pub fn draw_text(x: i32, y: i32, text: &str) -> errors::Result<(i32, i32)> {
    with_canvas(|canvas| canvas.draw_string(x, y, text, &Vga8x8))
}

/// Build the refresh loop over the global buffers. Only one can exist.
///
/// # Errors
///
/// `NoSurface` in text mode, `FrontBufferTaken` on a second call.
pub fn refresh_loop<C: Compositor>(
    compositor: C,
    stop: &'static AtomicBool,
) -> errors::Result<RefreshLoop<'static, 'static, C>> {
    let surface = SURFACE.get().ok_or(DisplayError::NoSurface)?;
    let back = BACK_BUFFER.get().ok_or(DisplayError::NoSurface)?;
    if FRONT_TAKEN.swap(true, Ordering::AcqRel) {
        return Err(DisplayError::FrontBufferTaken);
    }
    // SAFETY: mapped during init_graphics; FRONT_TAKEN makes this the only alias.
    let front = FrontBuffer::new(unsafe { surface.front_buffer() });
    Ok(RefreshLoop::new(back, front, compositor, &FRAME_CLOCK, stop))
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;

    without_interrupts(|| {
        if let Some(console) = CONSOLE.lock().as_mut() {
            let _ = console.write_fmt(args);
        }
    });
    crate::serial::_print(args);
}

/// Print to the text console and the serial port
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ({
        $crate::display::_print(format_args!($($arg)*));
    });
}

/// Print a line to the text console and the serial port
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}
