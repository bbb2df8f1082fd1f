// src/framebuffer/surface.rs

//! Surface descriptor and the byte views over the two framebuffers.

use super::mode::ModeDescriptor;
use crate::constants::PAGE_SIZE;
use core::fmt;

/// Geometry and buffer locations of the active graphics mode.
///
/// Immutable once the mode selector returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    pub xres: u32,
    pub yres: u32,
    pub bits_per_pixel: u8,
    /// Byte stride between horizontally adjacent pixels
    pub bytes_per_pixel: u32,
    /// Byte stride between scanlines
    pub pitch: u32,
    /// Front buffer, identity mapped (virtual == physical)
    pub front_base: u64,
    /// Back buffer, first page boundary after the front buffer range
    pub back_base: u64,
    /// `xres * yres * bytes_per_pixel`
    pub size_bytes: u64,
}

impl SurfaceDescriptor {
    pub fn new(xres: u32, yres: u32, bits_per_pixel: u8, pitch: u32, front_base: u64) -> Self {
        let bytes_per_pixel = u32::from(bits_per_pixel / 8);
        let size_bytes = u64::from(xres) * u64::from(yres) * u64::from(bytes_per_pixel);
        let buffer_len = u64::from(pitch) * u64::from(yres);
        Self {
            xres,
            yres,
            bits_per_pixel,
            bytes_per_pixel,
            pitch,
            front_base,
            back_base: (front_base + buffer_len).next_multiple_of(PAGE_SIZE),
            size_bytes,
        }
    }

    pub fn from_mode(mode: &ModeDescriptor) -> Self {
        Self::new(
            u32::from(mode.width),
            u32::from(mode.height),
            mode.bits_per_pixel,
            mode.pitch,
            mode.framebuffer,
        )
    }

    /// Bytes addressed by pitch-based offsets (`pitch * yres`)
    #[inline]
    pub fn buffer_len(&self) -> u64 {
        u64::from(self.pitch) * u64::from(self.yres)
    }

    /// Number of 4 KiB pages covering the front buffer
    #[inline]
    pub fn page_count(&self) -> u64 {
        (self.front_base % PAGE_SIZE + self.buffer_len()).div_ceil(PAGE_SIZE)
    }

    /// Start of the page holding the first front buffer byte
    #[inline]
    pub fn front_page_base(&self) -> u64 {
        self.front_base - self.front_base % PAGE_SIZE
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.xres && (y as u32) < self.yres
    }

    /// Byte offset of pixel (x, y); caller checks [`contains`](Self::contains).
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        x as usize * self.bytes_per_pixel as usize + y as usize * self.pitch as usize
    }

    /// Back buffer as a byte slice.
    ///
    /// # Safety
    ///
    /// The back range must be mapped writable and no other slice over it
    /// may be live.
    pub unsafe fn back_buffer(&self) -> &'static mut [u8] {
        // SAFETY: guaranteed by the caller.
        unsafe {
            core::slice::from_raw_parts_mut(self.back_base as *mut u8, self.buffer_len() as usize)
        }
    }

    /// Front buffer as a byte slice.
    ///
    /// # Safety
    ///
    /// Same contract as [`back_buffer`](Self::back_buffer), for the front range.
    pub unsafe fn front_buffer(&self) -> &'static mut [u8] {
        // SAFETY: guaranteed by the caller.
        unsafe {
            core::slice::from_raw_parts_mut(self.front_base as *mut u8, self.buffer_len() as usize)
        }
    }
}

/// Back buffer plus the geometry needed to address it.
///
/// Every drawing primitive and the compositor write through a `Canvas`.
pub struct Canvas<'a> {
    surface: SurfaceDescriptor,
    pixels: &'a mut [u8],
}

impl<'a> Canvas<'a> {
    /// Wrap `pixels` as the back buffer of `surface`.
    ///
    /// A slice shorter than [`SurfaceDescriptor::buffer_len`] is allowed;
    /// pixels past its end are skipped.
    pub fn new(surface: SurfaceDescriptor, pixels: &'a mut [u8]) -> Self {
        Self { surface, pixels }
    }

    pub fn surface(&self) -> &SurfaceDescriptor {
        &self.surface
    }

    pub fn pixels(&self) -> &[u8] {
        self.pixels
    }

    pub(super) fn pixels_mut(&mut self) -> &mut [u8] {
        self.pixels
    }

    /// Read back the 0xRRGGBB value at (x, y).
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<u32> {
        if !self.surface.contains(x, y) {
            return None;
        }
        let offset = self.surface.offset(x as u32, y as u32);
        let bytes = self.pixels.get(offset..offset + 3)?;
        Some(u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16)
    }
}

impl fmt::Debug for Canvas<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("surface", &self.surface)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// Hardware-visible buffer; written only by the refresh loop.
pub struct FrontBuffer<'a> {
    pixels: &'a mut [u8],
}

impl<'a> FrontBuffer<'a> {
    pub fn new(pixels: &'a mut [u8]) -> Self {
        Self { pixels }
    }

    /// Copy the whole back buffer to the front buffer.
    pub fn publish(&mut self, back: &Canvas<'_>) {
        let len = self.pixels.len().min(back.pixels.len());
        self.pixels[..len].copy_from_slice(&back.pixels[..len]);
    }

    pub fn as_slice(&self) -> &[u8] {
        self.pixels
    }
}

impl fmt::Debug for FrontBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontBuffer")
            .field("len", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_sizes() {
        let surface = SurfaceDescriptor::new(1024, 768, 32, 4096, 0xFD00_0000);
        assert_eq!(surface.bytes_per_pixel, 4);
        assert_eq!(surface.size_bytes, 1024 * 768 * 4);
        assert_eq!(surface.buffer_len(), 4096 * 768);
        assert_eq!(surface.back_base, 0xFD00_0000 + 4096 * 768);
        assert_eq!(surface.page_count(), 768);
    }

    #[test]
    fn test_padded_pitch_widens_buffer() {
        let surface = SurfaceDescriptor::new(100, 10, 24, 320, 0x10_0000);
        assert_eq!(surface.size_bytes, 3000);
        assert_eq!(surface.buffer_len(), 3200);
        assert_eq!(surface.page_count(), 1);
        assert_eq!(surface.back_base, 0x10_1000);
        assert_eq!(surface.offset(2, 1), 6 + 320);
    }

    #[test]
    fn test_unaligned_front_buffer_pages() {
        let surface = SurfaceDescriptor::new(1024, 1, 32, 4096, 0x20_0800);
        assert_eq!(surface.front_page_base(), 0x20_0000);
        assert_eq!(surface.page_count(), 2);
        assert_eq!(surface.back_base, 0x20_2000);
    }

    #[test]
    fn test_contains_excludes_edges() {
        let surface = SurfaceDescriptor::new(8, 4, 32, 32, 0x1000);
        assert!(surface.contains(0, 0));
        assert!(surface.contains(7, 3));
        assert!(!surface.contains(8, 0));
        assert!(!surface.contains(0, 4));
        assert!(!surface.contains(-1, 2));
    }

    #[test]
    fn test_publish_copies_back_to_front() {
        let surface = SurfaceDescriptor::new(2, 2, 32, 8, 0x1000);
        let mut back = [7u8; 16];
        let mut front = [0u8; 16];
        let canvas = Canvas::new(surface, &mut back);
        let mut front_buffer = FrontBuffer::new(&mut front);
        front_buffer.publish(&canvas);
        assert!(front_buffer.as_slice().iter().all(|&b| b == 7));
    }
}
