// src/framebuffer/draw.rs

//! Pixel, rectangle and glyph primitives over the back buffer.
//!
//! Colors are `0xRRGGBB`. Each pixel stores blue, green, red in its first
//! three bytes; the fourth byte of a 32-bpp pixel is never written.

use super::font::{FontTable, Glyph};
use super::surface::Canvas;
use crate::constants::{GLYPH_ADVANCE, GLYPH_COLOR, GLYPH_SIZE, LINE_ADVANCE};
use crate::errors::DrawError;

/// How much of a requested rectangle was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectFill {
    Complete,
    /// The extent crossed the surface edge; only this much was filled
    Clipped { width: u32, height: u32 },
}

#[inline]
fn color_bytes(color: u32) -> [u8; 3] {
    [color as u8, (color >> 8) as u8, (color >> 16) as u8]
}

impl Canvas<'_> {
    /// Set one pixel. Returns `false`, writing nothing, outside the surface.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: u32) -> bool {
        if !self.surface().contains(x, y) {
            return false;
        }
        let offset = self.surface().offset(x as u32, y as u32);
        match self.pixels_mut().get_mut(offset..offset + 3) {
            Some(slot) => {
                slot.copy_from_slice(&color_bytes(color));
                true
            }
            None => false,
        }
    }

    /// Fill a `w` x `h` rectangle with its top-left corner at (x, y).
    ///
    /// # Errors
    ///
    /// `OriginOutOfBounds` when (x, y) is off the surface, `EmptyRect` when
    /// either side is not positive. Nothing is drawn in both cases.
    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: u32,
    ) -> Result<RectFill, DrawError> {
        let surface = *self.surface();
        if !surface.contains(x, y) {
            return Err(DrawError::OriginOutOfBounds);
        }
        if w <= 0 || h <= 0 {
            return Err(DrawError::EmptyRect);
        }

        let (x, y) = (x as u32, y as u32);
        let width = (w as u32).min(surface.xres - x);
        let height = (h as u32).min(surface.yres - y);
        // Depths below 24 bpp are rejected at mode selection; never step
        // by less than one pixel's three color bytes.
        let bpp = (surface.bytes_per_pixel as usize).max(3);
        let bytes = color_bytes(color);

        for row in y..y + height {
            let start = surface.offset(x, row);
            let end = start + width as usize * bpp;
            let Some(line) = self.pixels_mut().get_mut(start..end) else {
                break;
            };
            for pixel in line.chunks_exact_mut(bpp) {
                pixel[..3].copy_from_slice(&bytes);
            }
        }

        if width == w as u32 && height == h as u32 {
            Ok(RectFill::Complete)
        } else {
            Ok(RectFill::Clipped { width, height })
        }
    }

    /// Paint the whole surface.
    pub fn clear(&mut self, color: u32) {
        let surface = *self.surface();
        if surface.xres == 0 || surface.yres == 0 {
            return;
        }
        // Full-surface extents never clip and the origin is always inside.
        let _ = self.draw_rect(0, 0, surface.xres as i32, surface.yres as i32, color);
    }

    /// Draw the set bits of `glyph` in the glyph color; unset bits are
    /// transparent. Pixels outside the surface are dropped.
    pub fn draw_char(&mut self, x: i32, y: i32, glyph: &Glyph) {
        for (row, bits) in glyph.iter().enumerate() {
            for bit in (0..GLYPH_SIZE).rev() {
                if bits & (1 << bit) != 0 {
                    let col = (GLYPH_SIZE - 1 - bit) as i32;
                    // Coordinates past i32 are off every surface.
                    let (Some(px), Some(py)) = (x.checked_add(col), y.checked_add(row as i32))
                    else {
                        continue;
                    };
                    self.draw_pixel(px, py, GLYPH_COLOR);
                }
            }
        }
    }

    /// Draw `text` starting at (x, y) and return the final pen position.
    ///
    /// `\n` moves down one line and back to `x`, `\r` returns to `x`, `\x08`
    /// steps back one advance (never left of `x`) without erasing. Other
    /// control codes are ignored. Codes the font has no glyph for advance
    /// like a space. The pen saturates at the `i32` range.
    pub fn draw_string<F: FontTable + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        font: &F,
    ) -> (i32, i32) {
        let line_start = x;
        let (mut pen_x, mut pen_y) = (x, y);

        for byte in text.bytes() {
            match byte {
                b'\n' => {
                    pen_y = pen_y.saturating_add(LINE_ADVANCE);
                    pen_x = line_start;
                }
                b'\r' => pen_x = line_start,
                0x08 => pen_x = pen_x.saturating_sub(GLYPH_ADVANCE).max(line_start),
                b' ' => pen_x = pen_x.saturating_add(GLYPH_ADVANCE),
                0x00..=0x1F | 0x7F => {}
                _ => {
                    if let Some(glyph) = font.glyph(byte) {
                        self.draw_char(pen_x, pen_y, glyph);
                    }
                    pen_x = pen_x.saturating_add(GLYPH_ADVANCE);
                }
            }
        }

        (pen_x, pen_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::font::Vga8x8;
    use crate::framebuffer::surface::SurfaceDescriptor;

    const WHITE: u32 = 0xFF_FFFF;

    fn surface(xres: u32, yres: u32, bpp: u8) -> SurfaceDescriptor {
        let pitch = xres * u32::from(bpp / 8);
        SurfaceDescriptor::new(xres, yres, bpp, pitch, 0x10_0000)
    }

    /// Font whose every glyph is a single pixel in the top-left corner
    struct DotFont;

    impl FontTable for DotFont {
        fn glyph(&self, code: u8) -> Option<&Glyph> {
            static DOT: Glyph = [0x80, 0, 0, 0, 0, 0, 0, 0];
            (code != b'?').then_some(&DOT)
        }
    }

    #[test]
    fn test_pixel_byte_order() {
        let mut pixels = vec![0xAAu8; 4 * 4 * 4];
        let mut canvas = Canvas::new(surface(4, 4, 32), &mut pixels);
        assert!(canvas.draw_pixel(1, 2, 0x11_2233));
        let offset = 1 * 4 + 2 * 16;
        assert_eq!(&canvas.pixels()[offset..offset + 4], &[0x33, 0x22, 0x11, 0xAA]);
        assert_eq!(canvas.pixel_at(1, 2), Some(0x11_2233));
    }

    #[test]
    fn test_pixel_out_of_bounds_is_noop() {
        let mut pixels = vec![0u8; 4 * 4 * 3];
        let mut canvas = Canvas::new(surface(4, 4, 24), &mut pixels);
        for &(x, y) in &[(-1, 0), (0, -1), (4, 0), (0, 4), (i32::MAX, i32::MIN)] {
            assert!(!canvas.draw_pixel(x, y, WHITE));
        }
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pixel_uses_pitch_for_rows() {
        let padded = SurfaceDescriptor::new(3, 2, 24, 12, 0x10_0000);
        let mut pixels = vec![0u8; 24];
        let mut canvas = Canvas::new(padded, &mut pixels);
        canvas.draw_pixel(0, 1, WHITE);
        assert_eq!(&canvas.pixels()[12..15], &[0xFF, 0xFF, 0xFF]);
        assert_eq!(&canvas.pixels()[9..12], &[0, 0, 0]);
    }

    #[test]
    fn test_rect_complete() {
        let mut pixels = vec![0u8; 8 * 8 * 4];
        let mut canvas = Canvas::new(surface(8, 8, 32), &mut pixels);
        assert_eq!(canvas.draw_rect(2, 3, 3, 2, WHITE), Ok(RectFill::Complete));
        assert_eq!(canvas.pixel_at(2, 3), Some(WHITE));
        assert_eq!(canvas.pixel_at(4, 4), Some(WHITE));
        assert_eq!(canvas.pixel_at(5, 4), Some(0));
        assert_eq!(canvas.pixel_at(2, 5), Some(0));
    }

    #[test]
    fn test_rect_clipped_at_edges() {
        let mut pixels = vec![0u8; 8 * 8 * 3];
        let mut canvas = Canvas::new(surface(8, 8, 24), &mut pixels);
        assert_eq!(
            canvas.draw_rect(6, 5, 10, 10, WHITE),
            Ok(RectFill::Clipped { width: 2, height: 3 })
        );
        assert_eq!(canvas.pixel_at(7, 7), Some(WHITE));
        assert_eq!(canvas.pixel_at(5, 7), Some(0));
        assert_eq!(canvas.pixel_at(7, 0), Some(0));
    }

    #[test]
    fn test_rect_rejects_bad_arguments() {
        let mut pixels = vec![0u8; 8 * 8 * 4];
        let mut canvas = Canvas::new(surface(8, 8, 32), &mut pixels);
        assert_eq!(canvas.draw_rect(8, 0, 1, 1, WHITE), Err(DrawError::OriginOutOfBounds));
        assert_eq!(canvas.draw_rect(-1, 0, 4, 4, WHITE), Err(DrawError::OriginOutOfBounds));
        assert_eq!(canvas.draw_rect(0, 0, 0, 4, WHITE), Err(DrawError::EmptyRect));
        assert_eq!(canvas.draw_rect(0, 0, 4, -2, WHITE), Err(DrawError::EmptyRect));
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_keeps_padding_byte() {
        let mut pixels = vec![0x7Fu8; 2 * 2 * 4];
        let mut canvas = Canvas::new(surface(2, 2, 32), &mut pixels);
        canvas.clear(0x01_0203);
        for chunk in canvas.pixels().chunks(4) {
            assert_eq!(chunk, &[0x03, 0x02, 0x01, 0x7F]);
        }
    }

    #[test]
    fn test_char_msb_is_leftmost() {
        let mut pixels = vec![0xFFu8; 8 * 8 * 4];
        let mut canvas = Canvas::new(surface(8, 8, 32), &mut pixels);
        let glyph: Glyph = [0x80, 0x01, 0, 0, 0, 0, 0, 0];
        canvas.draw_char(0, 0, &glyph);
        assert_eq!(canvas.pixel_at(0, 0), Some(GLYPH_COLOR));
        assert_eq!(canvas.pixel_at(7, 1), Some(GLYPH_COLOR));
        assert_eq!(canvas.pixel_at(1, 0), Some(WHITE));
        assert_eq!(canvas.pixel_at(0, 1), Some(WHITE));
    }

    #[test]
    fn test_char_clips_at_edge() {
        let mut pixels = vec![0xFFu8; 4 * 4 * 4];
        let mut canvas = Canvas::new(surface(4, 4, 32), &mut pixels);
        canvas.draw_char(2, 2, &[0xFF; 8]);
        assert_eq!(canvas.pixel_at(3, 3), Some(GLYPH_COLOR));
        assert_eq!(canvas.pixel_at(1, 1), Some(WHITE));
    }

    #[test]
    fn test_string_newline_returns_to_start() {
        let mut pixels = vec![0xFFu8; 64 * 64 * 4];
        let mut canvas = Canvas::new(surface(64, 64, 32), &mut pixels);
        let end = canvas.draw_string(5, 3, "ab\ncd\n", &DotFont);
        assert_eq!(end, (5, 3 + 2 * LINE_ADVANCE));
        assert_eq!(canvas.pixel_at(5, 3), Some(GLYPH_COLOR));
        assert_eq!(canvas.pixel_at(14, 3), Some(GLYPH_COLOR));
        assert_eq!(canvas.pixel_at(5, 12), Some(GLYPH_COLOR));
    }

    #[test]
    fn test_string_space_and_missing_glyph_advance() {
        let mut pixels = vec![0xFFu8; 64 * 16 * 4];
        let mut canvas = Canvas::new(surface(64, 16, 32), &mut pixels);
        let end = canvas.draw_string(0, 0, "a ?b", &DotFont);
        assert_eq!(end, (4 * GLYPH_ADVANCE, 0));
        assert_eq!(canvas.pixel_at(9, 0), Some(WHITE));
        assert_eq!(canvas.pixel_at(18, 0), Some(WHITE));
        assert_eq!(canvas.pixel_at(27, 0), Some(GLYPH_COLOR));
    }

    #[test]
    fn test_string_carriage_return_and_backspace() {
        let mut pixels = vec![0xFFu8; 64 * 16 * 4];
        let mut canvas = Canvas::new(surface(64, 16, 32), &mut pixels);
        assert_eq!(canvas.draw_string(4, 0, "abc\r", &DotFont), (4, 0));
        assert_eq!(canvas.draw_string(4, 0, "ab\x08", &DotFont), (4 + GLYPH_ADVANCE, 0));
        assert_eq!(canvas.draw_string(4, 0, "\x08\x08", &DotFont), (4, 0));
        // Backspace does not erase what was drawn.
        assert_eq!(canvas.pixel_at(4 + GLYPH_ADVANCE, 0), Some(GLYPH_COLOR));
    }

    #[test]
    fn test_string_ignores_other_controls() {
        let mut pixels = vec![0xFFu8; 32 * 16 * 4];
        let mut canvas = Canvas::new(surface(32, 16, 32), &mut pixels);
        assert_eq!(canvas.draw_string(0, 0, "\t\x1b\x7f", &DotFont), (0, 0));
        assert!(canvas.pixels().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_string_with_builtin_font() {
        let mut pixels = vec![0xFFu8; 32 * 16 * 4];
        let mut canvas = Canvas::new(surface(32, 16, 32), &mut pixels);
        canvas.draw_string(0, 0, "I", &Vga8x8);
        // Top row of 'I' is 0x7E: columns 1..=6.
        assert_eq!(canvas.pixel_at(0, 0), Some(WHITE));
        assert_eq!(canvas.pixel_at(1, 0), Some(GLYPH_COLOR));
        assert_eq!(canvas.pixel_at(6, 0), Some(GLYPH_COLOR));
        assert_eq!(canvas.pixel_at(7, 0), Some(WHITE));
    }

    #[test]
    fn test_char_far_off_surface_is_noop() {
        let mut pixels = vec![0xFFu8; 8 * 8 * 4];
        let mut canvas = Canvas::new(surface(8, 8, 32), &mut pixels);
        canvas.draw_char(i32::MAX - 3, 0, &[0xFF; 8]);
        canvas.draw_char(0, i32::MAX - 3, &[0xFF; 8]);
        canvas.draw_char(i32::MIN, i32::MIN, &[0xFF; 8]);
        assert!(canvas.pixels().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_string_pen_saturates_at_i32_range() {
        let mut pixels = vec![0xFFu8; 8 * 8 * 4];
        let mut canvas = Canvas::new(surface(8, 8, 32), &mut pixels);
        assert_eq!(
            canvas.draw_string(i32::MAX - 20, 0, "abc d", &Vga8x8),
            (i32::MAX, 0)
        );
        assert_eq!(canvas.draw_string(0, i32::MAX - 3, "\n\n", &DotFont), (0, i32::MAX));
        assert_eq!(
            canvas.draw_string(i32::MIN + 2, 0, "\x08", &DotFont),
            (i32::MIN + 2, 0)
        );
        assert!(canvas.pixels().iter().all(|&b| b == 0xFF));
    }
}
