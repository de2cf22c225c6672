//! RGBA32 pixel format.
//!
//! Pixels are four bytes, R G B A, straight alpha. Blending a color `c`
//! with effective alpha `a = c.a * cover` moves every color channel toward
//! `c` by `a` and the alpha channel toward 255 by `a`.

use crate::basics::{CoverType, COVER_FULL};
use crate::color::Rgba8;
use crate::render_buffer::{RenderBuffer, BPP};

/// Unclipped pixel access. Callers keep coordinates inside the buffer.
pub trait PixelFormat {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn pixel(&self, x: i32, y: i32) -> Rgba8;
    fn copy_pixel(&mut self, x: i32, y: i32, c: &Rgba8);
    fn blend_pixel(&mut self, x: i32, y: i32, c: &Rgba8, cover: CoverType);

    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8);
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, cover: CoverType);

    /// One color, one cover per pixel.
    fn blend_solid_hspan(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, covers: &[CoverType]);

    fn copy_color_hspan(&mut self, x: i32, y: i32, len: u32, colors: &[Rgba8]);

    /// One color per pixel. `covers` empty means every pixel uses `cover`.
    fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        len: u32,
        colors: &[Rgba8],
        covers: &[CoverType],
        cover: CoverType,
    );
}

/// [`PixelFormat`] over a [`RenderBuffer`].
#[derive(Debug)]
pub struct PixfmtRgba32<'a> {
    rbuf: RenderBuffer<'a>,
}

#[inline]
fn put(p: &mut [u8], c: &Rgba8) {
    p[0] = c.r;
    p[1] = c.g;
    p[2] = c.b;
    p[3] = c.a;
}

#[inline]
fn blend_pix(p: &mut [u8], c: &Rgba8, cover: CoverType) {
    let alpha = Rgba8::mult_cover(c.a, cover);
    if alpha == 255 {
        put(p, &Rgba8 { a: 255, ..*c });
    } else if alpha > 0 {
        p[0] = Rgba8::lerp(p[0], c.r, alpha);
        p[1] = Rgba8::lerp(p[1], c.g, alpha);
        p[2] = Rgba8::lerp(p[2], c.b, alpha);
        p[3] = Rgba8::lerp(p[3], 255, alpha);
    }
}

impl<'a> PixfmtRgba32<'a> {
    pub fn new(rbuf: RenderBuffer<'a>) -> Self {
        Self { rbuf }
    }

    pub fn rbuf(&self) -> &RenderBuffer<'a> {
        &self.rbuf
    }

    pub fn rbuf_mut(&mut self) -> &mut RenderBuffer<'a> {
        &mut self.rbuf
    }

    /// Overwrite every pixel with `c`.
    pub fn clear(&mut self, c: &Rgba8) {
        for y in 0..self.rbuf.height() {
            self.rbuf
                .row_mut(y)
                .chunks_exact_mut(BPP)
                .for_each(|p| put(p, c));
        }
    }

    #[inline]
    fn span_mut(&mut self, x: i32, y: i32, len: u32) -> &mut [u8] {
        let start = x as usize * BPP;
        &mut self.rbuf.row_mut(y as u32)[start..start + len as usize * BPP]
    }
}

impl<'a> PixelFormat for PixfmtRgba32<'a> {
    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        let off = x as usize * BPP;
        let p = &self.rbuf.row(y as u32)[off..off + BPP];
        Rgba8::new(p[0], p[1], p[2], p[3])
    }

    fn copy_pixel(&mut self, x: i32, y: i32, c: &Rgba8) {
        put(self.span_mut(x, y, 1), c);
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: &Rgba8, cover: CoverType) {
        blend_pix(self.span_mut(x, y, 1), c, cover);
    }

    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8) {
        self.span_mut(x, y, len)
            .chunks_exact_mut(BPP)
            .for_each(|p| put(p, c));
    }

    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, cover: CoverType) {
        self.span_mut(x, y, len)
            .chunks_exact_mut(BPP)
            .for_each(|p| blend_pix(p, c, cover));
    }

    fn blend_solid_hspan(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, covers: &[CoverType]) {
        let len = len.min(covers.len() as u32);
        for (p, &cover) in self.span_mut(x, y, len).chunks_exact_mut(BPP).zip(covers) {
            blend_pix(p, c, cover);
        }
    }

    fn copy_color_hspan(&mut self, x: i32, y: i32, len: u32, colors: &[Rgba8]) {
        let len = len.min(colors.len() as u32);
        for (p, c) in self.span_mut(x, y, len).chunks_exact_mut(BPP).zip(colors) {
            put(p, c);
        }
    }

    fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        len: u32,
        colors: &[Rgba8],
        covers: &[CoverType],
        cover: CoverType,
    ) {
        let len = len.min(colors.len() as u32);
        let pixels = self.span_mut(x, y, len).chunks_exact_mut(BPP).zip(colors);
        if covers.is_empty() {
            for (p, c) in pixels {
                blend_pix(p, c, cover);
            }
        } else {
            for ((p, c), &cv) in pixels.zip(covers) {
                blend_pix(p, c, cv);
            }
        }
    }
}

/// `true` when blending `c` at `cover` fully replaces the pixel.
#[inline]
pub fn is_opaque_cover(c: &Rgba8, cover: CoverType) -> bool {
    c.a == 255 && cover == COVER_FULL
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn with_pixfmt<F: FnOnce(&mut PixfmtRgba32)>(w: u32, h: u32, f: F) -> Vec<u8> {
        let mut data = vec![0u8; (w * h) as usize * BPP];
        {
            let rb = RenderBuffer::new(&mut data, w, h, w as usize * BPP).unwrap();
            let mut pf = PixfmtRgba32::new(rb);
            f(&mut pf);
        }
        data
    }

    #[test]
    fn test_copy_and_read_back() {
        with_pixfmt(10, 10, |pf| {
            pf.copy_pixel(5, 5, &Rgba8::RED);
            assert_eq!(pf.pixel(5, 5), Rgba8::RED);
            assert_eq!(pf.pixel(4, 5), Rgba8::TRANSPARENT);
        });
    }

    #[test]
    fn test_opaque_blend_replaces() {
        with_pixfmt(4, 1, |pf| {
            pf.clear(&Rgba8::WHITE);
            pf.blend_hline(0, 0, 4, &Rgba8::BLUE, 255);
            assert_eq!(pf.pixel(3, 0), Rgba8::BLUE);
        });
    }

    #[test]
    fn test_half_cover_blend() {
        with_pixfmt(1, 1, |pf| {
            pf.clear(&Rgba8::BLACK);
            pf.blend_pixel(0, 0, &Rgba8::WHITE, 128);
            let p = pf.pixel(0, 0);
            assert!((p.r as i32 - 128).abs() <= 1);
            assert_eq!(p.a, 255);
        });
    }

    #[test]
    fn test_zero_cover_leaves_pixel() {
        with_pixfmt(3, 1, |pf| {
            pf.clear(&Rgba8::GREEN);
            pf.blend_solid_hspan(0, 0, 3, &Rgba8::RED, &[0, 255, 0]);
            assert_eq!(pf.pixel(0, 0), Rgba8::GREEN);
            assert_eq!(pf.pixel(1, 0), Rgba8::RED);
            assert_eq!(pf.pixel(2, 0), Rgba8::GREEN);
        });
    }

    #[test]
    fn test_color_hspan_uniform_cover() {
        let data = with_pixfmt(2, 1, |pf| {
            pf.blend_color_hspan(0, 0, 2, &[Rgba8::RED, Rgba8::BLUE], &[], 255);
        });
        assert_eq!(&data, &[255, 0, 0, 255, 0, 0, 255, 255]);
    }
}
