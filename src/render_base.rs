//! Clipped rendering on top of a pixel format.
//!
//! Every primitive here trims its x range and rejects its row against the
//! clip box before handing the rest to the [`PixelFormat`], so callers may
//! pass coordinates anywhere on the plane.

use crate::basics::{CoverType, RectI};
use crate::color::Rgba8;
use crate::pixfmt_rgba::PixelFormat;

// ============================================================================
// RenderBase
// ============================================================================

pub struct RenderBase<PF: PixelFormat> {
    ren: PF,
    clip_box: RectI,
}

/// A clip box that rejects everything.
const INVISIBLE: RectI = RectI {
    x1: 1,
    y1: 1,
    x2: 0,
    y2: 0,
};

impl<PF: PixelFormat> RenderBase<PF> {
    /// Clip box starts as the whole buffer.
    pub fn new(ren: PF) -> Self {
        let clip_box = RectI::new(0, 0, ren.width() as i32 - 1, ren.height() as i32 - 1);
        Self { ren, clip_box }
    }

    pub fn width(&self) -> u32 {
        self.ren.width()
    }

    pub fn height(&self) -> u32 {
        self.ren.height()
    }

    /// Clip to `(x1, y1)-(x2, y2)` intersected with the buffer. When the
    /// intersection is empty nothing is drawn until the box changes again.
    pub fn clip_box_i(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        let mut cb = RectI::new(x1, y1, x2, y2);
        cb.normalize();
        let bounds = RectI::new(0, 0, self.width() as i32 - 1, self.height() as i32 - 1);
        if cb.clip(&bounds) {
            self.clip_box = cb;
            true
        } else {
            self.clip_box = INVISIBLE;
            false
        }
    }

    pub fn reset_clipping(&mut self, visibility: bool) {
        self.clip_box = if visibility {
            RectI::new(0, 0, self.width() as i32 - 1, self.height() as i32 - 1)
        } else {
            INVISIBLE
        };
    }

    pub fn clip_box(&self) -> &RectI {
        &self.clip_box
    }

    pub fn xmin(&self) -> i32 {
        self.clip_box.x1
    }

    pub fn ymin(&self) -> i32 {
        self.clip_box.y1
    }

    pub fn xmax(&self) -> i32 {
        self.clip_box.x2
    }

    pub fn ymax(&self) -> i32 {
        self.clip_box.y2
    }

    #[inline]
    pub fn inbox(&self, x: i32, y: i32) -> bool {
        self.clip_box.hit_test(x, y)
    }

    pub fn ren(&self) -> &PF {
        &self.ren
    }

    pub fn ren_mut(&mut self) -> &mut PF {
        &mut self.ren
    }

    pub fn into_inner(self) -> PF {
        self.ren
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Overwrite the whole buffer, ignoring the clip box.
    pub fn clear(&mut self, c: &Rgba8) {
        let w = self.width();
        if w == 0 {
            return;
        }
        for y in 0..self.height() as i32 {
            self.ren.copy_hline(0, y, w, c);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        if self.inbox(x, y) {
            self.ren.pixel(x, y)
        } else {
            Rgba8::TRANSPARENT
        }
    }

    pub fn copy_pixel(&mut self, x: i32, y: i32, c: &Rgba8) {
        if self.inbox(x, y) {
            self.ren.copy_pixel(x, y, c);
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, c: &Rgba8, cover: CoverType) {
        if self.inbox(x, y) {
            self.ren.blend_pixel(x, y, c, cover);
        }
    }

    /// Trim the inclusive range `[x1, x2]` on row `y` to the clip box.
    #[inline]
    fn clip_hline(&self, x1: i32, y: i32, x2: i32) -> Option<(i32, u32)> {
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        if y > self.ymax() || y < self.ymin() || x1 > self.xmax() || x2 < self.xmin() {
            return None;
        }
        let x1 = x1.max(self.xmin());
        let x2 = x2.min(self.xmax());
        Some((x1, (x2 - x1 + 1) as u32))
    }

    /// Trim the span `x..x + len` on row `y`. Returns the new start, the new
    /// length and how many leading elements were cut.
    #[inline]
    fn clip_span(&self, x: i32, y: i32, len: i32) -> Option<(i32, u32, usize)> {
        if y > self.ymax() || y < self.ymin() || len <= 0 {
            return None;
        }
        let (mut x, mut len, mut skip) = (x, len, 0usize);
        if x < self.xmin() {
            let d = self.xmin() - x;
            len -= d;
            if len <= 0 {
                return None;
            }
            skip = d as usize;
            x = self.xmin();
        }
        if x + len > self.xmax() {
            len = self.xmax() - x + 1;
            if len <= 0 {
                return None;
            }
        }
        Some((x, len as u32, skip))
    }

    /// `x1` and `x2` are both inclusive.
    pub fn copy_hline(&mut self, x1: i32, y: i32, x2: i32, c: &Rgba8) {
        if let Some((x, len)) = self.clip_hline(x1, y, x2) {
            self.ren.copy_hline(x, y, len, c);
        }
    }

    pub fn blend_hline(&mut self, x1: i32, y: i32, x2: i32, c: &Rgba8, cover: CoverType) {
        if let Some((x, len)) = self.clip_hline(x1, y, x2) {
            self.ren.blend_hline(x, y, len, c, cover);
        }
    }

    /// Fill the inclusive rectangle `(x1, y1)-(x2, y2)` with `c`, no blending.
    pub fn copy_bar(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, c: &Rgba8) {
        let mut rc = RectI::new(x1, y1, x2, y2);
        rc.normalize();
        if rc.clip(&self.clip_box) {
            for y in rc.y1..=rc.y2 {
                self.ren.copy_hline(rc.x1, y, (rc.x2 - rc.x1 + 1) as u32, c);
            }
        }
    }

    pub fn blend_solid_hspan(&mut self, x: i32, y: i32, len: i32, c: &Rgba8, covers: &[CoverType]) {
        if let Some((x, len, skip)) = self.clip_span(x, y, len) {
            if let Some(covers) = covers.get(skip..) {
                self.ren.blend_solid_hspan(x, y, len, c, covers);
            }
        }
    }

    pub fn copy_color_hspan(&mut self, x: i32, y: i32, len: i32, colors: &[Rgba8]) {
        if let Some((x, len, skip)) = self.clip_span(x, y, len) {
            if let Some(colors) = colors.get(skip..) {
                self.ren.copy_color_hspan(x, y, len, colors);
            }
        }
    }

    /// `covers` empty means every pixel uses `cover`.
    pub fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        len: i32,
        colors: &[Rgba8],
        covers: &[CoverType],
        cover: CoverType,
    ) {
        let Some((x, len, skip)) = self.clip_span(x, y, len) else {
            return;
        };
        let Some(colors) = colors.get(skip..) else {
            return;
        };
        let covers = if covers.is_empty() {
            covers
        } else {
            match covers.get(skip..) {
                Some(c) => c,
                None => return,
            }
        };
        self.ren.blend_color_hspan(x, y, len, colors, covers, cover);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixfmt_rgba::PixfmtRgba32;
    use crate::render_buffer::RenderBuffer;

    fn run<F: FnOnce(&mut RenderBase<PixfmtRgba32>)>(w: u32, h: u32, f: F) {
        let mut data = vec![0u8; (w * h * 4) as usize];
        let rb = RenderBuffer::new(&mut data, w, h, (w * 4) as usize).unwrap();
        let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
        f(&mut ren);
    }

    #[test]
    fn test_clip_box_limited_to_buffer() {
        run(10, 10, |ren| {
            assert!(ren.clip_box_i(-5, -5, 20, 3));
            assert_eq!(*ren.clip_box(), RectI::new(0, 0, 9, 3));
            assert!(!ren.clip_box_i(20, 20, 30, 30));
            assert!(!ren.inbox(0, 0));
            ren.reset_clipping(true);
            assert!(ren.inbox(9, 9));
        });
    }

    #[test]
    fn test_hline_clipped() {
        run(5, 2, |ren| {
            ren.blend_hline(-10, 1, 100, &Rgba8::RED, 255);
            ren.blend_hline(0, 5, 4, &Rgba8::BLUE, 255);
            for x in 0..5 {
                assert_eq!(ren.pixel(x, 1), Rgba8::RED);
                assert_eq!(ren.pixel(x, 0), Rgba8::TRANSPARENT);
            }
        });
    }

    #[test]
    fn test_span_offsets_track_left_clip() {
        run(4, 1, |ren| {
            let colors = [Rgba8::RED, Rgba8::GREEN, Rgba8::BLUE, Rgba8::WHITE, Rgba8::BLACK];
            ren.clip_box_i(1, 0, 2, 0);
            ren.blend_color_hspan(-1, 0, 5, &colors, &[], 255);
            ren.reset_clipping(true);
            assert_eq!(ren.pixel(0, 0), Rgba8::TRANSPARENT);
            assert_eq!(ren.pixel(1, 0), Rgba8::BLUE);
            assert_eq!(ren.pixel(2, 0), Rgba8::WHITE);
            assert_eq!(ren.pixel(3, 0), Rgba8::TRANSPARENT);
        });
    }

    #[test]
    fn test_solid_hspan_clipped_covers() {
        run(3, 1, |ren| {
            ren.blend_solid_hspan(-2, 0, 4, &Rgba8::RED, &[255, 255, 255, 0]);
            assert_eq!(ren.pixel(0, 0), Rgba8::RED);
            assert_eq!(ren.pixel(1, 0), Rgba8::TRANSPARENT);
        });
    }

    #[test]
    fn test_copy_bar() {
        run(4, 4, |ren| {
            ren.copy_bar(2, 2, 10, 10, &Rgba8::GREEN);
            assert_eq!(ren.pixel(3, 3), Rgba8::GREEN);
            assert_eq!(ren.pixel(1, 3), Rgba8::TRANSPARENT);
        });
    }
}
