//! Scanline rendering drivers.
//!
//! These tie the pipeline together: the rasterizer sweeps rows into a
//! [`GeometryScanline`], and each span is either blended in one color or
//! colored by a [`SpanGenerator`] and blended pixel by pixel.

use crate::color::Rgba8;
use crate::fill_base::{SpanAllocator, SpanGenerator};
use crate::geometry_scanline::{GeometryScanline, Scanline};
use crate::pixfmt_rgba::PixelFormat;
use crate::rasterizer::RasterizerScanlineAa;
use crate::render_base::RenderBase;

// ============================================================================
// Solid color
// ============================================================================

/// Blend one swept row in `color`.
pub fn render_scanline_aa_solid<PF: PixelFormat>(
    sl: &GeometryScanline,
    ren: &mut RenderBase<PF>,
    color: &Rgba8,
) {
    let y = sl.y();
    for span in sl.spans() {
        let covers = sl.span_covers(span);
        if span.is_uniform() {
            if let Some(&cover) = covers.first() {
                ren.blend_hline(span.x, y, span.end() - 1, color, cover);
            }
        } else {
            ren.blend_solid_hspan(span.x, y, span.len, color, covers);
        }
    }
}

/// Fill everything the rasterizer holds in `color`.
pub fn render_scanlines_aa_solid<PF: PixelFormat>(
    ras: &mut RasterizerScanlineAa,
    sl: &mut GeometryScanline,
    ren: &mut RenderBase<PF>,
    color: &Rgba8,
) {
    if !ras.rewind_scanlines() {
        return;
    }
    sl.reset(ras.min_x(), ras.max_x());
    while ras.sweep_scanline(sl) {
        render_scanline_aa_solid(sl, ren, color);
    }
}

// ============================================================================
// Span generator
// ============================================================================

/// Blend one swept row with colors from `span_gen`.
pub fn render_scanline_aa<PF: PixelFormat, SG: SpanGenerator + ?Sized>(
    sl: &GeometryScanline,
    ren: &mut RenderBase<PF>,
    alloc: &mut SpanAllocator<Rgba8>,
    span_gen: &mut SG,
) {
    let y = sl.y();
    for span in sl.spans() {
        let len = span.pixel_len() as usize;
        let colors = alloc.allocate(len);
        span_gen.generate(colors, span.x, y, len);
        let covers = sl.span_covers(span);
        if span.is_uniform() {
            if let Some(&cover) = covers.first() {
                ren.blend_color_hspan(span.x, y, len as i32, colors, &[], cover);
            }
        } else {
            ren.blend_color_hspan(span.x, y, len as i32, colors, covers, 0);
        }
    }
}

/// Fill everything the rasterizer holds with colors from `span_gen`.
pub fn render_scanlines_aa<PF: PixelFormat, SG: SpanGenerator + ?Sized>(
    ras: &mut RasterizerScanlineAa,
    sl: &mut GeometryScanline,
    ren: &mut RenderBase<PF>,
    alloc: &mut SpanAllocator<Rgba8>,
    span_gen: &mut SG,
) {
    if !ras.rewind_scanlines() {
        return;
    }
    sl.reset(ras.min_x(), ras.max_x());
    span_gen.prepare();
    while ras.sweep_scanline(sl) {
        render_scanline_aa(sl, ren, alloc, span_gen);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill_solid::FillSolid;
    use crate::pixfmt_rgba::PixfmtRgba32;
    use crate::render_buffer::RenderBuffer;
    use crate::vertex_storage::VertexStorage;

    const MARK: Rgba8 = Rgba8::new(1, 2, 3, 4);

    fn rect_path(x1: f64, y1: f64, x2: f64, y2: f64) -> VertexStorage {
        let mut path = VertexStorage::new();
        path.add_rect(x1, y1, x2, y2);
        path
    }

    fn pixel(data: &[u8], w: u32, x: u32, y: u32) -> Rgba8 {
        let i = ((y * w + x) * 4) as usize;
        Rgba8::new(data[i], data[i + 1], data[i + 2], data[i + 3])
    }

    #[test]
    fn test_filled_rect_round_trip() {
        let (w, h) = (20u32, 20u32);
        let c = Rgba8::new(10, 200, 30, 255);
        let mut data = vec![0u8; (w * h * 4) as usize];
        {
            let rb = RenderBuffer::new(&mut data, w, h, (w * 4) as usize).unwrap();
            let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
            ren.clear(&MARK);
            let mut ras = RasterizerScanlineAa::new();
            let mut sl = GeometryScanline::new();
            ras.add_path(&mut rect_path(0.0, 0.0, 10.0, 10.0), 0);
            render_scanlines_aa_solid(&mut ras, &mut sl, &mut ren, &c);
        }
        for y in 0..h {
            for x in 0..w {
                let expected = if x < 10 && y < 10 { c } else { MARK };
                assert_eq!(pixel(&data, w, x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_generator_matches_solid() {
        let (w, h) = (16u32, 16u32);
        let c = Rgba8::new(90, 20, 200, 255);
        let mut solid = vec![0u8; (w * h * 4) as usize];
        let mut generated = solid.clone();
        let mut ras = RasterizerScanlineAa::new();
        let mut sl = GeometryScanline::new();
        {
            let rb = RenderBuffer::new(&mut solid, w, h, (w * 4) as usize).unwrap();
            let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
            ras.add_path(&mut rect_path(1.5, 2.25, 12.75, 9.5), 0);
            render_scanlines_aa_solid(&mut ras, &mut sl, &mut ren, &c);
        }
        {
            let rb = RenderBuffer::new(&mut generated, w, h, (w * 4) as usize).unwrap();
            let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
            let mut alloc = SpanAllocator::new();
            let mut fill = FillSolid::new(c);
            ras.reset();
            ras.add_path(&mut rect_path(1.5, 2.25, 12.75, 9.5), 0);
            render_scanlines_aa(&mut ras, &mut sl, &mut ren, &mut alloc, &mut fill);
        }
        assert_eq!(solid, generated);
    }

    #[test]
    fn test_empty_path_draws_nothing() {
        let mut data = vec![0u8; 4 * 4 * 4];
        {
            let rb = RenderBuffer::new(&mut data, 4, 4, 16).unwrap();
            let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
            let mut ras = RasterizerScanlineAa::new();
            let mut sl = GeometryScanline::new();
            render_scanlines_aa_solid(&mut ras, &mut sl, &mut ren, &Rgba8::RED);
        }
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_shape_outside_buffer_is_clipped() {
        let mut data = vec![0u8; 4 * 4 * 4];
        {
            let rb = RenderBuffer::new(&mut data, 4, 4, 16).unwrap();
            let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
            let mut ras = RasterizerScanlineAa::new();
            let mut sl = GeometryScanline::new();
            ras.add_path(&mut rect_path(-10.0, -10.0, 2.0, 50.0), 0);
            render_scanlines_aa_solid(&mut ras, &mut sl, &mut ren, &Rgba8::RED);
        }
        assert_eq!(pixel(&data, 4, 1, 3), Rgba8::RED);
        assert_eq!(pixel(&data, 4, 2, 3), Rgba8::TRANSPARENT);
    }
}
