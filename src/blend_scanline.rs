//! Compositing two rasterized shapes scanline by scanline.
//!
//! [`blend_scanline`] sweeps a source rasterizer and a destination
//! rasterizer together. Every row is cut at the span boundaries of both
//! shapes, so each piece lies in the source only, the destination only, or
//! their overlap. The operator then decides which shape's colors are blended
//! on each piece and with which coverage:
//!
//! * source only: `cs`, destination only: `cd`
//! * overlap: `cs * cd / 255`
//! * source minus destination: `cs * (255 - cd) / 255`, and the mirror
//!   image for the destination.

use crate::basics::CoverType;
use crate::color::Rgba8;
use crate::fill_base::{SpanAllocator, SpanGenerator};
use crate::fill_blend::FillBlend;
use crate::geometry_scanline::{GeometryScanline, Scanline, SpanBlock};
use crate::pixfmt_rgba::PixelFormat;
use crate::rasterizer::RasterizerScanlineAa;
use crate::render_base::RenderBase;

// ============================================================================
// CompositeOperation
// ============================================================================

/// Porter-Duff style operator combining a source shape with a destination
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOperation {
    #[default]
    SourceOver,
    SourceAtop,
    SourceIn,
    SourceOut,
    DestinationOver,
    DestinationAtop,
    DestinationIn,
    DestinationOut,
    Lighter,
    Copy,
    Xor,
}

/// Whose colors a layer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Source,
    Destination,
    /// Source and destination colors added channel by channel.
    Sum,
}

/// Which part of the painted shape a layer covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Whole,
    Exclusive,
    Overlap,
}

type Layer = (Paint, Region);

impl CompositeOperation {
    /// Layers drawn bottom to top.
    fn layers(self) -> &'static [Layer] {
        use Paint::*;
        use Region::*;
        match self {
            CompositeOperation::SourceOver => &[(Destination, Whole), (Source, Whole)],
            CompositeOperation::DestinationOver => &[(Source, Whole), (Destination, Whole)],
            CompositeOperation::SourceIn => &[(Source, Overlap)],
            CompositeOperation::DestinationIn => &[(Destination, Overlap)],
            CompositeOperation::SourceOut => &[(Source, Exclusive)],
            CompositeOperation::DestinationOut => &[(Destination, Exclusive)],
            CompositeOperation::SourceAtop => &[(Destination, Whole), (Source, Overlap)],
            CompositeOperation::DestinationAtop => &[(Source, Whole), (Destination, Overlap)],
            CompositeOperation::Xor => &[(Source, Exclusive), (Destination, Exclusive)],
            CompositeOperation::Lighter => &[
                (Source, Exclusive),
                (Destination, Exclusive),
                (Sum, Overlap),
            ],
            CompositeOperation::Copy => &[(Source, Whole)],
        }
    }

    /// Whether the destination's geometry affects the result.
    pub fn uses_destination(self) -> bool {
        self != CompositeOperation::Copy
    }
}

#[inline]
fn layer_cover(layer: Layer, cs: CoverType, cd: CoverType) -> CoverType {
    match layer {
        (Paint::Source, Region::Whole) => cs,
        (Paint::Destination, Region::Whole) => cd,
        (Paint::Source, Region::Exclusive) => Rgba8::multiply(cs, 255 - cd),
        (Paint::Destination, Region::Exclusive) => Rgba8::multiply(cd, 255 - cs),
        (_, Region::Overlap) => Rgba8::multiply(cs, cd),
        (Paint::Sum, _) => Rgba8::multiply(cs, cd),
    }
}

// ============================================================================
// Row splitting
// ============================================================================

/// Coverage of pixel `x`, which lies inside `span`.
#[inline]
fn span_cover(sl: &GeometryScanline, span: &SpanBlock, x: i32) -> CoverType {
    let covers = sl.span_covers(span);
    let i = if span.is_uniform() { 0 } else { (x - span.x) as usize };
    covers.get(i).copied().unwrap_or(0)
}

/// Cursor over the spans of one row, advanced left to right.
struct RowCursor<'a> {
    sl: Option<&'a GeometryScanline>,
    idx: usize,
}

impl<'a> RowCursor<'a> {
    fn new(sl: Option<&'a GeometryScanline>) -> Self {
        Self { sl, idx: 0 }
    }

    fn spans(&self) -> &'a [SpanBlock] {
        self.sl.map_or(&[], |sl| sl.spans())
    }

    /// The span holding `x`, skipping spans that end at or before it.
    fn span_at(&mut self, x: i32) -> Option<&'a SpanBlock> {
        let spans = self.spans();
        while self.idx < spans.len() && spans[self.idx].end() <= x {
            self.idx += 1;
        }
        spans.get(self.idx).filter(|s| s.x <= x)
    }

    /// Fill `out` with coverage for `x..x + out.len()`.
    fn covers(&mut self, x: i32, out: &mut Vec<CoverType>, len: usize) {
        out.clear();
        match (self.sl, self.span_at(x)) {
            (Some(sl), Some(span)) => {
                out.extend((0..len as i32).map(|i| span_cover(sl, span, x + i)));
            }
            _ => out.resize(len, 0),
        }
    }
}

/// Sorted, unique x positions where either row enters or leaves a span.
fn breakpoints(a: Option<&GeometryScanline>, b: Option<&GeometryScanline>, out: &mut Vec<i32>) {
    out.clear();
    for sl in [a, b].into_iter().flatten() {
        for span in sl.spans() {
            out.push(span.x);
            out.push(span.end());
        }
    }
    out.sort_unstable();
    out.dedup();
}

/// Scratch buffers reused across rows.
#[derive(Default)]
struct Scratch {
    points: Vec<i32>,
    src: Vec<CoverType>,
    dst: Vec<CoverType>,
    out: Vec<CoverType>,
}

#[allow(clippy::too_many_arguments)]
fn blend_row<PF, SG1, SG2>(
    op: CompositeOperation,
    y: i32,
    src: Option<&GeometryScanline>,
    dst: Option<&GeometryScanline>,
    ren: &mut RenderBase<PF>,
    alloc: &mut SpanAllocator<Rgba8>,
    gens: &mut FillBlend<SG1, SG2>,
    scratch: &mut Scratch,
) where
    PF: PixelFormat,
    SG1: SpanGenerator,
    SG2: SpanGenerator,
{
    breakpoints(src, dst, &mut scratch.points);
    let mut src_cur = RowCursor::new(src);
    let mut dst_cur = RowCursor::new(dst);

    for w in 0..scratch.points.len().saturating_sub(1) {
        let x = scratch.points[w];
        let len = (scratch.points[w + 1] - x) as usize;
        src_cur.covers(x, &mut scratch.src, len);
        dst_cur.covers(x, &mut scratch.dst, len);

        for &layer in op.layers() {
            scratch.out.clear();
            scratch.out.extend(
                scratch
                    .src
                    .iter()
                    .zip(&scratch.dst)
                    .map(|(&cs, &cd)| layer_cover(layer, cs, cd)),
            );
            if scratch.out.iter().all(|&c| c == 0) {
                continue;
            }
            let colors = alloc.allocate(len);
            match layer.0 {
                Paint::Source => gens.first_mut().generate(colors, x, y, len),
                Paint::Destination => gens.second_mut().generate(colors, x, y, len),
                Paint::Sum => gens.generate(colors, x, y, len),
            }
            ren.blend_color_hspan(x, y, len as i32, colors, &scratch.out, 0);
        }
    }
}

// ============================================================================
// blend_scanline
// ============================================================================

/// Composite the shape in `ras_src` onto the shape in `ras_dst`.
///
/// Rows the two shapes share are split into exclusive and overlapping
/// pieces; rows only one shape reaches are handled as pure exclusive
/// pieces. An empty rasterizer simply contributes nothing.
#[allow(clippy::too_many_arguments)]
pub fn blend_scanline<PF, SG1, SG2>(
    op: CompositeOperation,
    ras_src: &mut RasterizerScanlineAa,
    ras_dst: &mut RasterizerScanlineAa,
    sl_src: &mut GeometryScanline,
    sl_dst: &mut GeometryScanline,
    ren: &mut RenderBase<PF>,
    alloc: &mut SpanAllocator<Rgba8>,
    span_gen_src: &mut SG1,
    span_gen_dst: &mut SG2,
) where
    PF: PixelFormat,
    SG1: SpanGenerator + ?Sized,
    SG2: SpanGenerator + ?Sized,
{
    let mut has_src = ras_src.rewind_scanlines();
    let mut has_dst = op.uses_destination() && ras_dst.rewind_scanlines();
    if !has_src && !has_dst {
        return;
    }
    if has_src {
        sl_src.reset(ras_src.min_x(), ras_src.max_x());
        has_src = ras_src.sweep_scanline(sl_src);
    }
    if has_dst {
        sl_dst.reset(ras_dst.min_x(), ras_dst.max_x());
        has_dst = ras_dst.sweep_scanline(sl_dst);
    }

    let mut gens = FillBlend::new(span_gen_src, span_gen_dst);
    gens.prepare();
    let mut scratch = Scratch::default();

    while has_src || has_dst {
        let take_src = has_src && (!has_dst || sl_src.y() <= sl_dst.y());
        let take_dst = has_dst && (!has_src || sl_dst.y() <= sl_src.y());
        let y = if take_src { sl_src.y() } else { sl_dst.y() };
        blend_row(
            op,
            y,
            take_src.then_some(&*sl_src),
            take_dst.then_some(&*sl_dst),
            ren,
            alloc,
            &mut gens,
            &mut scratch,
        );
        if take_src {
            has_src = ras_src.sweep_scanline(sl_src);
        }
        if take_dst {
            has_dst = ras_dst.sweep_scanline(sl_dst);
        }
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
    use crate::render_scanline::render_scanlines_aa;
    use crate::vertex_storage::VertexStorage;

    const W: u32 = 48;
    const H: u32 = 48;

    fn square() -> RasterizerScanlineAa {
        let mut path = VertexStorage::new();
        path.add_rect(10.0, 10.0, 30.0, 30.0);
        let mut ras = RasterizerScanlineAa::new();
        ras.add_path(&mut path, 0);
        ras
    }

    fn circle() -> RasterizerScanlineAa {
        let mut path = VertexStorage::new();
        let (cx, cy, r) = (30.0, 30.0, 12.0);
        for i in 0..64 {
            let a = i as f64 * std::f64::consts::TAU / 64.0;
            let (x, y) = (cx + r * a.cos(), cy + r * a.sin());
            if i == 0 {
                path.move_to(x, y);
            } else {
                path.line_to(x, y);
            }
        }
        path.close_polygon();
        let mut ras = RasterizerScanlineAa::new();
        ras.add_path(&mut path, 0);
        ras
    }

    fn blend(op: CompositeOperation, src: &mut RasterizerScanlineAa, dst: &mut RasterizerScanlineAa) -> Vec<u8> {
        let mut data = vec![0u8; (W * H * 4) as usize];
        {
            let rb = RenderBuffer::new(&mut data, W, H, (W * 4) as usize).unwrap();
            let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
            let mut alloc = SpanAllocator::new();
            blend_scanline(
                op,
                src,
                dst,
                &mut GeometryScanline::new(),
                &mut GeometryScanline::new(),
                &mut ren,
                &mut alloc,
                &mut FillSolid::new(Rgba8::RED),
                &mut FillSolid::new(Rgba8::BLUE),
            );
        }
        data
    }

    fn at(data: &[u8], x: u32, y: u32) -> Rgba8 {
        let i = ((y * W + x) * 4) as usize;
        Rgba8::new(data[i], data[i + 1], data[i + 2], data[i + 3])
    }

    #[test]
    fn test_source_in_covers_only_intersection() {
        let mut a = square();
        let mut b = circle();
        let data = blend(CompositeOperation::SourceIn, &mut a, &mut b);

        // Square only, circle only, both.
        assert_eq!(at(&data, 12, 12).a, 0);
        assert_eq!(at(&data, 38, 30).a, 0);
        assert_eq!(at(&data, 25, 25), Rgba8::RED);

        for y in 0..H {
            for x in 0..W {
                if at(&data, x, y).a != 0 {
                    let (x, y) = (x as i32, y as i32);
                    assert!(a.hit_test(x, y) && b.hit_test(x, y), "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_copy_ignores_destination() {
        let data = blend(CompositeOperation::Copy, &mut square(), &mut circle());

        let mut expected = vec![0u8; (W * H * 4) as usize];
        {
            let rb = RenderBuffer::new(&mut expected, W, H, (W * 4) as usize).unwrap();
            let mut ren = RenderBase::new(PixfmtRgba32::new(rb));
            render_scanlines_aa(
                &mut square(),
                &mut GeometryScanline::new(),
                &mut ren,
                &mut SpanAllocator::new(),
                &mut FillSolid::new(Rgba8::RED),
            );
        }
        assert_eq!(data, expected);
    }

    #[test]
    fn test_source_over_paints_source_on_top() {
        let data = blend(CompositeOperation::SourceOver, &mut square(), &mut circle());
        assert_eq!(at(&data, 25, 25), Rgba8::RED);
        assert_eq!(at(&data, 38, 30), Rgba8::BLUE);
        assert_eq!(at(&data, 12, 12), Rgba8::RED);
    }

    #[test]
    fn test_destination_over_paints_destination_on_top() {
        let data = blend(CompositeOperation::DestinationOver, &mut square(), &mut circle());
        assert_eq!(at(&data, 25, 25), Rgba8::BLUE);
        assert_eq!(at(&data, 12, 12), Rgba8::RED);
    }

    #[test]
    fn test_xor_clears_overlap() {
        let data = blend(CompositeOperation::Xor, &mut square(), &mut circle());
        assert_eq!(at(&data, 25, 25).a, 0);
        assert_eq!(at(&data, 12, 12), Rgba8::RED);
        assert_eq!(at(&data, 38, 30), Rgba8::BLUE);
    }

    #[test]
    fn test_out_and_atop() {
        let out = blend(CompositeOperation::SourceOut, &mut square(), &mut circle());
        assert_eq!(at(&out, 12, 12), Rgba8::RED);
        assert_eq!(at(&out, 25, 25).a, 0);
        assert_eq!(at(&out, 38, 30).a, 0);

        let atop = blend(CompositeOperation::SourceAtop, &mut square(), &mut circle());
        assert_eq!(at(&atop, 12, 12).a, 0);
        assert_eq!(at(&atop, 25, 25), Rgba8::RED);
        assert_eq!(at(&atop, 38, 30), Rgba8::BLUE);

        let dst_out = blend(CompositeOperation::DestinationOut, &mut square(), &mut circle());
        assert_eq!(at(&dst_out, 38, 30), Rgba8::BLUE);
        assert_eq!(at(&dst_out, 25, 25).a, 0);
    }

    #[test]
    fn test_lighter_adds_in_overlap() {
        let data = blend(CompositeOperation::Lighter, &mut square(), &mut circle());
        assert_eq!(at(&data, 25, 25), Rgba8::new(255, 0, 255, 255));
        assert_eq!(at(&data, 12, 12), Rgba8::RED);
    }

    #[test]
    fn test_rows_of_one_shape_only() {
        // Destination entirely below the source.
        let mut path = VertexStorage::new();
        path.add_rect(0.0, 40.0, 10.0, 44.0);
        let mut low = RasterizerScanlineAa::new();
        low.add_path(&mut path, 0);
        let data = blend(CompositeOperation::SourceOver, &mut square(), &mut low);
        assert_eq!(at(&data, 5, 42), Rgba8::BLUE);
        assert_eq!(at(&data, 20, 20), Rgba8::RED);
    }
}
