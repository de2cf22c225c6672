//! Retained-mode drawing surface.
//!
//! A [`Canvas`] records [`DrawCommand`]s, each holding a shape and a copy
//! of the [`Paint`] it was issued with, and replays them into a host buffer
//! on every [`Canvas::on_draw`]. All shapes, text and images included, are
//! turned into vertex paths and go through the same rasterizer, so every
//! one of them can take part in compositing.
//!
//! Coordinates are canvas-local; the canvas origin (`set_position`) is
//! added last, after the paint transform.

use log::{debug, trace, warn};

use crate::basics::{uround, PointD, RectI, VertexSource, COVER_FULL};
use crate::bezier_arc::BezierArc;
use crate::blend_scanline::blend_scanline;
use crate::box_blur::BoxBlur;
use crate::buffer::{BufferInfo, ImageInfo};
use crate::color::Rgba8;
use crate::curve_adaptor::CurveAdaptor;
use crate::dash::DashAdaptor;
use crate::fill_base::{SpanAllocator, SpanGenerator};
use crate::fill_gradient::{FillGradient, GradientLinearCalculate, GradientRadialCalculate};
use crate::fill_image::FillImage;
use crate::fill_interpolator::FillInterpolator;
use crate::fill_pattern::FillPattern;
use crate::fill_solid::FillSolid;
use crate::geometry_scanline::GeometryScanline;
use crate::gradient_lut::GradientLut;
use crate::paint::{Gradient, Paint, PaintStyle};
use crate::pixfmt_rgba::{PixelFormat, PixfmtRgba32};
use crate::rasterizer::RasterizerScanlineAa;
use crate::render_base::RenderBase;
use crate::render_scanline::{render_scanlines_aa, render_scanlines_aa_solid};
use crate::stroke::StrokeAdaptor;
use crate::text::FontStyle;
#[cfg(feature = "font")]
use crate::text::FontFace;
use crate::trans_affine::TransAffine;
use crate::transform_adaptor::TransformAdaptor;
use crate::vertex_storage::VertexStorage;

/// Curves are stroked no wider than this.
pub const MAX_CURVE_WIDTH: f64 = 3.0;

// ============================================================================
// Commands
// ============================================================================

/// Geometry of one recorded command, in canvas coordinates.
#[derive(Debug, Clone)]
pub enum Shape {
    Line {
        start: PointD,
        end: PointD,
    },
    Curve {
        start: PointD,
        control1: PointD,
        control2: PointD,
        end: PointD,
    },
    Rect {
        origin: PointD,
        width: f64,
        height: f64,
    },
    Circle {
        center: PointD,
        radius: f64,
    },
    /// Angles in degrees, 0 at twelve o'clock, growing clockwise. A sector
    /// is closed through the center.
    Arc {
        center: PointD,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        sector: bool,
    },
    /// A snapshot of the canvas path. `stroke` selects outlining over
    /// filling.
    Path {
        vertices: VertexStorage,
        stroke: bool,
    },
    /// `image` stretched over `width` x `height` at `origin`.
    Image {
        image: ImageInfo,
        origin: PointD,
        width: f64,
        height: f64,
    },
    /// One line of text whose line box has its top-left corner at `origin`.
    /// `stroke` selects the stroke color over the fill color.
    Text {
        text: String,
        origin: PointD,
        style: FontStyle,
        stroke: bool,
    },
}

impl Shape {
    fn name(&self) -> &'static str {
        match self {
            Shape::Line { .. } => "line",
            Shape::Curve { .. } => "curve",
            Shape::Rect { .. } => "rect",
            Shape::Circle { .. } => "circle",
            Shape::Arc { .. } => "arc",
            Shape::Path { .. } => "path",
            Shape::Image { .. } => "image",
            Shape::Text { .. } => "text",
        }
    }
}

/// A shape and the paint it was issued with.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub paint: Paint,
    pub shape: Shape,
}

// ============================================================================
// Render passes
// ============================================================================

/// Where the colors of a pass come from.
#[derive(Debug, Clone)]
enum Source {
    Color(Rgba8),
    /// The paint's gradient, pattern or fill color, by style.
    Paint,
    /// `image` mapped through `placement` (image pixels to canvas space).
    Image { image: ImageInfo, placement: TransAffine },
}

/// One rasterized layer of a command: a path, optionally outlined with a
/// given width, and its color source.
#[derive(Debug, Clone)]
struct Pass {
    path: VertexStorage,
    stroke_width: Option<f64>,
    source: Source,
}

impl Pass {
    fn fill(path: VertexStorage, source: Source) -> Self {
        Self {
            path,
            stroke_width: None,
            source,
        }
    }

    fn stroke(path: VertexStorage, width: f64, color: Rgba8) -> Self {
        Self {
            path,
            stroke_width: Some(width),
            source: Source::Color(color),
        }
    }
}

/// Append an arc of `radius` around `center` from `start_angle` to
/// `end_angle` (degrees, clockwise from twelve o'clock) to `path`.
///
/// The arc starts with a line from the current point, or a move when the
/// path is empty. A full turn or more draws the whole circle.
pub fn append_arc(path: &mut VertexStorage, center: PointD, radius: f64, start_angle: f64, end_angle: f64) {
    if start_angle == end_angle {
        return;
    }
    let point_at = |deg: f64| {
        let (s, c) = deg.to_radians().sin_cos();
        PointD::new(center.x + radius * s, center.y - radius * c)
    };
    let start = point_at(start_angle);
    if path.total_vertices() > 0 {
        path.line_to(start.x, start.y);
    } else {
        path.move_to(start.x, start.y);
    }

    let sweep = end_angle - start_angle;
    if sweep.abs() >= 360.0 {
        // An SVG arc cannot end on its own start point; go round in halves.
        let half = point_at(start_angle + 180.0);
        path.arc_to(radius, radius, 0.0, false, true, half.x, half.y);
        path.arc_to(radius, radius, 0.0, false, true, start.x, start.y);
        return;
    }
    let end = point_at(end_angle);
    let large_arc = sweep > 180.0 || sweep <= 0.0;
    path.arc_to(radius, radius, 0.0, large_arc, true, end.x, end.y);
}

fn shape_passes(shape: &Shape, paint: &Paint, #[cfg(feature = "font")] font: Option<&FontFace>) -> Vec<Pass> {
    let style = paint.style();
    let stroke_color = paint.render_color(true);
    let width = paint.stroke_width();

    // Closed outline, filled and/or stroked according to the style.
    let styled = |path: VertexStorage| {
        let mut passes = Vec::with_capacity(2);
        if style.fills() {
            passes.push(Pass::fill(path.clone(), Source::Paint));
        }
        if style.strokes() {
            passes.push(Pass::stroke(path, width, stroke_color));
        }
        passes
    };

    match shape {
        Shape::Line { start, end } => {
            let mut path = VertexStorage::new();
            path.move_to(start.x, start.y);
            path.line_to(end.x, end.y);
            vec![Pass::stroke(path, width, stroke_color)]
        }
        Shape::Curve {
            start,
            control1,
            control2,
            end,
        } => {
            let mut path = VertexStorage::new();
            path.move_to(start.x, start.y);
            path.curve4(control1.x, control1.y, control2.x, control2.y, end.x, end.y);
            vec![Pass::stroke(path, width.min(MAX_CURVE_WIDTH), stroke_color)]
        }
        Shape::Rect { origin, width: w, height: h } => {
            let mut path = VertexStorage::new();
            path.add_rect(origin.x, origin.y, origin.x + w, origin.y + h);
            styled(path)
        }
        Shape::Circle { center, radius } => {
            let mut path = VertexStorage::new();
            let mut arc = BezierArc::new(center.x, center.y, *radius, *radius, 0.0, std::f64::consts::TAU);
            path.concat_path(&mut arc, 0);
            path.close_polygon();
            styled(path)
        }
        Shape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            sector,
        } => {
            let mut path = VertexStorage::new();
            if *sector {
                path.move_to(center.x, center.y);
                append_arc(&mut path, *center, *radius, *start_angle, *end_angle);
                path.close_polygon();
                styled(path)
            } else {
                append_arc(&mut path, *center, *radius, *start_angle, *end_angle);
                vec![Pass::stroke(path, width, stroke_color)]
            }
        }
        Shape::Path { vertices, stroke } => {
            if *stroke {
                vec![Pass::stroke(vertices.clone(), width, stroke_color)]
            } else {
                vec![Pass::fill(vertices.clone(), Source::Paint)]
            }
        }
        Shape::Image {
            image,
            origin,
            width: w,
            height: h,
        } => {
            let mut path = VertexStorage::new();
            path.add_rect(origin.x, origin.y, origin.x + w, origin.y + h);
            let mut placement = TransAffine::new_scaling(w / image.width() as f64, h / image.height() as f64);
            placement.translate(origin.x, origin.y);
            vec![Pass::fill(
                path,
                Source::Image {
                    image: image.clone(),
                    placement,
                },
            )]
        }
        #[cfg(feature = "font")]
        Shape::Text {
            text,
            origin,
            style: font_style,
            stroke,
        } => {
            let Some(font) = font else {
                warn!("canvas: no font face set, text skipped");
                return Vec::new();
            };
            let mut path = VertexStorage::new();
            font.append_text(&mut path, text, origin.x, origin.y, font_style);
            let color = paint.render_color(*stroke);
            vec![Pass::fill(path, Source::Color(color))]
        }
        #[cfg(not(feature = "font"))]
        Shape::Text { .. } => {
            warn!("canvas: built without the `font` feature, text skipped");
            Vec::new()
        }
    }
}

/// The pass that stands for the whole command when compositing: the fill
/// when there is one, else the outline.
fn primary_pass(mut passes: Vec<Pass>) -> Option<Pass> {
    if passes.is_empty() {
        return None;
    }
    let idx = passes
        .iter()
        .position(|p| p.stroke_width.is_none())
        .unwrap_or(0);
    Some(passes.swap_remove(idx))
}

// ============================================================================
// Pipeline helpers
// ============================================================================

fn add_stroked<VS: VertexSource>(
    ras: &mut RasterizerScanlineAa,
    source: VS,
    paint: &Paint,
    width: f64,
    mtx: &TransAffine,
) {
    let mut stroke = StrokeAdaptor::new(source);
    stroke.set_width(width);
    stroke.set_line_cap(paint.line_cap());
    stroke.set_line_join(paint.line_join());
    if paint.miter_limit() > 0.0 {
        stroke.set_miter_limit(paint.miter_limit());
    }
    stroke.set_approximation_scale(mtx.scale_factor());
    let mut trans = TransformAdaptor::new(stroke, *mtx);
    ras.add_path(&mut trans, 0);
}

/// Reset `ras` and feed it `pass` through curve flattening, optional dash
/// and stroke generation, and `mtx`.
fn rasterize(ras: &mut RasterizerScanlineAa, pass: &mut Pass, paint: &Paint, mtx: &TransAffine) {
    ras.reset();
    let mut curve = CurveAdaptor::new(&mut pass.path);
    curve.set_approximation_scale(mtx.scale_factor());
    match pass.stroke_width {
        None => {
            let mut trans = TransformAdaptor::new(curve, *mtx);
            ras.add_path(&mut trans, 0);
        }
        Some(width) if paint.is_line_dash() => {
            let mut dash = DashAdaptor::new(curve);
            for (dash_len, gap_len) in paint.dash_pairs() {
                dash.add_dash(dash_len, gap_len);
            }
            dash.set_dash_start(paint.line_dash_offset());
            add_stroked(ras, dash, paint, width, mtx);
        }
        Some(width) => add_stroked(ras, curve, paint, width, mtx),
    }
}

fn gradient_lut(paint: &Paint) -> GradientLut {
    let mut lut = GradientLut::new();
    for stop in paint.color_stops() {
        lut.add_color(stop.offset, stop.color.with_alpha_scale(paint.alpha_scale()));
    }
    lut.build_lut();
    lut
}

/// Gradient generator for `gradient`, mapped through `mtx`.
pub fn gradient_generator(gradient: &Gradient, paint: &Paint, mtx: &TransAffine) -> Box<dyn SpanGenerator> {
    let lut = gradient_lut(paint);
    match *gradient {
        Gradient::Linear { x0, y0, x1, y1 } => {
            let (dx, dy) = (x1 - x0, y1 - y0);
            let mut m = TransAffine::new_rotation(dy.atan2(dx));
            m.translate(x0, y0);
            m.multiply(mtx);
            m.invert();
            let len = (dx * dx + dy * dy).sqrt();
            Box::new(FillGradient::new(
                FillInterpolator::new(m),
                GradientLinearCalculate,
                lut,
                0.0,
                len,
            ))
        }
        Gradient::Radial {
            x0,
            y0,
            r0,
            x1,
            y1,
            r1,
        } => {
            let mut m = TransAffine::new_translation(x1, y1);
            m.multiply(mtx);
            m.invert();
            let calc = GradientRadialCalculate::new(r1, x0 - x1, y0 - y1);
            Box::new(FillGradient::new(FillInterpolator::new(m), calc, lut, r0, r1))
        }
    }
}

/// Span generator for `source`. `mtx` maps canvas space to the device,
/// `origin` is the canvas origin on the device.
fn span_generator(source: &Source, paint: &Paint, mtx: &TransAffine, origin: (i32, i32)) -> Box<dyn SpanGenerator> {
    match source {
        Source::Color(c) => Box::new(FillSolid::new(*c)),
        Source::Image { image, placement } => {
            let mut m = *placement;
            m.multiply(mtx);
            m.invert();
            Box::new(FillImage::new(image.clone(), FillInterpolator::new(m), paint.alpha_scale()))
        }
        Source::Paint => match (paint.style(), paint.gradient(), paint.pattern()) {
            (PaintStyle::Gradient, Some(gradient), _) => gradient_generator(gradient, paint, mtx),
            (PaintStyle::Pattern, _, Some(pattern)) => Box::new(
                FillPattern::new(pattern.image.clone(), pattern.repeat, origin.0, origin.1)
                    .with_alpha(paint.alpha_scale()),
            ),
            _ => Box::new(FillSolid::new(paint.render_color(false))),
        },
    }
}

/// Rasterizers, scanlines and buffers reused across draw passes.
#[derive(Debug, Default)]
struct Scratch {
    ras: RasterizerScanlineAa,
    ras_dst: RasterizerScanlineAa,
    sl: GeometryScanline,
    sl_dst: GeometryScanline,
    alloc: SpanAllocator<Rgba8>,
    blur: BoxBlur,
}

/// Per-draw state: the device-space area being repainted and the canvas
/// origin on the device.
#[derive(Debug, Clone, Copy)]
struct Frame {
    area: RectI,
    origin: (i32, i32),
}

impl Frame {
    /// Paint transform followed by the move to the canvas origin.
    fn transform(&self, paint: &Paint) -> TransAffine {
        let mut m = *paint.trans_affine();
        m.translate(self.origin.0 as f64, self.origin.1 as f64);
        m
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// A drawing surface of `width` x `height` pixels.
#[derive(Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    background: Rgba8,

    path: VertexStorage,
    start_point: PointD,
    commands: Vec<DrawCommand>,
    paint_stack: Vec<Paint>,

    #[cfg(feature = "font")]
    font: Option<FontFace>,

    scratch: Scratch,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
            background: Rgba8::WHITE,
            path: VertexStorage::new(),
            start_point: PointD::default(),
            commands: Vec::new(),
            paint_stack: Vec::new(),
            #[cfg(feature = "font")]
            font: None,
            scratch: Scratch::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Place the canvas at `(x, y)` in the destination buffer.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_background(&mut self, color: Rgba8) {
        self.background = color;
    }

    pub fn background(&self) -> Rgba8 {
        self.background
    }

    /// The canvas area in the destination buffer, corners inclusive.
    pub fn rect(&self) -> RectI {
        RectI::new(
            self.x,
            self.y,
            self.x + self.width as i32 - 1,
            self.y + self.height as i32 - 1,
        )
    }

    /// Face used by [`Canvas::draw_label`], [`Canvas::stroke_text`] and
    /// [`Canvas::measure_text`].
    #[cfg(feature = "font")]
    pub fn set_font(&mut self, font: FontFace) {
        self.font = Some(font);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Where the next [`Canvas::draw_line_from`] starts.
    pub fn set_start_position(&mut self, point: PointD) {
        self.start_point = point;
    }

    pub fn start_position(&self) -> PointD {
        self.start_point
    }

    fn push(&mut self, paint: &Paint, shape: Shape) {
        self.commands.push(DrawCommand {
            paint: paint.clone(),
            shape,
        });
    }

    // ------------------------------------------------------------------------
    // Path building
    // ------------------------------------------------------------------------

    pub fn begin_path(&mut self) {
        self.path.remove_all();
    }

    pub fn move_to(&mut self, point: PointD) {
        self.path.move_to(point.x, point.y);
    }

    pub fn line_to(&mut self, point: PointD) {
        self.path.line_to(point.x, point.y);
    }

    /// Arc around `center` from `start_angle` to `end_angle`, in degrees
    /// clockwise from twelve o'clock. Equal angles add nothing.
    pub fn arc_to(&mut self, center: PointD, radius: f64, start_angle: f64, end_angle: f64) {
        if start_angle == end_angle {
            debug!("canvas: arc with equal start and end angle skipped");
            return;
        }
        append_arc(&mut self.path, center, radius, start_angle, end_angle);
    }

    pub fn add_rect(&mut self, point: PointD, width: f64, height: f64) {
        self.path
            .add_rect(point.x, point.y, point.x + width, point.y + height);
    }

    pub fn close_path(&mut self) {
        self.path.close_polygon();
    }

    pub fn path(&self) -> &VertexStorage {
        &self.path
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    pub fn draw_line(&mut self, start: PointD, end: PointD, paint: &Paint) {
        self.push(paint, Shape::Line { start, end });
        self.start_point = end;
    }

    /// Line from the current start position to `end`.
    pub fn draw_line_from(&mut self, end: PointD, paint: &Paint) {
        self.draw_line(self.start_point, end, paint);
    }

    /// Cubic Bezier curve, stroked at most [`MAX_CURVE_WIDTH`] wide.
    pub fn draw_curve(&mut self, start: PointD, control1: PointD, control2: PointD, end: PointD, paint: &Paint) {
        self.push(
            paint,
            Shape::Curve {
                start,
                control1,
                control2,
                end,
            },
        );
        self.start_point = end;
    }

    pub fn draw_rect(&mut self, origin: PointD, width: f64, height: f64, paint: &Paint) {
        self.push(paint, Shape::Rect { origin, width, height });
    }

    /// Rectangle outline, whatever the paint style.
    pub fn stroke_rect(&mut self, origin: PointD, width: f64, height: f64, paint: &Paint) {
        let mut paint = paint.clone();
        paint.set_style(PaintStyle::Stroke);
        self.push(&paint, Shape::Rect { origin, width, height });
        self.start_point = origin;
    }

    /// Paint a rectangle in the background color.
    pub fn clear_rect(&mut self, origin: PointD, width: f64, height: f64) {
        let mut paint = Paint::new();
        paint.set_fill_style(self.background);
        self.push(&paint, Shape::Rect { origin, width, height });
    }

    pub fn draw_circle(&mut self, center: PointD, radius: f64, paint: &Paint) {
        if radius <= 0.0 {
            debug!("canvas: circle with radius {radius} skipped");
            return;
        }
        self.push(paint, Shape::Circle { center, radius });
    }

    /// Pie slice, filled and/or stroked by the paint style.
    pub fn draw_sector(&mut self, center: PointD, radius: f64, start_angle: f64, end_angle: f64, paint: &Paint) {
        self.push_arc(center, radius, start_angle, end_angle, true, paint);
    }

    /// Open arc stroked with the stroke color. Paints without a stroke style
    /// draw nothing.
    pub fn draw_arc(&mut self, center: PointD, radius: f64, start_angle: f64, end_angle: f64, paint: &Paint) {
        if !paint.style().strokes() {
            debug!("canvas: arc skipped, {:?} paint does not stroke", paint.style());
            return;
        }
        self.push_arc(center, radius, start_angle, end_angle, false, paint);
    }

    fn push_arc(&mut self, center: PointD, radius: f64, start_angle: f64, end_angle: f64, sector: bool, paint: &Paint) {
        if radius <= 0.0 || start_angle == end_angle {
            debug!("canvas: degenerate arc skipped (radius {radius}, {start_angle}..{end_angle})");
            return;
        }
        self.push(
            paint,
            Shape::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                sector,
            },
        );
    }

    /// Outline the current path.
    pub fn draw_path(&mut self, paint: &Paint) {
        self.push_path(true, paint);
    }

    /// Fill the current path with the paint's color, gradient or pattern.
    pub fn fill_path(&mut self, paint: &Paint) {
        self.push_path(false, paint);
    }

    fn push_path(&mut self, stroke: bool, paint: &Paint) {
        if self.path.total_vertices() == 0 {
            debug!("canvas: empty path skipped");
            return;
        }
        let vertices = self.path.clone();
        self.push(paint, Shape::Path { vertices, stroke });
    }

    /// Draw `image` at its natural size.
    pub fn draw_image(&mut self, origin: PointD, image: &ImageInfo, paint: &Paint) {
        let (w, h) = (image.width() as f64, image.height() as f64);
        self.draw_image_scaled(origin, image, w, h, paint);
    }

    /// Draw `image` stretched to `width` x `height`.
    pub fn draw_image_scaled(&mut self, origin: PointD, image: &ImageInfo, width: f64, height: f64, paint: &Paint) {
        if width <= 0.0 || height <= 0.0 {
            warn!("canvas: image drawn at {width}x{height} skipped");
            return;
        }
        self.push(
            paint,
            Shape::Image {
                image: image.clone(),
                origin,
                width,
                height,
            },
        );
    }

    /// Text filled with the fill color.
    pub fn draw_label(&mut self, origin: PointD, text: &str, style: FontStyle, paint: &Paint) {
        self.push_text(origin, text, style, false, paint);
    }

    /// Text filled with the stroke color.
    pub fn stroke_text(&mut self, origin: PointD, text: &str, style: FontStyle, paint: &Paint) {
        self.push_text(origin, text, style, true, paint);
    }

    fn push_text(&mut self, origin: PointD, text: &str, style: FontStyle, stroke: bool, paint: &Paint) {
        if text.is_empty() {
            return;
        }
        self.push(
            paint,
            Shape::Text {
                text: text.to_owned(),
                origin,
                style,
                stroke,
            },
        );
    }

    /// Advance width of `text`, or 0 without a font face.
    #[cfg_attr(not(feature = "font"), allow(unused_variables))]
    pub fn measure_text(&self, text: &str, style: &FontStyle) -> f64 {
        #[cfg(feature = "font")]
        if let Some(font) = &self.font {
            return font.measure(text, style);
        }
        warn!("canvas: no font face, text measures as 0");
        0.0
    }

    /// Drop every recorded command and the current path.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.path.remove_all();
    }

    /// Push a copy of `paint`.
    pub fn save(&mut self, paint: &Paint) {
        self.paint_stack.push(paint.clone());
    }

    /// Pop the most recently saved paint.
    pub fn restore(&mut self) -> Option<Paint> {
        self.paint_stack.pop()
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    fn passes(&self, cmd: &DrawCommand) -> Vec<Pass> {
        #[cfg(feature = "font")]
        let passes = shape_passes(&cmd.shape, &cmd.paint, self.font.as_ref());
        #[cfg(not(feature = "font"))]
        let passes = shape_passes(&cmd.shape, &cmd.paint);
        passes
    }

    /// Repaint the part of the canvas inside `invalidated` (device pixels,
    /// corners inclusive) into `dst`.
    pub fn on_draw(&mut self, dst: &mut BufferInfo<'_>, invalidated: RectI) {
        let (width, height) = (dst.width(), dst.height());
        let rbuf = match dst.render_buffer() {
            Ok(rbuf) => rbuf,
            Err(e) => {
                warn!("canvas: draw skipped, {e}");
                return;
            }
        };
        let mut ren = RenderBase::new(PixfmtRgba32::new(rbuf));

        let mut area = invalidated;
        area.normalize();
        if !area.clip(&self.rect()) || !ren.clip_box_i(area.x1, area.y1, area.x2, area.y2) {
            return;
        }
        let area = *ren.clip_box();
        for y in area.y1..=area.y2 {
            ren.blend_hline(area.x1, y, area.x2, &self.background, COVER_FULL);
        }

        let frame = Frame {
            area,
            origin: (self.x, self.y),
        };
        let mut scratch = std::mem::take(&mut self.scratch);
        for ras in [&mut scratch.ras, &mut scratch.ras_dst] {
            ras.clip_box(0.0, 0.0, width as f64, height as f64);
        }

        let compositing = self.commands.iter().any(|c| c.paint.have_composite());
        debug!(
            "canvas: drawing {} commands into {:?}{}",
            self.commands.len(),
            area,
            if compositing { " with compositing" } else { "" }
        );
        if compositing {
            self.on_blend_draw(&mut ren, &mut scratch, &frame);
        } else {
            for cmd in &self.commands {
                trace!("canvas: {}", cmd.shape.name());
                let mut passes = self.passes(cmd);
                if cmd.paint.have_shadow() {
                    draw_shadow(&mut ren, &mut scratch, &frame, &mut passes, &cmd.paint);
                }
                for pass in &mut passes {
                    draw_pass(&mut ren, &mut scratch, &frame, pass, &cmd.paint);
                }
            }
        }
        self.scratch = scratch;
    }

    /// Composite every command before the last compositing one against it,
    /// using that command's operation.
    fn on_blend_draw(&self, ren: &mut RenderBase<PixfmtRgba32<'_>>, scratch: &mut Scratch, frame: &Frame) {
        let Some(target_idx) = self.commands.iter().rposition(|c| c.paint.have_composite()) else {
            return;
        };
        let target = &self.commands[target_idx];
        let Some(mut target_pass) = primary_pass(self.passes(target)) else {
            return;
        };
        let op = target.paint.global_composite_operation();
        let target_mtx = frame.transform(&target.paint);
        rasterize(&mut scratch.ras, &mut target_pass, &target.paint, &target_mtx);
        let mut target_gen = span_generator(&target_pass.source, &target.paint, &target_mtx, frame.origin);

        let mut count = self
            .commands
            .iter()
            .filter(|c| c.paint.have_composite())
            .count();
        for cmd in &self.commands {
            if cmd.paint.have_composite() {
                count -= 1;
            }
            if count == 0 {
                break;
            }
            trace!("canvas: {} composited with {:?}", cmd.shape.name(), op);
            let mut passes = self.passes(cmd);
            if cmd.paint.have_shadow() {
                draw_shadow(ren, scratch, frame, &mut passes, &cmd.paint);
            }
            let Some(mut pass) = primary_pass(passes) else {
                continue;
            };
            let mtx = frame.transform(&cmd.paint);
            rasterize(&mut scratch.ras_dst, &mut pass, &cmd.paint, &mtx);
            let mut gen = span_generator(&pass.source, &cmd.paint, &mtx, frame.origin);
            blend_scanline(
                op,
                &mut scratch.ras,
                &mut scratch.ras_dst,
                &mut scratch.sl,
                &mut scratch.sl_dst,
                ren,
                &mut scratch.alloc,
                &mut target_gen,
                &mut gen,
            );
        }
    }
}

fn draw_pass<PF: PixelFormat>(
    ren: &mut RenderBase<PF>,
    scratch: &mut Scratch,
    frame: &Frame,
    pass: &mut Pass,
    paint: &Paint,
) {
    let mtx = frame.transform(paint);
    rasterize(&mut scratch.ras, pass, paint, &mtx);
    match &pass.source {
        Source::Color(c) => render_scanlines_aa_solid(&mut scratch.ras, &mut scratch.sl, ren, c),
        source => {
            let mut gen = span_generator(source, paint, &mtx, frame.origin);
            render_scanlines_aa(&mut scratch.ras, &mut scratch.sl, ren, &mut scratch.alloc, &mut gen);
        }
    }
}

/// Render every pass in the shadow color at the shadow offset, then blur
/// what was drawn. Uses the second rasterizer so that a blend target held
/// in the first survives.
fn draw_shadow(
    ren: &mut RenderBase<PixfmtRgba32<'_>>,
    scratch: &mut Scratch,
    frame: &Frame,
    passes: &mut [Pass],
    paint: &Paint,
) {
    let shadow = paint.shadow();
    let color = shadow.color.with_alpha_scale(paint.alpha_scale());
    let mut mtx = *paint.trans_affine();
    mtx.translate(shadow.offset_x, shadow.offset_y);
    mtx.translate(frame.origin.0 as f64, frame.origin.1 as f64);

    let mut bbox: Option<RectI> = None;
    let ras = &mut scratch.ras_dst;
    for pass in passes.iter_mut() {
        rasterize(ras, pass, paint, &mtx);
        if !ras.rewind_scanlines() {
            continue;
        }
        let r = RectI::new(ras.min_x(), ras.min_y(), ras.max_x(), ras.max_y());
        bbox = Some(match bbox {
            Some(b) => RectI::new(b.x1.min(r.x1), b.y1.min(r.y1), b.x2.max(r.x2), b.y2.max(r.y2)),
            None => r,
        });
        render_scanlines_aa_solid(ras, &mut scratch.sl_dst, ren, &color);
    }

    let radius = uround(shadow.blur as f64);
    let Some(b) = bbox else {
        return;
    };
    if radius == 0 {
        return;
    }
    let r = radius as i32;
    let mut region = RectI::new(b.x1 - r, b.y1 - r, b.x2 + r, b.y2 + r);
    if region.clip(&frame.area) {
        scratch
            .blur
            .blur(ren.ren_mut().rbuf_mut(), region, radius);
    }
}

// ============================================================================
// Tests
// ============================================================================
