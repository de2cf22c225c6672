//! Drawing style for canvas commands.
//!
//! A [`Paint`] is a plain value: every canvas command copies the paint it
//! was issued with, so later changes never affect commands already queued.

use crate::basics::deg2rad;
use crate::blend_scanline::CompositeOperation;
use crate::buffer::ImageInfo;
use crate::color::Rgba8;
use crate::fill_pattern::PatternRepeat;
use crate::stroke_math::{LineCap, LineJoin};
use crate::trans_affine::TransAffine;

/// Stroke width of a fresh paint, in pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// What a closed shape is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    Stroke,
    Fill,
    #[default]
    StrokeFill,
    Gradient,
    Pattern,
}

impl PaintStyle {
    /// Whether outlines are drawn with the stroke color.
    pub fn strokes(self) -> bool {
        matches!(self, PaintStyle::Stroke | PaintStyle::StrokeFill)
    }

    /// Whether interiors are painted. Gradient and pattern styles fill.
    pub fn fills(self) -> bool {
        !matches!(self, PaintStyle::Stroke)
    }

    /// Whether the paint uses a flat color rather than a gradient or pattern.
    pub fn is_solid(self) -> bool {
        matches!(self, PaintStyle::Stroke | PaintStyle::Fill | PaintStyle::StrokeFill)
    }
}

/// Geometry of a gradient, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gradient {
    /// Colors run from `(x0, y0)` at offset 0 to `(x1, y1)` at offset 1.
    Linear { x0: f64, y0: f64, x1: f64, y1: f64 },
    /// Colors run from the start circle to the end circle.
    Radial {
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub image: ImageInfo,
    pub repeat: PatternRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba8,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: u16,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: Rgba8::BLACK,
            offset_x: 0.0,
            offset_y: 0.0,
            blur: 0,
        }
    }
}

/// Style snapshot attached to every draw command.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    style: PaintStyle,
    fill_color: Rgba8,
    stroke_color: Rgba8,
    opacity: u8,
    stroke_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,

    dash_mode: bool,
    dash_array: Vec<f64>,
    dash_offset: f64,

    gradient: Option<Gradient>,
    stops: Vec<ColorStop>,
    pattern: Option<Pattern>,

    shadow: Shadow,
    have_shadow: bool,

    global_alpha: f64,
    composite: CompositeOperation,
    have_composite: bool,

    transform: TransAffine,
    rotate_angle: f64,
    scale_x: f64,
    scale_y: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            style: PaintStyle::StrokeFill,
            fill_color: Rgba8::BLACK,
            stroke_color: Rgba8::WHITE,
            opacity: 255,
            stroke_width: DEFAULT_STROKE_WIDTH,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Round,
            miter_limit: 0.0,
            dash_mode: false,
            dash_array: Vec::new(),
            dash_offset: 0.0,
            gradient: None,
            stops: Vec::new(),
            pattern: None,
            shadow: Shadow::default(),
            have_shadow: false,
            global_alpha: 1.0,
            composite: CompositeOperation::SourceOver,
            have_composite: false,
            transform: TransAffine::new(),
            rotate_angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Paint {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Colors and style
    // ------------------------------------------------------------------------

    pub fn set_style(&mut self, style: PaintStyle) {
        self.style = style;
    }

    pub fn style(&self) -> PaintStyle {
        self.style
    }

    /// Switch to stroke-only painting in `color`.
    pub fn set_stroke_style(&mut self, color: Rgba8) {
        self.style = PaintStyle::Stroke;
        self.stroke_color = color;
    }

    /// Switch to fill-only painting in `color`.
    pub fn set_fill_style(&mut self, color: Rgba8) {
        self.style = PaintStyle::Fill;
        self.fill_color = color;
    }

    pub fn set_fill_color(&mut self, color: Rgba8) {
        self.fill_color = color;
    }

    pub fn fill_color(&self) -> Rgba8 {
        self.fill_color
    }

    pub fn set_stroke_color(&mut self, color: Rgba8) {
        self.stroke_color = color;
    }

    pub fn stroke_color(&self) -> Rgba8 {
        self.stroke_color
    }

    /// Opacity in `0..=255`. Scales the alpha of everything drawn with this
    /// paint, on top of the global alpha.
    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity;
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Multiplies the alpha of every color this paint produces. Clamped to
    /// `[0, 1]`.
    pub fn set_global_alpha(&mut self, alpha: f64) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn global_alpha(&self) -> f64 {
        self.global_alpha
    }

    /// Combined alpha factor of opacity and global alpha.
    pub fn alpha_scale(&self) -> f64 {
        self.opacity as f64 / 255.0 * self.global_alpha
    }

    /// The color a fill or stroke is rendered with, opacity and global alpha
    /// applied.
    pub fn render_color(&self, stroke: bool) -> Rgba8 {
        let c = if stroke {
            self.stroke_color
        } else {
            self.fill_color
        };
        c.with_alpha_scale(self.alpha_scale())
    }

    // ------------------------------------------------------------------------
    // Stroke geometry
    // ------------------------------------------------------------------------

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width.max(0.0);
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.line_cap = cap;
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.line_join = join;
    }

    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    /// Only limits greater than zero reach the stroker.
    pub fn set_miter_limit(&mut self, limit: f64) {
        self.miter_limit = limit;
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    /// Dash pattern as alternating dash and gap lengths. An empty slice turns
    /// dashing off; an unpaired trailing value is ignored.
    pub fn set_line_dash(&mut self, dashes: &[f64]) {
        self.clear_line_dash();
        if dashes.is_empty() {
            return;
        }
        self.dash_array = dashes.to_vec();
        self.dash_mode = true;
    }

    pub fn line_dash(&self) -> &[f64] {
        &self.dash_array
    }

    pub fn set_line_dash_offset(&mut self, offset: f64) {
        self.dash_offset = offset;
        self.dash_mode = true;
    }

    pub fn line_dash_offset(&self) -> f64 {
        self.dash_offset
    }

    pub fn clear_line_dash(&mut self) {
        self.dash_array.clear();
        self.dash_offset = 0.0;
        self.dash_mode = false;
    }

    pub fn is_line_dash(&self) -> bool {
        self.dash_mode
    }

    /// `(dash, gap)` pairs of the dash pattern.
    pub fn dash_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.dash_array.chunks_exact(2).map(|p| (p[0], p[1]))
    }

    // ------------------------------------------------------------------------
    // Gradient and pattern
    // ------------------------------------------------------------------------

    pub fn create_linear_gradient(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.gradient = Some(Gradient::Linear { x0, y0, x1, y1 });
    }

    pub fn create_radial_gradient(&mut self, x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) {
        self.gradient = Some(Gradient::Radial {
            x0,
            y0,
            r0,
            x1,
            y1,
            r1,
        });
    }

    pub fn add_color_stop(&mut self, offset: f64, color: Rgba8) {
        self.stops.push(ColorStop { offset, color });
    }

    pub fn gradient(&self) -> Option<&Gradient> {
        self.gradient.as_ref()
    }

    pub fn color_stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Image used by [`PaintStyle::Pattern`], tiled from the canvas origin.
    pub fn create_pattern(&mut self, image: ImageInfo, repeat: PatternRepeat) {
        self.pattern = Some(Pattern { image, repeat });
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    // ------------------------------------------------------------------------
    // Shadow
    // ------------------------------------------------------------------------

    /// Setting a shadow color turns the shadow on.
    pub fn set_shadow_color(&mut self, color: Rgba8) {
        self.shadow.color = color;
        self.have_shadow = true;
    }

    pub fn set_shadow_offset_x(&mut self, offset: f64) {
        self.shadow.offset_x = offset;
    }

    pub fn set_shadow_offset_y(&mut self, offset: f64) {
        self.shadow.offset_y = offset;
    }

    pub fn set_shadow_blur(&mut self, radius: u16) {
        self.shadow.blur = radius;
    }

    pub fn shadow(&self) -> &Shadow {
        &self.shadow
    }

    pub fn have_shadow(&self) -> bool {
        self.have_shadow
    }

    // ------------------------------------------------------------------------
    // Compositing
    // ------------------------------------------------------------------------

    /// Choosing any operation other than source-over marks the paint as
    /// compositing for good, even if source-over is set again later.
    pub fn set_global_composite_operation(&mut self, op: CompositeOperation) {
        self.composite = op;
        if op != CompositeOperation::SourceOver {
            self.have_composite = true;
        }
    }

    pub fn global_composite_operation(&self) -> CompositeOperation {
        self.composite
    }

    pub fn have_composite(&self) -> bool {
        self.have_composite
    }

    // ------------------------------------------------------------------------
    // Transform
    // ------------------------------------------------------------------------

    /// Rotate by `angle` degrees about the canvas origin.
    pub fn rotate(&mut self, angle: f64) {
        self.transform.rotate(deg2rad(angle));
        self.rotate_angle += angle;
    }

    /// Rotate by `angle` degrees about `(x, y)`.
    pub fn rotate_about(&mut self, angle: f64, x: f64, y: f64) {
        self.transform.translate(-x, -y);
        self.transform.rotate(deg2rad(angle));
        self.transform.translate(x, y);
        self.rotate_angle += angle;
    }

    /// Scale along the unrotated axes.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.scale_x *= sx;
        self.scale_y *= sy;
        if self.rotate_angle != 0.0 {
            let a = deg2rad(self.rotate_angle);
            self.transform.rotate(-a);
            self.transform.scale(sx, sy);
            self.transform.rotate(a);
        } else {
            self.transform.scale(sx, sy);
        }
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.transform.translate(x, y);
    }

    /// Scale about the current translation, then move by `(tx, ty)` and add
    /// the shear terms.
    pub fn transform(&mut self, sx: f64, shear_x: f64, shear_y: f64, sy: f64, tx: f64, ty: f64) {
        let (cur_x, cur_y) = (self.transform.tx, self.transform.ty);
        self.transform.translate(-cur_x, -cur_y);
        self.scale(sx, sy);
        self.transform.translate(cur_x + tx, cur_y + ty);
        self.transform.shx += shear_x;
        self.transform.shy += shear_y;
    }

    /// Reset to identity, then [`Paint::transform`].
    pub fn set_transform(&mut self, sx: f64, shear_x: f64, shear_y: f64, sy: f64, tx: f64, ty: f64) {
        self.transform.reset();
        self.rotate_angle = 0.0;
        self.scale_x = 1.0;
        self.scale_y = 1.0;
        self.transform(sx, shear_x, shear_y, sy, tx, ty);
    }

    pub fn trans_affine(&self) -> &TransAffine {
        &self.transform
    }

    pub fn rotate_angle(&self) -> f64 {
        self.rotate_angle
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }
}

// ============================================================================
// Tests
// ============================================================================
