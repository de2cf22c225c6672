//! Image pattern fill.
//!
//! The pattern's origin sits at `(start_x, start_y)` in device space.
//! Each axis either wraps (repeats the image forever) or is bounded, in
//! which case pixels outside the image come out fully transparent.
//! An optional alpha factor scales every sampled pixel.

use crate::buffer::ImageInfo;
use crate::color::Rgba8;
use crate::fill_base::SpanGenerator;

/// Which axes of a pattern tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternRepeat {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

impl PatternRepeat {
    fn wraps_x(self) -> bool {
        matches!(self, PatternRepeat::Repeat | PatternRepeat::RepeatX)
    }

    fn wraps_y(self) -> bool {
        matches!(self, PatternRepeat::Repeat | PatternRepeat::RepeatY)
    }
}

/// Map `v` into `[0, size)`, or `None` when the axis does not wrap and `v`
/// lies outside.
#[inline]
fn wrap(v: i32, size: u32, wraps: bool) -> Option<u32> {
    let size = size as i32;
    if wraps {
        Some(v.rem_euclid(size) as u32)
    } else if (0..size).contains(&v) {
        Some(v as u32)
    } else {
        None
    }
}

/// Span generator sampling an [`ImageInfo`].
#[derive(Debug, Clone)]
pub struct FillPattern {
    image: ImageInfo,
    repeat: PatternRepeat,
    start_x: i32,
    start_y: i32,
    alpha: f64,
}

impl FillPattern {
    pub fn new(image: ImageInfo, repeat: PatternRepeat, start_x: i32, start_y: i32) -> Self {
        Self {
            image,
            repeat,
            start_x,
            start_y,
            alpha: 1.0,
        }
    }

    /// Scale the alpha of every sampled pixel by `alpha`, clamped to `[0, 1]`.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn repeat(&self) -> PatternRepeat {
        self.repeat
    }

    /// Color of device pixel `(x, y)`.
    pub fn sample(&self, x: i32, y: i32) -> Rgba8 {
        let sx = wrap(x - self.start_x, self.image.width(), self.repeat.wraps_x());
        let sy = wrap(y - self.start_y, self.image.height(), self.repeat.wraps_y());
        match (sx, sy) {
            (Some(sx), Some(sy)) => self.image.pixel(sx, sy),
            _ => Rgba8::TRANSPARENT,
        }
    }
}

impl SpanGenerator for FillPattern {
    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32, len: usize) {
        for (i, pixel) in span.iter_mut().take(len).enumerate() {
            let c = self.sample(x + i as i32, y);
            *pixel = if self.alpha < 1.0 { c.with_alpha_scale(self.alpha) } else { c };
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
