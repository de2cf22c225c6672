//! Linear and radial gradient fills.
//!
//! A [`FillGradient`] maps every pixel center into gradient space through
//! its interpolator, asks a [`GradientCalculate`] for a distance in that
//! space and maps the distance range `[d1, d2]` onto the color ramp. The
//! canvas builds the matrix so that a linear gradient runs along the x axis
//! from 0 to the axis length, and a radial gradient is centered on the end
//! circle.

use crate::basics::iround;
use crate::color::Rgba8;
use crate::fill_base::SpanGenerator;
use crate::fill_interpolator::{FillInterpolator, SUBPIXEL_SHIFT};
use crate::gradient_lut::GradientLut;

pub const GRADIENT_SUBPIXEL_SHIFT: i32 = 4;
pub const GRADIENT_SUBPIXEL_SCALE: i32 = 1 << GRADIENT_SUBPIXEL_SHIFT;

const DOWNSCALE_SHIFT: i32 = SUBPIXEL_SHIFT as i32 - GRADIENT_SUBPIXEL_SHIFT;

/// Distance of a point in gradient space, in gradient sub-pixel units.
pub trait GradientCalculate {
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32;
}

/// Distance along the x axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientLinearCalculate;

impl GradientCalculate for GradientLinearCalculate {
    #[inline]
    fn calculate(&self, x: i32, _y: i32, _d: i32) -> i32 {
        x
    }
}

/// Two-circle radial gradient.
///
/// The end circle of radius `r` sits at the origin; the start circle is
/// reduced to its center, the focal point `(fx, fy)`. The result is the
/// radius of the circle through `(x, y)` on the cone between them, which
/// reduces to the plain distance when the focus is at the origin.
#[derive(Debug, Clone, Copy)]
pub struct GradientRadialCalculate {
    r: i32,
    fx: i32,
    fy: i32,
    r2: f64,
    mul: f64,
}

impl GradientRadialCalculate {
    pub fn new(r: f64, fx: f64, fy: f64) -> Self {
        let s = GRADIENT_SUBPIXEL_SCALE as f64;
        let mut calc = Self {
            r: iround(r * s),
            fx: iround(fx * s),
            fy: iround(fy * s),
            r2: 0.0,
            mul: 0.0,
        };
        calc.update_values();
        calc
    }

    pub fn radius(&self) -> f64 {
        self.r as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus(&self) -> (f64, f64) {
        let s = GRADIENT_SUBPIXEL_SCALE as f64;
        (self.fx as f64 / s, self.fy as f64 / s)
    }

    fn update_values(&mut self) {
        self.r2 = self.r as f64 * self.r as f64;
        let mut d = self.r2 - self.focus_len2();
        // A focus exactly on the circle makes the divisor vanish; pull it one
        // sub-pixel toward the center.
        if d == 0.0 {
            self.fx -= self.fx.signum();
            self.fy -= self.fy.signum();
            d = self.r2 - self.focus_len2();
        }
        self.mul = if d == 0.0 { 0.0 } else { self.r as f64 / d };
    }

    fn focus_len2(&self) -> f64 {
        let (fx, fy) = (self.fx as f64, self.fy as f64);
        fx * fx + fy * fy
    }
}

impl GradientCalculate for GradientRadialCalculate {
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let (fx, fy) = (self.fx as f64, self.fy as f64);
        let dx = x as f64 - fx;
        let dy = y as f64 - fy;
        let d2 = dx * fy - dy * fx;
        let d3 = self.r2 * (dx * dx + dy * dy) - d2 * d2;
        iround((dx * fx + dy * fy + d3.abs().sqrt()) * self.mul)
    }
}

// ============================================================================
// FillGradient
// ============================================================================

/// Gradient span generator.
#[derive(Debug, Clone)]
pub struct FillGradient<G> {
    interpolator: FillInterpolator,
    calc: G,
    lut: GradientLut,
    d1: i32,
    d2: i32,
}

impl<G: GradientCalculate> FillGradient<G> {
    /// `lut` must already be built. `[d1, d2]` is the distance range mapped
    /// onto the whole ramp.
    pub fn new(interpolator: FillInterpolator, calc: G, lut: GradientLut, d1: f64, d2: f64) -> Self {
        let s = GRADIENT_SUBPIXEL_SCALE as f64;
        Self {
            interpolator,
            calc,
            lut,
            d1: iround(d1 * s),
            d2: iround(d2 * s),
        }
    }

    pub fn interpolator_mut(&mut self) -> &mut FillInterpolator {
        &mut self.interpolator
    }

    pub fn lut(&self) -> &GradientLut {
        &self.lut
    }

    pub fn d1(&self) -> f64 {
        self.d1 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn d2(&self) -> f64 {
        self.d2 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }
}

impl<G: GradientCalculate> SpanGenerator for FillGradient<G> {
    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32, len: usize) {
        let dd = (self.d2 - self.d1).max(1) as i64;
        let size = self.lut.size() as i64;
        self.interpolator.begin(x as f64 + 0.5, y as f64 + 0.5, len);
        for pixel in span.iter_mut().take(len) {
            let (ix, iy) = self.interpolator.coordinates();
            let d = self
                .calc
                .calculate(ix >> DOWNSCALE_SHIFT, iy >> DOWNSCALE_SHIFT, self.d2);
            let index = ((d - self.d1) as i64 * size / dd).clamp(0, size - 1);
            *pixel = self.lut.color(index as i32);
            self.interpolator.next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trans_affine::TransAffine;

    fn red_blue() -> GradientLut {
        let mut lut = GradientLut::new();
        lut.add_color(0.0, Rgba8::RED);
        lut.add_color(1.0, Rgba8::BLUE);
        lut.build_lut();
        lut
    }

    #[test]
    fn test_linear_ramp_along_x() {
        let interp = FillInterpolator::new(TransAffine::new());
        let mut fill = FillGradient::new(interp, GradientLinearCalculate, red_blue(), 0.0, 100.0);
        let mut span = vec![Rgba8::TRANSPARENT; 120];
        fill.generate(&mut span, 0, 0, 120);

        assert!(span[0].r > 250 && span[0].b < 5);
        assert!(span[99].b > 250 && span[99].r < 5);
        // Clamped past the end of the axis.
        assert_eq!(span[110], span[119]);
        assert!(span.windows(2).take(100).all(|w| w[1].r <= w[0].r));
    }

    #[test]
    fn test_linear_rotated_matrix() {
        // Gradient running down the y axis: device (x, y) -> gradient (y, -x).
        let mut mtx = TransAffine::new_rotation(std::f64::consts::FRAC_PI_2);
        mtx.invert();
        let interp = FillInterpolator::new(mtx);
        let mut fill = FillGradient::new(interp, GradientLinearCalculate, red_blue(), 0.0, 100.0);
        let mut top = vec![Rgba8::TRANSPARENT; 10];
        let mut bottom = vec![Rgba8::TRANSPARENT; 10];
        fill.generate(&mut top, 0, 0, 10);
        fill.generate(&mut bottom, 0, 99, 10);
        assert!(top.iter().all(|c| c.r > 250));
        assert!(bottom.iter().all(|c| c.b > 250));
    }

    #[test]
    fn test_radial_centered() {
        let mut mtx = TransAffine::new_translation(50.0, 50.0);
        mtx.invert();
        let interp = FillInterpolator::new(mtx);
        let calc = GradientRadialCalculate::new(40.0, 0.0, 0.0);
        let mut fill = FillGradient::new(interp, calc, red_blue(), 0.0, 40.0);
        let mut row = vec![Rgba8::TRANSPARENT; 100];
        fill.generate(&mut row, 0, 50, 100);

        assert!(row[50].r > 245);
        assert!(row[0].b > 250);
        assert!(row[99].b > 250);
        // Symmetric about the center.
        assert!((row[30].r as i32 - row[69].r as i32).abs() <= 8);
    }

    #[test]
    fn test_radial_plain_distance_without_focus() {
        let calc = GradientRadialCalculate::new(100.0, 0.0, 0.0);
        let s = GRADIENT_SUBPIXEL_SCALE;
        assert_eq!(calc.calculate(30 * s, 40 * s, 0), 50 * s);
    }

    #[test]
    fn test_radial_focus_starts_ramp() {
        let calc = GradientRadialCalculate::new(100.0, 20.0, 0.0);
        let s = GRADIENT_SUBPIXEL_SCALE;
        assert_eq!(calc.calculate(20 * s, 0, 0), 0);
        // Points on the end circle map to its radius.
        assert!((calc.calculate(-100 * s, 0, 0) - 100 * s).abs() <= 1);
        assert!((calc.calculate(0, 100 * s, 0) - 100 * s).abs() <= 1);
    }

    #[test]
    fn test_radial_focus_on_circle_is_nudged() {
        let calc = GradientRadialCalculate::new(10.0, 10.0, 0.0);
        let (fx, _) = calc.focus();
        assert!(fx < 10.0);
        assert!(calc.mul.is_finite());
    }
}
