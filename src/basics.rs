//! Foundation types, constants, and path command utilities.
//!
//! Everything else in the crate depends on the definitions here: rounding
//! helpers, the coverage and sub-pixel constants, path command tags, the
//! [`VertexSource`] pull interface, and the single conversion boundary
//! between floating-point coordinates and 24.8 fixed point.

use core::ops::{Add, Sub};

// ============================================================================
// Rounding
// ============================================================================

/// Round half away from zero.
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round half up, for non-negative values.
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

// ============================================================================
// Cover (anti-aliasing) constants
// ============================================================================

/// Per-pixel coverage, 0 = outside, 255 = fully covered.
pub type CoverType = u8;

pub const COVER_SHIFT: u32 = 8;
pub const COVER_SIZE: u32 = 1 << COVER_SHIFT;
pub const COVER_MASK: u32 = COVER_SIZE - 1;
pub const COVER_FULL: CoverType = COVER_MASK as CoverType;

// ============================================================================
// Sub-pixel constants and the fixed-point boundary
// ============================================================================

/// Number of fractional bits in rasterizer coordinates (24.8 fixed point).
pub const POLY_SUBPIXEL_SHIFT: u32 = 8;
pub const POLY_SUBPIXEL_SCALE: u32 = 1 << POLY_SUBPIXEL_SHIFT;
pub const POLY_SUBPIXEL_MASK: u32 = POLY_SUBPIXEL_SCALE - 1;

/// Convert a floating-point pixel coordinate to 24.8 fixed point.
///
/// This and [`downscale`] are the only places the sub-pixel scale is applied
/// to coordinates; every float entry point of the rasterizer goes through here.
#[inline]
pub fn upscale(v: f64) -> i32 {
    iround(v * POLY_SUBPIXEL_SCALE as f64)
}

/// Convert a 24.8 fixed-point coordinate back to whole pixels (floor).
#[inline]
pub fn downscale(v: i32) -> i32 {
    v >> POLY_SUBPIXEL_SHIFT
}

/// Exact `a * b / c` rounded, used when clipping fixed-point edges.
#[inline]
pub fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    iround(a as f64 * b as f64 / c as f64)
}

// ============================================================================
// Filling rule
// ============================================================================

/// Policy for turning winding counts into inside/outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillingRule {
    #[default]
    NonZero,
    EvenOdd,
}

pub const PI: f64 = std::f64::consts::PI;

#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle given by two inclusive corner points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Swap corners so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Shrink to the intersection with `r`. Returns `false` when nothing is left.
    pub fn clip(&mut self, r: &Self) -> bool {
        if self.x2 > r.x2 {
            self.x2 = r.x2;
        }
        if self.y2 > r.y2 {
            self.y2 = r.y2;
        }
        if self.x1 < r.x1 {
            self.x1 = r.x1;
        }
        if self.y1 < r.y1 {
            self.y1 = r.y1;
        }
        self.is_valid()
    }

    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

pub type RectI = Rect<i32>;
pub type RectD = Rect<f64>;

// ============================================================================
// Points
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for PointD {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointD {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ============================================================================
// Path commands
// ============================================================================

pub const PATH_CMD_STOP: u32 = 0;
pub const PATH_CMD_MOVE_TO: u32 = 1;
pub const PATH_CMD_LINE_TO: u32 = 2;
pub const PATH_CMD_CURVE3: u32 = 3;
pub const PATH_CMD_CURVE4: u32 = 4;
pub const PATH_CMD_END_POLY: u32 = 0x0F;
pub const PATH_CMD_MASK: u32 = 0x0F;

pub const PATH_FLAGS_CCW: u32 = 0x10;
pub const PATH_FLAGS_CW: u32 = 0x20;
pub const PATH_FLAGS_CLOSE: u32 = 0x40;

/// Move-to, line-to or one of the curve commands.
#[inline]
pub fn is_vertex(c: u32) -> bool {
    (PATH_CMD_MOVE_TO..PATH_CMD_END_POLY).contains(&c)
}

#[inline]
pub fn is_stop(c: u32) -> bool {
    c == PATH_CMD_STOP
}

#[inline]
pub fn is_move_to(c: u32) -> bool {
    c == PATH_CMD_MOVE_TO
}

#[inline]
pub fn is_curve(c: u32) -> bool {
    c == PATH_CMD_CURVE3 || c == PATH_CMD_CURVE4
}

/// END_POLY with any combination of flags.
#[inline]
pub fn is_end_poly(c: u32) -> bool {
    (c & PATH_CMD_MASK) == PATH_CMD_END_POLY
}

/// END_POLY carrying the CLOSE flag, orientation ignored.
#[inline]
pub fn is_close(c: u32) -> bool {
    (c & !(PATH_FLAGS_CW | PATH_FLAGS_CCW)) == (PATH_CMD_END_POLY | PATH_FLAGS_CLOSE)
}

#[inline]
pub fn get_close_flag(c: u32) -> u32 {
    c & PATH_FLAGS_CLOSE
}

// ============================================================================
// VertexSource trait
// ============================================================================

/// Pull-based vertex iterator shared by paths, curve flatteners, strokers and
/// every other pipeline stage.
///
/// `rewind` restarts the stream; each `vertex` call writes one point and
/// returns its command, with `PATH_CMD_STOP` marking the end.
pub trait VertexSource {
    fn rewind(&mut self, path_id: u32);

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32;
}

/// Lets pipeline stages borrow their source instead of owning it.
impl<T: VertexSource + ?Sized> VertexSource for &mut T {
    fn rewind(&mut self, path_id: u32) {
        (**self).rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        (**self).vertex(x, y)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(0.49), 0);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(-1.5), -2);
    }

    #[test]
    fn test_upscale_downscale() {
        assert_eq!(upscale(1.0), 256);
        assert_eq!(upscale(0.5), 128);
        assert_eq!(upscale(-0.25), -64);
        assert_eq!(downscale(upscale(10.75)), 10);
        assert_eq!(downscale(-1), -1);
    }

    #[test]
    fn test_mul_div() {
        assert_eq!(mul_div(10, 3, 4), 8);
        assert_eq!(mul_div(-10, 3, 4), -8);
    }

    #[test]
    fn test_rect_clip() {
        let mut r = RectI::new(-5, -5, 20, 20);
        assert!(r.clip(&RectI::new(0, 0, 9, 9)));
        assert_eq!(r, RectI::new(0, 0, 9, 9));

        let mut outside = RectI::new(30, 30, 40, 40);
        assert!(!outside.clip(&RectI::new(0, 0, 9, 9)));
    }

    #[test]
    fn test_rect_hit_test() {
        let r = RectI::new(2, 2, 5, 5);
        assert!(r.hit_test(2, 5));
        assert!(!r.hit_test(6, 3));
    }

    #[test]
    fn test_rect_normalize() {
        let mut r = RectI::new(10, 8, 2, 1);
        r.normalize();
        assert_eq!(r, RectI::new(2, 1, 10, 8));
    }

    #[test]
    fn test_command_predicates() {
        assert!(is_vertex(PATH_CMD_MOVE_TO));
        assert!(is_vertex(PATH_CMD_CURVE4));
        assert!(!is_vertex(PATH_CMD_STOP));
        assert!(!is_vertex(PATH_CMD_END_POLY));
        assert!(is_end_poly(PATH_CMD_END_POLY | PATH_FLAGS_CLOSE));
        assert!(is_close(PATH_CMD_END_POLY | PATH_FLAGS_CLOSE | PATH_FLAGS_CCW));
        assert!(!is_close(PATH_CMD_END_POLY));
        assert!(is_curve(PATH_CMD_CURVE3));
        assert!(!is_curve(PATH_CMD_LINE_TO));
        assert_eq!(get_close_flag(PATH_CMD_END_POLY | PATH_FLAGS_CLOSE), PATH_FLAGS_CLOSE);
    }
}
