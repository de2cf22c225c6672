//! RGBA color with 8 bits per channel.
//!
//! Colors are stored straight (not premultiplied). The fixed-point helpers
//! here (`multiply`, `lerp`, `mult_cover`) are exact over `u8` and are what
//! the pixel blender, gradient ramp and blend combinator build on.

use crate::basics::{uround, CoverType, COVER_MASK};

// ============================================================================
// Rgba8
// ============================================================================

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
    pub const GREEN: Rgba8 = Rgba8::new(0, 255, 0, 255);
    pub const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Unpack `0xAARRGGBB`.
    pub const fn from_argb32(v: u32) -> Self {
        Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a as u32 == Self::BASE_MASK
    }

    /// Same color with alpha scaled by `k` in [0, 1].
    pub fn with_alpha_scale(&self, k: f64) -> Rgba8 {
        let k = k.clamp(0.0, 1.0);
        Rgba8 {
            a: uround(self.a as f64 * k) as u8,
            ..*self
        }
    }

    /// `a * b / 255`, rounded exactly.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    #[inline]
    pub fn mult_cover(a: u8, cover: CoverType) -> u8 {
        Self::multiply(a, cover)
    }

    /// Interpolate `p` toward `q` by `a / 255`.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }

    /// Interpolate between `self` and `c` by `k` in [0, 1].
    pub fn gradient(&self, c: &Rgba8, k: f64) -> Rgba8 {
        let ik = uround(k * Self::BASE_MASK as f64) as u8;
        Rgba8 {
            r: Self::lerp(self.r, c.r, ik),
            g: Self::lerp(self.g, c.g, ik),
            b: Self::lerp(self.b, c.b, ik),
            a: Self::lerp(self.a, c.a, ik),
        }
    }

    /// Per-channel sum clamped at 255.
    #[inline]
    pub fn saturating_add(&self, c: &Rgba8) -> Rgba8 {
        Rgba8 {
            r: self.r.saturating_add(c.r),
            g: self.g.saturating_add(c.g),
            b: self.b.saturating_add(c.b),
            a: self.a.saturating_add(c.a),
        }
    }

    /// Add `c` scaled by `cover`, clamping every channel.
    pub fn add(&mut self, c: &Rgba8, cover: u32) {
        if cover == COVER_MASK {
            *self = self.saturating_add(c);
        } else {
            let scaled = Rgba8 {
                r: Self::mult_cover(c.r, cover as u8),
                g: Self::mult_cover(c.g, cover as u8),
                b: Self::mult_cover(c.b, cover as u8),
                a: Self::mult_cover(c.a, cover as u8),
            };
            *self = self.saturating_add(&scaled);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_exact_ends() {
        assert_eq!(Rgba8::multiply(255, 255), 255);
        assert_eq!(Rgba8::multiply(255, 0), 0);
        assert_eq!(Rgba8::multiply(128, 255), 128);
        assert_eq!(Rgba8::multiply(255, 128), 128);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(Rgba8::lerp(0, 255, 255), 255);
        assert_eq!(Rgba8::lerp(0, 255, 0), 0);
        assert_eq!(Rgba8::lerp(255, 0, 255), 0);
        let mid = Rgba8::lerp(0, 200, 128);
        assert!((mid as i32 - 100).abs() <= 1);
    }

    #[test]
    fn test_gradient_midpoint() {
        let c = Rgba8::RED.gradient(&Rgba8::BLUE, 0.5);
        assert!((c.r as i32 - 127).abs() <= 1);
        assert_eq!(c.g, 0);
        assert!((c.b as i32 - 128).abs() <= 1);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_saturating_add() {
        let a = Rgba8::new(200, 10, 0, 200);
        let b = Rgba8::new(100, 20, 0, 100);
        assert_eq!(a.saturating_add(&b), Rgba8::new(255, 30, 0, 255));
    }

    #[test]
    fn test_add_with_cover() {
        let mut c = Rgba8::new(10, 10, 10, 10);
        c.add(&Rgba8::new(255, 0, 0, 255), 0);
        assert_eq!(c, Rgba8::new(10, 10, 10, 10));
        c.add(&Rgba8::new(255, 0, 0, 255), 255);
        assert_eq!(c, Rgba8::new(255, 10, 10, 255));
    }

    #[test]
    fn test_from_argb32() {
        assert_eq!(Rgba8::from_argb32(0x80FF2010), Rgba8::new(0xFF, 0x20, 0x10, 0x80));
    }

    #[test]
    fn test_with_alpha_scale() {
        assert_eq!(Rgba8::RED.with_alpha_scale(0.5).a, 128);
        assert_eq!(Rgba8::RED.with_alpha_scale(2.0).a, 255);
        assert_eq!(Rgba8::RED.with_alpha_scale(-1.0).a, 0);
    }
}
