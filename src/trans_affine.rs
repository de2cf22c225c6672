//! 2D affine transformation matrix.
//!
//! Used for the paint transform applied to canvas geometry and for the
//! inverse matrices that map device pixels back into gradient space.

use core::ops::{Mul, MulAssign};

/// Epsilon used by [`TransAffine::is_identity`].
pub const AFFINE_EPSILON: f64 = 1e-14;

/// Six-component affine matrix.
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    /// Identity matrix.
    pub const fn new() -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn new_custom(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    pub fn new_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self::new_custom(ca, sa, -sa, ca, 0.0, 0.0)
    }

    pub fn new_scaling(x: f64, y: f64) -> Self {
        Self::new_custom(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub fn new_translation(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += x;
        self.ty += y;
        self
    }

    /// Rotate by `a` radians about the origin, after the current transform.
    pub fn rotate(&mut self, a: f64) -> &mut Self {
        let (sa, ca) = a.sin_cos();
        let t0 = self.sx * ca - self.shy * sa;
        let t2 = self.shx * ca - self.sy * sa;
        let t4 = self.tx * ca - self.ty * sa;
        self.shy = self.sx * sa + self.shy * ca;
        self.sy = self.shx * sa + self.sy * ca;
        self.ty = self.tx * sa + self.ty * ca;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.sx *= x;
        self.shx *= x;
        self.tx *= x;
        self.shy *= y;
        self.sy *= y;
        self.ty *= y;
        self
    }

    /// `self = self * m`: apply `self` first, then `m`.
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    /// `self = m * self`: apply `m` first, then `self`.
    pub fn premultiply(&mut self, m: &TransAffine) -> &mut Self {
        let mut t = *m;
        t.multiply(self);
        *self = t;
        self
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    /// Invert in place. A singular matrix yields non-finite components.
    pub fn invert(&mut self) -> &mut Self {
        let d = 1.0 / self.determinant();
        let t0 = self.sy * d;
        self.sy = self.sx * d;
        self.shy = -self.shy * d;
        self.shx = -self.shx * d;
        let t4 = -self.tx * t0 - self.ty * self.shx;
        self.ty = -self.tx * self.shy - self.ty * self.sy;
        self.sx = t0;
        self.tx = t4;
        self
    }

    #[inline]
    pub fn transform(&self, x: &mut f64, y: &mut f64) {
        let tmp = *x;
        *x = tmp * self.sx + *y * self.shx + self.tx;
        *y = tmp * self.shy + *y * self.sy + self.ty;
    }

    /// Apply the inverse without building it.
    pub fn inverse_transform(&self, x: &mut f64, y: &mut f64) {
        let d = 1.0 / self.determinant();
        let a = (*x - self.tx) * d;
        let b = (*y - self.ty) * d;
        *x = a * self.sy - b * self.shx;
        *y = b * self.sx - a * self.shy;
    }

    /// Average scale factor, used to pick curve approximation precision.
    pub fn scale_factor(&self) -> f64 {
        let x = 0.707_106_781 * self.sx + 0.707_106_781 * self.shx;
        let y = 0.707_106_781 * self.shy + 0.707_106_781 * self.sy;
        (x * x + y * y).sqrt()
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.sx - 1.0).abs() <= epsilon
            && self.shy.abs() <= epsilon
            && self.shx.abs() <= epsilon
            && (self.sy - 1.0).abs() <= epsilon
            && self.tx.abs() <= epsilon
            && self.ty.abs() <= epsilon
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

impl Mul for TransAffine {
    type Output = TransAffine;
    fn mul(self, rhs: TransAffine) -> TransAffine {
        let mut r = self;
        r.multiply(&rhs);
        r
    }
}

impl MulAssign for TransAffine {
    fn mul_assign(&mut self, rhs: TransAffine) {
        self.multiply(&rhs);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::PI;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity() {
        let m = TransAffine::new();
        assert!(m.is_identity(AFFINE_EPSILON));
        let (mut x, mut y) = (3.0, 4.0);
        m.transform(&mut x, &mut y);
        assert!(close(x, 3.0) && close(y, 4.0));
    }

    #[test]
    fn test_translate_then_scale() {
        let mut m = TransAffine::new();
        m.translate(10.0, 5.0);
        m.scale(2.0, 3.0);
        let (mut x, mut y) = (1.0, 1.0);
        m.transform(&mut x, &mut y);
        assert!(close(x, 22.0));
        assert!(close(y, 18.0));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let m = TransAffine::new_rotation(PI / 2.0);
        let (mut x, mut y) = (1.0, 0.0);
        m.transform(&mut x, &mut y);
        assert!(close(x, 0.0));
        assert!(close(y, 1.0));
    }

    #[test]
    fn test_multiply_order() {
        // translate first, then rotate
        let m = TransAffine::new_translation(1.0, 0.0) * TransAffine::new_rotation(PI / 2.0);
        let (mut x, mut y) = (0.0, 0.0);
        m.transform(&mut x, &mut y);
        assert!(close(x, 0.0));
        assert!(close(y, 1.0));
    }

    #[test]
    fn test_invert_round_trip() {
        let mut m = TransAffine::new_rotation(0.3);
        m.scale(2.0, 0.5);
        m.translate(7.0, -3.0);
        let mut inv = m;
        inv.invert();
        let (mut x, mut y) = (12.5, -4.25);
        m.transform(&mut x, &mut y);
        inv.transform(&mut x, &mut y);
        assert!(close(x, 12.5));
        assert!(close(y, -4.25));
    }

    #[test]
    fn test_inverse_transform_matches_invert() {
        let mut m = TransAffine::new_scaling(3.0, 2.0);
        m.translate(5.0, 1.0);
        let (mut x1, mut y1) = (20.0, 9.0);
        m.inverse_transform(&mut x1, &mut y1);
        let mut inv = m;
        inv.invert();
        let (mut x2, mut y2) = (20.0, 9.0);
        inv.transform(&mut x2, &mut y2);
        assert!(close(x1, x2) && close(y1, y2));
    }

    #[test]
    fn test_scale_factor() {
        assert!(close(TransAffine::new_scaling(2.0, 2.0).scale_factor(), 2.0));
    }
}
