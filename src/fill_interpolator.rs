//! Affine span interpolator.
//!
//! Gradient and pattern fills work in their own coordinate space. For each
//! span the interpolator maps the two end points through the (already
//! inverted) paint matrix and steps linearly between them in 24.8 fixed
//! point, which is exact for affine maps up to rounding.

use crate::basics::iround;
use crate::trans_affine::TransAffine;

pub const SUBPIXEL_SHIFT: u32 = 8;
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;

/// Integer DDA from `y1` to `y2` in `count` steps, error spread forward.
#[derive(Debug, Clone, Copy)]
struct Dda {
    cnt: i32,
    lft: i32,
    rem: i32,
    modulo: i32,
    y: i32,
}

impl Dda {
    fn new(y1: i32, y2: i32, count: i32) -> Self {
        let cnt = count.max(1);
        let mut lft = (y2 - y1) / cnt;
        let mut rem = (y2 - y1) % cnt;
        let mut modulo = rem;
        if modulo <= 0 {
            modulo += cnt;
            rem += cnt;
            lft -= 1;
        }
        modulo -= cnt;
        Self {
            cnt,
            lft,
            rem,
            modulo,
            y: y1,
        }
    }

    #[inline]
    fn inc(&mut self) {
        self.modulo += self.rem;
        self.y += self.lft;
        if self.modulo > 0 {
            self.modulo -= self.cnt;
            self.y += 1;
        }
    }
}

/// Steps pixel centers of a span through an affine matrix.
#[derive(Debug, Clone)]
pub struct FillInterpolator {
    trans: TransAffine,
    li_x: Dda,
    li_y: Dda,
}

impl FillInterpolator {
    /// `trans` maps device space into fill space.
    pub fn new(trans: TransAffine) -> Self {
        Self {
            trans,
            li_x: Dda::new(0, 0, 1),
            li_y: Dda::new(0, 0, 1),
        }
    }

    pub fn transformer(&self) -> &TransAffine {
        &self.trans
    }

    pub fn set_transformer(&mut self, trans: TransAffine) {
        self.trans = trans;
    }

    /// Start a span of `len` pixels at `(x, y)`.
    pub fn begin(&mut self, x: f64, y: f64, len: usize) {
        let (mut x1, mut y1) = (x, y);
        self.trans.transform(&mut x1, &mut y1);
        let (mut x2, mut y2) = (x + len as f64, y);
        self.trans.transform(&mut x2, &mut y2);

        let s = SUBPIXEL_SCALE as f64;
        self.li_x = Dda::new(iround(x1 * s), iround(x2 * s), len as i32);
        self.li_y = Dda::new(iround(y1 * s), iround(y2 * s), len as i32);
    }

    #[inline]
    pub fn next(&mut self) {
        self.li_x.inc();
        self.li_y.inc();
    }

    /// Current position in fill space, 24.8 fixed point.
    #[inline]
    pub fn coordinates(&self) -> (i32, i32) {
        (self.li_x.y, self.li_y.y)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_steps_one_pixel() {
        let mut it = FillInterpolator::new(TransAffine::new());
        it.begin(10.5, 3.5, 4);
        let mut xs = Vec::new();
        for _ in 0..4 {
            xs.push(it.coordinates());
            it.next();
        }
        assert_eq!(
            xs,
            vec![
                (10 * 256 + 128, 3 * 256 + 128),
                (11 * 256 + 128, 3 * 256 + 128),
                (12 * 256 + 128, 3 * 256 + 128),
                (13 * 256 + 128, 3 * 256 + 128),
            ]
        );
    }

    #[test]
    fn test_scaling_matrix() {
        let mut it = FillInterpolator::new(TransAffine::new_scaling(0.5, 2.0));
        it.begin(0.0, 1.0, 10);
        assert_eq!(it.coordinates(), (0, 512));
        for _ in 0..10 {
            it.next();
        }
        assert_eq!(it.coordinates(), (5 * 256, 512));
    }

    #[test]
    fn test_translation() {
        let mut it = FillInterpolator::new(TransAffine::new_translation(-5.0, -5.0));
        it.begin(5.0, 5.0, 1);
        assert_eq!(it.coordinates(), (0, 0));
    }
}
