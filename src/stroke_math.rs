//! Cap and join geometry for stroke outlines.
//!
//! For a segment `a -> b` of length `len` and half-width `w`, the offset
//! vector is `(w * (b.y - a.y) / len, w * (b.x - a.x) / len)`; adding it as
//! `(x + ox, y - oy)` gives the point on the left-hand outline. Caps and
//! joins are emitted as point lists into a caller-owned buffer.

use crate::basics::{PointD, PI};
use crate::vertex_dist::VertexDist;

const INTERSECTION_EPSILON: f64 = 1.0e-30;

/// Inner corners shorter than this many half-widths are still mitred.
const INNER_MITER_LIMIT: f64 = 1.01;

/// Shape drawn at open path ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Square,
    Round,
}

/// Shape drawn where two segments meet on the outer side of a corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    Miter,
    MiterRevert,
    #[default]
    Round,
    Bevel,
    MiterRound,
}

#[inline]
fn cross(a: &VertexDist, b: &VertexDist, p: PointD) -> f64 {
    (p.x - b.x) * (b.y - a.y) - (p.y - b.y) * (b.x - a.x)
}

/// Intersection of lines `a1 -> a2` and `b1 -> b2`, `None` when parallel.
fn intersect(a1: PointD, a2: PointD, b1: PointD, b2: PointD) -> Option<PointD> {
    let num = (a1.y - b1.y) * (b2.x - b1.x) - (a1.x - b1.x) * (b2.y - b1.y);
    let den = (a2.x - a1.x) * (b2.y - b1.y) - (a2.y - a1.y) * (b2.x - b1.x);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let r = num / den;
    Some(PointD::new(a1.x + r * (a2.x - a1.x), a1.y + r * (a2.y - a1.y)))
}

#[inline]
fn offset(a: &VertexDist, b: &VertexDist, len: f64, w: f64) -> PointD {
    PointD::new(w * (b.y - a.y) / len, w * (b.x - a.x) / len)
}

#[inline]
fn left(v: &VertexDist, o: PointD) -> PointD {
    PointD::new(v.x + o.x, v.y - o.y)
}

/// Stroke outline parameters and the cap/join builders that use them.
#[derive(Debug, Clone)]
pub struct StrokeMath {
    half_width: f64,
    half_width_abs: f64,
    width_eps: f64,
    width_sign: f64,
    miter_limit: f64,
    approx_scale: f64,
    line_cap: LineCap,
    line_join: LineJoin,
}

impl Default for StrokeMath {
    fn default() -> Self {
        Self {
            half_width: 0.5,
            half_width_abs: 0.5,
            width_eps: 0.5 / 1024.0,
            width_sign: 1.0,
            miter_limit: 4.0,
            approx_scale: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
        }
    }
}

impl StrokeMath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_width(&mut self, w: f64) {
        self.half_width = w * 0.5;
        self.half_width_abs = self.half_width.abs();
        self.width_sign = if self.half_width < 0.0 { -1.0 } else { 1.0 };
        self.width_eps = self.half_width / 1024.0;
    }

    pub fn width(&self) -> f64 {
        self.half_width * 2.0
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

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.miter_limit = limit;
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approx_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.approx_scale
    }

    /// Angular step that keeps round caps and joins within 1/8 pixel.
    fn arc_step(&self) -> f64 {
        (self.half_width_abs / (self.half_width_abs + 0.125 / self.approx_scale)).acos() * 2.0
    }

    /// Cap at `v0`, where the path continues toward `v1`.
    pub fn calc_cap(&self, out: &mut Vec<PointD>, v0: &VertexDist, v1: &VertexDist, len: f64) {
        out.clear();
        let o = offset(v0, v1, len, self.half_width);

        match self.line_cap {
            LineCap::Butt | LineCap::Square => {
                let ext = if self.line_cap == LineCap::Square {
                    PointD::new(o.y * self.width_sign, o.x * self.width_sign)
                } else {
                    PointD::default()
                };
                out.push(PointD::new(v0.x - o.x - ext.x, v0.y + o.y - ext.y));
                out.push(PointD::new(v0.x + o.x - ext.x, v0.y - o.y - ext.y));
            }
            LineCap::Round => {
                let n = (PI / self.arc_step()) as i32;
                let da = PI / (n + 1) as f64 * self.width_sign;
                let mut a = if self.width_sign > 0.0 {
                    o.y.atan2(-o.x)
                } else {
                    (-o.y).atan2(o.x)
                };
                out.push(PointD::new(v0.x - o.x, v0.y + o.y));
                for _ in 0..n {
                    a += da;
                    out.push(PointD::new(
                        v0.x + a.cos() * self.half_width,
                        v0.y + a.sin() * self.half_width,
                    ));
                }
                out.push(PointD::new(v0.x + o.x, v0.y - o.y));
            }
        }
    }

    /// Join at `v1` between segments `v0 -> v1` (length `len1`) and
    /// `v1 -> v2` (length `len2`).
    #[allow(clippy::too_many_arguments)]
    pub fn calc_join(
        &self,
        out: &mut Vec<PointD>,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        len1: f64,
        len2: f64,
    ) {
        out.clear();
        let o1 = offset(v0, v1, len1, self.half_width);
        let o2 = offset(v1, v2, len2, self.half_width);

        let cp = cross(v0, v1, PointD::new(v2.x, v2.y));
        if cp != 0.0 && (cp > 0.0) == (self.half_width > 0.0) {
            // Inner corner.
            let limit = (len1.min(len2) / self.half_width_abs).max(INNER_MITER_LIMIT);
            self.calc_miter(out, v0, v1, v2, o1, o2, LineJoin::MiterRevert, limit, 0.0);
            return;
        }

        let mid = PointD::new((o1.x + o2.x) / 2.0, (o1.y + o2.y) / 2.0);
        let dbevel = (mid.x * mid.x + mid.y * mid.y).sqrt();

        // Nearly straight corner: a single point is enough.
        if matches!(self.line_join, LineJoin::Round | LineJoin::Bevel)
            && self.approx_scale * (self.half_width_abs - dbevel) < self.width_eps
        {
            let p = intersect(left(v0, o1), left(v1, o1), left(v1, o2), left(v2, o2))
                .unwrap_or_else(|| left(v1, o1));
            out.push(p);
            return;
        }

        match self.line_join {
            LineJoin::Miter | LineJoin::MiterRevert | LineJoin::MiterRound => {
                self.calc_miter(out, v0, v1, v2, o1, o2, self.line_join, self.miter_limit, dbevel);
            }
            LineJoin::Round => self.calc_arc(out, v1, o1, o2),
            LineJoin::Bevel => {
                out.push(left(v1, o1));
                out.push(left(v1, o2));
            }
        }
    }

    /// Arc around `center` from the `o1` offset point to the `o2` one.
    fn calc_arc(&self, out: &mut Vec<PointD>, center: &VertexDist, o1: PointD, o2: PointD) {
        let s = self.width_sign;
        let mut a1 = (-o1.y * s).atan2(o1.x * s);
        let mut a2 = (-o2.y * s).atan2(o2.x * s);
        let step = self.arc_step();

        out.push(left(center, o1));
        if s > 0.0 {
            if a1 > a2 {
                a2 += 2.0 * PI;
            }
        } else if a1 < a2 {
            a2 -= 2.0 * PI;
        }
        let n = ((a2 - a1).abs() / step) as i32;
        let da = (a2 - a1) / (n + 1) as f64;
        for _ in 0..n {
            a1 += da;
            out.push(PointD::new(
                center.x + a1.cos() * self.half_width,
                center.y + a1.sin() * self.half_width,
            ));
        }
        out.push(left(center, o2));
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_miter(
        &self,
        out: &mut Vec<PointD>,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        o1: PointD,
        o2: PointD,
        join: LineJoin,
        limit: f64,
        dbevel: f64,
    ) {
        let lim = self.half_width_abs * limit;
        let p1 = left(v1, o1);
        let p2 = left(v1, o2);

        let hit = intersect(left(v0, o1), p1, p2, left(v2, o2));
        let mut within_limit = false;
        let mut miter = PointD::new(v1.x, v1.y);
        let mut di = 1.0;

        match hit {
            Some(p) => {
                miter = p;
                di = ((p.x - v1.x).powi(2) + (p.y - v1.y).powi(2)).sqrt();
                if di <= lim {
                    out.push(p);
                    within_limit = true;
                }
            }
            None => {
                // Collinear segments: continue straight if they do not fold back.
                if (cross(v0, v1, p1) < 0.0) == (cross(v1, v2, p1) < 0.0) {
                    out.push(p1);
                    within_limit = true;
                }
            }
        }
        if within_limit {
            return;
        }

        match join {
            LineJoin::MiterRevert => {
                out.push(p1);
                out.push(p2);
            }
            LineJoin::MiterRound => self.calc_arc(out, v1, o1, o2),
            _ => match hit {
                None => {
                    let m = limit * self.width_sign;
                    out.push(PointD::new(p1.x + o1.y * m, p1.y + o1.x * m));
                    out.push(PointD::new(p2.x - o2.y * m, p2.y - o2.x * m));
                }
                Some(_) => {
                    // Clip the miter at the limit distance.
                    let k = (lim - dbevel) / (di - dbevel);
                    out.push(PointD::new(p1.x + (miter.x - p1.x) * k, p1.y + (miter.y - p1.y) * k));
                    out.push(PointD::new(p2.x + (miter.x - p2.x) * k, p2.y + (miter.y - p2.y) * k));
                }
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vd(x: f64, y: f64) -> VertexDist {
        VertexDist::new(x, y)
    }

    #[test]
    fn test_butt_cap_is_perpendicular() {
        let mut m = StrokeMath::new();
        m.set_width(4.0);
        let mut out = Vec::new();
        m.calc_cap(&mut out, &vd(0.0, 0.0), &vd(10.0, 0.0), 10.0);
        assert_eq!(out.len(), 2);
        assert!((out[0].x).abs() < 1e-12 && (out[0].y - 2.0).abs() < 1e-12);
        assert!((out[1].x).abs() < 1e-12 && (out[1].y + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_square_cap_extends_backwards() {
        let mut m = StrokeMath::new();
        m.set_width(4.0);
        m.set_line_cap(LineCap::Square);
        let mut out = Vec::new();
        m.calc_cap(&mut out, &vd(0.0, 0.0), &vd(10.0, 0.0), 10.0);
        assert!((out[0].x + 2.0).abs() < 1e-12);
        assert!((out[1].x + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_cap_stays_on_circle() {
        let mut m = StrokeMath::new();
        m.set_width(10.0);
        m.set_line_cap(LineCap::Round);
        let mut out = Vec::new();
        m.calc_cap(&mut out, &vd(0.0, 0.0), &vd(10.0, 0.0), 10.0);
        assert!(out.len() > 3);
        for p in &out {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - 5.0).abs() < 1e-9);
            assert!(p.x <= 1e-9);
        }
    }

    #[test]
    fn test_miter_join_right_angle() {
        let mut m = StrokeMath::new();
        m.set_width(2.0);
        m.set_line_join(LineJoin::Miter);
        let mut out = Vec::new();
        // Outer side of this corner is the (x + ox, y - oy) side.
        m.calc_join(&mut out, &vd(0.0, 0.0), &vd(10.0, 0.0), &vd(10.0, 10.0), 10.0, 10.0);
        assert_eq!(out.len(), 1);
        assert!((out[0].x - 11.0).abs() < 1e-9);
        assert!((out[0].y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bevel_join_two_points() {
        let mut m = StrokeMath::new();
        m.set_width(2.0);
        m.set_line_join(LineJoin::Bevel);
        let mut out = Vec::new();
        m.calc_join(&mut out, &vd(0.0, 0.0), &vd(10.0, 0.0), &vd(10.0, 10.0), 10.0, 10.0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_miter_limit_clips_sharp_corner() {
        let mut m = StrokeMath::new();
        m.set_width(2.0);
        m.set_line_join(LineJoin::Miter);
        m.set_miter_limit(1.5);
        let mut out = Vec::new();
        // Very sharp turn back on itself; the full miter would reach x = 30.
        m.calc_join(&mut out, &vd(0.0, 0.0), &vd(10.0, 0.0), &vd(0.0, 1.0), 10.0, 101f64.sqrt());
        assert_eq!(out.len(), 2);
        for p in &out {
            assert!(p.x < 12.0);
        }
    }

    #[test]
    fn test_defaults() {
        let m = StrokeMath::new();
        assert_eq!(m.line_join(), LineJoin::Round);
        assert_eq!(m.line_cap(), LineCap::Butt);
        assert!((m.width() - 1.0).abs() < 1e-12);
    }
}
