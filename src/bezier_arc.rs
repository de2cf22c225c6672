//! Elliptic arcs as cubic Bezier segments.
//!
//! [`BezierArc`] splits an arc given by center, radii and angles into at most
//! four quarter-turn cubic segments. [`SvgArc`] solves the endpoint form
//! (start point, radii, flags, end point) used by `VertexStorage::arc_to`.

use crate::basics::{
    PointD, VertexSource, PATH_CMD_CURVE4, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PI,
};
use crate::trans_affine::TransAffine;

/// Sweeps closer than this to a quarter-turn boundary are folded into the
/// previous segment.
const ANGLE_EPSILON: f64 = 0.01;

/// Start point plus four segments of three points each.
const MAX_POINTS: usize = 13;

/// Control points of one cubic segment approximating an arc of at most 90°.
pub fn arc_segment(
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    start_angle: f64,
    sweep_angle: f64,
) -> [PointD; 4] {
    let x0 = (sweep_angle / 2.0).cos();
    let y0 = (sweep_angle / 2.0).sin();
    let tx = (1.0 - x0) * 4.0 / 3.0;
    let ty = y0 - tx * x0 / y0;

    let px = [x0, x0 + tx, x0 + tx, x0];
    let py = [-y0, -ty, ty, y0];

    let (sn, cs) = (start_angle + sweep_angle / 2.0).sin_cos();

    let mut out = [PointD::default(); 4];
    for (i, p) in out.iter_mut().enumerate() {
        p.x = cx + rx * (px[i] * cs - py[i] * sn);
        p.y = cy + ry * (px[i] * sn + py[i] * cs);
    }
    out
}

// ============================================================================
// BezierArc
// ============================================================================

/// Arc around a center, emitted as MOVE_TO followed by CURVE4 triples.
///
/// A sweep below 1e-10 radians degrades to a straight MOVE_TO/LINE_TO pair.
#[derive(Debug, Clone)]
pub struct BezierArc {
    points: [PointD; MAX_POINTS],
    count: usize,
    cursor: usize,
    cmd: u32,
}

impl BezierArc {
    pub fn new(x: f64, y: f64, rx: f64, ry: f64, start_angle: f64, sweep_angle: f64) -> Self {
        let mut arc = Self {
            points: [PointD::default(); MAX_POINTS],
            count: 0,
            cursor: 0,
            cmd: PATH_CMD_LINE_TO,
        };
        arc.init(x, y, rx, ry, start_angle, sweep_angle);
        arc
    }

    pub fn init(&mut self, x: f64, y: f64, rx: f64, ry: f64, start_angle: f64, sweep_angle: f64) {
        let mut start_angle = start_angle % (2.0 * PI);
        let sweep_angle = sweep_angle.clamp(-2.0 * PI, 2.0 * PI);
        self.cursor = 0;

        if sweep_angle.abs() < 1e-10 {
            self.count = 2;
            self.cmd = PATH_CMD_LINE_TO;
            self.points[0] = PointD::new(x + rx * start_angle.cos(), y + ry * start_angle.sin());
            self.points[1] = PointD::new(
                x + rx * (start_angle + sweep_angle).cos(),
                y + ry * (start_angle + sweep_angle).sin(),
            );
            return;
        }

        self.cmd = PATH_CMD_CURVE4;
        self.count = 1;
        let step = if sweep_angle < 0.0 { -PI * 0.5 } else { PI * 0.5 };
        let mut total = 0.0;
        loop {
            let prev = total;
            total += step;
            let mut local = step;
            let done = if sweep_angle < 0.0 {
                total <= sweep_angle + ANGLE_EPSILON
            } else {
                total >= sweep_angle - ANGLE_EPSILON
            };
            if done {
                local = sweep_angle - prev;
            }

            let seg = arc_segment(x, y, rx, ry, start_angle, local);
            // The first segment contributes its start point too; later ones
            // share it with the previous segment's end.
            self.points[self.count - 1] = seg[0];
            self.points[self.count..self.count + 3].copy_from_slice(&seg[1..]);
            self.count += 3;
            start_angle += local;

            if done || self.count >= MAX_POINTS {
                break;
            }
        }
    }

    /// Number of points, including the start point.
    pub fn num_points(&self) -> usize {
        self.count
    }

    pub fn points(&self) -> &[PointD] {
        &self.points[..self.count]
    }

    fn points_mut(&mut self) -> &mut [PointD] {
        &mut self.points[..self.count]
    }
}

impl VertexSource for BezierArc {
    fn rewind(&mut self, _path_id: u32) {
        self.cursor = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.cursor >= self.count {
            return PATH_CMD_STOP;
        }
        let p = self.points[self.cursor];
        *x = p.x;
        *y = p.y;
        self.cursor += 1;
        if self.cursor == 1 {
            PATH_CMD_MOVE_TO
        } else {
            self.cmd
        }
    }
}

// ============================================================================
// SvgArc
// ============================================================================

/// Arc in endpoint form: from `(x0, y0)` to `(x2, y2)` on an ellipse with
/// radii `rx`/`ry` rotated by `angle`, choosing the branch with the
/// large-arc and sweep flags.
#[derive(Debug, Clone)]
pub struct SvgArc {
    arc: BezierArc,
    radii_ok: bool,
}

impl SvgArc {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x0: f64,
        y0: f64,
        rx: f64,
        ry: f64,
        angle: f64,
        large_arc: bool,
        sweep: bool,
        x2: f64,
        y2: f64,
    ) -> Self {
        let mut rx = rx.abs();
        let mut ry = ry.abs();
        let mut radii_ok = true;

        let dx2 = (x0 - x2) / 2.0;
        let dy2 = (y0 - y2) / 2.0;
        let (sin_a, cos_a) = angle.sin_cos();

        // Midpoint in the ellipse's own axes.
        let x1 = cos_a * dx2 + sin_a * dy2;
        let y1 = -sin_a * dx2 + cos_a * dy2;

        let mut prx = rx * rx;
        let mut pry = ry * ry;
        let px1 = x1 * x1;
        let py1 = y1 * y1;

        // Grow radii that cannot reach both endpoints.
        let radii_check = px1 / prx + py1 / pry;
        if radii_check > 1.0 {
            rx *= radii_check.sqrt();
            ry *= radii_check.sqrt();
            prx = rx * rx;
            pry = ry * ry;
            if radii_check > 10.0 {
                radii_ok = false;
            }
        }

        let sign = if large_arc == sweep { -1.0 } else { 1.0 };
        let sq = (prx * pry - prx * py1 - pry * px1) / (prx * py1 + pry * px1);
        let coef = sign * sq.max(0.0).sqrt();
        let cx1 = coef * ((rx * y1) / ry);
        let cy1 = coef * -((ry * x1) / rx);

        let cx = (x0 + x2) / 2.0 + (cos_a * cx1 - sin_a * cy1);
        let cy = (y0 + y2) / 2.0 + (sin_a * cx1 + cos_a * cy1);

        let ux = (x1 - cx1) / rx;
        let uy = (y1 - cy1) / ry;
        let vx = (-x1 - cx1) / rx;
        let vy = (-y1 - cy1) / ry;

        let n = (ux * ux + uy * uy).sqrt();
        let start_sign = if uy < 0.0 { -1.0 } else { 1.0 };
        let start_angle = start_sign * (ux / n).clamp(-1.0, 1.0).acos();

        let n = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
        let p = ux * vx + uy * vy;
        let sweep_sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
        let mut sweep_angle = sweep_sign * (p / n).clamp(-1.0, 1.0).acos();
        if !sweep && sweep_angle > 0.0 {
            sweep_angle -= PI * 2.0;
        } else if sweep && sweep_angle < 0.0 {
            sweep_angle += PI * 2.0;
        }

        let mut arc = BezierArc::new(0.0, 0.0, rx, ry, start_angle, sweep_angle);
        let mut mtx = TransAffine::new_rotation(angle);
        mtx.multiply(&TransAffine::new_translation(cx, cy));

        let pts = arc.points_mut();
        let last = pts.len() - 1;
        for p in pts[1..last].iter_mut() {
            mtx.transform(&mut p.x, &mut p.y);
        }
        // Pin the endpoints exactly.
        pts[0] = PointD::new(x0, y0);
        pts[last] = PointD::new(x2, y2);

        Self { arc, radii_ok }
    }

    /// `false` when the radii had to be scaled up by more than `sqrt(10)`.
    pub fn radii_ok(&self) -> bool {
        self.radii_ok
    }

    pub fn points(&self) -> &[PointD] {
        self.arc.points()
    }
}

impl VertexSource for SvgArc {
    fn rewind(&mut self, path_id: u32) {
        self.arc.rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        self.arc.vertex(x, y)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_arc_points() {
        let mut arc = BezierArc::new(0.0, 0.0, 10.0, 10.0, 0.0, PI / 2.0);
        assert_eq!(arc.num_points(), 4);
        arc.rewind(0);
        let (mut x, mut y) = (0.0, 0.0);
        assert_eq!(arc.vertex(&mut x, &mut y), PATH_CMD_MOVE_TO);
        assert!((x - 10.0).abs() < 1e-9 && y.abs() < 1e-9);
        for _ in 0..3 {
            assert_eq!(arc.vertex(&mut x, &mut y), PATH_CMD_CURVE4);
        }
        assert!(x.abs() < 1e-9 && (y - 10.0).abs() < 1e-9);
        assert_eq!(arc.vertex(&mut x, &mut y), PATH_CMD_STOP);
    }

    #[test]
    fn test_full_circle_uses_four_segments() {
        let arc = BezierArc::new(5.0, 5.0, 3.0, 3.0, 0.0, 2.0 * PI);
        assert_eq!(arc.num_points(), MAX_POINTS);
        let first = arc.points()[0];
        let last = arc.points()[MAX_POINTS - 1];
        assert!((first.x - last.x).abs() < 1e-9 && (first.y - last.y).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sweep_is_line() {
        let mut arc = BezierArc::new(0.0, 0.0, 10.0, 10.0, 0.0, 0.0);
        assert_eq!(arc.num_points(), 2);
        arc.rewind(0);
        let (mut x, mut y) = (0.0, 0.0);
        assert_eq!(arc.vertex(&mut x, &mut y), PATH_CMD_MOVE_TO);
        assert_eq!(arc.vertex(&mut x, &mut y), PATH_CMD_LINE_TO);
    }

    #[test]
    fn test_svg_arc_hits_endpoints() {
        let arc = SvgArc::new(0.0, 0.0, 10.0, 10.0, 0.0, false, true, 20.0, 0.0);
        assert!(arc.radii_ok());
        let pts = arc.points();
        assert_eq!(pts[0], PointD::new(0.0, 0.0));
        assert_eq!(pts[pts.len() - 1], PointD::new(20.0, 0.0));
        // Half circle of radius 10 around (10, 0): every control point
        // stays within the bounding box.
        for p in pts {
            assert!(p.x >= -1e-9 && p.x <= 20.0 + 1e-9);
            assert!(p.y.abs() <= 10.0 * 4.0 / 3.0 + 1e-9);
        }
    }
}
