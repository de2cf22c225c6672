//! Quadratic and cubic Bezier flattening.
//!
//! Two approximation methods are available:
//!
//! - [`CurveApproximationMethod::Inc`]: forward differencing with a step
//!   count derived from the control polygon length. Cheap, uniform steps.
//! - [`CurveApproximationMethod::Div`]: adaptive de Casteljau subdivision
//!   that stops once the segment is within the distance tolerance (and,
//!   when set, the angle tolerance).
//!
//! [`Curve3`] and [`Curve4`] select between them at runtime and are what the
//! curve adaptor drives. Both are vertex sources that emit one MOVE_TO
//! followed by LINE_TOs.

use crate::basics::{uround, PointD, VertexSource, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PI};

const COLLINEARITY_EPSILON: f64 = 1e-30;
const ANGLE_TOLERANCE_EPSILON: f64 = 0.01;
const RECURSION_LIMIT: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveApproximationMethod {
    Inc,
    #[default]
    Div,
}

#[inline]
fn sq_dist(a: PointD, b: PointD) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

#[inline]
fn dist(a: PointD, b: PointD) -> f64 {
    sq_dist(a, b).sqrt()
}

#[inline]
fn mid(a: PointD, b: PointD) -> PointD {
    PointD::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Absolute turn between directions `a->b` and `b->c`, folded into [0, PI].
#[inline]
fn turn(a: PointD, b: PointD, c: PointD) -> f64 {
    let mut da = ((c.y - b.y).atan2(c.x - b.x) - (b.y - a.y).atan2(b.x - a.x)).abs();
    if da >= PI {
        da = 2.0 * PI - da;
    }
    da
}

// ============================================================================
// Forward differencing
// ============================================================================

/// Forward-difference stepper shared by the quadratic and cubic cases; the
/// quadratic case simply has a zero third difference.
#[derive(Debug, Clone, Default)]
struct ForwardDiff {
    num_steps: i32,
    step: i32,
    start: PointD,
    end: PointD,
    f: PointD,
    df: PointD,
    ddf: PointD,
    dddf: PointD,
    saved_df: PointD,
    saved_ddf: PointD,
}

impl ForwardDiff {
    fn steps_for(len: f64, scale: f64) -> i32 {
        (uround(len * 0.25 * scale) as i32).max(4)
    }

    fn init_quad(&mut self, p1: PointD, p2: PointD, p3: PointD, scale: f64) {
        self.start = p1;
        self.end = p3;
        self.num_steps = Self::steps_for(dist(p1, p2) + dist(p2, p3), scale);

        let s = 1.0 / self.num_steps as f64;
        let s2 = s * s;
        let tmp = PointD::new((p1.x - p2.x * 2.0 + p3.x) * s2, (p1.y - p2.y * 2.0 + p3.y) * s2);

        self.saved_df = PointD::new(
            tmp.x + (p2.x - p1.x) * (2.0 * s),
            tmp.y + (p2.y - p1.y) * (2.0 * s),
        );
        self.saved_ddf = PointD::new(tmp.x * 2.0, tmp.y * 2.0);
        self.dddf = PointD::default();
        self.restart();
    }

    fn init_cubic(&mut self, p1: PointD, p2: PointD, p3: PointD, p4: PointD, scale: f64) {
        self.start = p1;
        self.end = p4;
        self.num_steps = Self::steps_for(dist(p1, p2) + dist(p2, p3) + dist(p3, p4), scale);

        let s = 1.0 / self.num_steps as f64;
        let s2 = s * s;
        let s3 = s2 * s;
        let pre1 = 3.0 * s;
        let pre2 = 3.0 * s2;
        let pre4 = 6.0 * s2;
        let pre5 = 6.0 * s3;

        let t1 = PointD::new(p1.x - p2.x * 2.0 + p3.x, p1.y - p2.y * 2.0 + p3.y);
        let t2 = PointD::new(
            (p2.x - p3.x) * 3.0 - p1.x + p4.x,
            (p2.y - p3.y) * 3.0 - p1.y + p4.y,
        );

        self.saved_df = PointD::new(
            (p2.x - p1.x) * pre1 + t1.x * pre2 + t2.x * s3,
            (p2.y - p1.y) * pre1 + t1.y * pre2 + t2.y * s3,
        );
        self.saved_ddf = PointD::new(t1.x * pre4 + t2.x * pre5, t1.y * pre4 + t2.y * pre5);
        self.dddf = PointD::new(t2.x * pre5, t2.y * pre5);
        self.restart();
    }

    fn restart(&mut self) {
        if self.num_steps == 0 {
            self.step = -1;
            return;
        }
        self.step = self.num_steps;
        self.f = self.start;
        self.df = self.saved_df;
        self.ddf = self.saved_ddf;
    }

    fn clear(&mut self) {
        self.num_steps = 0;
        self.step = -1;
    }

    fn next(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.step < 0 {
            return PATH_CMD_STOP;
        }
        let cmd = if self.step == self.num_steps {
            *x = self.start.x;
            *y = self.start.y;
            PATH_CMD_MOVE_TO
        } else if self.step == 0 {
            *x = self.end.x;
            *y = self.end.y;
            PATH_CMD_LINE_TO
        } else {
            self.f = self.f + self.df;
            self.df = self.df + self.ddf;
            self.ddf = self.ddf + self.dddf;
            *x = self.f.x;
            *y = self.f.y;
            PATH_CMD_LINE_TO
        };
        self.step -= 1;
        cmd
    }
}

// ============================================================================
// Adaptive subdivision
// ============================================================================

#[derive(Debug, Clone, Default)]
struct Subdivision {
    distance_tolerance_square: f64,
    angle_tolerance: f64,
    cusp_limit: f64,
    points: Vec<PointD>,
    cursor: usize,
}

impl Subdivision {
    fn set_scale(&mut self, approximation_scale: f64) {
        let d = 0.5 / approximation_scale;
        self.distance_tolerance_square = d * d;
    }

    fn quad(&mut self, p1: PointD, p2: PointD, p3: PointD, scale: f64) {
        self.points.clear();
        self.cursor = 0;
        self.set_scale(scale);
        self.points.push(p1);
        self.quad_rec(p1, p2, p3, 0);
        self.points.push(p3);
    }

    fn quad_rec(&mut self, p1: PointD, p2: PointD, p3: PointD, level: u32) {
        if level > RECURSION_LIMIT {
            return;
        }
        let p12 = mid(p1, p2);
        let p23 = mid(p2, p3);
        let p123 = mid(p12, p23);

        let dx = p3.x - p1.x;
        let dy = p3.y - p1.y;
        let d = ((p2.x - p3.x) * dy - (p2.y - p3.y) * dx).abs();

        if d > COLLINEARITY_EPSILON {
            if d * d <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                if self.angle_tolerance < ANGLE_TOLERANCE_EPSILON
                    || turn(p1, p2, p3) < self.angle_tolerance
                {
                    self.points.push(p123);
                    return;
                }
            }
        } else {
            let da = dx * dx + dy * dy;
            let d = if da == 0.0 {
                sq_dist(p1, p2)
            } else {
                let t = ((p2.x - p1.x) * dx + (p2.y - p1.y) * dy) / da;
                if t > 0.0 && t < 1.0 {
                    // control point lies between the ends
                    return;
                }
                if t <= 0.0 {
                    sq_dist(p2, p1)
                } else {
                    sq_dist(p2, p3)
                }
            };
            if d < self.distance_tolerance_square {
                self.points.push(p2);
                return;
            }
        }

        self.quad_rec(p1, p12, p123, level + 1);
        self.quad_rec(p123, p23, p3, level + 1);
    }

    fn cubic(&mut self, p1: PointD, p2: PointD, p3: PointD, p4: PointD, scale: f64) {
        self.points.clear();
        self.cursor = 0;
        self.set_scale(scale);
        self.points.push(p1);
        self.cubic_rec(p1, p2, p3, p4, 0);
        self.points.push(p4);
    }

    fn cubic_rec(&mut self, p1: PointD, p2: PointD, p3: PointD, p4: PointD, level: u32) {
        if level > RECURSION_LIMIT {
            return;
        }
        let p12 = mid(p1, p2);
        let p23 = mid(p2, p3);
        let p34 = mid(p3, p4);
        let p123 = mid(p12, p23);
        let p234 = mid(p23, p34);
        let p1234 = mid(p123, p234);

        let dx = p4.x - p1.x;
        let dy = p4.y - p1.y;
        let mut d2 = ((p2.x - p4.x) * dy - (p2.y - p4.y) * dx).abs();
        let mut d3 = ((p3.x - p4.x) * dy - (p3.y - p4.y) * dx).abs();
        let chord_sq = dx * dx + dy * dy;
        let tol = self.distance_tolerance_square;

        match (d2 > COLLINEARITY_EPSILON, d3 > COLLINEARITY_EPSILON) {
            (false, false) => {
                // All collinear, or p1 == p4.
                if chord_sq == 0.0 {
                    d2 = sq_dist(p1, p2);
                    d3 = sq_dist(p4, p3);
                } else {
                    let k = 1.0 / chord_sq;
                    let t2 = k * ((p2.x - p1.x) * dx + (p2.y - p1.y) * dy);
                    let t3 = k * ((p3.x - p1.x) * dx + (p3.y - p1.y) * dy);
                    if t2 > 0.0 && t2 < 1.0 && t3 > 0.0 && t3 < 1.0 {
                        return;
                    }
                    let project = |p: PointD, t: f64| {
                        if t <= 0.0 {
                            sq_dist(p, p1)
                        } else if t >= 1.0 {
                            sq_dist(p, p4)
                        } else {
                            sq_dist(p, PointD::new(p1.x + t * dx, p1.y + t * dy))
                        }
                    };
                    d2 = project(p2, t2);
                    d3 = project(p3, t3);
                }
                if d2 > d3 {
                    if d2 < tol {
                        self.points.push(p2);
                        return;
                    }
                } else if d3 < tol {
                    self.points.push(p3);
                    return;
                }
            }
            (false, true) => {
                // p3 is significant.
                if d3 * d3 <= tol * chord_sq {
                    if self.angle_tolerance < ANGLE_TOLERANCE_EPSILON {
                        self.points.push(p23);
                        return;
                    }
                    let da = turn(p2, p3, p4);
                    if da < self.angle_tolerance {
                        self.points.push(p2);
                        self.points.push(p3);
                        return;
                    }
                    if self.cusp_limit != 0.0 && da > self.cusp_limit {
                        self.points.push(p3);
                        return;
                    }
                }
            }
            (true, false) => {
                // p2 is significant.
                if d2 * d2 <= tol * chord_sq {
                    if self.angle_tolerance < ANGLE_TOLERANCE_EPSILON {
                        self.points.push(p23);
                        return;
                    }
                    let da = turn(p1, p2, p3);
                    if da < self.angle_tolerance {
                        self.points.push(p2);
                        self.points.push(p3);
                        return;
                    }
                    if self.cusp_limit != 0.0 && da > self.cusp_limit {
                        self.points.push(p2);
                        return;
                    }
                }
            }
            (true, true) => {
                if (d2 + d3) * (d2 + d3) <= tol * chord_sq {
                    if self.angle_tolerance < ANGLE_TOLERANCE_EPSILON {
                        self.points.push(p23);
                        return;
                    }
                    let da1 = turn(p1, p2, p3);
                    let da2 = turn(p2, p3, p4);
                    if da1 + da2 < self.angle_tolerance {
                        self.points.push(p23);
                        return;
                    }
                    if self.cusp_limit != 0.0 {
                        if da1 > self.cusp_limit {
                            self.points.push(p2);
                            return;
                        }
                        if da2 > self.cusp_limit {
                            self.points.push(p3);
                            return;
                        }
                    }
                }
            }
        }

        self.cubic_rec(p1, p12, p123, p1234, level + 1);
        self.cubic_rec(p1234, p234, p34, p4, level + 1);
    }

    fn clear(&mut self) {
        self.points.clear();
        self.cursor = 0;
    }

    fn next(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        let Some(p) = self.points.get(self.cursor) else {
            return PATH_CMD_STOP;
        };
        *x = p.x;
        *y = p.y;
        self.cursor += 1;
        if self.cursor == 1 {
            PATH_CMD_MOVE_TO
        } else {
            PATH_CMD_LINE_TO
        }
    }
}

// ============================================================================
// Curve3 / Curve4
// ============================================================================

/// Quadratic Bezier flattener.
#[derive(Debug, Clone)]
pub struct Curve3 {
    method: CurveApproximationMethod,
    approximation_scale: f64,
    inc: ForwardDiff,
    div: Subdivision,
}

impl Curve3 {
    pub fn new() -> Self {
        Self {
            method: CurveApproximationMethod::default(),
            approximation_scale: 1.0,
            inc: ForwardDiff::default(),
            div: Subdivision::default(),
        }
    }

    pub fn init(&mut self, p1: PointD, p2: PointD, p3: PointD) {
        match self.method {
            CurveApproximationMethod::Inc => self.inc.init_quad(p1, p2, p3, self.approximation_scale),
            CurveApproximationMethod::Div => self.div.quad(p1, p2, p3, self.approximation_scale),
        }
    }

    pub fn reset(&mut self) {
        self.inc.clear();
        self.div.clear();
    }

    pub fn set_approximation_method(&mut self, m: CurveApproximationMethod) {
        self.method = m;
    }

    pub fn approximation_method(&self) -> CurveApproximationMethod {
        self.method
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approximation_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.approximation_scale
    }

    pub fn set_angle_tolerance(&mut self, a: f64) {
        self.div.angle_tolerance = a;
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.div.angle_tolerance
    }
}

impl Default for Curve3 {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve3 {
    fn rewind(&mut self, _path_id: u32) {
        match self.method {
            CurveApproximationMethod::Inc => self.inc.restart(),
            CurveApproximationMethod::Div => self.div.cursor = 0,
        }
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        match self.method {
            CurveApproximationMethod::Inc => self.inc.next(x, y),
            CurveApproximationMethod::Div => self.div.next(x, y),
        }
    }
}

/// Cubic Bezier flattener.
#[derive(Debug, Clone)]
pub struct Curve4 {
    method: CurveApproximationMethod,
    approximation_scale: f64,
    inc: ForwardDiff,
    div: Subdivision,
}

impl Curve4 {
    pub fn new() -> Self {
        Self {
            method: CurveApproximationMethod::default(),
            approximation_scale: 1.0,
            inc: ForwardDiff::default(),
            div: Subdivision::default(),
        }
    }

    pub fn init(&mut self, p1: PointD, p2: PointD, p3: PointD, p4: PointD) {
        match self.method {
            CurveApproximationMethod::Inc => {
                self.inc.init_cubic(p1, p2, p3, p4, self.approximation_scale)
            }
            CurveApproximationMethod::Div => {
                self.div.cubic(p1, p2, p3, p4, self.approximation_scale)
            }
        }
    }

    pub fn reset(&mut self) {
        self.inc.clear();
        self.div.clear();
    }

    pub fn set_approximation_method(&mut self, m: CurveApproximationMethod) {
        self.method = m;
    }

    pub fn approximation_method(&self) -> CurveApproximationMethod {
        self.method
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approximation_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.approximation_scale
    }

    pub fn set_angle_tolerance(&mut self, a: f64) {
        self.div.angle_tolerance = a;
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.div.angle_tolerance
    }

    /// Turns sharper than `PI - v` are cut at the cusp. Zero disables.
    pub fn set_cusp_limit(&mut self, v: f64) {
        self.div.cusp_limit = if v == 0.0 { 0.0 } else { PI - v };
    }

    pub fn cusp_limit(&self) -> f64 {
        if self.div.cusp_limit == 0.0 {
            0.0
        } else {
            PI - self.div.cusp_limit
        }
    }
}

impl Default for Curve4 {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve4 {
    fn rewind(&mut self, _path_id: u32) {
        match self.method {
            CurveApproximationMethod::Inc => self.inc.restart(),
            CurveApproximationMethod::Div => self.div.cursor = 0,
        }
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        match self.method {
            CurveApproximationMethod::Inc => self.inc.next(x, y),
            CurveApproximationMethod::Div => self.div.next(x, y),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
