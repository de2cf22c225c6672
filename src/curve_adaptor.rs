//! Curve flattening adaptor.
//!
//! Passes every command of the wrapped source through, except CURVE3 and
//! CURVE4: those are read together with their remaining control/end points
//! and replaced by the LINE_TO run of a [`Curve3`]/[`Curve4`] flattener.

use crate::basics::{
    is_stop, PointD, VertexSource, PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_LINE_TO,
};
use crate::curves::{Curve3, Curve4, CurveApproximationMethod};

/// Control polygons that deviate from their chord by less than this are
/// emitted as a single straight LINE_TO.
const STRAIGHT_EPSILON: f64 = 1e-9;

enum Active {
    None,
    Quad,
    Cubic,
}

pub struct CurveAdaptor<VS: VertexSource> {
    source: VS,
    last: PointD,
    curve3: Curve3,
    curve4: Curve4,
    active: Active,
}

impl<VS: VertexSource> CurveAdaptor<VS> {
    pub fn new(source: VS) -> Self {
        Self {
            source,
            last: PointD::default(),
            curve3: Curve3::new(),
            curve4: Curve4::new(),
            active: Active::None,
        }
    }

    pub fn source(&self) -> &VS {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }

    pub fn set_approximation_method(&mut self, m: CurveApproximationMethod) {
        self.curve3.set_approximation_method(m);
        self.curve4.set_approximation_method(m);
    }

    pub fn approximation_method(&self) -> CurveApproximationMethod {
        self.curve4.approximation_method()
    }

    /// Higher values produce more segments; usually the scale of the view
    /// transform.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.curve3.set_approximation_scale(s);
        self.curve4.set_approximation_scale(s);
    }

    pub fn approximation_scale(&self) -> f64 {
        self.curve4.approximation_scale()
    }

    pub fn set_angle_tolerance(&mut self, v: f64) {
        self.curve3.set_angle_tolerance(v);
        self.curve4.set_angle_tolerance(v);
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.curve4.angle_tolerance()
    }

    /// Only cubic curves have cusps.
    pub fn set_cusp_limit(&mut self, v: f64) {
        self.curve4.set_cusp_limit(v);
    }

    pub fn cusp_limit(&self) -> f64 {
        self.curve4.cusp_limit()
    }

    fn next_source_point(&mut self) -> PointD {
        let (mut x, mut y) = (0.0, 0.0);
        self.source.vertex(&mut x, &mut y);
        PointD::new(x, y)
    }
}

/// True when every control point lies on the chord between the endpoints.
fn is_straight(points: &[PointD]) -> bool {
    let first = points[0];
    let last = points[points.len() - 1];
    let chord = dist(first, last);
    let polygon: f64 = points.windows(2).map(|w| dist(w[0], w[1])).sum();
    polygon - chord < STRAIGHT_EPSILON
}

#[inline]
fn dist(a: PointD, b: PointD) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

impl<VS: VertexSource> VertexSource for CurveAdaptor<VS> {
    fn rewind(&mut self, path_id: u32) {
        self.source.rewind(path_id);
        self.last = PointD::default();
        self.curve3.reset();
        self.curve4.reset();
        self.active = Active::None;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        let pending = match self.active {
            Active::Quad => self.curve3.vertex(x, y),
            Active::Cubic => self.curve4.vertex(x, y),
            Active::None => crate::basics::PATH_CMD_STOP,
        };
        if !is_stop(pending) {
            self.last = PointD::new(*x, *y);
            return PATH_CMD_LINE_TO;
        }
        self.active = Active::None;

        let mut cmd = self.source.vertex(x, y);
        match cmd {
            PATH_CMD_CURVE3 => {
                let ctrl = PointD::new(*x, *y);
                let end = self.next_source_point();
                if is_straight(&[self.last, ctrl, end]) {
                    *x = end.x;
                    *y = end.y;
                } else {
                    self.curve3.init(self.last, ctrl, end);
                    // Skip the flattener's MOVE_TO; it repeats the current point.
                    self.curve3.vertex(x, y);
                    self.curve3.vertex(x, y);
                    self.active = Active::Quad;
                }
                cmd = PATH_CMD_LINE_TO;
            }
            PATH_CMD_CURVE4 => {
                let ctrl1 = PointD::new(*x, *y);
                let ctrl2 = self.next_source_point();
                let end = self.next_source_point();
                if is_straight(&[self.last, ctrl1, ctrl2, end]) {
                    *x = end.x;
                    *y = end.y;
                } else {
                    self.curve4.init(self.last, ctrl1, ctrl2, end);
                    self.curve4.vertex(x, y);
                    self.curve4.vertex(x, y);
                    self.active = Active::Cubic;
                }
                cmd = PATH_CMD_LINE_TO;
            }
            _ => {}
        }
        self.last = PointD::new(*x, *y);
        cmd
    }
}

// ============================================================================
// Tests
// ============================================================================
