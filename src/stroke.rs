//! Stroke outline generation.
//!
//! A [`VertexGenerator`] consumes one sub-path at a time and produces new
//! geometry for it. [`GeneratorAdaptor`] splits any [`VertexSource`] into
//! sub-paths and feeds them through a generator; [`StrokeAdaptor`] is that
//! adaptor paired with the [`StrokeGenerator`].
//!
//! An open sub-path becomes one closed polygon (start cap, left side, end
//! cap, right side). A closed sub-path becomes two closed polygons, the outer
//! and inner contours, which together fill as a ring under the non-zero rule.

use crate::basics::{
    get_close_flag, is_end_poly, is_move_to, is_stop, is_vertex, PointD, VertexSource,
    PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PATH_FLAGS_CCW,
    PATH_FLAGS_CLOSE, PATH_FLAGS_CW,
};
use crate::stroke_math::{LineCap, LineJoin, StrokeMath};
use crate::vertex_dist::{VertexDist, VertexSequence};

// ============================================================================
// Generator plumbing
// ============================================================================

/// Per-sub-path vertex producer driven by [`GeneratorAdaptor`].
pub trait VertexGenerator {
    /// Drop the accumulated sub-path.
    fn remove_all(&mut self);
    fn add_vertex(&mut self, x: f64, y: f64, cmd: u32);
    fn rewind(&mut self, path_id: u32);
    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdaptorState {
    Initial,
    Accumulate,
    Generate,
}

/// Runs each sub-path of `source` through `generator`.
pub struct GeneratorAdaptor<VS: VertexSource, G: VertexGenerator> {
    source: VS,
    generator: G,
    state: AdaptorState,
    last_cmd: u32,
    start: PointD,
}

impl<VS: VertexSource, G: VertexGenerator> GeneratorAdaptor<VS, G> {
    pub fn with_generator(source: VS, generator: G) -> Self {
        Self {
            source,
            generator,
            state: AdaptorState::Initial,
            last_cmd: PATH_CMD_STOP,
            start: PointD::default(),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }

    /// Feed the next sub-path into the generator. Returns `false` once the
    /// source is exhausted.
    fn accumulate(&mut self) -> bool {
        if is_stop(self.last_cmd) {
            return false;
        }
        self.generator.remove_all();
        self.generator.add_vertex(self.start.x, self.start.y, PATH_CMD_MOVE_TO);

        let (mut x, mut y) = (0.0, 0.0);
        loop {
            let cmd = self.source.vertex(&mut x, &mut y);
            if is_vertex(cmd) {
                self.last_cmd = cmd;
                if is_move_to(cmd) {
                    self.start = PointD::new(x, y);
                    break;
                }
                self.generator.add_vertex(x, y, cmd);
            } else if is_stop(cmd) {
                self.last_cmd = PATH_CMD_STOP;
                break;
            } else if is_end_poly(cmd) {
                self.generator.add_vertex(x, y, cmd);
                break;
            }
        }
        self.generator.rewind(0);
        true
    }
}

impl<VS: VertexSource, G: VertexGenerator> VertexSource for GeneratorAdaptor<VS, G> {
    fn rewind(&mut self, path_id: u32) {
        self.source.rewind(path_id);
        self.state = AdaptorState::Initial;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        loop {
            match self.state {
                AdaptorState::Initial => {
                    let (mut sx, mut sy) = (0.0, 0.0);
                    self.last_cmd = self.source.vertex(&mut sx, &mut sy);
                    self.start = PointD::new(sx, sy);
                    self.state = AdaptorState::Accumulate;
                }
                AdaptorState::Accumulate => {
                    if !self.accumulate() {
                        return PATH_CMD_STOP;
                    }
                    self.state = AdaptorState::Generate;
                }
                AdaptorState::Generate => {
                    let cmd = self.generator.vertex(x, y);
                    if !is_stop(cmd) {
                        return cmd;
                    }
                    self.state = AdaptorState::Accumulate;
                }
            }
        }
    }
}

// ============================================================================
// StrokeGenerator
// ============================================================================

/// Builds the outline of one sub-path.
///
/// The outline is computed in full on `rewind` and then replayed.
#[derive(Debug, Clone, Default)]
pub struct StrokeGenerator {
    math: StrokeMath,
    src: VertexSequence,
    closed: bool,
    prepared: bool,
    out: Vec<(PointD, u32)>,
    cursor: usize,
    scratch: Vec<PointD>,
}

impl StrokeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_width(&mut self, w: f64) {
        self.math.set_width(w);
    }

    pub fn width(&self) -> f64 {
        self.math.width()
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.math.set_line_cap(cap);
    }

    pub fn line_cap(&self) -> LineCap {
        self.math.line_cap()
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.math.set_line_join(join);
    }

    pub fn line_join(&self) -> LineJoin {
        self.math.line_join()
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.math.set_miter_limit(limit);
    }

    pub fn miter_limit(&self) -> f64 {
        self.math.miter_limit()
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.math.set_approximation_scale(s);
    }

    /// Append the scratch points as one run; the first point of a contour
    /// gets MOVE_TO.
    fn flush(&mut self, first: &mut bool) {
        for p in self.scratch.drain(..) {
            let cmd = if *first { PATH_CMD_MOVE_TO } else { PATH_CMD_LINE_TO };
            *first = false;
            self.out.push((p, cmd));
        }
    }

    fn join_at(&mut self, prev: VertexDist, curr: VertexDist, next: VertexDist, l1: f64, l2: f64) {
        self.math.calc_join(&mut self.scratch, &prev, &curr, &next, l1, l2);
    }

    fn build(&mut self) {
        self.out.clear();
        self.cursor = 0;
        let n = self.src.len();

        if self.closed {
            if n < 3 {
                return;
            }
            let mut first = true;
            for i in 0..n {
                let (p, c, nx) = (*self.src.prev(i), self.src[i], *self.src.next(i));
                self.join_at(p, c, nx, p.dist, c.dist);
                self.flush(&mut first);
            }
            self.out.push((PointD::default(), PATH_CMD_END_POLY | PATH_FLAGS_CLOSE | PATH_FLAGS_CCW));

            let mut first = true;
            for i in (0..n).rev() {
                let (p, c, nx) = (*self.src.prev(i), self.src[i], *self.src.next(i));
                self.join_at(nx, c, p, c.dist, p.dist);
                self.flush(&mut first);
            }
            self.out.push((PointD::default(), PATH_CMD_END_POLY | PATH_FLAGS_CLOSE | PATH_FLAGS_CW));
            return;
        }

        if n < 2 {
            return;
        }
        let mut first = true;
        let (v0, v1) = (self.src[0], self.src[1]);
        self.math.calc_cap(&mut self.scratch, &v0, &v1, v0.dist);
        self.flush(&mut first);

        for i in 1..n - 1 {
            let (p, c, nx) = (self.src[i - 1], self.src[i], self.src[i + 1]);
            self.join_at(p, c, nx, p.dist, c.dist);
            self.flush(&mut first);
        }

        let (tail, before) = (self.src[n - 1], self.src[n - 2]);
        self.math.calc_cap(&mut self.scratch, &tail, &before, before.dist);
        self.flush(&mut first);

        for i in (1..n - 1).rev() {
            let (p, c, nx) = (self.src[i - 1], self.src[i], self.src[i + 1]);
            self.join_at(nx, c, p, c.dist, p.dist);
            self.flush(&mut first);
        }
        self.out.push((PointD::default(), PATH_CMD_END_POLY | PATH_FLAGS_CLOSE | PATH_FLAGS_CW));
    }
}

impl VertexGenerator for StrokeGenerator {
    fn remove_all(&mut self) {
        self.src.clear();
        self.closed = false;
        self.prepared = false;
    }

    fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        self.prepared = false;
        if is_move_to(cmd) {
            self.src.modify_last(VertexDist::new(x, y));
        } else if is_vertex(cmd) {
            self.src.add(VertexDist::new(x, y));
        } else {
            self.closed = get_close_flag(cmd) != 0;
        }
    }

    fn rewind(&mut self, _path_id: u32) {
        if !self.prepared {
            self.src.close(self.closed);
            if self.src.len() < 3 {
                self.closed = false;
            }
            self.build();
            self.prepared = true;
        }
        self.cursor = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if !self.prepared {
            self.rewind(0);
        }
        match self.out.get(self.cursor) {
            Some(&(p, cmd)) => {
                self.cursor += 1;
                *x = p.x;
                *y = p.y;
                cmd
            }
            None => PATH_CMD_STOP,
        }
    }
}

// ============================================================================
// StrokeAdaptor
// ============================================================================

/// Strokes every sub-path of a vertex source.
pub type StrokeAdaptor<VS> = GeneratorAdaptor<VS, StrokeGenerator>;

impl<VS: VertexSource> GeneratorAdaptor<VS, StrokeGenerator> {
    pub fn new(source: VS) -> Self {
        Self::with_generator(source, StrokeGenerator::new())
    }

    pub fn set_width(&mut self, w: f64) {
        self.generator.set_width(w);
    }

    pub fn width(&self) -> f64 {
        self.generator.width()
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.generator.set_line_cap(cap);
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.generator.set_line_join(join);
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.generator.set_miter_limit(limit);
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.generator.set_approximation_scale(s);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{is_close, is_end_poly};
    use crate::vertex_storage::VertexStorage;

    fn collect<VS: VertexSource>(vs: &mut VS) -> Vec<(f64, f64, u32)> {
        vs.rewind(0);
        let mut out = Vec::new();
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            out.push((x, y, cmd));
        }
        out
    }

    #[test]
    fn test_open_line_is_one_rectangle() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        let mut s = StrokeAdaptor::new(p);
        s.set_width(2.0);
        let v = collect(&mut s);
        // Two butt caps of two points each, then the closing END_POLY.
        assert_eq!(v.len(), 5);
        assert_eq!(v[0].2, PATH_CMD_MOVE_TO);
        assert!(is_close(v[4].2));
        for (x, y, cmd) in &v[..4] {
            assert!(*cmd == PATH_CMD_MOVE_TO || *cmd == PATH_CMD_LINE_TO);
            assert!((y.abs() - 1.0).abs() < 1e-9);
            assert!(*x == 0.0 || *x == 10.0);
        }
    }

    #[test]
    fn test_closed_path_gives_two_contours() {
        let mut p = VertexStorage::new();
        p.add_rect(0.0, 0.0, 10.0, 10.0);
        let mut s = StrokeAdaptor::new(p);
        s.set_width(2.0);
        s.set_line_join(LineJoin::Miter);
        let v = collect(&mut s);
        let moves = v.iter().filter(|t| t.2 == PATH_CMD_MOVE_TO).count();
        let ends = v.iter().filter(|t| is_end_poly(t.2)).count();
        assert_eq!(moves, 2);
        assert_eq!(ends, 2);
        // Miter corners land one unit outside and inside the square.
        assert!(v.iter().any(|t| (t.0 + 1.0).abs() < 1e-9 && (t.1 + 1.0).abs() < 1e-9));
        assert!(v.iter().any(|t| (t.0 - 1.0).abs() < 1e-9 && (t.1 - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_degenerate_inputs_produce_nothing() {
        let mut single = VertexStorage::new();
        single.move_to(5.0, 5.0);
        assert!(collect(&mut StrokeAdaptor::new(single)).is_empty());

        let mut repeated = VertexStorage::new();
        repeated.move_to(5.0, 5.0);
        repeated.line_to(5.0, 5.0);
        assert!(collect(&mut StrokeAdaptor::new(repeated)).is_empty());

        assert!(collect(&mut StrokeAdaptor::new(VertexStorage::new())).is_empty());
    }

    #[test]
    fn test_each_subpath_stroked() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.move_to(0.0, 20.0);
        p.line_to(10.0, 20.0);
        let v = collect(&mut StrokeAdaptor::new(p));
        assert_eq!(v.iter().filter(|t| t.2 == PATH_CMD_MOVE_TO).count(), 2);
    }

    #[test]
    fn test_round_cap_adds_points() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        let mut s = StrokeAdaptor::new(p);
        s.set_width(10.0);
        s.set_line_cap(LineCap::Round);
        assert!(collect(&mut s).len() > 5);
    }
}
