//! Dash pattern generation.
//!
//! [`DashGenerator`] walks each sub-path and cuts it into alternating "on"
//! and "off" intervals from a repeating dash array. The "on" intervals come
//! out as open polylines (MOVE_TO then LINE_TOs), ready to be stroked.

use crate::basics::{
    get_close_flag, is_move_to, is_vertex, PointD, VertexSource, PATH_CMD_LINE_TO,
    PATH_CMD_MOVE_TO, PATH_CMD_STOP,
};
use crate::stroke::{GeneratorAdaptor, VertexGenerator};
use crate::vertex_dist::{VertexDist, VertexSequence};

/// Splits sub-paths into dashes.
#[derive(Debug, Clone, Default)]
pub struct DashGenerator {
    /// Alternating dash and gap lengths, always of even length.
    dashes: Vec<f64>,
    total_len: f64,
    dash_start: f64,

    src: VertexSequence,
    closed: bool,
    prepared: bool,
    out: Vec<(PointD, u32)>,
    cursor: usize,
}

impl DashGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_all_dashes(&mut self) {
        self.dashes.clear();
        self.total_len = 0.0;
    }

    pub fn add_dash(&mut self, dash_len: f64, gap_len: f64) {
        self.dashes.push(dash_len.max(0.0));
        self.dashes.push(gap_len.max(0.0));
        self.total_len += dash_len.max(0.0) + gap_len.max(0.0);
    }

    /// Replace the pattern with `(dash, gap)` pairs taken from `values`. An
    /// unpaired trailing value is ignored.
    pub fn set_dashes(&mut self, values: &[f64]) {
        self.remove_all_dashes();
        for pair in values.chunks_exact(2) {
            self.add_dash(pair[0], pair[1]);
        }
    }

    /// Distance into the pattern at which the first sub-path starts.
    pub fn set_dash_start(&mut self, offset: f64) {
        self.dash_start = offset;
    }

    pub fn num_dashes(&self) -> usize {
        self.dashes.len()
    }

    /// Index into the dash array and the distance already consumed from it
    /// for a pattern position of `offset`.
    fn pattern_position(&self, offset: f64) -> (usize, f64) {
        let mut rest = offset.abs() % self.total_len;
        let mut idx = 0;
        while rest > 0.0 && rest >= self.dashes[idx] {
            rest -= self.dashes[idx];
            idx = (idx + 1) % self.dashes.len();
        }
        (idx, rest)
    }

    fn build(&mut self) {
        self.out.clear();
        self.cursor = 0;
        let n = self.src.len();
        if self.dashes.len() < 2 || self.total_len <= 0.0 || n < 2 {
            return;
        }

        let (mut idx, mut consumed) = self.pattern_position(self.dash_start);
        let segments = if self.closed { n } else { n - 1 };
        let mut pen_down = false;

        for s in 0..segments {
            let a = self.src[s];
            let b = *self.src.next(s);
            let len = a.dist;
            let mut pos = 0.0;

            while pos < len {
                let on = idx % 2 == 0;
                let left_in_dash = self.dashes[idx] - consumed;
                let step = left_in_dash.min(len - pos);

                if on && !pen_down {
                    self.out.push((along(&a, &b, pos, len), PATH_CMD_MOVE_TO));
                    pen_down = true;
                }
                pos += step;
                consumed += step;
                if on {
                    self.out.push((along(&a, &b, pos, len), PATH_CMD_LINE_TO));
                }
                if consumed >= self.dashes[idx] {
                    idx = (idx + 1) % self.dashes.len();
                    consumed = 0.0;
                    pen_down = false;
                }
            }
        }
    }
}

/// Point at distance `pos` along `a -> b` of length `len`.
#[inline]
fn along(a: &VertexDist, b: &VertexDist, pos: f64, len: f64) -> PointD {
    PointD::new(a.x + (b.x - a.x) * pos / len, a.y + (b.y - a.y) * pos / len)
}

impl VertexGenerator for DashGenerator {
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

/// Dashes every sub-path of a vertex source.
pub type DashAdaptor<VS> = GeneratorAdaptor<VS, DashGenerator>;

impl<VS: VertexSource> GeneratorAdaptor<VS, DashGenerator> {
    pub fn new(source: VS) -> Self {
        Self::with_generator(source, DashGenerator::new())
    }

    pub fn add_dash(&mut self, dash_len: f64, gap_len: f64) {
        self.generator_mut().add_dash(dash_len, gap_len);
    }

    pub fn set_dashes(&mut self, values: &[f64]) {
        self.generator_mut().set_dashes(values);
    }

    pub fn set_dash_start(&mut self, offset: f64) {
        self.generator_mut().set_dash_start(offset);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::is_stop;
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

    fn line(len: f64) -> VertexStorage {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.line_to(len, 0.0);
        p
    }

    fn dash_runs(v: &[(f64, f64, u32)]) -> Vec<(f64, f64)> {
        let mut runs = Vec::new();
        let mut start = 0.0;
        for (x, _, cmd) in v {
            if *cmd == PATH_CMD_MOVE_TO {
                start = *x;
            } else {
                runs.push((start, *x));
            }
        }
        runs
    }

    #[test]
    fn test_simple_pattern() {
        let mut d = DashAdaptor::new(line(10.0));
        d.add_dash(2.0, 3.0);
        let runs = dash_runs(&collect(&mut d));
        assert_eq!(runs, vec![(0.0, 2.0), (5.0, 7.0)]);
    }

    #[test]
    fn test_dash_start_offset() {
        let mut d = DashAdaptor::new(line(10.0));
        d.add_dash(2.0, 3.0);
        d.set_dash_start(1.0);
        let runs = dash_runs(&collect(&mut d));
        assert_eq!(runs[0], (0.0, 1.0));
        assert_eq!(runs[1], (4.0, 6.0));
    }

    #[test]
    fn test_odd_array_drops_trailing_value() {
        let mut g = DashGenerator::new();
        g.set_dashes(&[1.0, 1.5, 2.0]);
        assert_eq!(g.num_dashes(), 2);
    }

    #[test]
    fn test_zero_pattern_is_noop() {
        let mut d = DashAdaptor::new(line(10.0));
        d.set_dashes(&[0.0, 0.0]);
        assert!(collect(&mut d).is_empty());

        let mut none = DashAdaptor::new(line(10.0));
        assert!(collect(&mut none).is_empty());
    }

    #[test]
    fn test_dash_continues_around_corner() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.line_to(3.0, 0.0);
        p.line_to(3.0, 10.0);
        let mut d = DashAdaptor::new(p);
        d.add_dash(5.0, 5.0);
        let v = collect(&mut d);
        // First dash: (0,0) -> (3,0) -> (3,2), without a MOVE_TO at the corner.
        assert_eq!(v[0], (0.0, 0.0, PATH_CMD_MOVE_TO));
        assert_eq!(v[1], (3.0, 0.0, PATH_CMD_LINE_TO));
        assert_eq!(v[2], (3.0, 2.0, PATH_CMD_LINE_TO));
        assert_eq!(v[3].2, PATH_CMD_MOVE_TO);
    }

    #[test]
    fn test_closed_path_dashes_closing_edge() {
        let mut p = VertexStorage::new();
        p.add_rect(0.0, 0.0, 10.0, 10.0);
        let mut d = DashAdaptor::new(p);
        d.add_dash(35.0, 20.0);
        let v = collect(&mut d);
        // 35 units on: walks three full edges and half the closing one.
        let last = v[v.len() - 1];
        assert!((last.0 - 0.0).abs() < 1e-9 && (last.1 - 5.0).abs() < 1e-9);
    }
}
