//! Block-allocated vertex storage and the path builder on top of it.
//!
//! [`VertexBlockStorage`] keeps vertices in fixed-size boxed blocks. Growing
//! the storage only ever appends a new block, so vertices already written
//! never move. [`VertexStorage`] adds the drawing vocabulary (move/line/curve/
//! arc/close) and replays everything as a [`VertexSource`].

use crate::basics::{
    is_move_to, is_stop, is_vertex, VertexSource, PATH_CMD_CURVE3, PATH_CMD_CURVE4,
    PATH_CMD_END_POLY, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PATH_FLAGS_CLOSE,
};
use crate::bezier_arc::SvgArc;

/// Distance under which two consecutive vertices are treated as one.
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

const BLOCK_SHIFT: usize = 8;
const BLOCK_SIZE: usize = 1 << BLOCK_SHIFT;
const BLOCK_MASK: usize = BLOCK_SIZE - 1;

/// A stored vertex: coordinates plus its path command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub cmd: u32,
}

impl Vertex {
    pub const fn new(x: f64, y: f64, cmd: u32) -> Self {
        Self { x, y, cmd }
    }
}

// ============================================================================
// VertexBlockStorage
// ============================================================================

/// Vertex container made of 256-vertex blocks.
#[derive(Debug, Clone, Default)]
pub struct VertexBlockStorage {
    blocks: Vec<Box<[Vertex; BLOCK_SIZE]>>,
    total: usize,
}

impl VertexBlockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all vertices but keep the blocks for reuse.
    pub fn remove_all(&mut self) {
        self.total = 0;
    }

    /// Forget all vertices and release the blocks.
    pub fn free_all(&mut self) {
        self.blocks = Vec::new();
        self.total = 0;
    }

    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        let nb = self.total >> BLOCK_SHIFT;
        if nb >= self.blocks.len() {
            self.blocks.push(Box::new([Vertex::default(); BLOCK_SIZE]));
        }
        self.blocks[nb][self.total & BLOCK_MASK] = Vertex::new(x, y, cmd);
        self.total += 1;
    }

    pub fn total_vertices(&self) -> usize {
        self.total
    }

    /// Vertex at `idx`, or `None` past the end.
    pub fn get(&self, idx: usize) -> Option<Vertex> {
        if idx >= self.total {
            return None;
        }
        Some(self.blocks[idx >> BLOCK_SHIFT][idx & BLOCK_MASK])
    }

    /// Write the coordinates of vertex `idx` and return its command.
    pub fn vertex(&self, idx: usize, x: &mut f64, y: &mut f64) -> u32 {
        match self.get(idx) {
            Some(v) => {
                *x = v.x;
                *y = v.y;
                v.cmd
            }
            None => PATH_CMD_STOP,
        }
    }

    pub fn command(&self, idx: usize) -> u32 {
        self.get(idx).map_or(PATH_CMD_STOP, |v| v.cmd)
    }

    pub fn last_vertex(&self, x: &mut f64, y: &mut f64) -> u32 {
        if self.total == 0 {
            return PATH_CMD_STOP;
        }
        self.vertex(self.total - 1, x, y)
    }

    pub fn prev_vertex(&self, x: &mut f64, y: &mut f64) -> u32 {
        if self.total < 2 {
            return PATH_CMD_STOP;
        }
        self.vertex(self.total - 2, x, y)
    }

    pub fn last_command(&self) -> u32 {
        if self.total == 0 {
            return PATH_CMD_STOP;
        }
        self.command(self.total - 1)
    }

    pub fn modify_vertex(&mut self, idx: usize, x: f64, y: f64) {
        if idx < self.total {
            let v = &mut self.blocks[idx >> BLOCK_SHIFT][idx & BLOCK_MASK];
            v.x = x;
            v.y = y;
        }
    }

    pub fn modify_command(&mut self, idx: usize, cmd: u32) {
        if idx < self.total {
            self.blocks[idx >> BLOCK_SHIFT][idx & BLOCK_MASK].cmd = cmd;
        }
    }

    /// Number of allocated blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

// ============================================================================
// VertexStorage
// ============================================================================

/// Path builder over a [`VertexBlockStorage`].
///
/// `rewind(path_id)` positions the replay cursor at vertex index `path_id`,
/// so `0` replays the whole path.
#[derive(Debug, Clone, Default)]
pub struct VertexStorage {
    vertices: VertexBlockStorage,
    iterator: usize,
}

impl VertexStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_all(&mut self) {
        self.vertices.remove_all();
        self.iterator = 0;
    }

    pub fn free_all(&mut self) {
        self.vertices.free_all();
        self.iterator = 0;
    }

    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        self.vertices.add_vertex(x, y, cmd);
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.vertices.add_vertex(x, y, PATH_CMD_MOVE_TO);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.vertices.add_vertex(x, y, PATH_CMD_LINE_TO);
    }

    pub fn curve3(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.vertices.add_vertex(x_ctrl, y_ctrl, PATH_CMD_CURVE3);
        self.vertices.add_vertex(x_to, y_to, PATH_CMD_CURVE3);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn curve4(
        &mut self,
        x_ctrl1: f64,
        y_ctrl1: f64,
        x_ctrl2: f64,
        y_ctrl2: f64,
        x_to: f64,
        y_to: f64,
    ) {
        self.vertices.add_vertex(x_ctrl1, y_ctrl1, PATH_CMD_CURVE4);
        self.vertices.add_vertex(x_ctrl2, y_ctrl2, PATH_CMD_CURVE4);
        self.vertices.add_vertex(x_to, y_to, PATH_CMD_CURVE4);
    }

    /// SVG-style elliptic arc from the current point to `(x, y)`.
    ///
    /// Without a current point this is a `move_to`. A zero radius, or radii
    /// that cannot reasonably span the two points, degrade to `line_to`; an
    /// arc back onto the current point adds nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        angle: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) {
        const EPSILON: f64 = 1e-30;

        let (mut x0, mut y0) = (0.0, 0.0);
        if !is_vertex(self.vertices.last_vertex(&mut x0, &mut y0)) {
            self.move_to(x, y);
            return;
        }
        if rx.abs() < EPSILON || ry.abs() < EPSILON {
            self.line_to(x, y);
            return;
        }
        if distance(x0, y0, x, y) < EPSILON {
            return;
        }
        let mut arc = SvgArc::new(x0, y0, rx.abs(), ry.abs(), angle, large_arc, sweep, x, y);
        if arc.radii_ok() {
            self.join_path(&mut arc, 0);
        } else {
            self.line_to(x, y);
        }
    }

    /// Closed axis-aligned rectangle.
    pub fn add_rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.move_to(x1, y1);
        self.line_to(x2, y1);
        self.line_to(x2, y2);
        self.line_to(x1, y2);
        self.close_polygon();
    }

    /// Append END_POLY with `flags`, unless the path does not currently end
    /// on a vertex.
    pub fn end_poly(&mut self, flags: u32) {
        if is_vertex(self.vertices.last_command()) {
            self.vertices.add_vertex(0.0, 0.0, PATH_CMD_END_POLY | flags);
        }
    }

    pub fn close_polygon(&mut self) {
        self.end_poly(PATH_FLAGS_CLOSE);
    }

    /// Append every vertex of `vs` unchanged.
    pub fn concat_path<VS: VertexSource + ?Sized>(&mut self, vs: &mut VS, path_id: u32) {
        let (mut x, mut y) = (0.0, 0.0);
        vs.rewind(path_id);
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            self.vertices.add_vertex(x, y, cmd);
        }
    }

    /// Append `vs` as a continuation of the current sub-path: its MOVE_TOs
    /// become LINE_TOs, and a leading point equal to the current point is
    /// dropped.
    pub fn join_path<VS: VertexSource + ?Sized>(&mut self, vs: &mut VS, path_id: u32) {
        let (mut x, mut y) = (0.0, 0.0);
        vs.rewind(path_id);
        let mut cmd = vs.vertex(&mut x, &mut y);
        if is_stop(cmd) {
            return;
        }
        if is_vertex(cmd) {
            let (mut x0, mut y0) = (0.0, 0.0);
            let cmd0 = self.vertices.last_vertex(&mut x0, &mut y0);
            if is_vertex(cmd0) {
                if distance(x, y, x0, y0) > VERTEX_DIST_EPSILON {
                    if is_move_to(cmd) {
                        cmd = PATH_CMD_LINE_TO;
                    }
                    self.vertices.add_vertex(x, y, cmd);
                }
            } else {
                if is_stop(cmd0) {
                    cmd = PATH_CMD_MOVE_TO;
                } else if is_move_to(cmd) {
                    cmd = PATH_CMD_LINE_TO;
                }
                self.vertices.add_vertex(x, y, cmd);
            }
        }
        loop {
            cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            let cmd = if is_move_to(cmd) { PATH_CMD_LINE_TO } else { cmd };
            self.vertices.add_vertex(x, y, cmd);
        }
    }

    pub fn total_vertices(&self) -> usize {
        self.vertices.total_vertices()
    }

    pub fn last_vertex(&self, x: &mut f64, y: &mut f64) -> u32 {
        self.vertices.last_vertex(x, y)
    }

    pub fn last_command(&self) -> u32 {
        self.vertices.last_command()
    }

    pub fn vertex_at(&self, idx: usize, x: &mut f64, y: &mut f64) -> u32 {
        self.vertices.vertex(idx, x, y)
    }

    pub fn command(&self, idx: usize) -> u32 {
        self.vertices.command(idx)
    }

    pub fn modify_vertex(&mut self, idx: usize, x: f64, y: f64) {
        self.vertices.modify_vertex(idx, x, y);
    }

    pub fn storage(&self) -> &VertexBlockStorage {
        &self.vertices
    }
}

impl VertexSource for VertexStorage {
    fn rewind(&mut self, path_id: u32) {
        self.iterator = path_id as usize;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        let cmd = self.vertices.vertex(self.iterator, x, y);
        if !is_stop(cmd) {
            self.iterator += 1;
        }
        cmd
    }
}

#[inline]
fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{is_close, is_curve, is_end_poly};

    fn commands(vs: &mut VertexStorage) -> Vec<u32> {
        vs.rewind(0);
        let mut out = Vec::new();
        let (mut x, mut y) = (0.0, 0.0);
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            out.push(cmd);
        }
        out
    }

    #[test]
    fn test_block_growth_keeps_earlier_vertices() {
        let mut s = VertexBlockStorage::new();
        for i in 0..(BLOCK_SIZE * 2 + 5) {
            s.add_vertex(i as f64, -(i as f64), PATH_CMD_LINE_TO);
        }
        assert_eq!(s.num_blocks(), 3);
        assert_eq!(s.total_vertices(), BLOCK_SIZE * 2 + 5);
        let v = s.get(BLOCK_SIZE + 1).unwrap_or_default();
        assert_eq!(v.x, (BLOCK_SIZE + 1) as f64);
        assert!(s.get(BLOCK_SIZE * 3).is_none());
    }

    #[test]
    fn test_remove_all_reuses_blocks() {
        let mut s = VertexBlockStorage::new();
        s.add_vertex(1.0, 2.0, PATH_CMD_MOVE_TO);
        s.remove_all();
        assert_eq!(s.total_vertices(), 0);
        assert_eq!(s.num_blocks(), 1);
        s.free_all();
        assert_eq!(s.num_blocks(), 0);
    }

    #[test]
    fn test_replay_and_stop() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        p.close_polygon();
        let cmds = commands(&mut p);
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0], PATH_CMD_MOVE_TO);
        assert!(is_close(cmds[3]));
        // Rewind restarts.
        assert_eq!(commands(&mut p).len(), 4);
    }

    #[test]
    fn test_empty_storage_stops_immediately() {
        let mut p = VertexStorage::new();
        assert!(commands(&mut p).is_empty());
    }

    #[test]
    fn test_end_poly_requires_vertex() {
        let mut p = VertexStorage::new();
        p.close_polygon();
        assert_eq!(p.total_vertices(), 0);
        p.move_to(1.0, 1.0);
        p.close_polygon();
        p.close_polygon();
        assert_eq!(p.total_vertices(), 2);
        assert!(is_end_poly(p.last_command()));
    }

    #[test]
    fn test_curves_stored_as_tagged_vertices() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.curve3(5.0, 5.0, 10.0, 0.0);
        p.curve4(12.0, 5.0, 18.0, 5.0, 20.0, 0.0);
        let cmds = commands(&mut p);
        assert_eq!(cmds.len(), 6);
        assert!(cmds[1..].iter().all(|c| is_curve(*c)));
    }

    #[test]
    fn test_arc_to_without_current_point_moves() {
        let mut p = VertexStorage::new();
        p.arc_to(5.0, 5.0, 0.0, false, true, 3.0, 4.0);
        assert_eq!(p.command(0), PATH_CMD_MOVE_TO);
        assert_eq!(p.total_vertices(), 1);
    }

    #[test]
    fn test_arc_to_degenerate_cases() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.arc_to(0.0, 5.0, 0.0, false, true, 10.0, 0.0);
        assert_eq!(p.last_command(), PATH_CMD_LINE_TO);
        let before = p.total_vertices();
        p.arc_to(5.0, 5.0, 0.0, false, true, 10.0, 0.0);
        assert_eq!(p.total_vertices(), before);
    }

    #[test]
    fn test_arc_to_joins_curve_segments() {
        let mut p = VertexStorage::new();
        p.move_to(0.0, 0.0);
        p.arc_to(10.0, 10.0, 0.0, false, true, 20.0, 0.0);
        assert!(p.total_vertices() > 2);
        // The arc starts on the current point, so no extra MOVE_TO.
        assert_eq!(commands(&mut p).iter().filter(|c| is_move_to(**c)).count(), 1);
        let (mut x, mut y) = (0.0, 0.0);
        p.last_vertex(&mut x, &mut y);
        assert!((x - 20.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_concat_and_join() {
        let mut a = VertexStorage::new();
        a.move_to(0.0, 0.0);
        a.line_to(5.0, 0.0);

        let mut b = VertexStorage::new();
        b.move_to(5.0, 0.0);
        b.line_to(5.0, 5.0);

        let mut joined = a.clone();
        joined.join_path(&mut b, 0);
        assert_eq!(commands(&mut joined), vec![PATH_CMD_MOVE_TO, PATH_CMD_LINE_TO, PATH_CMD_LINE_TO]);

        let mut concat = a.clone();
        concat.concat_path(&mut b, 0);
        assert_eq!(concat.total_vertices(), 4);
        assert_eq!(concat.command(2), PATH_CMD_MOVE_TO);
    }

    #[test]
    fn test_add_rect() {
        let mut p = VertexStorage::new();
        p.add_rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(p.total_vertices(), 5);
        assert!(is_close(p.last_command()));
    }
}
