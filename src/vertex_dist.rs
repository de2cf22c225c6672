//! Vertex sequences with segment lengths.
//!
//! Stroke and dash generators accumulate their input here. Each vertex keeps
//! the length of the segment that starts at it, and coincident neighbours
//! are dropped as vertices arrive so later stages never see a zero-length
//! segment.

use core::ops::{Index, IndexMut};

pub use crate::vertex_storage::VERTEX_DIST_EPSILON;

/// A point plus the distance to the next point in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexDist {
    pub x: f64,
    pub y: f64,
    pub dist: f64,
}

impl VertexDist {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, dist: 0.0 }
    }

    /// Store the distance to `next`. Returns `false` when the two points
    /// coincide, in which case `dist` is set to a huge sentinel.
    pub fn measure_to(&mut self, next: &VertexDist) -> bool {
        let dx = next.x - self.x;
        let dy = next.y - self.y;
        self.dist = (dx * dx + dy * dy).sqrt();
        if self.dist > VERTEX_DIST_EPSILON {
            true
        } else {
            self.dist = 1.0 / VERTEX_DIST_EPSILON;
            false
        }
    }
}

/// Growable run of [`VertexDist`] that discards coincident points.
#[derive(Debug, Clone, Default)]
pub struct VertexSequence {
    vertices: Vec<VertexDist>,
}

impl VertexSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Append `v`. The previous tail is dropped first if it coincides with
    /// the vertex before it.
    pub fn add(&mut self, v: VertexDist) {
        let n = self.vertices.len();
        if n > 1 {
            let tail = self.vertices[n - 1];
            if !self.vertices[n - 2].measure_to(&tail) {
                self.vertices.pop();
            }
        }
        self.vertices.push(v);
    }

    /// Replace the tail vertex.
    pub fn modify_last(&mut self, v: VertexDist) {
        self.vertices.pop();
        self.add(v);
    }

    /// Finish the sequence: measure every remaining segment, drop trailing
    /// duplicates and, for closed contours, a tail that repeats the head.
    pub fn close(&mut self, closed: bool) {
        while self.vertices.len() > 1 {
            let n = self.vertices.len();
            let tail = self.vertices[n - 1];
            if self.vertices[n - 2].measure_to(&tail) {
                break;
            }
            self.vertices.pop();
            self.modify_last(tail);
        }

        if closed {
            while self.vertices.len() > 1 {
                let n = self.vertices.len();
                let head = self.vertices[0];
                if self.vertices[n - 1].measure_to(&head) {
                    break;
                }
                self.vertices.pop();
            }
        }
    }

    pub fn as_slice(&self) -> &[VertexDist] {
        &self.vertices
    }

    /// Cyclic neighbour access used by the join logic.
    pub fn prev(&self, idx: usize) -> &VertexDist {
        let n = self.vertices.len();
        &self.vertices[(idx + n - 1) % n]
    }

    pub fn next(&self, idx: usize) -> &VertexDist {
        &self.vertices[(idx + 1) % self.vertices.len()]
    }
}

impl Index<usize> for VertexSequence {
    type Output = VertexDist;

    fn index(&self, i: usize) -> &VertexDist {
        &self.vertices[i]
    }
}

impl IndexMut<usize> for VertexSequence {
    fn index_mut(&mut self, i: usize) -> &mut VertexDist {
        &mut self.vertices[i]
    }
}
