//! Edge clipping in front of the cell rasterizer.
//!
//! Edges are clipped against a box in 24.8 fixed point. Parts left or right
//! of the box are not discarded but flattened onto the nearest vertical box
//! border: they still carry cover for the pixels inside the box, so fills
//! stay correct. Parts above or below the box contribute nothing and are
//! dropped.

use crate::basics::{mul_div, Rect};
use crate::rasterizer_cells::RasterizerCells;

/// `x > x2`
const CLIP_RIGHT: u32 = 1;
/// `y > y2`
const CLIP_BOTTOM: u32 = 2;
/// `x < x1`
const CLIP_LEFT: u32 = 4;
/// `y < y1`
const CLIP_TOP: u32 = 8;

const CLIP_Y: u32 = CLIP_TOP | CLIP_BOTTOM;

/// Outcode of a point against `b`.
#[inline]
pub fn clipping_flags(x: i32, y: i32, b: &Rect<i32>) -> u32 {
    (x > b.x2) as u32 * CLIP_RIGHT
        | (y > b.y2) as u32 * CLIP_BOTTOM
        | (x < b.x1) as u32 * CLIP_LEFT
        | (y < b.y1) as u32 * CLIP_TOP
}

#[inline]
fn flags_y(y: i32, b: &Rect<i32>) -> u32 {
    (y > b.y2) as u32 * CLIP_BOTTOM | (y < b.y1) as u32 * CLIP_TOP
}

/// Current pen position plus the optional clip box.
#[derive(Debug, Clone, Default)]
pub struct RasterizerClip {
    clip_box: Rect<i32>,
    clipping: bool,
    x1: i32,
    y1: i32,
    f1: u32,
}

impl RasterizerClip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_clipping(&mut self) {
        self.clipping = false;
    }

    /// Clip subsequent edges to the box, in 24.8 fixed point.
    pub fn clip_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clip_box = Rect::new(x1, y1, x2, y2);
        self.clip_box.normalize();
        self.clipping = true;
    }

    pub fn is_clipping(&self) -> bool {
        self.clipping
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x1 = x;
        self.y1 = y;
        if self.clipping {
            self.f1 = clipping_flags(x, y, &self.clip_box);
        }
    }

    /// Emit the edge from the pen position to `(x2, y2)` and move the pen.
    pub fn line_to(&mut self, cells: &mut RasterizerCells, x2: i32, y2: i32) {
        if !self.clipping {
            cells.line(self.x1, self.y1, x2, y2);
            self.x1 = x2;
            self.y1 = y2;
            return;
        }

        let f2 = clipping_flags(x2, y2, &self.clip_box);
        let (x1, y1, f1) = (self.x1, self.y1, self.f1);
        self.x1 = x2;
        self.y1 = y2;
        self.f1 = f2;

        // Entirely above or entirely below.
        if (f1 & CLIP_Y) != 0 && (f1 & CLIP_Y) == (f2 & CLIP_Y) {
            return;
        }

        let b = self.clip_box;
        let y_at = |bx: i32| y1 + mul_div(bx - x1, y2 - y1, x2 - x1);

        // Crossings of the vertical borders, in path order.
        let mut pts: [(i32, i32); 4] = [(0, 0); 4];
        let mut n = 0;
        pts[n] = (x1.clamp(b.x1, b.x2), y1);
        n += 1;
        let left = (f1 ^ f2) & CLIP_LEFT != 0;
        let right = (f1 ^ f2) & CLIP_RIGHT != 0;
        let crossings = if x2 >= x1 {
            [(left, b.x1), (right, b.x2)]
        } else {
            [(right, b.x2), (left, b.x1)]
        };
        for (crosses, bx) in crossings {
            if crosses {
                pts[n] = (bx, y_at(bx));
                n += 1;
            }
        }
        pts[n] = (x2.clamp(b.x1, b.x2), y2);
        n += 1;

        for w in pts[..n].windows(2) {
            self.clip_y(cells, w[0], w[1]);
        }
    }

    /// Emit the part of an edge (already inside the box horizontally) that
    /// lies between the top and bottom borders.
    fn clip_y(&self, cells: &mut RasterizerCells, (x1, y1): (i32, i32), (x2, y2): (i32, i32)) {
        let b = &self.clip_box;
        let f1 = flags_y(y1, b);
        let f2 = flags_y(y2, b);

        if f1 | f2 == 0 {
            cells.line(x1, y1, x2, y2);
            return;
        }
        if f1 == f2 {
            return;
        }

        let x_at = |by: i32| x1 + mul_div(by - y1, x2 - x1, y2 - y1);
        let (mut tx1, mut ty1, mut tx2, mut ty2) = (x1, y1, x2, y2);
        if f1 & CLIP_TOP != 0 {
            tx1 = x_at(b.y1);
            ty1 = b.y1;
        }
        if f1 & CLIP_BOTTOM != 0 {
            tx1 = x_at(b.y2);
            ty1 = b.y2;
        }
        if f2 & CLIP_TOP != 0 {
            tx2 = x_at(b.y1);
            ty2 = b.y1;
        }
        if f2 & CLIP_BOTTOM != 0 {
            tx2 = x_at(b.y2);
            ty2 = b.y2;
        }
        cells.line(tx1, ty1, tx2, ty2);
    }
}

// ============================================================================
// Tests
// ============================================================================
