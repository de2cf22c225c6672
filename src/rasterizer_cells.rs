//! Edge to cell conversion.
//!
//! Every edge, given in 24.8 fixed point, is walked across the pixel grid.
//! Each pixel it touches receives an exact analytic contribution: `cover`
//! is the signed vertical extent of the edge inside the pixel, `area` is
//! twice the signed area between the edge and the pixel's left border,
//! scaled by the sub-pixel grid. Nothing is sampled.
//!
//! After [`RasterizerCells::sort_cells`] the cells are ordered by `(y, x)`
//! and can be read one row at a time. Cells with equal coordinates are left
//! as separate entries; the sweep sums them.

use crate::basics::{POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};

const SUBPIXEL_SCALE: i32 = POLY_SUBPIXEL_SCALE as i32;
const SUBPIXEL_MASK: i32 = POLY_SUBPIXEL_MASK as i32;

/// Edges wider than this are split in half before walking, which keeps the
/// intermediate products in range.
const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;

/// Per-pixel accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
}

impl Cell {
    const UNSET: Cell = Cell {
        x: i32::MAX,
        y: i32::MAX,
        cover: 0,
        area: 0,
    };

    #[inline]
    fn is_at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::UNSET
    }
}

/// Floor division returning the quotient and a non-negative remainder.
#[inline]
fn floor_divmod(p: i64, d: i64) -> (i32, i64) {
    let mut q = p / d;
    let mut r = p % d;
    if r < 0 {
        q -= 1;
        r += d;
    }
    (q as i32, r)
}

/// Cell storage plus the bounding box of all edges seen so far.
#[derive(Debug, Clone)]
pub struct RasterizerCells {
    cells: Vec<Cell>,
    /// `rows[i]..rows[i + 1]` is the slice of sorted cells on row `min_y + i`.
    rows: Vec<u32>,
    curr: Cell,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
}

impl Default for RasterizerCells {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterizerCells {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            rows: Vec::new(),
            curr: Cell::UNSET,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
        }
    }

    /// Drop every cell. Allocations are kept for the next path.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.rows.clear();
        self.curr = Cell::UNSET;
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.sorted = false;
    }

    pub fn min_x(&self) -> i32 {
        self.min_x
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn sorted(&self) -> bool {
        self.sorted
    }

    /// Sorted cells of row `y`. Empty outside `[min_y, max_y]` or before
    /// sorting.
    pub fn row(&self, y: i32) -> &[Cell] {
        if !self.sorted || y < self.min_y || y > self.max_y {
            return &[];
        }
        let i = (y - self.min_y) as usize;
        let (Some(&start), Some(&end)) = (self.rows.get(i), self.rows.get(i + 1)) else {
            return &[];
        };
        &self.cells[start as usize..end as usize]
    }

    #[inline]
    fn flush_curr(&mut self) {
        if self.curr.area | self.curr.cover != 0 {
            self.cells.push(self.curr);
        }
    }

    #[inline]
    fn move_curr(&mut self, x: i32, y: i32) {
        if !self.curr.is_at(x, y) {
            self.flush_curr();
            self.curr = Cell {
                x,
                y,
                cover: 0,
                area: 0,
            };
        }
    }

    #[inline]
    fn accumulate(&mut self, cover: i32, area: i32) {
        self.curr.cover += cover;
        self.curr.area += area;
    }

    fn grow_bounds(&mut self, ex: i32, ey: i32) {
        self.min_x = self.min_x.min(ex);
        self.max_x = self.max_x.max(ex);
        self.min_y = self.min_y.min(ey);
        self.max_y = self.max_y.max(ey);
    }

    /// Walk the part of an edge that lies inside row `ey`. `x1`/`x2` are full
    /// fixed-point x values, `y1`/`y2` the sub-pixel y inside the row.
    fn walk_row(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let fx1 = x1 & SUBPIXEL_MASK;
        let fx2 = x2 & SUBPIXEL_MASK;

        if y1 == y2 {
            self.move_curr(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let dy = y2 - y1;
            self.accumulate(dy, (fx1 + fx2) * dy);
            return;
        }

        // The edge crosses several pixels of this row.
        let mut dx = x2 as i64 - x1 as i64;
        let (first, incr, p) = if dx < 0 {
            dx = -dx;
            (0, -1, fx1 as i64 * (y2 - y1) as i64)
        } else {
            (SUBPIXEL_SCALE, 1, (SUBPIXEL_SCALE - fx1) as i64 * (y2 - y1) as i64)
        };

        let (mut delta, mut modulo) = floor_divmod(p, dx);
        self.accumulate(delta, (fx1 + first) * delta);

        let mut ex = ex1 + incr;
        self.move_curr(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            let (lift, rem) = floor_divmod(SUBPIXEL_SCALE as i64 * (y2 - y + delta) as i64, dx);
            modulo -= dx;
            while ex != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.accumulate(delta, SUBPIXEL_SCALE * delta);
                y += delta;
                ex += incr;
                self.move_curr(ex, ey);
            }
        }
        let dy = y2 - y;
        self.accumulate(dy, (fx2 + SUBPIXEL_SCALE - first) * dy);
    }

    /// Accumulate the edge `(x1, y1) -> (x2, y2)`, in 24.8 fixed point.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let mut ey1 = y1 >> POLY_SUBPIXEL_SHIFT;
        let ey2 = y2 >> POLY_SUBPIXEL_SHIFT;
        let fy1 = y1 & SUBPIXEL_MASK;
        let fy2 = y2 & SUBPIXEL_MASK;

        self.grow_bounds(ex1, ey1);
        self.grow_bounds(ex2, ey2);
        self.move_curr(ex1, ey1);

        if ey1 == ey2 {
            self.walk_row(ey1, x1, fy1, x2, fy2);
            return;
        }

        let (first, incr) = if dy < 0 { (0, -1) } else { (SUBPIXEL_SCALE, 1) };

        if dx == 0 {
            // Vertical edge: one cell per row, same column throughout.
            let two_fx = (x1 - (ex1 << POLY_SUBPIXEL_SHIFT)) << 1;

            let delta = first - fy1;
            self.accumulate(delta, two_fx * delta);
            ey1 += incr;
            self.move_curr(ex1, ey1);

            let full = first + first - SUBPIXEL_SCALE;
            while ey1 != ey2 {
                self.curr.cover = full;
                self.curr.area = two_fx * full;
                ey1 += incr;
                self.move_curr(ex1, ey1);
            }
            let delta = fy2 - SUBPIXEL_SCALE + first;
            self.accumulate(delta, two_fx * delta);
            return;
        }

        // General case: split into per-row pieces.
        let dy_abs = dy.abs();
        let p = if dy < 0 {
            fy1 as i64 * dx
        } else {
            (SUBPIXEL_SCALE - fy1) as i64 * dx
        };
        let (delta, mut modulo) = floor_divmod(p, dy_abs);

        let mut x_from = x1 + delta;
        self.walk_row(ey1, x1, fy1, x_from, first);
        ey1 += incr;
        self.move_curr(x_from >> POLY_SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            let (lift, rem) = floor_divmod(SUBPIXEL_SCALE as i64 * dx, dy_abs);
            modulo -= dy_abs;
            while ey1 != ey2 {
                let mut delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.walk_row(ey1, x_from, SUBPIXEL_SCALE - first, x_to, first);
                x_from = x_to;
                ey1 += incr;
                self.move_curr(x_from >> POLY_SUBPIXEL_SHIFT, ey1);
            }
        }
        self.walk_row(ey1, x_from, SUBPIXEL_SCALE - first, x2, fy2);
    }

    /// Order the cells by row, then by x, and index the rows.
    pub fn sort_cells(&mut self) {
        if self.sorted {
            return;
        }
        self.flush_curr();
        self.curr = Cell::UNSET;
        if self.cells.is_empty() {
            return;
        }

        self.cells.sort_unstable_by_key(|c| (c.y, c.x));

        let height = (self.max_y - self.min_y + 1) as usize;
        self.rows.clear();
        self.rows.resize(height + 1, 0);
        for c in &self.cells {
            self.rows[(c.y - self.min_y) as usize + 1] += 1;
        }
        for i in 1..self.rows.len() {
            self.rows[i] += self.rows[i - 1];
        }
        self.sorted = true;
    }
}

// ============================================================================
// Tests
// ============================================================================
