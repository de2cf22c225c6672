//! Anti-aliased scanline polygon rasterizer.
//!
//! Accepts contours through `move_to`/`line_to`/`close_polygon` (or a whole
//! [`VertexSource`] through `add_path`), accumulates them into cells and then
//! sweeps the cells row by row into a [`Scanline`].
//!
//! Coverage per pixel is exact: the sweep keeps a running sum of `cover`
//! across the row, so the pixels between two boundary cells get the
//! accumulated winding as a uniform span and only the boundary cells
//! themselves need their `area`.

use crate::basics::{
    is_close, is_move_to, is_stop, is_vertex, upscale, FillingRule, VertexSource,
    POLY_SUBPIXEL_SHIFT,
};
use crate::gamma::{build_gamma_table, GammaFunction, GammaNone};
use crate::geometry_scanline::{GeometryScanline, Scanline};
use crate::rasterizer_cells::RasterizerCells;
use crate::rasterizer_clip::RasterizerClip;

const AA_SHIFT: u32 = 8;
const AA_SCALE: i32 = 1 << AA_SHIFT;
const AA_MASK: i32 = AA_SCALE - 1;
const AA_SCALE2: i32 = AA_SCALE * 2;
const AA_MASK2: i32 = AA_SCALE2 - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Polygon rasterizer with anti-aliased output.
///
/// 1. Optionally set the filling rule, gamma and clip box.
/// 2. Add contours with `move_to_d`/`line_to_d` or `add_path`.
/// 3. Call `rewind_scanlines`, then `sweep_scanline` until it returns
///    `false`.
#[derive(Debug, Clone)]
pub struct RasterizerScanlineAa {
    cells: RasterizerCells,
    clipper: RasterizerClip,
    gamma: [u8; 256],
    filling_rule: FillingRule,
    auto_close: bool,
    start_x: i32,
    start_y: i32,
    status: Status,
    scan_y: i32,
}

impl Default for RasterizerScanlineAa {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterizerScanlineAa {
    pub fn new() -> Self {
        let mut gamma = [0u8; 256];
        build_gamma_table(&GammaNone, &mut gamma);
        Self {
            cells: RasterizerCells::new(),
            clipper: RasterizerClip::new(),
            gamma,
            filling_rule: FillingRule::NonZero,
            auto_close: true,
            start_x: 0,
            start_y: 0,
            status: Status::Initial,
            scan_y: 0,
        }
    }

    /// Discard every contour. Clip box, gamma and filling rule stay.
    pub fn reset(&mut self) {
        self.cells.reset();
        self.status = Status::Initial;
    }

    pub fn set_filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    pub fn filling_rule(&self) -> FillingRule {
        self.filling_rule
    }

    /// Close open contours implicitly on the next `move_to` and on
    /// `rewind_scanlines`. On by default.
    pub fn set_auto_close(&mut self, flag: bool) {
        self.auto_close = flag;
    }

    pub fn auto_close(&self) -> bool {
        self.auto_close
    }

    /// Rebuild the coverage table from `f`.
    pub fn gamma<G: GammaFunction + ?Sized>(&mut self, f: &G) {
        build_gamma_table(f, &mut self.gamma);
    }

    /// Clip all following contours to the box, in pixels.
    pub fn clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.reset();
        self.clipper
            .clip_box(upscale(x1), upscale(y1), upscale(x2), upscale(y2));
    }

    pub fn reset_clipping(&mut self) {
        self.reset();
        self.clipper.reset_clipping();
    }

    // ========================================================================
    // Contours
    // ========================================================================

    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.clipper
                .line_to(&mut self.cells, self.start_x, self.start_y);
            self.status = Status::Closed;
        }
    }

    /// Start a contour at `(x, y)` in 24.8 fixed point.
    pub fn move_to(&mut self, x: i32, y: i32) {
        if self.cells.sorted() {
            self.reset();
        }
        if self.auto_close {
            self.close_polygon();
        }
        self.start_x = x;
        self.start_y = y;
        self.clipper.move_to(x, y);
        self.status = Status::MoveTo;
    }

    /// Edge to `(x, y)` in 24.8 fixed point.
    pub fn line_to(&mut self, x: i32, y: i32) {
        self.clipper.line_to(&mut self.cells, x, y);
        self.status = Status::LineTo;
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.move_to(upscale(x), upscale(y));
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        self.line_to(upscale(x), upscale(y));
    }

    /// Dispatch one path vertex on its command.
    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: u32) {
        if is_move_to(cmd) {
            self.move_to_d(x, y);
        } else if is_vertex(cmd) {
            self.line_to_d(x, y);
        } else if is_close(cmd) {
            self.close_polygon();
        }
    }

    /// Add every vertex of `vs`. Curves must already be flattened.
    pub fn add_path<VS: VertexSource + ?Sized>(&mut self, vs: &mut VS, path_id: u32) {
        let (mut x, mut y) = (0.0, 0.0);
        vs.rewind(path_id);
        if self.cells.sorted() {
            self.reset();
        }
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            self.add_vertex(x, y, cmd);
        }
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    pub fn min_x(&self) -> i32 {
        self.cells.min_x()
    }

    pub fn min_y(&self) -> i32 {
        self.cells.min_y()
    }

    pub fn max_x(&self) -> i32 {
        self.cells.max_x()
    }

    pub fn max_y(&self) -> i32 {
        self.cells.max_y()
    }

    // ========================================================================
    // Sweep
    // ========================================================================

    /// Sort the cells and position the sweep on the first row. `false` means
    /// there is nothing to render.
    pub fn rewind_scanlines(&mut self) -> bool {
        if self.auto_close {
            self.close_polygon();
        }
        self.cells.sort_cells();
        if self.cells.total_cells() == 0 {
            return false;
        }
        self.scan_y = self.cells.min_y();
        true
    }

    /// Position the sweep on row `y`.
    pub fn navigate_scanline(&mut self, y: i32) -> bool {
        if self.auto_close {
            self.close_polygon();
        }
        self.cells.sort_cells();
        if self.cells.total_cells() == 0 || y < self.cells.min_y() || y > self.cells.max_y() {
            return false;
        }
        self.scan_y = y;
        true
    }

    /// Row the next `sweep_scanline` starts from.
    pub fn scan_y(&self) -> i32 {
        self.scan_y
    }

    /// Map a signed area, scaled by `2 * 256 * 256`, to an 8-bit alpha.
    #[inline]
    pub fn calculate_alpha(&self, area: i32) -> u32 {
        let mut cover = (area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).abs();
        if self.filling_rule == FillingRule::EvenOdd {
            cover &= AA_MASK2;
            if cover > AA_SCALE {
                cover = AA_SCALE2 - cover;
            }
        }
        self.gamma[cover.min(AA_MASK) as usize] as u32
    }

    /// Emit the next non-empty row into `sl`. Returns `false` past the last
    /// row.
    pub fn sweep_scanline<SL: Scanline + ?Sized>(&mut self, sl: &mut SL) -> bool {
        loop {
            if self.scan_y > self.cells.max_y() {
                return false;
            }
            sl.reset_spans();
            self.sweep_row(self.scan_y, sl);
            if sl.num_spans() > 0 {
                break;
            }
            self.scan_y += 1;
        }
        sl.finalize(self.scan_y);
        self.scan_y += 1;
        true
    }

    fn sweep_row<SL: Scanline + ?Sized>(&self, y: i32, sl: &mut SL) {
        let row = self.cells.row(y);
        let mut cover = 0;
        let mut i = 0;

        while i < row.len() {
            let x = row[i].x;
            let mut area = 0;
            while i < row.len() && row[i].x == x {
                area += row[i].area;
                cover += row[i].cover;
                i += 1;
            }

            let mut run_from = x;
            if area != 0 {
                let alpha = self.calculate_alpha((cover << (POLY_SUBPIXEL_SHIFT + 1)) - area);
                if alpha != 0 {
                    sl.add_cell(x, alpha);
                }
                run_from = x + 1;
            }

            if let Some(next) = row.get(i) {
                if next.x > run_from {
                    let alpha = self.calculate_alpha(cover << (POLY_SUBPIXEL_SHIFT + 1));
                    if alpha != 0 {
                        sl.add_span(run_from, (next.x - run_from) as u32, alpha);
                    }
                }
            }
        }
    }

    /// Whether pixel `(tx, ty)` receives any coverage.
    pub fn hit_test(&mut self, tx: i32, ty: i32) -> bool {
        if !self.navigate_scanline(ty) {
            return false;
        }
        let mut sl = GeometryScanline::new();
        self.sweep_row(ty, &mut sl);
        sl.cover_at(tx) != 0
    }
}

// ============================================================================
// Tests
// ============================================================================
