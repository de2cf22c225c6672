//! Gradient color ramp.
//!
//! Color stops are collected with `add_color` and baked into a fixed
//! 512-entry table by `build_lut`. Gradient fills only ever index the table.

use crate::basics::uround;
use crate::color::Rgba8;

/// Number of entries in every gradient ramp.
pub const GRADIENT_LUT_SIZE: usize = 512;

/// Stops closer together than this are treated as the same offset.
const STOP_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ColorStop {
    offset: f64,
    color: Rgba8,
}

/// Baked color ramp plus the stops it was built from.
#[derive(Debug, Clone)]
pub struct GradientLut {
    stops: Vec<ColorStop>,
    lut: Vec<Rgba8>,
}

impl Default for GradientLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GradientLut {
    pub fn new() -> Self {
        Self {
            stops: Vec::new(),
            lut: vec![Rgba8::TRANSPARENT; GRADIENT_LUT_SIZE],
        }
    }

    pub fn remove_all(&mut self) {
        self.stops.clear();
    }

    /// Add a stop. `offset` is clamped to [0, 1].
    pub fn add_color(&mut self, offset: f64, color: Rgba8) {
        self.stops.push(ColorStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
    }

    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    /// Sort and de-duplicate the stops, then bake the table. Of several stops
    /// at the same offset the first one added wins.
    pub fn build_lut(&mut self) {
        self.stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.stops
            .dedup_by(|later, earlier| (later.offset - earlier.offset).abs() < STOP_EPSILON);

        match self.stops.as_slice() {
            [] => self.lut.fill(Rgba8::TRANSPARENT),
            [only] => self.lut.fill(only.color),
            stops => {
                let size = GRADIENT_LUT_SIZE;
                let mut start = uround(stops[0].offset * size as f64) as usize;
                self.lut[..start.min(size)].fill(stops[0].color);

                for pair in stops.windows(2) {
                    let end = uround(pair[1].offset * size as f64) as usize;
                    let seg_len = if end > start { end - start + 1 } else { 1 };
                    for (k, i) in (start..end.min(size)).enumerate() {
                        let t = k as f64 / seg_len as f64;
                        self.lut[i] = pair[0].color.gradient(&pair[1].color, t);
                    }
                    start = end;
                }

                let last = stops[stops.len() - 1].color;
                if start < size {
                    self.lut[start..].fill(last);
                }
            }
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        GRADIENT_LUT_SIZE
    }

    /// Color at `index`, clamped into the table.
    #[inline]
    pub fn color(&self, index: i32) -> Rgba8 {
        self.lut[index.clamp(0, GRADIENT_LUT_SIZE as i32 - 1) as usize]
    }

    pub fn as_slice(&self) -> &[Rgba8] {
        &self.lut
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: u8, b: u8) -> bool {
        (a as i32 - b as i32).abs() <= 1
    }

    #[test]
    fn test_two_stop_endpoints() {
        let mut lut = GradientLut::new();
        lut.add_color(0.0, Rgba8::RED);
        lut.add_color(1.0, Rgba8::BLUE);
        lut.build_lut();
        assert_eq!(lut.color(0), Rgba8::RED);
        assert!(lut.color(GRADIENT_LUT_SIZE as i32 - 1).b >= 254);
        assert!(lut.color(GRADIENT_LUT_SIZE as i32 - 1).r <= 1);
    }

    #[test]
    fn test_midpoint_within_one() {
        let mut lut = GradientLut::new();
        lut.add_color(0.0, Rgba8::RED);
        lut.add_color(1.0, Rgba8::BLUE);
        lut.build_lut();
        let mid = lut.color(GRADIENT_LUT_SIZE as i32 / 2);
        assert!(close(mid.r, 128) || close(mid.r, 127), "{mid:?}");
        assert!(close(mid.b, 128) || close(mid.b, 127), "{mid:?}");
        assert_eq!(mid.g, 0);
        assert_eq!(mid.a, 255);
    }

    #[test]
    fn test_duplicate_stop_is_ignored() {
        let mut a = GradientLut::new();
        a.add_color(0.0, Rgba8::RED);
        a.add_color(0.5, Rgba8::GREEN);
        a.add_color(1.0, Rgba8::BLUE);
        a.build_lut();

        let mut b = GradientLut::new();
        b.add_color(1.0, Rgba8::BLUE);
        b.add_color(0.5, Rgba8::GREEN);
        b.add_color(0.0, Rgba8::RED);
        b.add_color(0.5, Rgba8::WHITE);
        b.build_lut();

        assert_eq!(b.num_stops(), 3);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_stops_inside_range_pad_ends() {
        let mut lut = GradientLut::new();
        lut.add_color(0.25, Rgba8::RED);
        lut.add_color(0.75, Rgba8::BLUE);
        lut.build_lut();
        assert_eq!(lut.color(0), Rgba8::RED);
        assert_eq!(lut.color(100), Rgba8::RED);
        assert_eq!(lut.color(400), Rgba8::BLUE);
        assert_eq!(lut.color(511), Rgba8::BLUE);
    }

    #[test]
    fn test_index_clamped() {
        let mut lut = GradientLut::new();
        lut.add_color(0.0, Rgba8::RED);
        lut.add_color(1.0, Rgba8::BLUE);
        lut.build_lut();
        assert_eq!(lut.color(-40), lut.color(0));
        assert_eq!(lut.color(10_000), lut.color(511));
    }

    #[test]
    fn test_single_stop_fills_table() {
        let mut lut = GradientLut::new();
        lut.add_color(0.3, Rgba8::GREEN);
        lut.build_lut();
        assert!(lut.as_slice().iter().all(|c| *c == Rgba8::GREEN));
    }
}
