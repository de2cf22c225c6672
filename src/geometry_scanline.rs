//! Scanline containers.
//!
//! The rasterizer sweep feeds one row of coverage at a time into a
//! [`Scanline`]. [`GeometryScanline`] stores it packed: a run of pixels with
//! individual coverage is a span with positive length and one cover byte per
//! pixel, a run with uniform coverage is a span with negative length and a
//! single cover byte.

/// Sink for one row of sweep output.
pub trait Scanline {
    /// Start a new row.
    fn reset_spans(&mut self);

    /// One pixel at `x` with coverage `cover`.
    fn add_cell(&mut self, x: i32, cover: u32);

    /// `len` pixels starting at `x`, all with coverage `cover`.
    fn add_span(&mut self, x: i32, len: u32, cover: u32);

    /// Close the row at `y`.
    fn finalize(&mut self, y: i32);

    fn num_spans(&self) -> usize;

    fn y(&self) -> i32;
}

/// One packed span. `len > 0`: per-pixel covers starting at `cover_offset`.
/// `len < 0`: `-len` pixels sharing the cover at `cover_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanBlock {
    pub x: i32,
    pub len: i32,
    pub cover_offset: usize,
}

impl SpanBlock {
    /// Number of pixels the span covers.
    #[inline]
    pub fn pixel_len(&self) -> i32 {
        self.len.abs()
    }

    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.len < 0
    }

    /// One past the last pixel.
    #[inline]
    pub fn end(&self) -> i32 {
        self.x + self.pixel_len()
    }
}

/// Packed scanline. Adjacent cells merge into one per-pixel span, adjacent
/// uniform runs with equal cover merge into one uniform span.
#[derive(Debug, Clone)]
pub struct GeometryScanline {
    last_x: i32,
    y: i32,
    covers: Vec<u8>,
    spans: Vec<SpanBlock>,
}

const NO_LAST_X: i32 = 0x7FFF_FFF0;

impl Default for GeometryScanline {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryScanline {
    pub fn new() -> Self {
        Self {
            last_x: NO_LAST_X,
            y: 0,
            covers: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Reserve room for rows spanning `[min_x, max_x]`.
    pub fn reset(&mut self, min_x: i32, max_x: i32) {
        let width = (max_x - min_x + 3).max(0) as usize;
        self.covers.reserve(width.saturating_sub(self.covers.len()));
        self.spans.reserve(width.saturating_sub(self.spans.len()));
        self.reset_spans();
    }

    pub fn spans(&self) -> &[SpanBlock] {
        &self.spans
    }

    pub fn covers(&self) -> &[u8] {
        &self.covers
    }

    /// Cover bytes of `span`: `len` bytes, or one byte for a uniform span.
    pub fn span_covers(&self, span: &SpanBlock) -> &[u8] {
        let n = if span.is_uniform() { 1 } else { span.len as usize };
        self.covers
            .get(span.cover_offset..span.cover_offset + n)
            .unwrap_or(&[])
    }

    /// Coverage of pixel `x`, 0 when no span holds it.
    pub fn cover_at(&self, x: i32) -> u8 {
        for span in &self.spans {
            if x >= span.x && x < span.end() {
                let i = if span.is_uniform() {
                    span.cover_offset
                } else {
                    span.cover_offset + (x - span.x) as usize
                };
                return self.covers.get(i).copied().unwrap_or(0);
            }
        }
        0
    }
}

impl Scanline for GeometryScanline {
    fn reset_spans(&mut self) {
        self.last_x = NO_LAST_X;
        self.covers.clear();
        self.spans.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        let offset = self.covers.len();
        self.covers.push(cover as u8);
        match self.spans.last_mut() {
            Some(span) if x == self.last_x + 1 && span.len > 0 => span.len += 1,
            _ => self.spans.push(SpanBlock {
                x,
                len: 1,
                cover_offset: offset,
            }),
        }
        self.last_x = x;
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let cover = cover as u8;
        let mergeable = match self.spans.last() {
            Some(span) => {
                x == self.last_x + 1 && span.len < 0 && self.covers[span.cover_offset] == cover
            }
            None => false,
        };
        if let (true, Some(span)) = (mergeable, self.spans.last_mut()) {
            span.len -= len as i32;
        } else {
            let offset = self.covers.len();
            self.covers.push(cover);
            self.spans.push(SpanBlock {
                x,
                len: -(len as i32),
                cover_offset: offset,
            });
        }
        self.last_x = x + len as i32 - 1;
    }

    fn finalize(&mut self, y: i32) {
        self.y = y;
    }

    fn num_spans(&self) -> usize {
        self.spans.len()
    }

    fn y(&self) -> i32 {
        self.y
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_cells_merge() {
        let mut sl = GeometryScanline::new();
        sl.reset(0, 100);
        sl.add_cell(10, 100);
        sl.add_cell(11, 200);
        sl.add_cell(12, 150);
        assert_eq!(sl.num_spans(), 1);
        let span = sl.spans()[0];
        assert_eq!((span.x, span.len), (10, 3));
        assert_eq!(sl.span_covers(&span), &[100, 200, 150]);
    }

    #[test]
    fn test_uniform_span_negative_len() {
        let mut sl = GeometryScanline::new();
        sl.add_span(5, 10, 255);
        sl.add_span(15, 5, 255);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.spans()[0].len, -15);
        assert_eq!(sl.spans()[0].end(), 20);

        sl.add_span(20, 5, 128);
        assert_eq!(sl.num_spans(), 2);
    }

    #[test]
    fn test_cell_after_uniform_span_starts_new_span() {
        let mut sl = GeometryScanline::new();
        sl.add_span(5, 3, 200);
        sl.add_cell(8, 100);
        assert_eq!(sl.num_spans(), 2);
        assert_eq!(sl.cover_at(6), 200);
        assert_eq!(sl.cover_at(8), 100);
        assert_eq!(sl.cover_at(9), 0);
    }

    #[test]
    fn test_reset_spans_clears() {
        let mut sl = GeometryScanline::new();
        sl.add_cell(1, 1);
        sl.finalize(7);
        assert_eq!(sl.y(), 7);
        sl.reset_spans();
        assert_eq!(sl.num_spans(), 0);
        assert!(sl.covers().is_empty());
    }
}
