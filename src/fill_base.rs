//! Span generator interface and the reusable color buffer it writes into.

use crate::color::Rgba8;

// ============================================================================
// SpanGenerator
// ============================================================================

/// Produces one color per pixel for a horizontal run.
///
/// `prepare` runs once before a pass over all scanlines of a shape;
/// `generate` then fills `span[..len]` for the pixels `x..x + len` of row `y`.
pub trait SpanGenerator {
    fn prepare(&mut self);

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32, len: usize);
}

impl<G: SpanGenerator + ?Sized> SpanGenerator for &mut G {
    fn prepare(&mut self) {
        (**self).prepare();
    }

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32, len: usize) {
        (**self).generate(span, x, y, len);
    }
}

impl<G: SpanGenerator + ?Sized> SpanGenerator for Box<G> {
    fn prepare(&mut self) {
        (**self).prepare();
    }

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32, len: usize) {
        (**self).generate(span, x, y, len);
    }
}

// ============================================================================
// SpanAllocator
// ============================================================================

/// Color buffer reused across spans. Grows in steps of 256 elements and
/// never shrinks.
#[derive(Debug, Clone)]
pub struct SpanAllocator<C> {
    span: Vec<C>,
}

impl<C: Default + Clone> SpanAllocator<C> {
    pub fn new() -> Self {
        Self { span: Vec::new() }
    }

    /// A slice of exactly `span_len` elements. Contents are whatever the
    /// previous user left.
    pub fn allocate(&mut self, span_len: usize) -> &mut [C] {
        if span_len > self.span.len() {
            let new_size = ((span_len + 255) >> 8) << 8;
            self.span.resize(new_size, C::default());
        }
        &mut self.span[..span_len]
    }

    pub fn max_span_len(&self) -> usize {
        self.span.len()
    }
}

impl<C: Default + Clone> Default for SpanAllocator<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
