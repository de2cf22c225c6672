//! Additive combination of two fills.
//!
//! Used for the overlap of a LIGHTER composite: both shapes' colors are
//! generated for the same pixels and summed channel by channel, saturating
//! at 255.

use crate::color::Rgba8;
use crate::fill_base::{SpanAllocator, SpanGenerator};

/// Per-channel saturating sum of two span generators.
#[derive(Debug)]
pub struct FillBlend<A, B> {
    first: A,
    second: B,
    scratch: SpanAllocator<Rgba8>,
}

impl<A: SpanGenerator, B: SpanGenerator> FillBlend<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            scratch: SpanAllocator::new(),
        }
    }

    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: SpanGenerator, B: SpanGenerator> SpanGenerator for FillBlend<A, B> {
    fn prepare(&mut self) {
        self.first.prepare();
        self.second.prepare();
    }

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32, len: usize) {
        let len = len.min(span.len());
        self.first.generate(span, x, y, len);
        let other = self.scratch.allocate(len);
        self.second.generate(other, x, y, len);
        for (dst, src) in span[..len].iter_mut().zip(other.iter()) {
            *dst = dst.saturating_add(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill_solid::FillSolid;

    #[test]
    fn test_channels_saturate() {
        let mut blend = FillBlend::new(
            FillSolid::new(Rgba8::new(200, 10, 0, 128)),
            FillSolid::new(Rgba8::new(100, 20, 5, 200)),
        );
        let mut span = [Rgba8::TRANSPARENT; 4];
        blend.prepare();
        blend.generate(&mut span, 0, 0, 4);
        assert!(span.iter().all(|c| *c == Rgba8::new(255, 30, 5, 255)));
    }

    #[test]
    fn test_respects_len() {
        let mut blend = FillBlend::new(FillSolid::new(Rgba8::RED), FillSolid::new(Rgba8::BLUE));
        let mut span = [Rgba8::TRANSPARENT; 4];
        blend.generate(&mut span, 0, 0, 2);
        assert_eq!(span[1], Rgba8::new(255, 0, 255, 255));
        assert_eq!(span[2], Rgba8::TRANSPARENT);
    }
}
