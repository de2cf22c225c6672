//! Single-color span generator.

use crate::color::Rgba8;
use crate::fill_base::SpanGenerator;

/// Fills every pixel with one color.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillSolid {
    color: Rgba8,
}

impl FillSolid {
    pub fn new(color: Rgba8) -> Self {
        Self { color }
    }

    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }
}

impl SpanGenerator for FillSolid {
    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [Rgba8], _x: i32, _y: i32, len: usize) {
        span.iter_mut().take(len).for_each(|c| *c = self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_exactly_len() {
        let mut gen = FillSolid::new(Rgba8::new(10, 20, 30, 40));
        let mut span = [Rgba8::TRANSPARENT; 8];
        gen.prepare();
        gen.generate(&mut span, 3, 7, 5);
        assert!(span[..5].iter().all(|c| *c == Rgba8::new(10, 20, 30, 40)));
        assert!(span[5..].iter().all(|c| *c == Rgba8::TRANSPARENT));
    }
}
