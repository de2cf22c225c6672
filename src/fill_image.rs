//! Nearest-neighbor image fill.
//!
//! Each pixel center is mapped through the interpolator into image space
//! and the image pixel under it is taken as is. Pixels that land outside
//! the image are transparent.

use crate::buffer::ImageInfo;
use crate::color::Rgba8;
use crate::fill_base::SpanGenerator;
use crate::fill_interpolator::{FillInterpolator, SUBPIXEL_SHIFT};

/// Span generator drawing an [`ImageInfo`] through an affine matrix.
#[derive(Debug, Clone)]
pub struct FillImage {
    image: ImageInfo,
    interpolator: FillInterpolator,
    alpha: f64,
}

impl FillImage {
    /// `interpolator` maps device space into image pixels. Every sampled
    /// alpha is scaled by `alpha`.
    pub fn new(image: ImageInfo, interpolator: FillInterpolator, alpha: f64) -> Self {
        Self {
            image,
            interpolator,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn image(&self) -> &ImageInfo {
        &self.image
    }
}

impl SpanGenerator for FillImage {
    fn prepare(&mut self) {}

    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32, len: usize) {
        let (w, h) = (self.image.width() as i32, self.image.height() as i32);
        self.interpolator.begin(x as f64 + 0.5, y as f64 + 0.5, len);
        for pixel in span.iter_mut().take(len) {
            let (ix, iy) = self.interpolator.coordinates();
            let (ix, iy) = (ix >> SUBPIXEL_SHIFT, iy >> SUBPIXEL_SHIFT);
            *pixel = if (0..w).contains(&ix) && (0..h).contains(&iy) {
                let c = self.image.pixel(ix as u32, iy as u32);
                if self.alpha < 1.0 {
                    c.with_alpha_scale(self.alpha)
                } else {
                    c
                }
            } else {
                Rgba8::TRANSPARENT
            };
            self.interpolator.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trans_affine::TransAffine;

    /// 2x2 image: red, green / blue, white.
    fn checker() -> ImageInfo {
        let data = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        ImageInfo::new(data, 2, 2).unwrap()
    }

    #[test]
    fn test_identity_samples_pixels() {
        let mut fill = FillImage::new(checker(), FillInterpolator::new(TransAffine::new()), 1.0);
        let mut span = [Rgba8::TRANSPARENT; 3];
        fill.generate(&mut span, 0, 1, 3);
        assert_eq!(span[0], Rgba8::BLUE);
        assert_eq!(span[1], Rgba8::WHITE);
        assert_eq!(span[2], Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_scaled_and_translated() {
        // Image drawn at (10, 0) at twice its size.
        let mut m = TransAffine::new_scaling(2.0, 2.0);
        m.translate(10.0, 0.0);
        m.invert();
        let mut fill = FillImage::new(checker(), FillInterpolator::new(m), 1.0);
        let mut span = [Rgba8::TRANSPARENT; 6];
        fill.generate(&mut span, 9, 0, 6);
        assert_eq!(span[0], Rgba8::TRANSPARENT);
        assert_eq!(span[1], Rgba8::RED);
        assert_eq!(span[2], Rgba8::RED);
        assert_eq!(span[3], Rgba8::GREEN);
        assert_eq!(span[4], Rgba8::GREEN);
        assert_eq!(span[5], Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_alpha_scaled() {
        let mut fill = FillImage::new(checker(), FillInterpolator::new(TransAffine::new()), 0.5);
        let mut span = [Rgba8::TRANSPARENT; 1];
        fill.generate(&mut span, 0, 0, 1);
        assert_eq!(span[0].r, 255);
        assert_eq!(span[0].a, 128);
    }
}
