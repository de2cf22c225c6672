//! Gamma curves for anti-aliasing coverage.
//!
//! The rasterizer maps every raw 8-bit coverage value through a 256-entry
//! table built from one of these curves. [`GammaNone`] is the identity and
//! the default.

use crate::basics::uround;

/// A curve on `[0, 1]`.
pub trait GammaFunction {
    fn apply(&self, x: f64) -> f64;
}

impl<F: Fn(f64) -> f64> GammaFunction for F {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct GammaNone;

impl GammaFunction for GammaNone {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        x
    }
}

/// `x^gamma`.
#[derive(Debug, Clone, Copy)]
pub struct GammaPower(pub f64);

impl Default for GammaPower {
    fn default() -> Self {
        GammaPower(1.0)
    }
}

impl GammaFunction for GammaPower {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        x.powf(self.0)
    }
}

/// Hard edge: 0 below the threshold, 1 at or above it. Turns anti-aliasing
/// off.
#[derive(Debug, Clone, Copy)]
pub struct GammaThreshold(pub f64);

impl Default for GammaThreshold {
    fn default() -> Self {
        GammaThreshold(0.5)
    }
}

impl GammaFunction for GammaThreshold {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        if x < self.0 {
            0.0
        } else {
            1.0
        }
    }
}

/// 0 below `start`, 1 above `end`, linear in between.
#[derive(Debug, Clone, Copy)]
pub struct GammaLinear {
    pub start: f64,
    pub end: f64,
}

impl GammaLinear {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

impl Default for GammaLinear {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl GammaFunction for GammaLinear {
    fn apply(&self, x: f64) -> f64 {
        if x < self.start {
            0.0
        } else if x > self.end {
            1.0
        } else if self.end > self.start {
            (x - self.start) / (self.end - self.start)
        } else {
            1.0
        }
    }
}

/// `min(x * k, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct GammaMultiply(pub f64);

impl Default for GammaMultiply {
    fn default() -> Self {
        GammaMultiply(1.0)
    }
}

impl GammaFunction for GammaMultiply {
    #[inline]
    fn apply(&self, x: f64) -> f64 {
        (x * self.0).min(1.0)
    }
}

/// Sample `f` into a 256-entry coverage table.
pub fn build_gamma_table<G: GammaFunction + ?Sized>(f: &G, table: &mut [u8; 256]) {
    for (i, v) in table.iter_mut().enumerate() {
        let g = f.apply(i as f64 / 255.0).clamp(0.0, 1.0);
        *v = uround(g * 255.0) as u8;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table<G: GammaFunction>(g: G) -> [u8; 256] {
        let mut t = [0u8; 256];
        build_gamma_table(&g, &mut t);
        t
    }

    #[test]
    fn test_none_is_identity() {
        let t = table(GammaNone);
        for (i, v) in t.iter().enumerate() {
            assert_eq!(*v as usize, i);
        }
    }

    #[test]
    fn test_power_endpoints_fixed() {
        let t = table(GammaPower(2.2));
        assert_eq!(t[0], 0);
        assert_eq!(t[255], 255);
        assert!(t[128] < 128);
    }

    #[test]
    fn test_threshold() {
        let t = table(GammaThreshold(0.5));
        assert_eq!(t[100], 0);
        assert_eq!(t[200], 255);
    }

    #[test]
    fn test_linear_and_multiply() {
        let lin = GammaLinear::new(0.25, 0.75);
        assert_eq!(lin.apply(0.1), 0.0);
        assert!((lin.apply(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(lin.apply(0.9), 1.0);

        let m = GammaMultiply(2.0);
        assert!((m.apply(0.25) - 0.5).abs() < 1e-12);
        assert_eq!(m.apply(0.75), 1.0);
    }

    #[test]
    fn test_closure_as_gamma() {
        let t = table(|x: f64| 1.0 - x);
        assert_eq!(t[0], 255);
        assert_eq!(t[255], 0);
    }
}
