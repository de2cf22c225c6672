//! Box blur of an RGBA sub-rectangle.
//!
//! Two passes of a running-sum box filter, horizontal then vertical, each
//! averaging `2 * radius + 1` pixels. Samples past the rectangle's edge
//! repeat the edge pixel, so pixels outside the rectangle are never read or
//! written.

use crate::basics::RectI;
use crate::render_buffer::{RenderBuffer, BPP};

/// Reusable line buffers for [`BoxBlur::blur`].
#[derive(Debug, Default, Clone)]
pub struct BoxBlur {
    line: Vec<[u32; BPP]>,
}

impl BoxBlur {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blur `rect` (inclusive, clipped to the buffer) in place.
    pub fn blur(&mut self, rbuf: &mut RenderBuffer, rect: RectI, radius: u32) {
        let mut rc = rect;
        rc.normalize();
        let bounds = RectI::new(0, 0, rbuf.width() as i32 - 1, rbuf.height() as i32 - 1);
        if radius == 0 || !rc.clip(&bounds) {
            return;
        }
        let x0 = rc.x1 as usize;
        let w = (rc.x2 - rc.x1 + 1) as usize;
        let h = (rc.y2 - rc.y1 + 1) as usize;

        for y in rc.y1..=rc.y2 {
            let row = &mut rbuf.row_mut(y as u32)[x0 * BPP..(x0 + w) * BPP];
            self.line.clear();
            self.line.extend(row.chunks_exact(BPP).map(load));
            blur_line(&self.line, radius as usize, |i, px| {
                row[i * BPP..(i + 1) * BPP].copy_from_slice(&px)
            });
        }

        for x in x0..x0 + w {
            self.line.clear();
            for y in rc.y1..=rc.y2 {
                let row = rbuf.row(y as u32);
                self.line.push(load(&row[x * BPP..(x + 1) * BPP]));
            }
            let mut out = Vec::with_capacity(h);
            blur_line(&self.line, radius as usize, |_, px| out.push(px));
            for (i, px) in out.into_iter().enumerate() {
                let row = rbuf.row_mut(rc.y1 as u32 + i as u32);
                row[x * BPP..(x + 1) * BPP].copy_from_slice(&px);
            }
        }
    }
}

#[inline]
fn load(p: &[u8]) -> [u32; BPP] {
    [p[0] as u32, p[1] as u32, p[2] as u32, p[3] as u32]
}

/// Running-sum average over `src`, emitting each result through `put`.
fn blur_line<F: FnMut(usize, [u8; BPP])>(src: &[[u32; BPP]], radius: usize, mut put: F) {
    let n = src.len();
    if n == 0 {
        return;
    }
    let last = n - 1;
    let div = (2 * radius + 1) as u32;
    let at = |i: isize| src[i.clamp(0, last as isize) as usize];

    let mut sum = [0u32; BPP];
    for k in -(radius as isize)..=radius as isize {
        let p = at(k);
        for c in 0..BPP {
            sum[c] += p[c];
        }
    }

    for i in 0..n {
        let mut px = [0u8; BPP];
        for c in 0..BPP {
            px[c] = ((sum[c] + div / 2) / div) as u8;
        }
        put(i, px);

        let add = at(i as isize + radius as isize + 1);
        let sub = at(i as isize - radius as isize);
        for c in 0..BPP {
            sum[c] = sum[c] + add[c] - sub[c];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(w: u32, h: u32) -> Vec<u8> {
        vec![0u8; (w * h * 4) as usize]
    }

    #[test]
    fn test_uniform_area_unchanged() {
        let mut data = vec![100u8; 8 * 8 * 4];
        {
            let mut rb = RenderBuffer::new(&mut data, 8, 8, 32).unwrap();
            BoxBlur::new().blur(&mut rb, RectI::new(0, 0, 7, 7), 3);
        }
        assert!(data.iter().all(|&b| b == 100));
    }

    #[test]
    fn test_spreads_single_pixel() {
        let mut data = buffer(9, 9);
        let center = (4 * 9 + 4) * 4;
        data[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
        {
            let mut rb = RenderBuffer::new(&mut data, 9, 9, 36).unwrap();
            BoxBlur::new().blur(&mut rb, RectI::new(0, 0, 8, 8), 1);
        }
        // 255 / 9, rounded.
        assert_eq!(data[center + 3], 28);
        let neighbour = (3 * 9 + 3) * 4;
        assert_eq!(data[neighbour + 3], 28);
        assert_eq!(data[3], 0);
    }

    #[test]
    fn test_outside_rect_untouched() {
        let mut data = buffer(6, 1);
        for x in 0..6 {
            data[x * 4 + 3] = if x % 2 == 0 { 255 } else { 0 };
        }
        let before = data.clone();
        {
            let mut rb = RenderBuffer::new(&mut data, 6, 1, 24).unwrap();
            BoxBlur::new().blur(&mut rb, RectI::new(2, 0, 3, 0), 1);
        }
        assert_eq!(data[..8], before[..8]);
        assert_eq!(data[16..], before[16..]);
        assert_ne!(data[8..16], before[8..16]);
    }

    #[test]
    fn test_zero_radius_is_noop() {
        let mut data = buffer(3, 3);
        data[0] = 200;
        let before = data.clone();
        {
            let mut rb = RenderBuffer::new(&mut data, 3, 3, 12).unwrap();
            BoxBlur::new().blur(&mut rb, RectI::new(0, 0, 2, 2), 0);
        }
        assert_eq!(data, before);
    }
}
