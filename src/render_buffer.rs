//! Row access over borrowed pixel memory.
//!
//! [`RenderBuffer`] views a byte slice as `height` rows of `stride` bytes,
//! each starting with `width` pixels of 4 bytes. Every access is a checked
//! slice operation.

use crate::error::{Error, Result};

/// Bytes per RGBA pixel.
pub const BPP: usize = 4;

#[derive(Debug)]
pub struct RenderBuffer<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> RenderBuffer<'a> {
    pub fn new(data: &'a mut [u8], width: u32, height: u32, stride: usize) -> Result<Self> {
        let row_bytes = width as usize * BPP;
        let needed = match height {
            0 => 0,
            h => stride * (h as usize - 1) + row_bytes,
        };
        if stride < row_bytes || data.len() < needed {
            return Err(Error::InvalidBuffer {
                width,
                height,
                stride,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes of row `y`, `width * 4` long.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * BPP]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.width as usize * BPP]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_respect_stride() {
        let mut data = vec![0u8; 3 * 12];
        {
            let mut rb = RenderBuffer::new(&mut data, 2, 3, 12).unwrap();
            rb.row_mut(1)[0] = 7;
            rb.row_mut(2)[7] = 9;
            assert_eq!(rb.row(1).len(), 8);
        }
        assert_eq!(data[12], 7);
        assert_eq!(data[24 + 7], 9);
    }

    #[test]
    fn test_too_small_rejected() {
        let mut data = vec![0u8; 10];
        assert!(RenderBuffer::new(&mut data, 2, 2, 8).is_err());
        assert!(RenderBuffer::new(&mut data, 3, 1, 8).is_err());
        assert!(RenderBuffer::new(&mut data, 2, 1, 8).is_ok());
    }
}
