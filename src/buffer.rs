//! Pixel memory at the crate boundary.
//!
//! [`BufferInfo`] describes the destination the host hands to a draw pass;
//! [`ImageInfo`] is a read-only RGBA source for patterns and image draws.

use std::sync::Arc;

use crate::basics::Rect;
use crate::color::Rgba8;
use crate::error::{Error, Result};
use crate::render_buffer::RenderBuffer;

/// Pixel layout of a destination buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// 32 bits per pixel, bytes in R, G, B, A order.
    #[default]
    Argb8888,
    Rgb888,
    Rgb565,
    L8,
}

impl ColorMode {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorMode::Argb8888 => 4,
            ColorMode::Rgb888 => 3,
            ColorMode::Rgb565 => 2,
            ColorMode::L8 => 1,
        }
    }
}

/// Destination pixel buffer, borrowed from the host for one draw pass.
#[derive(Debug)]
pub struct BufferInfo<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
    mode: ColorMode,
}

impl<'a> BufferInfo<'a> {
    /// Wrap `data` as `height` rows of `stride` bytes each.
    pub fn new(data: &'a mut [u8], width: u32, height: u32, stride: usize, mode: ColorMode) -> Result<Self> {
        let row_bytes = width as usize * mode.bytes_per_pixel();
        let needed = if height == 0 {
            0
        } else {
            stride * (height as usize - 1) + row_bytes
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
            mode,
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

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// The whole buffer as a rect in pixels, both corners inclusive.
    pub fn rect(&self) -> Rect<i32> {
        Rect::new(0, 0, self.width as i32 - 1, self.height as i32 - 1)
    }

    pub fn data(&self) -> &[u8] {
        self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Row access for rendering. Only 32-bit RGBA buffers can be drawn into.
    pub fn render_buffer(&mut self) -> Result<RenderBuffer<'_>> {
        if self.mode != ColorMode::Argb8888 {
            return Err(Error::UnsupportedColorMode(self.mode));
        }
        RenderBuffer::new(self.data, self.width, self.height, self.stride)
    }
}

/// Immutable straight-alpha RGBA image, cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl ImageInfo {
    /// `data` holds `width * height` pixels as R, G, B, A bytes, row by row.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 4 {
            return Err(Error::InvalidImage {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data: data.into(),
            width,
            height,
        })
    }

    /// An image filled with one color.
    pub fn solid(color: Rgba8, width: u32, height: u32) -> Result<Self> {
        let px = [color.r, color.g, color.b, color.a];
        let data = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(data, width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`. The caller keeps coordinates inside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        match self.data.get(i..i + 4) {
            Some(p) => Rgba8::new(p[0], p[1], p[2], p[3]),
            None => Rgba8::TRANSPARENT,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
