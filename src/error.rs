//! Error types for the buffer and font boundaries.
//!
//! Rendering itself never fails; only wrapping caller-supplied memory or
//! font data can.

use thiserror::Error;

use crate::buffer::ColorMode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pixel memory too small for the declared geometry.
    #[error("invalid buffer: {width}x{height} with stride {stride} needs more than {len} bytes")]
    InvalidBuffer {
        width: u32,
        height: u32,
        stride: usize,
        len: usize,
    },

    /// The renderer only writes 32-bit RGBA pixels.
    #[error("unsupported color mode: {0:?}")]
    UnsupportedColorMode(ColorMode),

    /// Image data that does not match `width * height * 4`, or an empty image.
    #[error("invalid image: {width}x{height} with {len} bytes")]
    InvalidImage { width: u32, height: u32, len: usize },

    /// Font data that could not be parsed.
    #[cfg(feature = "font")]
    #[error("font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, Error>;
