//! # canvas-raster
//!
//! Software rendering engine behind a lightweight 2D UI canvas: an
//! anti-aliased scanline rasterizer, span fills and a scanline-level
//! Porter-Duff compositor, driven by a retained-mode [`Canvas`].
//!
//! - Anti-aliased polygon rasterization with 24.8 fixed-point subpixel accuracy
//! - Curve flattening, stroke and dash generation
//! - Solid, linear/radial gradient, pattern and image fills
//! - Eleven composite operations evaluated per scanline
//! - Drop shadows with box blur
//! - Optional vector text through `ttf-parser` (feature `font`)
//!
//! ## Architecture
//!
//! Every shape goes through the same pipeline:
//!
//! 1. **Vertex Source**: a [`VertexStorage`] path
//! 2. **Coordinate Conversion**: curve flattening, dash, stroke, affine transform
//! 3. **Rasterizer**: cells with area and cover, swept into scanlines
//! 4. **Span Generation**: one color per pixel of each span
//! 5. **Renderer**: clipped blending into a 32-bit RGBA buffer
//!
//! Compositing replaces stages 4 and 5 with [`blend_scanline`], which walks
//! two rasterizers row by row and paints the layers the operation asks for.
//!
//! [`blend_scanline`]: blend_scanline::blend_scanline

// Foundation types and math
pub mod basics;
pub mod color;
pub mod error;
pub mod gamma;
pub mod trans_affine;

// Paths and vertex conversion
pub mod bezier_arc;
pub mod curve_adaptor;
pub mod curves;
pub mod dash;
pub mod stroke;
pub mod stroke_math;
pub mod transform_adaptor;
pub mod vertex_dist;
pub mod vertex_storage;

// Rasterizer
pub mod geometry_scanline;
pub mod rasterizer;
pub mod rasterizer_cells;
pub mod rasterizer_clip;

// Pixel memory and renderers
pub mod buffer;
pub mod pixfmt_rgba;
pub mod render_base;
pub mod render_buffer;
pub mod render_scanline;

// Span generators
pub mod fill_base;
pub mod fill_blend;
pub mod fill_gradient;
pub mod fill_image;
pub mod fill_interpolator;
pub mod fill_pattern;
pub mod fill_solid;
pub mod gradient_lut;

// Compositing and effects
pub mod blend_scanline;
pub mod box_blur;

// Canvas
pub mod canvas;
pub mod paint;
pub mod text;

pub use basics::{PointD, Rect, RectD, RectI, VertexSource};
pub use blend_scanline::CompositeOperation;
pub use buffer::{BufferInfo, ColorMode, ImageInfo};
pub use canvas::{Canvas, DrawCommand, Shape};
pub use color::Rgba8;
pub use error::{Error, Result};
pub use fill_pattern::PatternRepeat;
pub use paint::{ColorStop, Gradient, Paint, PaintStyle};
pub use stroke_math::{LineCap, LineJoin};
#[cfg(feature = "font")]
pub use text::FontFace;
pub use text::FontStyle;
pub use trans_affine::TransAffine;
pub use vertex_storage::VertexStorage;
